//! Bridge between concrete Rust types and the dynamic value model.

use crate::{Catalog, Lazy, LazySeq, Ty, Value, ValueError};

/// A Rust type the mapper can read from and build.
///
/// Struct implementations describe themselves as an [`ObjectDesc`](crate::ObjectDesc)
/// and convert through [`ObjectValue`](crate::ObjectValue):
///
/// ```ignore
/// impl Reflect for Animal {
///     fn ty() -> Ty {
///         Ty::object("Animal")
///     }
///
///     fn describe(catalog: &mut Catalog) {
///         if catalog.contains("Animal") {
///             return;
///         }
///         catalog.insert(ObjectDesc::new("Animal")
///             .member(MemberDesc::new("Name", String::ty()))
///             .member(MemberDesc::new("Age", i32::ty())));
///     }
///
///     fn to_value(&self) -> Value {
///         ObjectValue::new("Animal")
///             .with("Name", self.name.to_value())
///             .with("Age", self.age.to_value())
///             .into()
///     }
///
///     fn from_value(value: Value) -> Result<Self, ValueError> {
///         let mut obj = value.into_object()?;
///         Ok(Self { name: obj.take("Name")?, age: obj.take("Age")? })
///     }
/// }
/// ```
pub trait Reflect: Sized {
    /// How this type appears as a member type.
    fn ty() -> Ty;

    /// Register this type's descriptor, and those of nested member types.
    fn describe(_catalog: &mut Catalog) {}

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Result<Self, ValueError>;
}

impl Reflect for bool {
    fn ty() -> Ty {
        Ty::bool()
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(ValueError::shape("bool", other.kind_name())),
        }
    }
}

impl Reflect for i32 {
    fn ty() -> Ty {
        Ty::i32()
    }

    fn to_value(&self) -> Value {
        Value::Int(i64::from(*self))
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Int(i) => i32::try_from(i).map_err(|_| ValueError::OutOfRange {
                value: i.to_string(),
                target: "i32".to_string(),
            }),
            Value::Enum(e) => i32::try_from(e.discriminant).map_err(|_| ValueError::OutOfRange {
                value: e.discriminant.to_string(),
                target: "i32".to_string(),
            }),
            other => Err(ValueError::shape("i32", other.kind_name())),
        }
    }
}

impl Reflect for i64 {
    fn ty() -> Ty {
        Ty::i64()
    }

    fn to_value(&self) -> Value {
        Value::Int(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Int(i) => Ok(i),
            Value::Enum(e) => Ok(e.discriminant),
            other => Err(ValueError::shape("i64", other.kind_name())),
        }
    }
}

impl Reflect for f32 {
    fn ty() -> Ty {
        Ty::f32()
    }

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        value
            .as_f64()
            .map(|f| f as f32)
            .ok_or_else(|| ValueError::shape("f32", value.kind_name()))
    }
}

impl Reflect for f64 {
    fn ty() -> Ty {
        Ty::f64()
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        value
            .as_f64()
            .ok_or_else(|| ValueError::shape("f64", value.kind_name()))
    }
}

impl Reflect for String {
    fn ty() -> Ty {
        Ty::text()
    }

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    /// Absent text reads as empty.
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Text(s) => Ok(s),
            Value::Null => Ok(String::new()),
            other => Err(ValueError::shape("String", other.kind_name())),
        }
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn ty() -> Ty {
        Ty::optional(T::ty())
    }

    fn describe(catalog: &mut Catalog) {
        T::describe(catalog);
    }

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, Reflect::to_value)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn ty() -> Ty {
        Ty::list(T::ty())
    }

    fn describe(catalog: &mut Catalog) {
        T::describe(catalog);
    }

    fn to_value(&self) -> Value {
        Value::Seq(self.iter().map(Reflect::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        value.into_items()?.into_iter().map(T::from_value).collect()
    }
}

impl<T: Reflect> Reflect for Box<[T]> {
    fn ty() -> Ty {
        Ty::array(T::ty())
    }

    fn describe(catalog: &mut Catalog) {
        T::describe(catalog);
    }

    fn to_value(&self) -> Value {
        Value::Seq(self.iter().map(Reflect::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        Vec::<T>::from_value(value).map(Vec::into_boxed_slice)
    }
}

impl<T: Reflect> Reflect for Lazy<T> {
    fn ty() -> Ty {
        Ty::lazy(T::ty())
    }

    fn describe(catalog: &mut Catalog) {
        T::describe(catalog);
    }

    fn to_value(&self) -> Value {
        Value::Lazy(self.as_seq().clone())
    }

    /// Keeps lazy input lazy; eager input is wrapped without copying elements twice.
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Lazy(seq) => Ok(Self::from_seq(seq)),
            Value::Seq(items) => Ok(Self::from_seq(LazySeq::from_items(items))),
            Value::Null => Ok(Self::from_seq(LazySeq::empty())),
            other => Err(ValueError::shape("lazy sequence", other.kind_name())),
        }
    }
}

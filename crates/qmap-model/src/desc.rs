//! Shape descriptors: members, constructors, enums.

use std::fmt;
use std::sync::Arc;

use crate::{EnumValue, ObjectValue, Ty, TypeName, Value, ValueError};

/// A named, typed slot on an object shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDesc {
    pub name: String,
    pub ty: Ty,
    /// A value can be obtained from an instance.
    pub readable: bool,
    /// A value can be assigned during or after construction.
    pub writable: bool,
}

impl MemberDesc {
    /// A readable and writable member.
    pub fn new(name: impl Into<String>, ty: Ty) -> Self {
        Self {
            name: name.into(),
            ty,
            readable: true,
            writable: true,
        }
    }

    /// A member that can only be set through a constructor.
    pub fn read_only(name: impl Into<String>, ty: Ty) -> Self {
        Self {
            writable: false,
            ..Self::new(name, ty)
        }
    }

    pub fn write_only(name: impl Into<String>, ty: Ty) -> Self {
        Self {
            readable: false,
            ..Self::new(name, ty)
        }
    }

    /// Case-insensitive name comparison.
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    NonPublic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDesc {
    pub name: String,
    pub ty: Ty,
}

/// Custom constructor body: receives the default-initialized instance and
/// the evaluated arguments in declaration order.
pub type Initializer =
    Arc<dyn Fn(&mut ObjectValue, Vec<Value>) -> Result<(), ValueError> + Send + Sync>;

/// A way to instantiate an object shape.
#[derive(Clone)]
pub struct ConstructorDesc {
    pub name: String,
    pub visibility: Visibility,
    pub params: Vec<ParamDesc>,
    initializer: Option<Initializer>,
}

impl ConstructorDesc {
    pub fn public(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            params: Vec::new(),
            initializer: None,
        }
    }

    pub fn non_public(name: impl Into<String>) -> Self {
        Self {
            visibility: Visibility::NonPublic,
            ..Self::public(name)
        }
    }

    #[must_use]
    pub fn param(mut self, name: impl Into<String>, ty: Ty) -> Self {
        self.params.push(ParamDesc {
            name: name.into(),
            ty,
        });
        self
    }

    /// Replace the default "assign each argument to the same-named member" body.
    #[must_use]
    pub fn with_initializer<F>(mut self, initializer: F) -> Self
    where
        F: Fn(&mut ObjectValue, Vec<Value>) -> Result<(), ValueError> + Send + Sync + 'static,
    {
        self.initializer = Some(Arc::new(initializer));
        self
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn param_types(&self) -> impl Iterator<Item = &Ty> {
        self.params.iter().map(|p| &p.ty)
    }

    /// Run the constructor body against a default-initialized instance.
    pub fn initialize(&self, target: &mut ObjectValue, args: Vec<Value>) -> Result<(), ValueError> {
        if let Some(initializer) = &self.initializer {
            return initializer(target, args);
        }
        for (param, value) in self.params.iter().zip(args) {
            target.set(&param.name, value);
        }
        Ok(())
    }

    /// Human-readable signature, e.g. `new(String, i32)`.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self.params.iter().map(|p| p.ty.to_string()).collect();
        format!("{}({})", self.name, params.join(", "))
    }
}

impl fmt::Debug for ConstructorDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDesc")
            .field("name", &self.name)
            .field("visibility", &self.visibility)
            .field("params", &self.params)
            .field("custom_initializer", &self.initializer.is_some())
            .finish()
    }
}

/// An enum shape: named variants with integer discriminants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDesc {
    pub name: TypeName,
    pub variants: Vec<(String, i64)>,
}

impl EnumDesc {
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            variants: Vec::new(),
        }
    }

    #[must_use]
    pub fn variant(mut self, name: impl Into<String>, discriminant: i64) -> Self {
        self.variants.push((name.into(), discriminant));
        self
    }

    pub fn name_of(&self, discriminant: i64) -> Option<&str> {
        self.variants
            .iter()
            .find(|(_, d)| *d == discriminant)
            .map(|(name, _)| name.as_str())
    }

    pub fn discriminant_of(&self, name: &str) -> Option<i64> {
        self.variants
            .iter()
            .find(|(variant, _)| variant.eq_ignore_ascii_case(name))
            .map(|(_, d)| *d)
    }

    /// Build a value from a discriminant; undeclared discriminants render as numbers.
    pub fn value_of(&self, discriminant: i64) -> EnumValue {
        let name = self
            .name_of(discriminant)
            .map_or_else(|| discriminant.to_string(), str::to_string);
        EnumValue { name, discriminant }
    }

    /// The zero value.
    pub fn default_value(&self) -> EnumValue {
        self.value_of(0)
    }
}

/// An object shape: ordered members and constructors.
#[derive(Debug, Clone)]
pub struct ObjectDesc {
    pub name: TypeName,
    pub members: Vec<MemberDesc>,
    /// Empty means an implicit public parameterless constructor.
    pub constructors: Vec<ConstructorDesc>,
}

impl ObjectDesc {
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            constructors: Vec::new(),
        }
    }

    #[must_use]
    pub fn member(mut self, member: MemberDesc) -> Self {
        self.members.push(member);
        self
    }

    #[must_use]
    pub fn constructor(mut self, constructor: ConstructorDesc) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Case-insensitive member lookup.
    pub fn find_member(&self, name: &str) -> Option<&MemberDesc> {
        self.members.iter().find(|m| m.matches(name))
    }

    pub fn find_constructor(&self, name: &str) -> Option<&ConstructorDesc> {
        self.constructors.iter().find(|c| c.name == name)
    }

    /// Constructors sharing `name`, in declaration order.
    pub fn overloads<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a ConstructorDesc> + use<'a, 'n> {
        self.constructors.iter().filter(move |c| c.name == name)
    }

    /// The `overload`-th constructor named `name`.
    pub fn find_overload(&self, name: &str, overload: usize) -> Option<&ConstructorDesc> {
        self.overloads(name).nth(overload)
    }

    /// Position of `constructors[index]` among the constructors sharing its name.
    pub fn overload_of(&self, index: usize) -> usize {
        self.constructors.get(index).map_or(0, |ctor| {
            self.constructors[..index]
                .iter()
                .filter(|c| c.name == ctor.name)
                .count()
        })
    }

    pub fn readable_members(&self) -> impl Iterator<Item = &MemberDesc> {
        self.members.iter().filter(|m| m.readable)
    }

    pub fn writable_members(&self) -> impl Iterator<Item = &MemberDesc> {
        self.members.iter().filter(|m| m.writable)
    }
}

/// Any registered shape.
#[derive(Debug, Clone)]
pub enum TypeDesc {
    Object(ObjectDesc),
    Enum(EnumDesc),
}

impl TypeDesc {
    pub fn name(&self) -> &TypeName {
        match self {
            Self::Object(desc) => &desc.name,
            Self::Enum(desc) => &desc.name,
        }
    }
}

impl From<ObjectDesc> for TypeDesc {
    fn from(desc: ObjectDesc) -> Self {
        Self::Object(desc)
    }
}

impl From<EnumDesc> for TypeDesc {
    fn from(desc: EnumDesc) -> Self {
        Self::Enum(desc)
    }
}

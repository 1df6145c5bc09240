//! Dynamic instance model.

use std::borrow::Cow;

use serde::{Serialize, Serializer};

use crate::{LazySeq, Reflect, TypeName, ValueError};

/// A runtime value flowing through a transformation.
///
/// Numeric width is carried by the declared [`Ty`](crate::Ty), not the value:
/// every integer is stored as `i64`, every float as `f64`.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Enum(EnumValue),
    Seq(Vec<Value>),
    /// A sequence whose elements are produced on consumption.
    Lazy(LazySeq),
    Object(ObjectValue),
}

/// An enum variant, kept with its discriminant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EnumValue {
    pub name: String,
    pub discriminant: i64,
}

/// An object instance: declaration-ordered named fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectValue {
    type_name: TypeName,
    fields: Vec<(String, Value)>,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Enum(_) => "enum",
            Self::Seq(_) => "sequence",
            Self::Lazy(_) => "lazy sequence",
            Self::Object(_) => "object",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn into_object(self) -> Result<ObjectValue, ValueError> {
        match self {
            Self::Object(obj) => Ok(obj),
            other => Err(ValueError::shape("object", other.kind_name())),
        }
    }

    /// Elements of a sequence. Lazy sequences are forced; null reads as empty.
    pub fn items(&self) -> Result<Cow<'_, [Value]>, ValueError> {
        match self {
            Self::Null => Ok(Cow::Borrowed(&[])),
            Self::Seq(items) => Ok(Cow::Borrowed(items)),
            Self::Lazy(seq) => seq.force().map(Cow::Owned),
            other => Err(ValueError::shape("sequence", other.kind_name())),
        }
    }

    pub fn into_items(self) -> Result<Vec<Value>, ValueError> {
        match self {
            Self::Seq(items) => Ok(items),
            other => other.items().map(Cow::into_owned),
        }
    }

    /// Textual rendering used for string coercion and concatenation.
    ///
    /// Null renders as empty text.
    pub fn to_text(&self) -> Result<String, ValueError> {
        match self {
            Self::Null => Ok(String::new()),
            Self::Bool(b) => Ok(b.to_string()),
            Self::Int(i) => Ok(i.to_string()),
            Self::Float(f) => Ok(f.to_string()),
            Self::Text(s) => Ok(s.clone()),
            Self::Enum(e) => Ok(e.name.clone()),
            other => Err(ValueError::shape("scalar", other.kind_name())),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Enum(a), Self::Enum(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Seq(_) | Self::Lazy(_), Self::Seq(_) | Self::Lazy(_)) => {
                match (self.items(), other.items()) {
                    (Ok(a), Ok(b)) => a == b,
                    _ => false,
                }
            }
            _ => false,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Enum(e) => serializer.serialize_str(&e.name),
            Self::Seq(_) | Self::Lazy(_) => {
                let items = self.items().map_err(serde::ser::Error::custom)?;
                serializer.collect_seq(items.iter())
            }
            Self::Object(obj) => serializer.collect_map(obj.fields()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<EnumValue> for Value {
    fn from(value: EnumValue) -> Self {
        Self::Enum(value)
    }
}

impl From<ObjectValue> for Value {
    fn from(value: ObjectValue) -> Self {
        Self::Object(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::Seq(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl ObjectValue {
    pub fn new(type_name: impl Into<TypeName>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        self.set(&name, value.into());
        self
    }

    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    /// Field lookup: exact name first, then case-insensitive.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.position(name).map(|idx| &self.fields[idx].1)
    }

    /// Assign a field, replacing a same-named (case-insensitive) one in place.
    pub fn set(&mut self, name: &str, value: Value) {
        match self.position(name) {
            Some(idx) => self.fields[idx].1 = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    /// Remove a field and convert it; a missing field reads as null.
    pub fn take<T: Reflect>(&mut self, name: &str) -> Result<T, ValueError> {
        let value = match self.position(name) {
            Some(idx) => self.fields.remove(idx).1,
            None => Value::Null,
        };
        T::from_value(value).map_err(|err| err.in_member(name))
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|(field, _)| field == name)
            .or_else(|| {
                self.fields
                    .iter()
                    .position(|(field, _)| field.eq_ignore_ascii_case(name))
            })
    }
}

//! Member types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::TypeName;

/// Built-in scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarKind {
    Bool,
    I32,
    I64,
    F32,
    F64,
    Text,
}

impl ScalarKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::I32 | Self::I64 | Self::F32 | Self::F64)
    }

    pub fn is_integer(self) -> bool {
        matches!(self, Self::I32 | Self::I64)
    }

    pub fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Text => "String",
        }
    }
}

/// Concrete shape of a sequence member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeqShape {
    /// Fixed-size, eagerly built (`Box<[T]>`).
    Array,
    /// Growable ordered collection, eagerly built (`Vec<T>`).
    List,
    /// Bare sequence; elements are produced when it is consumed.
    Lazy,
}

/// Declared type of a member, parameter, or expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ty {
    Scalar(ScalarKind),
    /// A registered enum shape.
    Enum(TypeName),
    /// A value that may be absent.
    Optional(Box<Ty>),
    /// A sequence; `element` is `None` when the element type is unknown.
    Sequence {
        shape: SeqShape,
        element: Option<Box<Ty>>,
    },
    /// A registered object shape.
    Object(TypeName),
    /// A type the mapper cannot look inside.
    Opaque(TypeName),
}

impl Ty {
    pub fn bool() -> Self {
        Self::Scalar(ScalarKind::Bool)
    }

    pub fn i32() -> Self {
        Self::Scalar(ScalarKind::I32)
    }

    pub fn i64() -> Self {
        Self::Scalar(ScalarKind::I64)
    }

    pub fn f32() -> Self {
        Self::Scalar(ScalarKind::F32)
    }

    pub fn f64() -> Self {
        Self::Scalar(ScalarKind::F64)
    }

    pub fn text() -> Self {
        Self::Scalar(ScalarKind::Text)
    }

    pub fn object(name: impl Into<TypeName>) -> Self {
        Self::Object(name.into())
    }

    pub fn enumeration(name: impl Into<TypeName>) -> Self {
        Self::Enum(name.into())
    }

    pub fn opaque(name: impl Into<TypeName>) -> Self {
        Self::Opaque(name.into())
    }

    pub fn optional(inner: Ty) -> Self {
        Self::Optional(Box::new(inner))
    }

    pub fn list(element: Ty) -> Self {
        Self::sequence(SeqShape::List, element)
    }

    pub fn array(element: Ty) -> Self {
        Self::sequence(SeqShape::Array, element)
    }

    pub fn lazy(element: Ty) -> Self {
        Self::sequence(SeqShape::Lazy, element)
    }

    pub fn sequence(shape: SeqShape, element: Ty) -> Self {
        Self::Sequence {
            shape,
            element: Some(Box::new(element)),
        }
    }

    /// A sequence whose element type cannot be determined.
    pub fn untyped_sequence(shape: SeqShape) -> Self {
        Self::Sequence {
            shape,
            element: None,
        }
    }

    /// Strip every optional layer.
    pub fn unwrap_optional(&self) -> &Ty {
        match self {
            Self::Optional(inner) => inner.unwrap_optional(),
            other => other,
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// Scalars and enums, after unwrapping optionals.
    pub fn is_scalar_like(&self) -> bool {
        matches!(self.unwrap_optional(), Self::Scalar(_) | Self::Enum(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self.unwrap_optional(), Self::Scalar(ScalarKind::Text))
    }

    pub fn is_numeric(&self) -> bool {
        self.scalar_kind().is_some_and(ScalarKind::is_numeric)
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self.unwrap_optional(), Self::Sequence { .. })
    }

    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self.unwrap_optional() {
            Self::Scalar(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn object_name(&self) -> Option<&TypeName> {
        match self.unwrap_optional() {
            Self::Object(name) => Some(name),
            _ => None,
        }
    }

    pub fn enum_name(&self) -> Option<&TypeName> {
        match self.unwrap_optional() {
            Self::Enum(name) => Some(name),
            _ => None,
        }
    }

    /// Element type of a sequence, if known.
    pub fn element(&self) -> Option<&Ty> {
        match self.unwrap_optional() {
            Self::Sequence { element, .. } => element.as_deref(),
            _ => None,
        }
    }

    pub fn seq_shape(&self) -> Option<SeqShape> {
        match self.unwrap_optional() {
            Self::Sequence { shape, .. } => Some(*shape),
            _ => None,
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => f.write_str(kind.as_str()),
            Self::Enum(name) | Self::Object(name) | Self::Opaque(name) => write!(f, "{name}"),
            Self::Optional(inner) => write!(f, "Option<{inner}>"),
            Self::Sequence { shape, element } => {
                let element = element
                    .as_deref()
                    .map_or_else(|| "?".to_string(), Ty::to_string);
                match shape {
                    SeqShape::Array => write!(f, "[{element}]"),
                    SeqShape::List => write!(f, "Vec<{element}>"),
                    SeqShape::Lazy => write!(f, "Lazy<{element}>"),
                }
            }
        }
    }
}

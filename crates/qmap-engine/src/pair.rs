use std::fmt;

use qmap_model::{Reflect, Ty, TypeName};
use serde::Serialize;

use crate::ConfigError;

/// An ordered (source, destination) pair of object shapes; the key for
/// configurations and compiled transformations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypePair {
    pub source: TypeName,
    pub destination: TypeName,
}

impl TypePair {
    pub fn new(source: impl Into<TypeName>, destination: impl Into<TypeName>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// Pair of two reflected Rust types.
    ///
    /// # Errors
    ///
    /// Both types must be object shapes.
    pub fn of<S: Reflect, D: Reflect>() -> Result<Self, ConfigError> {
        Ok(Self::new(object_name(&S::ty())?, object_name(&D::ty())?))
    }

    pub fn source_ty(&self) -> Ty {
        Ty::Object(self.source.clone())
    }

    pub fn destination_ty(&self) -> Ty {
        Ty::Object(self.destination.clone())
    }
}

pub(crate) fn object_name(ty: &Ty) -> Result<TypeName, ConfigError> {
    match ty {
        Ty::Object(name) => Ok(name.clone()),
        other => Err(ConfigError::NotAnObject {
            type_name: other.to_string(),
        }),
    }
}

impl fmt::Display for TypePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}

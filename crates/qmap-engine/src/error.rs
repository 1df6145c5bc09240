//! Error types for configuring, compiling, and running transformations.
//!
//! Configuration problems are reported while a [`MapperBuilder`](crate::MapperBuilder)
//! is being filled or while a transformation is compiled. Value problems only
//! surface when a compiled transformation runs on a concrete instance.

use std::fmt;

use qmap_model::{ModelError, ValueError};
use thiserror::Error;

/// Which side of a type pair a constructor parameter was looked up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairSide {
    Source,
    Destination,
}

impl fmt::Display for PairSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Destination => f.write_str("destination"),
        }
    }
}

/// Errors raised by invalid mapping configuration.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    // =========================================================================
    // REGISTRATION ERRORS
    // =========================================================================
    /// A type pair was configured twice.
    #[error("mapping from {source_type} to {destination_type} is already configured")]
    DuplicateConfiguration {
        /// Source type name.
        source_type: String,
        /// Destination type name.
        destination_type: String,
    },

    /// A type was used that the catalog does not describe.
    #[error("type '{type_name}' is not registered")]
    UnknownType {
        /// The missing type name.
        type_name: String,
    },

    /// A type pair side is not an object shape.
    #[error("type '{type_name}' is not an object shape and cannot be mapped directly")]
    NotAnObject {
        /// The offending type name.
        type_name: String,
    },

    /// A shape descriptor was rejected by the catalog.
    #[error(transparent)]
    Model(#[from] ModelError),

    // =========================================================================
    // MEMBER ERRORS
    // =========================================================================
    /// A member name does not exist on a shape.
    #[error("'{member}' is not a member of {type_name}")]
    UnknownMember {
        /// The requested member.
        member: String,
        /// The shape that was searched.
        type_name: String,
    },

    /// A member match targets a member that cannot be assigned.
    #[error("member '{member}' of {type_name} is not writable")]
    NotWritable {
        /// The read-only member.
        member: String,
        /// The destination shape.
        type_name: String,
    },

    // =========================================================================
    // CONSTRUCTOR ERRORS
    // =========================================================================
    /// An explicit constructor choice is not a constructor invocation.
    #[error("constructor choice for {destination_type} must invoke a constructor, found {found}")]
    NotAConstructor {
        /// Destination type name.
        destination_type: String,
        /// What the supplied expression was instead.
        found: String,
    },

    /// No constructor of the destination matches the requested one.
    #[error("{destination_type} has no constructor matching {signature}")]
    NoMatchingConstructor {
        /// Destination type name.
        destination_type: String,
        /// The requested signature, rendered.
        signature: String,
    },

    /// A constructor parameter has no readable same-named member.
    #[error(
        "{parameter} parameter of constructor has no match or can't be read at {searched_type} \
         ({side}) while mapping {source_type} to {destination_type}"
    )]
    UnmatchedConstructorParameter {
        /// The parameter name.
        parameter: String,
        /// Which side lacked the member.
        side: PairSide,
        /// The type that was searched.
        searched_type: String,
        /// Source type name.
        source_type: String,
        /// Destination type name.
        destination_type: String,
    },

    // =========================================================================
    // EXPRESSION ERRORS
    // =========================================================================
    /// An expression cannot be typed against the shapes it reads.
    #[error("invalid expression: {message}")]
    InvalidExpression {
        /// Description of the problem.
        message: String,
    },
}

impl ConfigError {
    pub(crate) fn unknown_type(type_name: impl fmt::Display) -> Self {
        Self::UnknownType {
            type_name: type_name.to_string(),
        }
    }

    pub(crate) fn invalid_expression(message: impl Into<String>) -> Self {
        Self::InvalidExpression {
            message: message.into(),
        }
    }

    /// Get a user-friendly suggestion for fixing this error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::DuplicateConfiguration { .. } => {
                Some("Merge both configurations into a single configure call.")
            }
            Self::UnknownType { .. } => {
                Some("Register the type with MapperBuilder::register before building the mapper.")
            }
            Self::UnknownMember { .. } => Some("Check the member name against the shape descriptor."),
            Self::NotWritable { .. } => {
                Some("Read-only members can only be set through a constructor parameter.")
            }
            Self::NotAConstructor { .. } => {
                Some("Pass Expr::construct(..) naming one of the destination's constructors.")
            }
            Self::NoMatchingConstructor { .. } => {
                Some("Check the constructor name and the number and types of its arguments.")
            }
            Self::UnmatchedConstructorParameter { .. } => Some(
                "Rename the parameter to match a member, or choose a constructor explicitly.",
            ),
            _ => None,
        }
    }
}

/// Any failure of a mapper operation.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum MapError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Value(#[from] ValueError),
}

impl MapError {
    /// True when the failure comes from configuration rather than input data.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, MapError>;

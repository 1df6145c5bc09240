//! Error types for shape registration and value handling.

use thiserror::Error;

/// Errors raised while registering shape descriptors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModelError {
    /// Type names must be non-empty.
    #[error("invalid type name: '{0}'")]
    InvalidTypeName(String),

    /// Two members of one shape share a name (compared case-insensitively).
    #[error("type '{type_name}' declares member '{member}' more than once")]
    DuplicateMember {
        /// The declaring type.
        type_name: String,
        /// The repeated member name.
        member: String,
    },
}

/// Errors raised while reading, converting, or materializing values.
///
/// These surface when a transformation runs on a concrete instance, never
/// while it is being compiled.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ValueError {
    /// Text could not be parsed into the requested scalar.
    #[error("cannot parse '{text}' as {target}")]
    Unparsable {
        /// The offending text.
        text: String,
        /// The requested target type.
        target: String,
    },

    /// A numeric value does not fit the requested type.
    #[error("value {value} is out of range for {target}")]
    OutOfRange {
        /// The offending value, rendered.
        value: String,
        /// The requested target type.
        target: String,
    },

    /// A value has a different shape than the one required.
    #[error("expected {expected}, found {found}")]
    Shape {
        /// What the caller required.
        expected: String,
        /// What was actually present.
        found: String,
    },

    /// A member could not be read or converted.
    #[error("member '{member}': {source}")]
    Member {
        /// The member being read.
        member: String,
        /// The underlying failure.
        source: Box<ValueError>,
    },

    /// An expression referenced a variable with no binding in scope.
    #[error("unbound variable {0}")]
    UnboundVariable(String),

    /// A nested transformation was invoked before it finished compiling.
    #[error("no compiled transformation available for {pair}")]
    TransformationUnavailable {
        /// The type pair, rendered.
        pair: String,
    },

    /// A user-supplied function failed.
    #[error("{function}: {message}")]
    Function {
        /// Function name.
        function: String,
        /// Failure description.
        message: String,
    },
}

impl ValueError {
    /// Build a shape mismatch error.
    pub fn shape(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::Shape {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Attach the member being read to an error.
    pub fn in_member(self, member: impl Into<String>) -> Self {
        Self::Member {
            member: member.into(),
            source: Box::new(self),
        }
    }
}

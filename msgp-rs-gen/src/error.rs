//! Error types for code generation.
//!
//! Generation errors are expected outcomes when a schema describes something
//! that cannot be emitted. They halt generation of the affected type only and
//! are reported to the caller; nothing here panics.

use thiserror::Error;

/// Error produced while generating code for a type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    /// The type or one of its shapes cannot be emitted.
    #[error("cannot generate code for '{type_name}': {reason}")]
    Unsupported { type_name: String, reason: String },

    /// Two fields of one struct resolve to the same wire key.
    #[error("fields '{first}' and '{second}' of '{type_name}' share the wire key \"{key}\"")]
    DuplicateKey {
        type_name: String,
        key: String,
        first: String,
        second: String,
    },

    /// A schema document declares the same type twice.
    #[error("type '{type_name}' is declared more than once")]
    DuplicateType { type_name: String },

    /// A schema document could not be parsed.
    #[error("invalid schema document: {message}")]
    Schema { message: String },
}

impl GeneratorError {
    /// Create an unsupported-shape error.
    pub fn unsupported(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unsupported {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a schema parse error.
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// The type this error refers to, if any.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            GeneratorError::Unsupported { type_name, .. }
            | GeneratorError::DuplicateKey { type_name, .. }
            | GeneratorError::DuplicateType { type_name } => Some(type_name),
            GeneratorError::Schema { .. } => None,
        }
    }
}

impl From<serde_json::Error> for GeneratorError {
    fn from(err: serde_json::Error) -> Self {
        Self::schema(err.to_string())
    }
}

use crate::binder::SqlType;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} not found: {name}")]
    NotFound { entity: &'static str, name: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A template references a placeholder that has no bound parameter.
    #[error("Unbound placeholder @{placeholder} in query template")]
    Binding { placeholder: String },

    /// A parameter value disagrees with its declared SQL type.
    #[error("Parameter @{name} declared as {expected} but given {actual}")]
    TypeMismatch {
        name: String,
        expected: SqlType,
        actual: &'static str,
    },

    /// A result column could not be read as the type its field table declares.
    #[error("Cannot shape column {column}: {reason}")]
    Shape { column: String, reason: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Programming errors in query construction, as opposed to bad input.
    pub fn is_binder_misuse(&self) -> bool {
        matches!(self, CoreError::Binding { .. } | CoreError::TypeMismatch { .. })
    }
}

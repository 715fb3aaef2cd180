use thiserror::Error;

/// Error type covering everything that can go wrong while encoding or
/// decoding XML-RPC values, calls, responses, and faults.
#[derive(Debug, Error)]
pub enum DxrError {
    /// The XML document could not be parsed, or did not match the expected
    /// shape for the type being deserialized.
    #[error("invalid XML-RPC data: {0}")]
    InvalidData(String),

    /// A value was present, but did not have the type the caller expected.
    #[error("type mismatch: expected {expected}, got {got}")]
    WrongType {
        /// Type name the caller asked for.
        expected: String,
        /// Type name that was actually present.
        got: String,
    },

    /// A required struct member or response field was missing.
    #[error("missing field '{field}' in {container}")]
    MissingField {
        /// Name of the containing type (`Fault`, a struct, ...).
        container: String,
        /// Name of the field that was missing.
        field: String,
    },

    /// A method call or response had the wrong number of parameters for the
    /// requested tuple conversion.
    #[error("parameter count mismatch: expected {expected}, got {got}")]
    ParameterMismatch {
        /// Number of parameters the caller's type expected.
        expected: usize,
        /// Number of parameters actually present.
        got: usize,
    },
}

impl DxrError {
    /// Construct an [`DxrError::InvalidData`] from anything that prints a
    /// useful description of what went wrong.
    pub fn invalid_data(description: impl Into<String>) -> DxrError {
        DxrError::InvalidData(description.into())
    }

    /// Construct a [`DxrError::MissingField`] for `field` within `container`.
    pub fn missing_field(container: impl Into<String>, field: impl Into<String>) -> DxrError {
        DxrError::MissingField {
            container: container.into(),
            field: field.into(),
        }
    }

    /// Construct a [`DxrError::WrongType`].
    pub fn wrong_type(expected: impl Into<String>, got: impl Into<String>) -> DxrError {
        DxrError::WrongType {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Construct a [`DxrError::ParameterMismatch`].
    pub fn parameter_mismatch(expected: usize, got: usize) -> DxrError {
        DxrError::ParameterMismatch { expected, got }
    }
}

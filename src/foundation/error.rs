/// Convenience result type used across grhandle.
pub type GrResult<T> = Result<T, GrError>;

/// Error taxonomy for the native object layer and the drawing/IO helpers.
///
/// The scoped wrapper itself never produces errors; everything here comes from
/// operations that acquire, decode, encode or draw.
#[derive(thiserror::Error, Debug)]
pub enum GrError {
    /// Invalid caller-provided arguments (sizes, quality factors, component counts).
    #[error("validation error: {0}")]
    Validation(String),

    /// A null handle was passed where a live one is required.
    #[error("null handle: expected {0}")]
    NullHandle(&'static str),

    /// A handle that is no longer live (or of the wrong kind) was used.
    #[error("invalid handle: {0}")]
    InvalidHandle(String),

    /// Image data could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// An image destination could not be encoded or finalized.
    #[error("encode error: {0}")]
    Encode(String),

    /// The requested operation is not available (unknown URL scheme, ...).
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GrError {
    /// Build a [`GrError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`GrError::InvalidHandle`] value.
    pub fn invalid_handle(msg: impl Into<String>) -> Self {
        Self::InvalidHandle(msg.into())
    }

    /// Build a [`GrError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`GrError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`GrError::Unsupported`] value.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

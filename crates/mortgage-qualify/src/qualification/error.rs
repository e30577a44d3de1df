/// Failures raised by the qualification entry points before any tier logic runs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QualificationError {
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
    #[error("unsupported loan program '{0}' (expected 'fha' or 'conventional')")]
    UnsupportedProduct(String),
}

impl QualificationError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

pub type QualificationResult<T> = Result<T, QualificationError>;

use thiserror::Error;

/// Failures raised by the analysis and rendering core.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EcgError {
    #[error("sampling rate must be positive and finite, got {0}")]
    InvalidSamplingRate(f64),
    #[error("signal contains no samples")]
    EmptySignal,
    #[error("display duration must be positive and finite, got {0}")]
    InvalidDuration(f64),
    #[error("beat detection failed: {0}")]
    DetectionFailed(String),
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    #[error("record '{0}' is not loaded")]
    RecordNotFound(String),
    #[error("record '{record}' has no lead named '{lead}'")]
    LeadNotFound { record: String, lead: String },
}

pub type EcgResult<T> = std::result::Result<T, EcgError>;

pub(crate) fn check_sampling_rate(fs: f64) -> EcgResult<()> {
    if fs.is_finite() && fs > 0.0 {
        Ok(())
    } else {
        Err(EcgError::InvalidSamplingRate(fs))
    }
}

use sangria_poly_commitment::CommitmentError;
use sangria_utils::FieldHelpersError;
use thiserror::Error;

/// Errors of the folding scheme, the recursive circuits, the IVC and the
/// compression SNARK.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SangriaError {
    #[error("attempted to invert the zero element")]
    FieldInversionOfZero,
    #[error("a commitment does not open to the given vector")]
    OpeningMismatch,
    #[error("the relation is not satisfied: {reason}")]
    UnsatisfiedRelation { reason: String },
    #[error("verification failed: {0}")]
    VerificationFailed(String),
    #[error("transcript misuse: {0}")]
    TranscriptMisuse(&'static str),
    #[error("inconsistent circuit synthesis: {0}")]
    Synthesis(String),
    #[error("commitment error: {0}")]
    Commitment(CommitmentError),
    #[error("serialization failed: {0}")]
    Serialization(String),
    #[error("unsupported cycle of curves: {0}")]
    UnsupportedCycle(String),
}

/// Errors returned by the IVC orchestrator.
pub type IvcError = SangriaError;

pub type Result<T> = std::result::Result<T, SangriaError>;

impl From<FieldHelpersError> for SangriaError {
    fn from(e: FieldHelpersError) -> Self {
        match e {
            FieldHelpersError::InversionOfZero => SangriaError::FieldInversionOfZero,
            other => SangriaError::Synthesis(other.to_string()),
        }
    }
}

impl From<CommitmentError> for SangriaError {
    fn from(e: CommitmentError) -> Self {
        match e {
            CommitmentError::OpeningMismatch => SangriaError::OpeningMismatch,
            other => SangriaError::Commitment(other),
        }
    }
}

impl SangriaError {
    pub fn unsatisfied(reason: impl Into<String>) -> Self {
        SangriaError::UnsatisfiedRelation {
            reason: reason.into(),
        }
    }
}

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitmentError {
    #[error("the commitment does not open to the given vector and blinding factor")]
    OpeningMismatch,
    #[error("the vector has {0} entries but the key only has {1} generators")]
    VectorTooLong(usize, usize),
    #[error("the evaluation domain ({0}) is larger than the key ({1})")]
    DomainTooLarge(usize, usize),
    #[error("the number of evaluations ({0}) doesn't match the number of points ({1})")]
    EvaluationsDontMatch(usize, usize),
    #[error("a folding challenge was zero")]
    ZeroChallenge,
}

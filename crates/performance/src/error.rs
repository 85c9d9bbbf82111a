use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PerformanceError {
    #[error("Performance ledger is unavailable: {0}")]
    Unavailable(String),

    #[error("Performance update rejected: {0}")]
    Rejected(String),

    #[error("A calculation error occurred: {0}")]
    Calculation(String),
}

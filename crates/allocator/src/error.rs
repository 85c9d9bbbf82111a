use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AllocatorError {
    #[error("Allocator parameters from configuration are invalid: {0}")]
    InvalidParameters(String),

    #[error("A calculation error occurred: {0}")]
    Calculation(#[from] CoreError),

    #[error("Vault error: {0}")]
    Vault(#[from] vault::VaultError),
}

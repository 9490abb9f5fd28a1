use berth_common::guard::Operation;
use berth_db::storage::StoreError;
use thiserror::Error;

use super::validator::ValidationError;

/// Why a certificate operation was refused. Variants are listed in the order
/// the service checks for them.
#[derive(Debug, Error)]
pub enum CertError {
    #[error("App {0} not found")]
    ResourceNotFound(String),

    #[error("Caller may not perform {0}")]
    Forbidden(Operation),

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Certificate {0} already exists")]
    AlreadyExists(String),

    #[error("Certificate {0} not found")]
    RecordNotFound(String),

    #[error("Certificate common name {found} does not match {expected}")]
    CommonNameMismatch { expected: String, found: String },

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl CertError {
    /// Translate a store failure for the certificate named `common_name`.
    pub(crate) fn from_store(err: StoreError, common_name: &str) -> Self {
        match err {
            StoreError::NotFound => Self::RecordNotFound(common_name.to_string()),
            StoreError::AlreadyExists => Self::AlreadyExists(common_name.to_string()),
            StoreError::CommonNameMismatch { expected, found } => {
                Self::CommonNameMismatch { expected, found }
            }
            other => Self::Storage(other),
        }
    }
}

//! Error taxonomy shared across the crate

use thiserror::Error;

/// Convenience alias used throughout the registry, providers and stores.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Everything that can go wrong between a raw identifier and a response.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Malformed or empty identifier; carries the offending input.
    #[error("Invalid CNPJ: {0}")]
    InvalidCnpj(String),

    /// The reference dataset could not be fetched, decoded or parsed.
    #[error("Fund dataset unavailable: {0}")]
    DatasetUnavailable(String),

    /// Requested funds absent from the ingested dataset, one message per
    /// missing fund.
    #[error("One or more funds were not found")]
    MissingFunds(Vec<String>),

    /// The store already holds a record for this fund.
    #[error("Error while adding {cnpj} to the store: {detail}")]
    DuplicateRecord { cnpj: String, detail: String },

    /// The persistence layer is unreachable or misconfigured.
    #[error("Could not connect to the store: {0}")]
    StoreUnavailable(String),

    /// A point lookup matched nothing, or the match was ambiguous.
    #[error("{0}")]
    NotFound(String),
}

/// Outcome classes, mapped to process exit codes by the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The request itself was unacceptable.
    Client,
    /// The request was fine but nothing matched.
    NotFound,
    /// The system could not complete an acceptable request.
    Server,
}

impl RegistryError {
    /// Fixed mapping from error kind to outcome class.
    pub fn category(&self) -> ErrorCategory {
        match self {
            RegistryError::InvalidCnpj(_) | RegistryError::MissingFunds(_) => ErrorCategory::Client,
            RegistryError::NotFound(_) => ErrorCategory::NotFound,
            RegistryError::DatasetUnavailable(_)
            | RegistryError::DuplicateRecord { .. }
            | RegistryError::StoreUnavailable(_) => ErrorCategory::Server,
        }
    }
}

impl From<fjall::Error> for RegistryError {
    fn from(err: fjall::Error) -> Self {
        RegistryError::StoreUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::StoreUnavailable(err.to_string())
    }
}

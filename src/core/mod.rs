//! Core business logic abstractions

pub mod cnpj;
pub mod config;
pub mod error;
pub mod fund;
pub mod log;
pub mod quote;
pub mod registry;

// Re-export main types for cleaner imports
pub use cnpj::Cnpj;
pub use error::{ErrorCategory, RegistryError, Result};
pub use fund::{CatalogProvider, FundRecord, FundRepository};
pub use quote::{QuoteRecord, QuoteRepository, QuoteService};
pub use registry::FundRegistry;

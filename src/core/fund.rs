//! Fund records and their persistence/ingestion seams

use crate::core::cnpj::Cnpj;
use crate::core::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A fund registration as projected from the CVM reference table.
///
/// Non-key fields stay as raw text: the source table is untyped and the
/// fee, date and flag columns use locale-specific formats that must
/// round-trip unmodified. Absent cells are empty strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundRecord {
    pub cnpj: Cnpj,
    pub legal_name: String,
    pub fund_type: String,
    pub fund_class: String,
    pub status: String,
    pub started_on: String,
    pub admin_fee: String,
    pub performance_fee: String,
    pub qualified_investor: String,
    pub professional_investor: String,
    pub admin_cnpj: String,
    pub admin_name: String,
    pub manager_id: String,
    pub manager_name: String,
}

/// Persistence seam for fund registrations. The CNPJ is the natural key;
/// implementations must reject a second insert for the same fund.
#[async_trait]
pub trait FundRepository: Send + Sync {
    /// Probes the store before anything expensive runs.
    async fn ping(&self) -> Result<()>;

    /// Inserts a record, returning its persisted id.
    async fn insert(&self, record: &FundRecord) -> Result<String>;

    async fn find_all(&self) -> Result<Vec<FundRecord>>;

    /// Point lookup. More than one hit for a key means the uniqueness
    /// guarantee is broken; callers decide how to treat that.
    async fn find_by_cnpj(&self, cnpj: &Cnpj) -> Result<Vec<FundRecord>>;
}

/// Source of fund registrations for a requested identifier set.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetches the records matching `cnpjs`, ordered by their position in
    /// the request. Funds absent from the source are simply absent from
    /// the output.
    async fn fetch_funds(&self, cnpjs: &[Cnpj]) -> Result<Vec<FundRecord>>;
}

//! Fund registration pipeline

use crate::core::cnpj::{self, Cnpj};
use crate::core::error::{RegistryError, Result};
use crate::core::fund::{CatalogProvider, FundRecord, FundRepository};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Orchestrates registration against the catalog and the store.
pub struct FundRegistry {
    catalog: Arc<dyn CatalogProvider>,
    store: Arc<dyn FundRepository>,
}

impl FundRegistry {
    pub fn new(catalog: Arc<dyn CatalogProvider>, store: Arc<dyn FundRepository>) -> Self {
        Self { catalog, store }
    }

    /// Registers a batch of funds, returning the persisted ids in insert
    /// order.
    ///
    /// Stages short-circuit: batch validation, store probe, catalog fetch,
    /// reconciliation, then one insert per record in catalog order. A
    /// duplicate key aborts the rest of the batch: records inserted before
    /// the conflict stay put, nothing is rolled back, and later records are
    /// never attempted.
    pub async fn register(&self, raw_cnpjs: &[String]) -> Result<Vec<String>> {
        let cnpjs = cnpj::parse_batch(raw_cnpjs)?;

        self.store.ping().await?;

        let records = self.catalog.fetch_funds(&cnpjs).await?;
        debug!(
            "Catalog returned {} records for {} requested funds",
            records.len(),
            cnpjs.len()
        );

        let missing = find_missing(&cnpjs, &records);
        if !missing.is_empty() {
            return Err(RegistryError::MissingFunds(missing));
        }

        let mut persisted = Vec::with_capacity(records.len());
        for record in &records {
            let id = self.store.insert(record).await?;
            info!("Saved {}", record.cnpj);
            persisted.push(id);
        }

        Ok(persisted)
    }

    /// Every registered fund.
    pub async fn list_all(&self) -> Result<Vec<FundRecord>> {
        self.store.find_all().await
    }

    /// Exactly one fund for `raw`. Zero hits, or several hits from a
    /// broken uniqueness guarantee, both report not-found.
    pub async fn get(&self, raw: &str) -> Result<FundRecord> {
        let cnpj = Cnpj::parse(raw)?;
        let mut funds = self.store.find_by_cnpj(&cnpj).await?;
        if funds.len() != 1 {
            return Err(RegistryError::NotFound(format!(
                "Fund {raw} ({cnpj}) not found"
            )));
        }
        Ok(funds.remove(0))
    }
}

/// One message per requested fund absent from `ingested`, in request order.
/// Empty result means every requested fund was matched.
pub fn find_missing(requested: &[Cnpj], ingested: &[FundRecord]) -> Vec<String> {
    let known: HashSet<&Cnpj> = ingested.iter().map(|record| &record.cnpj).collect();
    requested
        .iter()
        .filter(|cnpj| !known.contains(cnpj))
        .map(|cnpj| format!("Fund with CNPJ {cnpj} not found in the registry"))
        .collect()
}

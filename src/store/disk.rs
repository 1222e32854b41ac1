use crate::core::cnpj::Cnpj;
use crate::core::error::{RegistryError, Result};
use crate::core::fund::{FundRecord, FundRepository};
use crate::core::quote::{QuoteRecord, QuoteRepository};
use async_trait::async_trait;
use chrono::NaiveDate;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

/// Persistent store backed by a fjall keyspace.
///
/// Funds live in one partition keyed by the CNPJ digit form, quotes in
/// another keyed by `digits/date`. Both key shapes sort lexicographically
/// the way the domain sorts, so range scans need no post-sorting.
pub struct DiskStore {
    keyspace: Keyspace,
    funds: PartitionHandle,
    quotes: PartitionHandle,
}

impl DiskStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Opening store at {}", path.display());

        let keyspace = fjall::Config::new(path).open().map_err(|e| {
            RegistryError::StoreUnavailable(format!(
                "could not open store at {}: {e}",
                path.display()
            ))
        })?;
        let funds = keyspace.open_partition("funds", PartitionCreateOptions::default())?;
        let quotes = keyspace.open_partition("quotes", PartitionCreateOptions::default())?;

        Ok(Self {
            keyspace,
            funds,
            quotes,
        })
    }

    pub fn put_quote(&self, quote: &QuoteRecord) -> Result<()> {
        let key = quote_key(&quote.cnpj, quote.date);
        self.quotes.insert(key, serde_json::to_vec(quote)?)?;
        Ok(())
    }

    /// Fsyncs the journal so buffered writes survive a crash.
    pub fn flush(&self) -> Result<()> {
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }
}

fn quote_key(cnpj: &Cnpj, date: NaiveDate) -> String {
    format!("{}/{date}", cnpj.digits())
}

#[async_trait]
impl FundRepository for DiskStore {
    async fn ping(&self) -> Result<()> {
        self.funds.contains_key("")?;
        Ok(())
    }

    async fn insert(&self, record: &FundRecord) -> Result<String> {
        let key = record.cnpj.digits();
        if self.funds.contains_key(&key)? {
            return Err(RegistryError::DuplicateRecord {
                cnpj: record.cnpj.to_string(),
                detail: format!("key {key} already present in the funds partition"),
            });
        }

        debug!("Storing fund {}", key);
        self.funds.insert(&key, serde_json::to_vec(record)?)?;
        Ok(key)
    }

    async fn find_all(&self) -> Result<Vec<FundRecord>> {
        let mut funds = Vec::new();
        for entry in self.funds.iter() {
            let (_, value) = entry?;
            funds.push(serde_json::from_slice(&value)?);
        }
        Ok(funds)
    }

    async fn find_by_cnpj(&self, cnpj: &Cnpj) -> Result<Vec<FundRecord>> {
        match self.funds.get(cnpj.digits())? {
            Some(value) => Ok(vec![serde_json::from_slice(&value)?]),
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl QuoteRepository for DiskStore {
    async fn find_range(
        &self,
        cnpj: &Cnpj,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<QuoteRecord>> {
        let start = quote_key(cnpj, from);
        let end = quote_key(cnpj, to);

        let mut quotes = Vec::new();
        for entry in self.quotes.range(start..end).rev() {
            let (_, value) = entry?;
            quotes.push(serde_json::from_slice(&value)?);
        }
        Ok(quotes)
    }
}

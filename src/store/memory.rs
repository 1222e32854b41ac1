use crate::core::cnpj::Cnpj;
use crate::core::error::{RegistryError, Result};
use crate::core::fund::{FundRecord, FundRepository};
use crate::core::quote::{QuoteRecord, QuoteRepository};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory store backed by ordered maps.
///
/// Funds are keyed by their digit form, quotes by digit form and date,
/// which gives the same key order the disk store has. Nothing survives
/// the process; useful for tests and dry runs.
pub struct MemoryStore {
    funds: Mutex<BTreeMap<String, FundRecord>>,
    quotes: Mutex<BTreeMap<(String, NaiveDate), QuoteRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            funds: Mutex::new(BTreeMap::new()),
            quotes: Mutex::new(BTreeMap::new()),
        }
    }

    pub async fn put_quote(&self, quote: QuoteRecord) {
        let mut quotes = self.quotes.lock().await;
        quotes.insert((quote.cnpj.digits(), quote.date), quote);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FundRepository for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn insert(&self, record: &FundRecord) -> Result<String> {
        let key = record.cnpj.digits();
        let mut funds = self.funds.lock().await;
        if funds.contains_key(&key) {
            return Err(RegistryError::DuplicateRecord {
                cnpj: record.cnpj.to_string(),
                detail: format!("key {key} already present"),
            });
        }
        debug!("Storing fund {}", key);
        funds.insert(key.clone(), record.clone());
        Ok(key)
    }

    async fn find_all(&self) -> Result<Vec<FundRecord>> {
        let funds = self.funds.lock().await;
        Ok(funds.values().cloned().collect())
    }

    async fn find_by_cnpj(&self, cnpj: &Cnpj) -> Result<Vec<FundRecord>> {
        let funds = self.funds.lock().await;
        Ok(funds.get(&cnpj.digits()).cloned().into_iter().collect())
    }
}

#[async_trait]
impl QuoteRepository for MemoryStore {
    async fn find_range(
        &self,
        cnpj: &Cnpj,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<QuoteRecord>> {
        let digits = cnpj.digits();
        let quotes = self.quotes.lock().await;
        Ok(quotes
            .range((digits.clone(), from)..(digits, to))
            .rev()
            .map(|(_, quote)| quote.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fund(cnpj: &str) -> FundRecord {
        FundRecord {
            cnpj: Cnpj::parse(cnpj).unwrap(),
            legal_name: "FUNDO DE TESTE".to_string(),
            fund_type: "FI".to_string(),
            fund_class: "Fundo de Renda Fixa".to_string(),
            status: "EM FUNCIONAMENTO NORMAL".to_string(),
            started_on: "2015-01-01".to_string(),
            admin_fee: "0,5".to_string(),
            performance_fee: String::new(),
            qualified_investor: "N".to_string(),
            professional_investor: "N".to_string(),
            admin_cnpj: "00.000.000/0001-91".to_string(),
            admin_name: "ADMIN SA".to_string(),
            manager_id: "00.000.000/0001-91".to_string(),
            manager_name: "GESTOR SA".to_string(),
        }
    }

    fn quote(cnpj: &str, date: &str, value: f64) -> QuoteRecord {
        QuoteRecord {
            cnpj: Cnpj::parse(cnpj).unwrap(),
            date: date.parse().unwrap(),
            quota_value: value,
            net_assets: 1_000_000.0,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = MemoryStore::new();

        let key = store.insert(&fund("11.222.333/0001-44")).await.unwrap();
        assert_eq!(key, "11222333000144");

        let cnpj = Cnpj::parse("11.222.333/0001-44").unwrap();
        let found = store.find_by_cnpj(&cnpj).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].legal_name, "FUNDO DE TESTE");
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicates() {
        let store = MemoryStore::new();
        store.insert(&fund("11.222.333/0001-44")).await.unwrap();

        let result = store.insert(&fund("11.222.333/0001-44")).await;
        match result {
            Err(RegistryError::DuplicateRecord { cnpj, detail }) => {
                assert_eq!(cnpj, "11.222.333/0001-44");
                assert!(detail.contains("11222333000144"), "{detail}");
            }
            other => panic!("Expected DuplicateRecord, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_find_all_lists_every_fund() {
        let store = MemoryStore::new();
        store.insert(&fund("21.917.184/0001-29")).await.unwrap();
        store.insert(&fund("11.222.333/0001-44")).await.unwrap();

        let funds = store.find_all().await.unwrap();
        assert_eq!(funds.len(), 2);
    }

    #[tokio::test]
    async fn test_find_by_cnpj_misses_cleanly() {
        let store = MemoryStore::new();
        let cnpj = Cnpj::parse("11.222.333/0001-44").unwrap();

        assert!(store.find_by_cnpj(&cnpj).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_range_is_newest_first_and_excludes_the_end() {
        let store = MemoryStore::new();
        store.put_quote(quote("11.222.333/0001-44", "2021-06-01", 27.10)).await;
        store.put_quote(quote("11.222.333/0001-44", "2021-06-10", 27.15)).await;
        store.put_quote(quote("11.222.333/0001-44", "2021-06-18", 27.20)).await;
        // Quotes of another fund never leak into the range.
        store.put_quote(quote("21.917.184/0001-29", "2021-06-10", 99.0)).await;

        let cnpj = Cnpj::parse("11.222.333/0001-44").unwrap();
        let quotes = store
            .find_range(
                &cnpj,
                "2021-06-01".parse().unwrap(),
                "2021-06-18".parse().unwrap(),
            )
            .await
            .unwrap();

        let dates: Vec<String> = quotes.iter().map(|q| q.date.to_string()).collect();
        assert_eq!(dates, vec!["2021-06-10", "2021-06-01"]);
    }
}

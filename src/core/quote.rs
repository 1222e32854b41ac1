//! Quote records and the date-ranged query service

use crate::core::cnpj::Cnpj;
use crate::core::error::{RegistryError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// A dated valuation for a single fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub cnpj: Cnpj,
    pub date: NaiveDate,
    pub quota_value: f64,
    pub net_assets: f64,
}

/// Read seam for valuation history.
#[async_trait]
pub trait QuoteRepository: Send + Sync {
    /// Quotes for `cnpj` with date in `[from, to)`, newest first.
    async fn find_range(
        &self,
        cnpj: &Cnpj,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<QuoteRecord>>;
}

/// Sentinel bounds for an unrestricted history query.
pub fn unbounded_range() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(1900, 1, 1).expect("static date"),
        NaiveDate::from_ymd_opt(9999, 12, 31).expect("static date"),
    )
}

/// Serves valuation history for registered funds.
pub struct QuoteService {
    store: Arc<dyn QuoteRepository>,
}

impl QuoteService {
    pub fn new(store: Arc<dyn QuoteRepository>) -> Self {
        Self { store }
    }

    /// History for `[from, to)`, newest first. Bounds default to the
    /// unrestricted range; `to` is always exclusive.
    pub async fn get_range(
        &self,
        raw: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<QuoteRecord>> {
        let cnpj = Cnpj::parse(raw)?;
        self.range_for(&cnpj, from, to).await
    }

    /// Most recent valuation on record for the fund.
    pub async fn get_latest(&self, raw: &str) -> Result<QuoteRecord> {
        let cnpj = Cnpj::parse(raw)?;
        let quotes = self.range_for(&cnpj, None, None).await?;
        quotes.into_iter().next().ok_or_else(|| {
            RegistryError::NotFound(format!("Could not find any quotes for the fund {cnpj}"))
        })
    }

    async fn range_for(
        &self,
        cnpj: &Cnpj,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<QuoteRecord>> {
        let (min, max) = unbounded_range();
        let from = from.unwrap_or(min);
        let to = to.unwrap_or(max);
        debug!("Querying quotes for {} in [{}, {})", cnpj, from, to);
        self.store.find_range(cnpj, from, to).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeQuotes {
        quotes: Vec<QuoteRecord>,
    }

    #[async_trait]
    impl QuoteRepository for FakeQuotes {
        async fn find_range(
            &self,
            cnpj: &Cnpj,
            from: NaiveDate,
            to: NaiveDate,
        ) -> Result<Vec<QuoteRecord>> {
            let mut hits: Vec<QuoteRecord> = self
                .quotes
                .iter()
                .filter(|q| q.cnpj == *cnpj && q.date >= from && q.date < to)
                .cloned()
                .collect();
            hits.sort_by(|a, b| b.date.cmp(&a.date));
            Ok(hits)
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

    fn service_with(quotes: Vec<QuoteRecord>) -> QuoteService {
        QuoteService::new(Arc::new(FakeQuotes { quotes }))
    }

    #[tokio::test]
    async fn test_latest_picks_the_newest_date() {
        let service = service_with(vec![
            quote("11.222.333/0001-44", "2021-06-01", 1.0),
            quote("11.222.333/0001-44", "2021-06-10", 1.1),
            quote("11.222.333/0001-44", "2021-06-18", 1.2),
        ]);

        let latest = service.get_latest("11.222.333/0001-44").await.unwrap();
        assert_eq!(latest.date.to_string(), "2021-06-18");
        assert_eq!(latest.quota_value, 1.2);
    }

    #[tokio::test]
    async fn test_range_excludes_the_to_bound() {
        let service = service_with(vec![
            quote("11.222.333/0001-44", "2021-06-01", 1.0),
            quote("11.222.333/0001-44", "2021-06-10", 1.1),
            quote("11.222.333/0001-44", "2021-06-18", 1.2),
        ]);

        let quotes = service
            .get_range(
                "11.222.333/0001-44",
                Some("2021-06-01".parse().unwrap()),
                Some("2021-06-18".parse().unwrap()),
            )
            .await
            .unwrap();

        let dates: Vec<String> = quotes.iter().map(|q| q.date.to_string()).collect();
        assert_eq!(dates, vec!["2021-06-10", "2021-06-01"]);
    }

    #[tokio::test]
    async fn test_latest_without_quotes_is_not_found() {
        let service = service_with(Vec::new());

        match service.get_latest("11222333000144").await {
            Err(RegistryError::NotFound(msg)) => {
                assert_eq!(
                    msg,
                    "Could not find any quotes for the fund 11.222.333/0001-44"
                );
            }
            other => panic!("Expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_identifier_is_rejected_before_the_store() {
        let service = service_with(Vec::new());

        let result = service.get_range("not-a-cnpj", None, None).await;
        assert!(matches!(result, Err(RegistryError::InvalidCnpj(_))));
    }

    #[test]
    fn test_unbounded_range_sentinels() {
        let (min, max) = unbounded_range();
        assert_eq!(min.to_string(), "1900-01-01");
        assert_eq!(max.to_string(), "9999-12-31");
    }
}

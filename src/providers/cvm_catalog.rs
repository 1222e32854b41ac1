//! Fund registrations from the CVM open data portal

use crate::core::cnpj::Cnpj;
use crate::core::error::{RegistryError, Result};
use crate::core::fund::{CatalogProvider, FundRecord};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

/// Path of the fund registration table on the portal.
const CATALOG_PATH: &str = "/dados/FI/CAD/DADOS/cad_fi.csv";

/// Serves `FundRecord`s out of the portal's registration table.
///
/// The table is a single large semicolon-delimited CSV, Latin-1 encoded,
/// with a few dozen columns of which fourteen are projected here. Columns
/// are matched by name so reordering upstream is harmless; anything not
/// named in [`CatalogColumns`] never reaches a record.
pub struct CvmCatalogProvider {
    base_url: String,
}

impl CvmCatalogProvider {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl CatalogProvider for CvmCatalogProvider {
    async fn fetch_funds(&self, cnpjs: &[Cnpj]) -> Result<Vec<FundRecord>> {
        let url = format!("{}{CATALOG_PATH}", self.base_url);
        debug!("Requesting fund catalog from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("cotas/0.1")
            .build()
            .map_err(|e| RegistryError::DatasetUnavailable(e.to_string()))?;

        let response = client.get(&url).send().await.map_err(|e| {
            RegistryError::DatasetUnavailable(format!("request to {url} failed: {e}"))
        })?;

        if !response.status().is_success() {
            return Err(RegistryError::DatasetUnavailable(format!(
                "{url} answered {}",
                response.status()
            )));
        }

        // The portal serves Latin-1 and usually omits the charset header.
        let body = response.text_with_charset("ISO-8859-1").await.map_err(|e| {
            RegistryError::DatasetUnavailable(format!("could not decode catalog body: {e}"))
        })?;

        parse_catalog(&body, cnpjs)
    }
}

/// Resolved positions of the projected columns in one particular download.
struct CatalogColumns {
    cnpj: usize,
    legal_name: usize,
    fund_type: usize,
    fund_class: usize,
    status: usize,
    started_on: usize,
    admin_fee: usize,
    performance_fee: usize,
    qualified_investor: usize,
    professional_investor: usize,
    admin_cnpj: usize,
    admin_name: usize,
    manager_id: usize,
    manager_name: usize,
}

impl CatalogColumns {
    fn resolve(headers: &csv::StringRecord) -> Result<Self> {
        let index_of = |name: &str| {
            headers.iter().position(|header| header == name).ok_or_else(|| {
                RegistryError::DatasetUnavailable(format!("catalog column {name} is missing"))
            })
        };

        Ok(Self {
            cnpj: index_of("CNPJ_FUNDO")?,
            legal_name: index_of("DENOM_SOCIAL")?,
            fund_type: index_of("TP_FUNDO")?,
            fund_class: index_of("CLASSE")?,
            status: index_of("SIT")?,
            started_on: index_of("DT_INI_ATIV")?,
            admin_fee: index_of("TAXA_ADM")?,
            performance_fee: index_of("TAXA_PERFM")?,
            qualified_investor: index_of("INVEST_QUALIF")?,
            professional_investor: index_of("INVEST_PROF")?,
            admin_cnpj: index_of("CNPJ_ADMIN")?,
            admin_name: index_of("ADMIN")?,
            manager_id: index_of("CPF_CNPJ_GESTOR")?,
            manager_name: index_of("GESTOR")?,
        })
    }

    /// Projects one table row. Absent cells become empty strings.
    fn record(&self, row: &csv::StringRecord, cnpj: &Cnpj) -> FundRecord {
        let cell = |index: usize| row.get(index).unwrap_or("").to_string();

        FundRecord {
            cnpj: cnpj.clone(),
            legal_name: cell(self.legal_name),
            fund_type: cell(self.fund_type),
            fund_class: cell(self.fund_class),
            status: cell(self.status),
            started_on: cell(self.started_on),
            admin_fee: cell(self.admin_fee),
            performance_fee: cell(self.performance_fee),
            qualified_investor: cell(self.qualified_investor),
            professional_investor: cell(self.professional_investor),
            admin_cnpj: cell(self.admin_cnpj),
            admin_name: cell(self.admin_name),
            manager_id: cell(self.manager_id),
            manager_name: cell(self.manager_name),
        }
    }
}

/// Filters and projects the downloaded table for the requested funds.
///
/// Output follows request order, not table order; several table rows for
/// the same fund keep their table order within that fund's slot.
fn parse_catalog(body: &str, requested: &[Cnpj]) -> Result<Vec<FundRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| RegistryError::DatasetUnavailable(format!("catalog header unreadable: {e}")))?
        .clone();
    let columns = CatalogColumns::resolve(&headers)?;

    let slots: HashMap<&str, usize> = requested
        .iter()
        .enumerate()
        .map(|(position, cnpj)| (cnpj.as_str(), position))
        .collect();
    let mut buckets: Vec<Vec<FundRecord>> = vec![Vec::new(); requested.len()];

    for row in reader.records() {
        let row = row.map_err(|e| {
            RegistryError::DatasetUnavailable(format!("catalog row unreadable: {e}"))
        })?;
        let Some(&slot) = row.get(columns.cnpj).and_then(|value| slots.get(value)) else {
            continue;
        };
        buckets[slot].push(columns.record(&row, &requested[slot]));
    }

    Ok(buckets.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const HEADER: &str = "CNPJ_FUNDO;DENOM_SOCIAL;TP_FUNDO;CLASSE;SIT;DT_INI_ATIV;TAXA_ADM;TAXA_PERFM;INVEST_QUALIF;INVEST_PROF;CNPJ_ADMIN;ADMIN;CPF_CNPJ_GESTOR;GESTOR";

    fn row(cnpj: &str, name: &str) -> String {
        format!(
            "{cnpj};{name};FI;Fundo de Renda Fixa;EM FUNCIONAMENTO NORMAL;2015-01-01;0,5;;N;N;00.000.000/0001-91;ADMIN SA;00.000.000/0001-91;GESTOR SA"
        )
    }

    fn cnpjs(raws: &[&str]) -> Vec<Cnpj> {
        raws.iter().map(|raw| Cnpj::parse(raw).unwrap()).collect()
    }

    async fn create_catalog_mock_server(body: impl Into<Vec<u8>>) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(CATALOG_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.into()))
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[test]
    fn test_parse_filters_to_the_requested_funds() {
        let body = format!(
            "{HEADER}\n{}\n{}\n{}\n",
            row("21.917.184/0001-29", "FUNDO UM"),
            row("11.222.333/0001-44", "FUNDO DOIS"),
            row("21.917.206/0001-50", "FUNDO TRES"),
        );

        let records = parse_catalog(&body, &cnpjs(&["11.222.333/0001-44"])).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].legal_name, "FUNDO DOIS");
        assert_eq!(records[0].cnpj.as_str(), "11.222.333/0001-44");
        assert_eq!(records[0].admin_fee, "0,5");
        assert_eq!(records[0].performance_fee, "");
    }

    #[test]
    fn test_parse_output_follows_request_order() {
        let body = format!(
            "{HEADER}\n{}\n{}\n{}\n",
            row("21.917.184/0001-29", "FUNDO UM"),
            row("11.222.333/0001-44", "FUNDO DOIS"),
            row("21.917.206/0001-50", "FUNDO TRES"),
        );

        let requested = cnpjs(&[
            "21.917.206/0001-50",
            "11.222.333/0001-44",
            "21.917.184/0001-29",
        ]);
        let records = parse_catalog(&body, &requested).unwrap();

        let names: Vec<&str> = records.iter().map(|r| r.legal_name.as_str()).collect();
        assert_eq!(names, vec!["FUNDO TRES", "FUNDO DOIS", "FUNDO UM"]);
    }

    #[test]
    fn test_parse_keeps_table_order_within_one_fund() {
        let body = format!(
            "{HEADER}\n{}\n{}\n",
            row("11.222.333/0001-44", "PRIMEIRA CLASSE"),
            row("11.222.333/0001-44", "SEGUNDA CLASSE"),
        );

        let records = parse_catalog(&body, &cnpjs(&["11.222.333/0001-44"])).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.legal_name.as_str()).collect();
        assert_eq!(names, vec!["PRIMEIRA CLASSE", "SEGUNDA CLASSE"]);
    }

    #[test]
    fn test_parse_accepts_reordered_columns_and_ignores_extras() {
        let body = "TP_FUNDO;AUDITOR;CNPJ_FUNDO;DENOM_SOCIAL;CLASSE;SIT;DT_INI_ATIV;TAXA_ADM;TAXA_PERFM;INVEST_QUALIF;INVEST_PROF;CNPJ_ADMIN;ADMIN;CPF_CNPJ_GESTOR;GESTOR;COD_CVM\n\
                    FI;KPMG;11.222.333/0001-44;FUNDO DOIS;Multimercado;EM FUNCIONAMENTO NORMAL;2015-01-01;1,0;20,0;S;N;;;;GESTOR SA;12345\n";

        let records = parse_catalog(body, &cnpjs(&["11.222.333/0001-44"])).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fund_type, "FI");
        assert_eq!(records[0].fund_class, "Multimercado");
        assert_eq!(records[0].performance_fee, "20,0");
        assert_eq!(records[0].admin_cnpj, "");
        assert_eq!(records[0].admin_name, "");
    }

    #[test]
    fn test_parse_rejects_a_missing_column() {
        let body = "CNPJ_FUNDO;DENOM_SOCIAL\n11.222.333/0001-44;FUNDO DOIS\n";

        match parse_catalog(body, &cnpjs(&["11.222.333/0001-44"])) {
            Err(RegistryError::DatasetUnavailable(detail)) => {
                assert!(detail.contains("TP_FUNDO"), "{detail}");
            }
            other => panic!("Expected DatasetUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_fills_short_rows_with_empty_strings() {
        let body = format!("{HEADER}\n11.222.333/0001-44;FUNDO DOIS;FI\n");

        let records = parse_catalog(&body, &cnpjs(&["11.222.333/0001-44"])).unwrap();
        assert_eq!(records[0].legal_name, "FUNDO DOIS");
        assert_eq!(records[0].fund_type, "FI");
        assert_eq!(records[0].fund_class, "");
        assert_eq!(records[0].manager_name, "");
    }

    #[tokio::test]
    async fn test_fetch_decodes_latin1_bodies() {
        let mut body = format!("{HEADER}\n").into_bytes();
        // "FUNDO DE A\xC7\xD5ES" is Latin-1 for "FUNDO DE AÇÕES".
        body.extend_from_slice(b"11.222.333/0001-44;FUNDO DE A\xC7\xD5ES;FI;;;;;;;;;;;\n");
        let mock_server = create_catalog_mock_server(body).await;

        let provider = CvmCatalogProvider::new(&mock_server.uri());
        let records = provider
            .fetch_funds(&cnpjs(&["11.222.333/0001-44"]))
            .await
            .unwrap();

        assert_eq!(records[0].legal_name, "FUNDO DE AÇÕES");
    }

    #[tokio::test]
    async fn test_fetch_reports_http_errors() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(CATALOG_PATH))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let provider = CvmCatalogProvider::new(&mock_server.uri());
        let result = provider.fetch_funds(&cnpjs(&["11.222.333/0001-44"])).await;

        match result {
            Err(RegistryError::DatasetUnavailable(detail)) => {
                assert!(detail.contains("503"), "{detail}");
            }
            other => panic!("Expected DatasetUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_reports_unreachable_hosts() {
        // Nothing listens on this port.
        let provider = CvmCatalogProvider::new("http://127.0.0.1:1");
        let result = provider.fetch_funds(&cnpjs(&["11.222.333/0001-44"])).await;

        assert!(matches!(result, Err(RegistryError::DatasetUnavailable(_))));
    }
}

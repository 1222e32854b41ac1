//! Daily quote reports from local CSV files

use crate::core::cnpj::Cnpj;
use crate::core::error::{RegistryError, Result};
use crate::core::quote::QuoteRecord;
use chrono::NaiveDate;
use std::path::Path;
use tracing::debug;

/// Reads quotes from a daily report in the CVM `inf_diario` layout.
///
/// Reports are semicolon-delimited, Latin-1 encoded, one row per fund
/// per day. Only the identification, date, quota value and net asset
/// columns are read.
pub fn load_quotes<P: AsRef<Path>>(path: P) -> Result<Vec<QuoteRecord>> {
    let path = path.as_ref();
    debug!("Loading quotes from {}", path.display());

    let bytes = std::fs::read(path).map_err(|e| {
        RegistryError::DatasetUnavailable(format!("could not read {}: {e}", path.display()))
    })?;
    parse_daily_report(&decode_latin1(&bytes))
}

/// Latin-1 code points map one-to-one onto the first 256 Unicode scalars.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn parse_daily_report(body: &str) -> Result<Vec<QuoteRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| RegistryError::DatasetUnavailable(format!("report header unreadable: {e}")))?
        .clone();
    let index_of = |name: &str| {
        headers.iter().position(|header| header == name).ok_or_else(|| {
            RegistryError::DatasetUnavailable(format!("report column {name} is missing"))
        })
    };

    let cnpj_column = index_of("CNPJ_FUNDO")?;
    let date_column = index_of("DT_COMPTC")?;
    let quota_column = index_of("VL_QUOTA")?;
    let assets_column = index_of("VL_PATRIM_LIQ")?;

    let mut quotes = Vec::new();
    for (position, row) in reader.records().enumerate() {
        // Rows are numbered as in the file, counting the header line.
        let line = position + 2;
        let row = row.map_err(|e| {
            RegistryError::DatasetUnavailable(format!("report row {line} unreadable: {e}"))
        })?;
        let cell = |index: usize| row.get(index).unwrap_or("");

        let cnpj = Cnpj::parse(cell(cnpj_column))?;
        let date = NaiveDate::parse_from_str(cell(date_column), "%Y-%m-%d").map_err(|e| {
            RegistryError::DatasetUnavailable(format!("report row {line} has a bad date: {e}"))
        })?;
        let quota_value: f64 = cell(quota_column).parse().map_err(|e| {
            RegistryError::DatasetUnavailable(format!("report row {line} has a bad quota: {e}"))
        })?;
        let net_assets: f64 = cell(assets_column).parse().map_err(|e| {
            RegistryError::DatasetUnavailable(format!(
                "report row {line} has bad net assets: {e}"
            ))
        })?;

        quotes.push(QuoteRecord {
            cnpj,
            date,
            quota_value,
            net_assets,
        });
    }

    Ok(quotes)
}

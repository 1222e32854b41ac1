use super::envelope::Envelope;
use super::{OutputFormat, print_envelope, report_failure, ui};
use crate::core::cnpj::Cnpj;
use crate::core::quote::{QuoteRecord, QuoteService};
use anyhow::Result;
use chrono::NaiveDate;

/// Shows the latest quote of a fund, or its quotes in a date window.
pub async fn run(
    service: &QuoteService,
    cnpj: &str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    format: OutputFormat,
) -> Result<()> {
    if from.is_none() && to.is_none() {
        run_latest(service, cnpj, format).await
    } else {
        run_range(service, cnpj, from, to, format).await
    }
}

async fn run_latest(service: &QuoteService, cnpj: &str, format: OutputFormat) -> Result<()> {
    match service.get_latest(cnpj).await {
        Ok(quote) => {
            let msg = format!("Latest quote for the fund {}", quote.cnpj);
            match format {
                OutputFormat::Table => {
                    println!("{}", ui::style_text(&msg, ui::StyleType::Title));
                    println!("{}", quotes_table(std::slice::from_ref(&quote)));
                }
                _ => {
                    let envelope = Envelope::with_records(msg, 1, serde_json::to_value(&quote)?);
                    print_envelope(&envelope, format)?;
                }
            }
            Ok(())
        }
        Err(err) => {
            report_failure(&err, format)?;
            Err(err.into())
        }
    }
}

async fn run_range(
    service: &QuoteService,
    cnpj: &str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    format: OutputFormat,
) -> Result<()> {
    match fetch_range(service, cnpj, from, to).await {
        Ok((cnpj, quotes)) => {
            let msg = format!("Quotes for the fund {cnpj}");
            match format {
                OutputFormat::Table => {
                    println!("{}", ui::style_text(&msg, ui::StyleType::Title));
                    println!("{}", quotes_table(&quotes));
                    println!(
                        "{}",
                        ui::style_text(
                            &format!("{} quote(s) in the window", quotes.len()),
                            ui::StyleType::Subtle
                        )
                    );
                }
                _ => {
                    let envelope =
                        Envelope::with_records(msg, quotes.len(), serde_json::to_value(&quotes)?);
                    print_envelope(&envelope, format)?;
                }
            }
            Ok(())
        }
        Err(err) => {
            report_failure(&err, format)?;
            Err(err.into())
        }
    }
}

/// Validates the identifier up front so an empty window can still name
/// the fund canonically.
async fn fetch_range(
    service: &QuoteService,
    raw: &str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> crate::core::error::Result<(Cnpj, Vec<QuoteRecord>)> {
    let cnpj = Cnpj::parse(raw)?;
    let quotes = service.get_range(raw, from, to).await?;
    Ok((cnpj, quotes))
}

fn quotes_table(quotes: &[QuoteRecord]) -> comfy_table::Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Quota value"),
        ui::header_cell("Net assets"),
    ]);

    for quote in quotes {
        table.add_row(vec![
            quote.date.to_string(),
            format!("{:.6}", quote.quota_value),
            format!("{:.2}", quote.net_assets),
        ]);
    }
    table
}

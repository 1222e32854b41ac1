use super::envelope::Envelope;
use super::{OutputFormat, print_envelope, report_failure, ui};
use crate::core::fund::FundRecord;
use crate::core::registry::FundRegistry;
use anyhow::Result;

/// Lists every fund in the registry.
pub async fn run_all(registry: &FundRegistry, format: OutputFormat) -> Result<()> {
    match registry.list_all().await {
        Ok(funds) => {
            match format {
                OutputFormat::Table => print_funds_table(&funds),
                _ => {
                    let envelope = Envelope::with_records(
                        "All funds in the DB",
                        funds.len(),
                        serde_json::to_value(&funds)?,
                    );
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

/// Shows the registration of a single fund.
pub async fn run_one(registry: &FundRegistry, cnpj: &str, format: OutputFormat) -> Result<()> {
    match registry.get(cnpj).await {
        Ok(fund) => {
            match format {
                OutputFormat::Table => print_fund_details(&fund),
                _ => {
                    let envelope = Envelope::with_records(
                        format!("Fund: {}", fund.cnpj),
                        1,
                        serde_json::to_value(&fund)?,
                    );
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

fn print_funds_table(funds: &[FundRecord]) {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("CNPJ"),
        ui::header_cell("Name"),
        ui::header_cell("Type"),
        ui::header_cell("Class"),
        ui::header_cell("Status"),
    ]);

    for fund in funds {
        table.add_row(vec![
            fund.cnpj.as_str(),
            fund.legal_name.as_str(),
            fund.fund_type.as_str(),
            fund.fund_class.as_str(),
            fund.status.as_str(),
        ]);
    }

    println!("{table}");
    println!(
        "{}",
        ui::style_text(
            &format!("{} fund(s) in the registry", funds.len()),
            ui::StyleType::Subtle
        )
    );
}

fn print_fund_details(fund: &FundRecord) {
    println!(
        "{}",
        ui::style_text(&format!("Fund: {}", fund.cnpj), ui::StyleType::Title)
    );

    let mut table = ui::new_styled_table();
    table.add_row(vec!["Legal name", fund.legal_name.as_str()]);
    table.add_row(vec!["Type", fund.fund_type.as_str()]);
    table.add_row(vec!["Class", fund.fund_class.as_str()]);
    table.add_row(vec!["Status", fund.status.as_str()]);
    table.add_row(vec!["Started on", fund.started_on.as_str()]);
    table.add_row(vec!["Admin fee", fund.admin_fee.as_str()]);
    table.add_row(vec!["Performance fee", fund.performance_fee.as_str()]);
    table.add_row(vec!["Qualified investors", fund.qualified_investor.as_str()]);
    table.add_row(vec![
        "Professional investors",
        fund.professional_investor.as_str(),
    ]);
    table.add_row(vec!["Admin CNPJ", fund.admin_cnpj.as_str()]);
    table.add_row(vec!["Admin", fund.admin_name.as_str()]);
    table.add_row(vec!["Manager id", fund.manager_id.as_str()]);
    table.add_row(vec!["Manager", fund.manager_name.as_str()]);
    println!("{table}");
}

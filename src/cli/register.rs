use super::envelope::Envelope;
use super::{OutputFormat, print_envelope, report_failure, ui};
use crate::core::registry::FundRegistry;
use anyhow::Result;
use serde_json::json;

/// Registers funds by CNPJ and reports the stored identifiers.
pub async fn run(registry: &FundRegistry, cnpjs: &[String], format: OutputFormat) -> Result<()> {
    let spinner = ui::new_spinner("Fetching the CVM fund catalog...");
    let result = registry.register(cnpjs).await;
    spinner.finish_and_clear();

    match result {
        Ok(ids) => {
            match format {
                OutputFormat::Table => print_registered(&ids),
                _ => {
                    let envelope = Envelope::with_records("Records added", ids.len(), json!(ids));
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

fn print_registered(ids: &[String]) {
    println!("{}", ui::style_text("Records added", ui::StyleType::Title));
    for id in ids {
        println!("  {id}");
    }
    println!(
        "{}",
        ui::style_text(
            &format!("{} fund(s) registered", ids.len()),
            ui::StyleType::Subtle
        )
    );
}

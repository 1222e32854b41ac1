use super::envelope::Envelope;
use super::{OutputFormat, print_envelope, report_failure, ui};
use crate::providers::quote_file;
use crate::store::disk::DiskStore;
use anyhow::Result;
use serde_json::Value;
use std::path::Path;

/// Loads a daily report file into the quote store.
pub fn run(store: &DiskStore, file: &Path, format: OutputFormat) -> Result<()> {
    match import_quotes(store, file) {
        Ok(count) => {
            match format {
                OutputFormat::Table => {
                    println!("{}", ui::style_text("Quotes imported", ui::StyleType::Title));
                    println!(
                        "{}",
                        ui::style_text(
                            &format!("{count} quote(s) from {}", file.display()),
                            ui::StyleType::Subtle
                        )
                    );
                }
                _ => {
                    let envelope = Envelope::with_records("Quotes imported", count, Value::Null);
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

fn import_quotes(store: &DiskStore, file: &Path) -> crate::core::error::Result<usize> {
    let quotes = quote_file::load_quotes(file)?;

    let progress = ui::new_progress_bar(quotes.len() as u64, true);
    progress.set_message("Importing quotes");
    for quote in &quotes {
        store.put_quote(quote)?;
        progress.inc(1);
    }
    progress.finish_and_clear();

    store.flush()?;
    Ok(quotes.len())
}

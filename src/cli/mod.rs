//! Command handlers and terminal output

pub mod envelope;
pub mod funds;
pub mod import;
pub mod quote;
pub mod register;
pub mod setup;
pub mod ui;

use crate::core::error::RegistryError;
use clap::ValueEnum;
use envelope::Envelope;

/// Output rendering selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Styled terminal tables.
    #[default]
    Table,
    /// A JSON envelope with `msg`, `error` and `data` fields.
    Json,
    /// The same envelope rendered as XML.
    Xml,
}

/// Prints an envelope on stdout in one of the machine formats.
pub(crate) fn print_envelope(envelope: &Envelope, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", envelope.to_json()?),
        OutputFormat::Xml => println!("{}", envelope.to_xml()),
        OutputFormat::Table => unreachable!("table output is rendered by the command"),
    }
    Ok(())
}

/// Reports a failed command on stdout for the machine formats.
///
/// Table consumers get the error on stderr with the exit code instead,
/// so this prints nothing for them.
pub(crate) fn report_failure(err: &RegistryError, format: OutputFormat) -> anyhow::Result<()> {
    if format != OutputFormat::Table {
        print_envelope(&Envelope::failure(err), format)?;
    }
    Ok(())
}

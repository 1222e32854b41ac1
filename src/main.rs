use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use cotas::cli::OutputFormat;
use cotas::core::error::{ErrorCategory, RegistryError};
use cotas::core::log::init_logging;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for cotas::AppCommand {
    fn from(cmd: Commands) -> cotas::AppCommand {
        match cmd {
            Commands::Register { cnpjs, format } => cotas::AppCommand::Register { cnpjs, format },
            Commands::Funds { format } => cotas::AppCommand::Funds { format },
            Commands::Fund { cnpj, format } => cotas::AppCommand::Fund { cnpj, format },
            Commands::Quote {
                cnpj,
                from,
                to,
                format,
            } => cotas::AppCommand::Quote {
                cnpj,
                from,
                to,
                format,
            },
            Commands::ImportQuotes { file, format } => {
                cotas::AppCommand::ImportQuotes { file, format }
            }
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Register funds from the CVM catalog by CNPJ
    Register {
        /// CNPJs of the funds to register
        cnpjs: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// List every registered fund
    Funds {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Show the registration of one fund
    Fund {
        /// CNPJ of the fund
        cnpj: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Show the latest quote of a fund, or its quotes in a date window
    Quote {
        /// CNPJ of the fund
        cnpj: String,

        /// First day of the window, e.g. 2021-06-01
        #[arg(long)]
        from: Option<NaiveDate>,

        /// First day past the window (exclusive)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Import quotes from a daily report file
    ImportQuotes {
        /// Path to a CSV file in the inf_diario layout
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => cotas::cli::setup::setup(),
        Some(cmd) => cotas::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => Cli::command().print_help().map_err(anyhow::Error::from),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Application failed");
            eprintln!("{}", console::style(format!("Error: {e:#}")).red());
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Client mistakes exit with 2, lookups that found nothing with 3,
/// everything else with 1.
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<RegistryError>() {
        Some(registry_err) => match registry_err.category() {
            ErrorCategory::Client => 2,
            ErrorCategory::NotFound => 3,
            ErrorCategory::Server => 1,
        },
        None => 1,
    }
}

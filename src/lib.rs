pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::cli::OutputFormat;
use crate::core::config::AppConfig;
use crate::core::fund::FundRepository;
use crate::core::quote::{QuoteRepository, QuoteService};
use crate::core::registry::FundRegistry;
use crate::providers::cvm_catalog::CvmCatalogProvider;
use crate::store::disk::DiskStore;
use anyhow::Result;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Commands the binary dispatches after argument parsing.
#[derive(Debug, Clone)]
pub enum AppCommand {
    Register {
        cnpjs: Vec<String>,
        format: OutputFormat,
    },
    Funds {
        format: OutputFormat,
    },
    Fund {
        cnpj: String,
        format: OutputFormat,
    },
    Quote {
        cnpj: String,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        format: OutputFormat,
    },
    ImportQuotes {
        file: PathBuf,
        format: OutputFormat,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Funds registry starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = Arc::new(DiskStore::open(config.store_path()?)?);
    let catalog = Arc::new(CvmCatalogProvider::new(&config.catalog.base_url));
    let registry = FundRegistry::new(catalog, Arc::clone(&store) as Arc<dyn FundRepository>);
    let quotes = QuoteService::new(Arc::clone(&store) as Arc<dyn QuoteRepository>);

    match command {
        AppCommand::Register { cnpjs, format } => {
            cli::register::run(&registry, &cnpjs, format).await
        }
        AppCommand::Funds { format } => cli::funds::run_all(&registry, format).await,
        AppCommand::Fund { cnpj, format } => cli::funds::run_one(&registry, &cnpj, format).await,
        AppCommand::Quote {
            cnpj,
            from,
            to,
            format,
        } => cli::quote::run(&quotes, &cnpj, from, to, format).await,
        AppCommand::ImportQuotes { file, format } => cli::import::run(&store, &file, format),
    }
}

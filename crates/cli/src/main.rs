mod config;

use clap::{Parser, Subcommand};
use config::{Settings, DEFAULT_EXPORT_PROPERTIES};
use csv_adapter::CsvTableWriter;
use hubspot_adapter::HubSpotClient;
use leadsync_core::application::{
    ListExportService, ScrapeToWarehouseService, WarehouseToCrmService,
};
use leadsync_core::config::{read_secret, SyncConfig};
use leadsync_core::flatten::LINKEDIN_PROPERTY;
use leadsync_core::ports::{Result, SyncError};
use phantombuster_adapter::PhantomBusterExport;
use sheets_adapter::SheetsReader;
use tracing::{error, info};
use warehouse_adapter::SqliteWarehouse;

/// Batch jobs that move lead data between the warehouse, the post lookup
/// sheet, the scraper export and the CRM
#[derive(Parser, Debug)]
#[command(name = "leadsync", version)]
#[command(about = "Syncs scraped leads between the warehouse and the CRM")]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Dump the CRM list membership to <output-dir>/temp_data.csv
    ExportList {
        /// Contact property to request (repeatable)
        #[arg(long = "property", default_values = DEFAULT_EXPORT_PROPERTIES.iter().copied())]
        properties: Vec<String>,
    },

    /// Create CRM contacts for warehouse leads missing from the CRM list
    WarehouseToCrm,

    /// Append new scraped contacts, companies and posts to the warehouse
    ScrapeToWarehouse,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn run(command: Commands, config: &SyncConfig) -> Result<()> {
    match command {
        Commands::ExportList { properties } => {
            let hub = HubSpotClient::new(&config.crm_base_url, read_secret(&config.crm_token_path)?)?;
            let service = ListExportService::new(
                Box::new(hub.list(config.crm_list_id, properties)),
                Box::new(CsvTableWriter::new(config.output_file())),
            );
            let rows = service.execute_export()?;
            info!(rows, path = %config.output_file().display(), "list export finished");
        }
        Commands::WarehouseToCrm => {
            let hub = HubSpotClient::new(&config.crm_base_url, read_secret(&config.crm_token_path)?)?;
            let service = WarehouseToCrmService::new(
                Box::new(SqliteWarehouse::new(&config.warehouse_path)),
                Box::new(hub.list(config.crm_list_id, vec![LINKEDIN_PROPERTY.to_string()])),
                Box::new(hub),
            );
            let report = service.execute_sync()?;
            info!(
                pushed = report.pushed.len(),
                failed = report.failed.len(),
                "warehouse to crm sync finished"
            );
        }
        Commands::ScrapeToWarehouse => {
            if config.spreadsheet_id.trim().is_empty() {
                return Err(SyncError::Config(
                    "spreadsheet id is required (--spreadsheet-id or LEADSYNC_SPREADSHEET_ID)"
                        .to_string(),
                ));
            }
            let export = PhantomBusterExport::new(read_secret(&config.scraper_link_path)?)?;
            let sheets = SheetsReader::new(
                &config.sheets_base_url,
                read_secret(&config.sheets_token_path)?,
            )?;
            let service = ScrapeToWarehouseService::new(
                Box::new(export),
                Box::new(sheets),
                Box::new(SqliteWarehouse::new(&config.warehouse_path)),
                config.spreadsheet_id.clone(),
                config.worksheet.clone(),
            );
            let jobs = service.execute_sync()?;
            let loaded: usize = jobs.iter().map(|job| job.output_rows).sum();
            info!(loaded, "scrape to warehouse sync finished");
        }
    }
    Ok(())
}

fn main() {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();
    let config = cli.settings.into_config();

    // Execute the selected job
    match run(cli.command, &config) {
        Ok(()) => {}
        Err(e) => {
            error!(error = %e, "leadsync run failed");
            std::process::exit(1);
        }
    }
}

use clap::Args;
use leadsync_core::config::{
    SyncConfig, DEFAULT_HUBSPOT_BASE, DEFAULT_SHEETS_BASE, DEFAULT_WORKSHEET,
};
use std::path::PathBuf;

/// Properties requested by `export-list` unless overridden.
pub const DEFAULT_EXPORT_PROPERTIES: &[&str] = &[
    "hs_linkedin_url",
    "firstname",
    "lastname",
    "email",
    "company",
    "createdate",
    "organic_social_stage",
    "organic_social_outreached",
    "linkedin_profile_url_organic_social_pipeline",
    "latest_funding_date",
    "latest_funding_stage",
    "total_funding",
    "post_id",
    "post",
];

/// Connection settings shared by every job. Each flag falls back to a
/// `LEADSYNC_*` environment variable (a `.env` file is honored).
#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Warehouse database file
    #[arg(long, env = "LEADSYNC_WAREHOUSE_PATH", default_value = "config/warehouse.db")]
    pub warehouse_path: PathBuf,

    /// File containing the HubSpot private app token
    #[arg(long, env = "LEADSYNC_CRM_TOKEN_PATH", default_value = "config/hs_key.txt")]
    pub crm_token_path: PathBuf,

    /// HubSpot list whose membership is read
    #[arg(long, env = "LEADSYNC_CRM_LIST_ID", default_value_t = 246)]
    pub crm_list_id: u64,

    #[arg(long, env = "LEADSYNC_CRM_BASE_URL", default_value = DEFAULT_HUBSPOT_BASE)]
    pub crm_base_url: String,

    /// File containing the Google Sheets access token
    #[arg(long, env = "LEADSYNC_SHEETS_TOKEN_PATH", default_value = "config/sheets_token.txt")]
    pub sheets_token_path: PathBuf,

    /// Spreadsheet holding the post lookup worksheet
    #[arg(long, env = "LEADSYNC_SPREADSHEET_ID", default_value = "")]
    pub spreadsheet_id: String,

    #[arg(long, env = "LEADSYNC_WORKSHEET", default_value = DEFAULT_WORKSHEET)]
    pub worksheet: String,

    #[arg(long, env = "LEADSYNC_SHEETS_BASE_URL", default_value = DEFAULT_SHEETS_BASE)]
    pub sheets_base_url: String,

    /// File containing the scraper export download link
    #[arg(long, env = "LEADSYNC_SCRAPER_LINK_PATH", default_value = "config/pb_link.txt")]
    pub scraper_link_path: PathBuf,

    /// Directory for local CSV output
    #[arg(long, env = "LEADSYNC_OUTPUT_DIR", default_value = "temp_data")]
    pub output_dir: PathBuf,
}

impl Settings {
    pub fn into_config(self) -> SyncConfig {
        SyncConfig {
            warehouse_path: self.warehouse_path,
            crm_token_path: self.crm_token_path,
            crm_list_id: self.crm_list_id,
            crm_base_url: self.crm_base_url,
            sheets_token_path: self.sheets_token_path,
            spreadsheet_id: self.spreadsheet_id,
            worksheet: self.worksheet,
            sheets_base_url: self.sheets_base_url,
            scraper_link_path: self.scraper_link_path,
            output_dir: self.output_dir,
        }
    }
}

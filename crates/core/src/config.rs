use crate::error::{Result, SyncError};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_HUBSPOT_BASE: &str = "https://api.hubapi.com";
pub const DEFAULT_SHEETS_BASE: &str = "https://sheets.googleapis.com";
pub const DEFAULT_WORKSHEET: &str = "LI Links";
pub const OUTPUT_FILE_NAME: &str = "temp_data.csv";

/// Everything a run needs to reach its collaborators, assembled once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Warehouse database file.
    pub warehouse_path: PathBuf,
    /// File holding the CRM private-app token.
    pub crm_token_path: PathBuf,
    pub crm_list_id: u64,
    pub crm_base_url: String,
    /// File holding the spreadsheet API access token.
    pub sheets_token_path: PathBuf,
    pub spreadsheet_id: String,
    pub worksheet: String,
    pub sheets_base_url: String,
    /// File holding the scraper export download link.
    pub scraper_link_path: PathBuf,
    pub output_dir: PathBuf,
}

impl SyncConfig {
    pub fn output_file(&self) -> PathBuf {
        self.output_dir.join(OUTPUT_FILE_NAME)
    }
}

/// Reads a single-value secret file (token, link), trimmed.
/// Missing, unreadable or blank files are credential errors.
pub fn read_secret(path: &Path) -> Result<String> {
    let raw = fs::read_to_string(path).map_err(|e| SyncError::Credentials {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let value = raw.trim();
    if value.is_empty() {
        return Err(SyncError::Credentials {
            path: path.to_path_buf(),
            reason: "file is empty".to_string(),
        });
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_secret_trims() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  pat-na1-abc  ").unwrap();
        assert_eq!(read_secret(file.path()).unwrap(), "pat-na1-abc");
    }

    #[test]
    fn test_read_secret_missing_file() {
        let err = read_secret(Path::new("/nonexistent/leadsync/token.txt")).unwrap_err();
        assert!(matches!(err, SyncError::Credentials { .. }));
    }

    #[test]
    fn test_read_secret_blank_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = read_secret(file.path()).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }
}

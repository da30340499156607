use csv::ReaderBuilder;
use leadsync_core::domain::ScrapedRow;
use leadsync_core::ports::{Result, ScrapeExport, SyncError};
use reqwest::blocking::Client;
use std::io::Read;
use std::time::Duration;
use tracing::{debug, info};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Downloads the scraper's CSV result file from its share link
pub struct PhantomBusterExport {
    client: Client,
    download_link: String,
}

impl PhantomBusterExport {
    pub fn new(download_link: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SyncError::backend("build export client", e))?;
        Ok(Self {
            client,
            download_link: download_link.into(),
        })
    }
}

/// Parses an export by header name. Extra columns are ignored and ragged
/// rows tolerated; empty cells read as missing.
pub fn parse_export<R: Read>(reader: R) -> Result<Vec<ScrapedRow>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    rdr.deserialize::<ScrapedRow>()
        .enumerate()
        .map(|(idx, row)| {
            row.map_err(|e| SyncError::Protocol(format!("export row {}: {e}", idx + 1)))
        })
        .collect()
}

impl ScrapeExport for PhantomBusterExport {
    fn download(&self) -> Result<Vec<ScrapedRow>> {
        debug!("downloading scraper export");
        let resp = self
            .client
            .get(&self.download_link)
            .send()
            .map_err(|e| SyncError::backend("download scraper export", e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(SyncError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp
            .bytes()
            .map_err(|e| SyncError::backend("read scraper export", e))?;
        let rows = parse_export(bytes.as_ref())?;
        info!(rows = rows.len(), "parsed scraper export");
        Ok(rows)
    }
}

use leadsync_core::ports::{Result, SpreadsheetReader, SyncError};
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Google Sheets values API reader
pub struct SheetsReader {
    client: Client,
    api_base: Url,
    access_token: String,
}

impl SheetsReader {
    pub fn new(api_base: &str, access_token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SyncError::backend("build sheets client", e))?;
        let api_base = Url::parse(api_base)
            .map_err(|e| SyncError::Config(format!("invalid sheets base url '{api_base}': {e}")))?;
        Ok(Self {
            client,
            api_base,
            access_token: access_token.into(),
        })
    }

    /// `{base}/v4/spreadsheets/{id}/values/{worksheet}` with each segment escaped.
    fn values_url(&self, spreadsheet: &str, worksheet: &str) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| SyncError::Config("sheets base url cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", spreadsheet, "values", worksheet]);
        Ok(url)
    }
}

fn parse_values(status: StatusCode, body: &str) -> Result<Vec<Vec<String>>> {
    if !status.is_success() {
        return Err(SyncError::Http {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }
    let range: ValueRange = serde_json::from_str(body)
        .map_err(|e| SyncError::Protocol(format!("sheets value range: {e}")))?;
    Ok(range.values)
}

impl SpreadsheetReader for SheetsReader {
    fn worksheet_values(&self, spreadsheet: &str, worksheet: &str) -> Result<Vec<Vec<String>>> {
        let url = self.values_url(spreadsheet, worksheet)?;
        debug!(%url, "fetching worksheet");
        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .map_err(|e| SyncError::backend("sheets values request", e))?;
        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| SyncError::backend("read sheets values", e))?;
        parse_values(status, &body)
    }
}

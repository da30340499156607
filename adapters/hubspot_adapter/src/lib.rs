//! HubSpot adapter.
//!
//! Reads list membership through the v1 lists API (cursor = `vid-offset`) and
//! creates contacts one at a time through CRM v3.

use leadsync_core::domain::ContactPage;
use leadsync_core::ports::{ContactCreator, ListPageSource, Result, SyncError};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct CreateContactRequest<'a> {
    properties: &'a BTreeMap<String, String>,
}

/// Authenticated HubSpot HTTP client.
#[derive(Clone)]
pub struct HubSpotClient {
    client: Client,
    api_base: String,
    token: String,
}

impl HubSpotClient {
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SyncError::backend("build hubspot client", e))?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Membership reader for one list, requesting the given contact properties.
    pub fn list(&self, list_id: u64, properties: Vec<String>) -> HubSpotList {
        HubSpotList {
            hub: self.clone(),
            list_id,
            properties,
        }
    }

    fn create_url(&self) -> String {
        format!("{}/crm/v3/objects/contacts", self.api_base)
    }
}

impl ContactCreator for HubSpotClient {
    fn create_contact(&self, properties: &BTreeMap<String, String>) -> Result<()> {
        let resp = self
            .client
            .post(self.create_url())
            .bearer_auth(&self.token)
            .json(&CreateContactRequest { properties })
            .send()
            .map_err(|e| SyncError::backend("hubspot create contact", e))?;

        let status = resp.status();
        if status == StatusCode::CREATED {
            return Ok(());
        }
        let body = resp.text().unwrap_or_default();
        Err(SyncError::Http {
            status: status.as_u16(),
            body,
        })
    }
}

/// Reads one CRM list page by page.
pub struct HubSpotList {
    hub: HubSpotClient,
    list_id: u64,
    properties: Vec<String>,
}

impl HubSpotList {
    fn url(&self) -> String {
        format!(
            "{}/contacts/v1/lists/{}/contacts/all",
            self.hub.api_base, self.list_id
        )
    }

    fn page_query(&self, count: u32, vid_offset: Option<i64>) -> Vec<(&'static str, String)> {
        let mut query: Vec<(&'static str, String)> = self
            .properties
            .iter()
            .map(|p| ("property", p.clone()))
            .collect();
        query.push(("count", count.to_string()));
        if let Some(offset) = vid_offset {
            query.push(("vidOffset", offset.to_string()));
        }
        query
    }
}

/// Interprets a list-membership response: anything but 200 is an HTTP
/// failure, and a 200 body that is not a contact page is a protocol error.
fn parse_page(status: StatusCode, body: &str) -> Result<ContactPage> {
    if status != StatusCode::OK {
        return Err(SyncError::Http {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }
    serde_json::from_str(body)
        .map_err(|e| SyncError::Protocol(format!("hubspot list page: {e}")))
}

impl ListPageSource for HubSpotList {
    fn fetch_page(&self, count: u32, vid_offset: Option<i64>) -> Result<ContactPage> {
        debug!(list_id = self.list_id, ?vid_offset, "requesting hubspot list page");
        let resp = self
            .hub
            .client
            .get(self.url())
            .bearer_auth(&self.hub.token)
            .query(&self.page_query(count, vid_offset))
            .send()
            .map_err(|e| SyncError::backend("hubspot list page", e))?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| SyncError::backend("read hubspot list page", e))?;
        parse_page(status, &body)
    }
}

use crate::domain::{ContactPage, LoadJob, ScrapedRow, Table};
use std::collections::{BTreeMap, HashSet};

pub use crate::error::{Result, SyncError};

/// Query and append access to the warehouse holding the canonical tables.
pub trait Warehouse {
    fn query(&self, sql: &str) -> Result<Table>;

    /// Appends rows to `table`, creating or widening it from the row values.
    fn append(&self, table: &str, rows: &Table) -> Result<LoadJob>;

    /// Non-null values of `column` currently stored in `table`; empty when
    /// the table has never been loaded.
    fn existing_keys(&self, table: &str, column: &str) -> Result<HashSet<String>>;
}

/// One page of CRM list membership per call.
pub trait ListPageSource {
    fn fetch_page(&self, count: u32, vid_offset: Option<i64>) -> Result<ContactPage>;
}

/// Creates a single CRM contact from a property map.
pub trait ContactCreator {
    fn create_contact(&self, properties: &BTreeMap<String, String>) -> Result<()>;
}

/// Read-only access to a worksheet as a grid of strings.
pub trait SpreadsheetReader {
    fn worksheet_values(&self, spreadsheet: &str, worksheet: &str) -> Result<Vec<Vec<String>>>;
}

/// The lead scraper's latest CSV export.
pub trait ScrapeExport {
    fn download(&self) -> Result<Vec<ScrapedRow>>;
}

/// Trait for writing a table to local output
/// This is a port (interface) that defines how the core communicates with output adapters
pub trait TableWriter: Send + Sync {
    fn write(&self, table: &Table) -> Result<()>;
}

use crate::diff::{dedup_by_key, incremental_diff};
use crate::domain::{Lead, LoadJob, PushReport, Record, Table};
use crate::flatten::{flatten, rows_to_table};
use crate::normalize::{self, PostLookup};
use crate::pagination::{fetch_all_contacts, PAGE_SIZE};
use crate::ports::{
    ContactCreator, ListPageSource, Result, ScrapeExport, SpreadsheetReader, TableWriter, Warehouse,
};
use crate::push::push_leads;
use std::collections::HashSet;
use tracing::info;

/// Warehouse contacts joined with the name of the post they reacted to.
pub const LEADS_QUERY: &str = r#"
    SELECT
        c.*,
        p.postName
    FROM contacts AS c
    LEFT JOIN posts AS p
        ON c.postId = p.postId
"#;

/// Application service that dumps a CRM list to a local table
pub struct ListExportService {
    list_source: Box<dyn ListPageSource>,
    table_writer: Box<dyn TableWriter>,
}

impl ListExportService {
    pub fn new(list_source: Box<dyn ListPageSource>, table_writer: Box<dyn TableWriter>) -> Self {
        Self {
            list_source,
            table_writer,
        }
    }

    /// Fetches every list member, flattens them and writes the table.
    /// Returns the number of rows written.
    pub fn execute_export(&self) -> Result<usize> {
        let contacts = fetch_all_contacts(self.list_source.as_ref(), PAGE_SIZE);
        info!(total = contacts.len(), "Total contacts retrieved");

        let table = rows_to_table(&flatten(&contacts));
        self.table_writer.write(&table)?;
        Ok(table.len())
    }
}

/// Application service that pushes warehouse leads missing from a CRM list
pub struct WarehouseToCrmService {
    warehouse: Box<dyn Warehouse>,
    list_source: Box<dyn ListPageSource>,
    contact_creator: Box<dyn ContactCreator>,
}

impl WarehouseToCrmService {
    pub fn new(
        warehouse: Box<dyn Warehouse>,
        list_source: Box<dyn ListPageSource>,
        contact_creator: Box<dyn ContactCreator>,
    ) -> Self {
        Self {
            warehouse,
            list_source,
            contact_creator,
        }
    }

    pub fn execute_sync(&self) -> Result<PushReport> {
        let table = self.warehouse.query(LEADS_QUERY)?;
        let leads: Vec<Lead> = table.row_views().map(|row| Lead::from_row(&row)).collect();
        let leads = dedup_by_key(leads, |lead| lead.profile_link.as_deref());
        info!(total = leads.len(), "warehouse leads loaded");

        let contacts = fetch_all_contacts(self.list_source.as_ref(), PAGE_SIZE);
        info!(total = contacts.len(), "Total contacts retrieved");
        let crm_links: HashSet<String> = flatten(&contacts)
            .iter()
            .filter_map(|row| row.member().linkedin_url)
            .collect();

        let new_leads = incremental_diff(leads, &crm_links, |lead| lead.profile_link.as_deref());
        info!(count = new_leads.len(), "Number of leads to push");

        Ok(push_leads(self.contact_creator.as_ref(), &new_leads))
    }
}

/// Application service that appends new scraped rows to the warehouse
pub struct ScrapeToWarehouseService {
    scrape_export: Box<dyn ScrapeExport>,
    spreadsheet: Box<dyn SpreadsheetReader>,
    warehouse: Box<dyn Warehouse>,
    spreadsheet_id: String,
    worksheet: String,
}

impl ScrapeToWarehouseService {
    pub fn new(
        scrape_export: Box<dyn ScrapeExport>,
        spreadsheet: Box<dyn SpreadsheetReader>,
        warehouse: Box<dyn Warehouse>,
        spreadsheet_id: String,
        worksheet: String,
    ) -> Self {
        Self {
            scrape_export,
            spreadsheet,
            warehouse,
            spreadsheet_id,
            worksheet,
        }
    }

    /// Downloads, normalizes and diffs the scrape, then appends the new
    /// contacts, companies and posts in that order.
    pub fn execute_sync(&self) -> Result<Vec<LoadJob>> {
        let raw = self.scrape_export.download()?;
        info!(rows = raw.len(), "scraper export downloaded");

        let grid = self
            .spreadsheet
            .worksheet_values(&self.spreadsheet_id, &self.worksheet)?;
        let lookup = PostLookup::from_grid(&grid);

        let rows = normalize::enrich(raw, &lookup);
        let companies = normalize::companies(&rows);
        let contacts = normalize::contacts(&rows);
        let posts = normalize::posts(&rows);

        let new_contacts = self.new_records(contacts)?;
        let new_companies = self.new_records(companies)?;
        let new_posts = self.new_records(posts)?;
        info!(
            contacts = new_contacts.len(),
            companies = new_companies.len(),
            posts = new_posts.len(),
            "new rows to push"
        );

        Ok(vec![
            self.load(&new_contacts)?,
            self.load(&new_companies)?,
            self.load(&new_posts)?,
        ])
    }

    fn new_records<R: Record>(&self, records: Vec<R>) -> Result<Vec<R>> {
        let existing = self.warehouse.existing_keys(R::TABLE, R::KEY)?;
        Ok(incremental_diff(records, &existing, R::key))
    }

    fn load<R: Record>(&self, records: &[R]) -> Result<LoadJob> {
        let job = self
            .warehouse
            .append(R::TABLE, &Table::from_records(records))?;
        info!("Loaded {} rows into {}.", job.output_rows, job.table);
        Ok(job)
    }
}

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;

/// A single cell crossing the tabular boundary (warehouse rows, CSV output).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Integer(i64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Renders the cell as text; `Null` has no text form.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Integer(n) => Some(n.to_string()),
            Value::Text(s) => Some(s.clone()),
        }
    }
}

impl From<Option<String>> for Value {
    fn from(value: Option<String>) -> Self {
        value.map(Value::Text).unwrap_or(Value::Null)
    }
}

impl From<Option<&String>> for Value {
    fn from(value: Option<&String>) -> Self {
        value.cloned().into()
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

/// Column-named grid of cells, the shape every tabular collaborator speaks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Builds a table from typed records using the record's column layout.
    pub fn from_records<R: Record>(records: &[R]) -> Self {
        Self {
            columns: R::columns().iter().map(|c| c.to_string()).collect(),
            rows: records.iter().map(R::values).collect(),
        }
    }

    pub fn row_views(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows.iter().map(move |cells| RowView {
            table: self,
            cells,
        })
    }
}

/// Borrowed access to one row of a [`Table`] by column name.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    table: &'a Table,
    cells: &'a [Value],
}

impl<'a> RowView<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.table
            .column_index(column)
            .and_then(|idx| self.cells.get(idx))
    }

    /// Missing columns and null cells both read as `None`.
    pub fn text(&self, column: &str) -> Option<String> {
        self.get(column).and_then(Value::as_text)
    }
}

/// A typed row that can be written as part of a named table.
pub trait Record {
    /// Destination table name.
    const TABLE: &'static str;
    /// Identity-key column used for deduplication and diffing.
    const KEY: &'static str;

    fn columns() -> &'static [&'static str];
    fn key(&self) -> Option<&str>;
    fn values(&self) -> Vec<Value>;
}

/// One person from the scrape, keyed by LinkedIn profile URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contact {
    pub source_user_id: Option<String>,
    pub name: Option<String>,
    pub occupation: Option<String>,
    pub profile_link: Option<String>,
    pub degree: Option<String>,
    pub company_url: Option<String>,
    pub post_id: Option<String>,
    pub reaction_type: Option<String>,
    pub platform: Option<String>,
    pub company_id: Option<String>,
}

impl Record for Contact {
    const TABLE: &'static str = "contacts";
    const KEY: &'static str = "profileLink";

    fn columns() -> &'static [&'static str] {
        &[
            "sourceUserId",
            "name",
            "occupation",
            "profileLink",
            "degree",
            "companyUrl",
            "postId",
            "reactionType",
            "platform",
            "companyId",
        ]
    }

    fn key(&self) -> Option<&str> {
        self.profile_link.as_deref()
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.source_user_id.as_ref().into(),
            self.name.as_ref().into(),
            self.occupation.as_ref().into(),
            self.profile_link.as_ref().into(),
            self.degree.as_ref().into(),
            self.company_url.as_ref().into(),
            self.post_id.as_ref().into(),
            self.reaction_type.as_ref().into(),
            self.platform.as_ref().into(),
            self.company_id.as_ref().into(),
        ]
    }
}

/// A company seen on a scraped profile. Every field is present by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub company_id: String,
    pub company_name: String,
    pub company_url: String,
    pub followers_count: i64,
}

impl Record for Company {
    const TABLE: &'static str = "companies";
    const KEY: &'static str = "companyId";

    fn columns() -> &'static [&'static str] {
        &["companyId", "companyName", "companyUrl", "followersCount"]
    }

    fn key(&self) -> Option<&str> {
        Some(self.company_id.as_str())
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.company_id.clone().into(),
            self.company_name.clone().into(),
            self.company_url.clone().into(),
            self.followers_count.into(),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Post {
    pub post_url: Option<String>,
    pub platform: Option<String>,
    pub post_id: Option<String>,
    pub post_name: Option<String>,
}

impl Record for Post {
    const TABLE: &'static str = "posts";
    const KEY: &'static str = "postUrl";

    fn columns() -> &'static [&'static str] {
        &["postUrl", "platform", "postId", "postName"]
    }

    fn key(&self) -> Option<&str> {
        self.post_url.as_deref()
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.post_url.as_ref().into(),
            self.platform.as_ref().into(),
            self.post_id.as_ref().into(),
            self.post_name.as_ref().into(),
        ]
    }
}

/// A warehouse contact joined with the name of the post it reacted to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lead {
    pub source_user_id: Option<String>,
    pub name: Option<String>,
    pub occupation: Option<String>,
    pub profile_link: Option<String>,
    pub company_id: Option<String>,
    pub post_id: Option<String>,
    pub post_name: Option<String>,
    pub reaction_type: Option<String>,
    pub platform: Option<String>,
}

impl Lead {
    pub fn from_row(row: &RowView<'_>) -> Self {
        Self {
            source_user_id: row.text("sourceUserId"),
            name: row.text("name"),
            occupation: row.text("occupation"),
            profile_link: row.text("profileLink"),
            company_id: row.text("companyId"),
            post_id: row.text("postId"),
            post_name: row.text("postName"),
            reaction_type: row.text("reactionType"),
            platform: row.text("platform"),
        }
    }

    /// Human-facing label for log lines.
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.profile_link.as_deref())
            .unwrap_or("<unnamed lead>")
    }
}

/// One row of the scraper's CSV export. Unknown columns are ignored and
/// empty cells read as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedRow {
    pub source_user_id: Option<String>,
    pub name: Option<String>,
    pub occupation: Option<String>,
    pub profile_link: Option<String>,
    pub degree: Option<String>,
    pub company_name: Option<String>,
    pub company_url: Option<String>,
    pub followers_count: Option<String>,
    pub post_url: Option<String>,
    pub reaction_type: Option<String>,
}

/// One page of the CRM list-membership endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContactPage {
    #[serde(default)]
    pub contacts: Vec<ListContact>,
    #[serde(rename = "has-more", default)]
    pub has_more: bool,
    #[serde(rename = "vid-offset", default)]
    pub vid_offset: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ListContact {
    pub vid: i64,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PropertyValue {
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

/// A list member reduced to one string per present property.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatRow {
    pub vid: i64,
    pub fields: BTreeMap<String, String>,
}

/// The typed view of a list member the sync jobs rely on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrmMember {
    pub vid: i64,
    pub linkedin_url: Option<String>,
}

/// Outcome of appending rows to a warehouse table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadJob {
    pub table: String,
    pub output_rows: usize,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushFailure {
    pub lead: String,
    pub reason: String,
}

/// Per-record results of a best-effort push.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushReport {
    pub pushed: Vec<String>,
    pub failed: Vec<PushFailure>,
}

impl PushReport {
    pub fn attempted(&self) -> usize {
        self.pushed.len() + self.failed.len()
    }
}

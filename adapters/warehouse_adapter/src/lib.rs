use chrono::Utc;
use leadsync_core::domain::{LoadJob, Table, Value};
use leadsync_core::ports::{Result, SyncError, Warehouse};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, OpenFlags, OptionalExtension, Row};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info};

/// SQLite implementation of the Warehouse trait
pub struct SqliteWarehouse {
    db_path: PathBuf,
}

impl SqliteWarehouse {
    /// Creates a new SqliteWarehouse backed by the given database file
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Opens the existing database file. A missing file is a configuration
    /// error, never an implicit empty warehouse.
    fn connect(&self) -> Result<Connection> {
        if !self.db_path.is_file() {
            return Err(SyncError::Config(format!(
                "warehouse database {} does not exist",
                self.db_path.display()
            )));
        }
        Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| SyncError::backend(format!("open warehouse {}", self.db_path.display()), e))
    }

    fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
        conn.query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |_| Ok(()),
        )
        .optional()
        .map(|found| found.is_some())
        .map_err(|e| SyncError::backend("look up warehouse table", e))
    }

    fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({})", quote_ident(table)))
            .map_err(|e| SyncError::backend("read table schema", e))?;
        let columns = stmt
            .query_map([], |row: &Row| row.get::<_, String>(1))
            .map_err(|e| SyncError::backend("read table schema", e))?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()
            .map_err(|e| SyncError::backend("read table schema", e))?;
        Ok(columns)
    }
}

/// Column type inferred from the cells about to be loaded: INTEGER when every
/// present cell is an integer, TEXT otherwise.
fn infer_column_type(rows: &Table, idx: usize) -> &'static str {
    let mut present = rows.rows.iter().filter_map(|r| r.get(idx)).filter(|v| !v.is_null()).peekable();
    if present.peek().is_none() {
        return "TEXT";
    }
    if present.all(|v| matches!(v, Value::Integer(_))) {
        "INTEGER"
    } else {
        "TEXT"
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(n) => SqlValue::Integer(*n),
        Value::Text(s) => SqlValue::Text(s.clone()),
    }
}

fn from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::Integer(n),
        ValueRef::Real(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Value::Integer(f as i64),
        ValueRef::Real(f) => Value::Text(f.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

impl Warehouse for SqliteWarehouse {
    fn query(&self, sql: &str) -> Result<Table> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| SyncError::backend("prepare warehouse query", e))?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();

        let rows = stmt
            .query_map([], |row: &Row| {
                (0..width)
                    .map(|idx| row.get_ref(idx).map(from_sql))
                    .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()
            })
            .map_err(|e| SyncError::backend("run warehouse query", e))?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()
            .map_err(|e| SyncError::backend("read warehouse rows", e))?;

        debug!(rows = rows.len(), "warehouse query returned");
        Ok(Table { columns, rows })
    }

    fn append(&self, table: &str, rows: &Table) -> Result<LoadJob> {
        if rows.is_empty() {
            return Ok(LoadJob {
                table: table.to_string(),
                output_rows: 0,
                finished_at: Utc::now(),
            });
        }

        let mut conn = self.connect()?;
        let tx = conn
            .transaction()
            .map_err(|e| SyncError::backend("begin load", e))?;

        let existing = Self::table_columns(&tx, table)?;
        if existing.is_empty() {
            let definitions: Vec<String> = rows
                .columns
                .iter()
                .enumerate()
                .map(|(idx, c)| format!("{} {}", quote_ident(c), infer_column_type(rows, idx)))
                .collect();
            tx.execute(
                &format!("CREATE TABLE {} ({})", quote_ident(table), definitions.join(", ")),
                [],
            )
            .map_err(|e| SyncError::backend(format!("create table {table}"), e))?;
            info!(table, columns = rows.columns.len(), "created warehouse table");
        } else {
            for (idx, column) in rows.columns.iter().enumerate() {
                if existing.iter().any(|c| c == column) {
                    continue;
                }
                tx.execute(
                    &format!(
                        "ALTER TABLE {} ADD COLUMN {} {}",
                        quote_ident(table),
                        quote_ident(column),
                        infer_column_type(rows, idx)
                    ),
                    [],
                )
                .map_err(|e| SyncError::backend(format!("add column {column} to {table}"), e))?;
                info!(table, column = %column, "added warehouse column");
            }
        }

        let insert = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(table),
            rows.columns
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", "),
            (1..=rows.columns.len())
                .map(|n| format!("?{n}"))
                .collect::<Vec<_>>()
                .join(", ")
        );
        let mut output_rows = 0;
        {
            let mut stmt = tx
                .prepare(&insert)
                .map_err(|e| SyncError::backend("prepare insert", e))?;
            for row in &rows.rows {
                output_rows += stmt
                    .execute(params_from_iter(row.iter().map(to_sql)))
                    .map_err(|e| SyncError::backend(format!("insert into {table}"), e))?;
            }
        }
        tx.commit()
            .map_err(|e| SyncError::backend("commit load", e))?;

        Ok(LoadJob {
            table: table.to_string(),
            output_rows,
            finished_at: Utc::now(),
        })
    }

    /// A table that has never been loaded has no keys yet.
    fn existing_keys(&self, table: &str, column: &str) -> Result<HashSet<String>> {
        let conn = self.connect()?;
        if !Self::table_exists(&conn, table)? {
            debug!(table, "warehouse table missing, treating as empty");
            return Ok(HashSet::new());
        }
        drop(conn);

        let result = self.query(&format!(
            "SELECT {} FROM {}",
            quote_ident(column),
            quote_ident(table)
        ))?;
        Ok(result
            .rows
            .iter()
            .filter_map(|row| row.first().and_then(Value::as_text))
            .collect())
    }
}

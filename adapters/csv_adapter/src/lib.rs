use csv::Writer;
use leadsync_core::domain::{Table, Value};
use leadsync_core::ports::{Result, SyncError, TableWriter};
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// CSV table writer adapter implementation
pub struct CsvTableWriter {
    output_path: PathBuf,
}

impl CsvTableWriter {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }

    fn cell(value: &Value) -> String {
        value.as_text().unwrap_or_default()
    }
}

impl TableWriter for CsvTableWriter {
    /// Overwrites the output file on every run, creating its directory if needed.
    fn write(&self, table: &Table) -> Result<()> {
        if let Some(dir) = self.output_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let csv_err = |e: csv::Error| SyncError::backend("write csv output", e);
        let mut writer = Writer::from_path(&self.output_path).map_err(csv_err)?;
        writer.write_record(&table.columns).map_err(csv_err)?;
        for row in &table.rows {
            writer
                .write_record(row.iter().map(Self::cell))
                .map_err(csv_err)?;
        }
        writer.flush()?;

        info!(
            path = %self.output_path.display(),
            rows = table.len(),
            "Saved CSV"
        );
        Ok(())
    }
}

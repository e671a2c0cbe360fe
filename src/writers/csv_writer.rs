use crate::error::Result;
use crate::models::CoaddTable;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes table rows as comma-separated values
pub struct CsvTableWriter {
    include_header: bool,
}

impl CsvTableWriter {
    /// Rows only, no header line
    pub fn new() -> Self {
        Self {
            include_header: false,
        }
    }

    pub fn with_header(include_header: bool) -> Self {
        Self { include_header }
    }

    /// Create or truncate `path` and write every row of `table`
    pub fn write(&self, table: &CoaddTable, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(table, file)
    }

    pub fn write_to<W: Write>(&self, table: &CoaddTable, sink: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(sink);

        if self.include_header {
            writer.write_record(table.column_names())?;
        }

        for row in table.rows() {
            writer.write_record(&row)?;
        }

        writer.flush()?;
        Ok(())
    }
}

impl Default for CsvTableWriter {
    fn default() -> Self {
        Self::new()
    }
}

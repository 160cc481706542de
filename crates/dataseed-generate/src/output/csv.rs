use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::errors::GenerationError;
use crate::model::GeneratedTable;

/// File name for the table at `position` in generation order, e.g.
/// `001_dbo.Customers.csv`.
pub fn csv_file_name(position: usize, table: &GeneratedTable) -> String {
    format!("{:03}_{}.{}.csv", position + 1, table.schema, table.table)
}

/// Write a table as CSV: a header with the column names, then one record per
/// row. Returns the number of bytes written.
pub fn write_table_csv(path: &Path, table: &GeneratedTable) -> Result<u64, csv::Error> {
    let writer = BufWriter::new(File::create(path).map_err(csv::Error::from)?);
    let counting = CountingWriter::new(writer);
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(counting);

    writer.write_record(&table.columns)?;

    for row in &table.rows {
        let record: Vec<String> = table
            .columns
            .iter()
            .map(|column| row.get(column).map(|value| value.to_csv()).unwrap_or_default())
            .collect();
        writer.write_record(&record)?;
    }

    writer.flush()?;
    let counting = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(counting.bytes_written())
}

/// Write every table into `dir`, numbered in generation order.
pub fn write_tables_csv(
    dir: &Path,
    tables: &[GeneratedTable],
) -> Result<Vec<PathBuf>, GenerationError> {
    std::fs::create_dir_all(dir)?;
    let mut paths = Vec::with_capacity(tables.len());
    for (position, table) in tables.iter().enumerate() {
        let path = dir.join(csv_file_name(position, table));
        let bytes = write_table_csv(&path, table)?;
        info!(
            table = %table.id(),
            rows = table.rows.len(),
            bytes,
            path = %path.display(),
            "table written"
        );
        paths.push(path);
    }
    Ok(paths)
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

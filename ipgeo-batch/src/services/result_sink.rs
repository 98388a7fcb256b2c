//! CSV export of a finished result set
//!
//! Layout: header `IP Address,<field>,...` in FieldSet order, then one row
//! per result in ResultSet order. Error markers are exported like any other
//! value; only a failing destination makes an export fail.

use crate::error::{Error, Result};
use crate::fields::FieldSet;
use crate::models::ResultSet;
use std::io;
use std::path::{Path, PathBuf};

/// First column header
pub const ADDRESS_HEADER: &str = "IP Address";

/// Destination for a finished result set
pub trait ResultSink {
    fn export(&self, results: &ResultSet, fields: &FieldSet) -> Result<()>;
}

/// Write the CSV table to any writer
pub fn write_csv<W: io::Write>(
    writer: W,
    results: &ResultSet,
    fields: &FieldSet,
) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    write_rows(&mut writer, results, fields)
}

fn write_rows<W: io::Write>(
    writer: &mut csv::Writer<W>,
    results: &ResultSet,
    fields: &FieldSet,
) -> csv::Result<()> {
    let mut header = vec![ADDRESS_HEADER];
    header.extend(fields.names());
    writer.write_record(&header)?;

    for result in results {
        let mut row: Vec<&str> = Vec::with_capacity(fields.len() + 1);
        row.push(result.address().as_str());
        row.extend(fields.iter().map(|field| result.get(field).unwrap_or_default()));
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// CSV file destination; the file is created or truncated
pub struct CsvFileSink {
    path: PathBuf,
}

impl CsvFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultSink for CsvFileSink {
    fn export(&self, results: &ResultSet, fields: &FieldSet) -> Result<()> {
        let export_error = |source| Error::Export {
            path: self.path.clone(),
            source,
        };

        let mut writer = csv::Writer::from_path(&self.path).map_err(export_error)?;
        write_rows(&mut writer, results, fields).map_err(export_error)?;

        tracing::info!(
            path = %self.path.display(),
            rows = results.len(),
            "Results exported"
        );
        Ok(())
    }
}

/// CSV on standard output
pub struct StdoutSink;

impl ResultSink for StdoutSink {
    fn export(&self, results: &ResultSet, fields: &FieldSet) -> Result<()> {
        write_csv(io::stdout().lock(), results, fields).map_err(|source| Error::Export {
            path: PathBuf::from("<stdout>"),
            source,
        })
    }
}

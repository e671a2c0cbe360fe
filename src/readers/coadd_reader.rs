use crate::error::{ProcessingError, Result};
use crate::models::{CoaddTable, Column, ColumnData};
use crate::utils::constants::{DEFAULT_COLUMNS, DEFAULT_EXTENSION};
use fitsio::hdu::HduInfo;
use fitsio::tables::{ColumnDataType, ConcreteColumnDescription};
use fitsio::FitsFile;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Reads named columns out of one binary-table extension of a FITS file
#[derive(Debug, Clone)]
pub struct CoaddReader {
    extension: String,
    columns: Vec<String>,
}

impl CoaddReader {
    pub fn new() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            columns: DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.to_string();
        self
    }

    pub fn with_columns(mut self, columns: &[String]) -> Self {
        self.columns = columns.to_vec();
        self
    }

    /// Parse an in-memory FITS body.
    ///
    /// cfitsio opens by file name, so the body is spilled to a temp file first.
    pub fn read_bytes(&self, bytes: &[u8]) -> Result<CoaddTable> {
        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(bytes)?;
        temp_file.flush()?;

        debug!(
            bytes = bytes.len(),
            path = %temp_file.path().display(),
            "spilled FITS body"
        );

        self.read_path(temp_file.path())
    }

    /// Read the configured extension of the FITS file at `path`, projected
    /// onto the configured columns
    pub fn read_path(&self, path: &Path) -> Result<CoaddTable> {
        let mut fits = FitsFile::open(path)?;
        let hdu = fits
            .hdu(self.extension.as_str())
            .map_err(|_| ProcessingError::MissingExtension(self.extension.clone()))?;

        let descriptions = match &hdu.info {
            HduInfo::TableInfo {
                column_descriptions,
                ..
            } => column_descriptions,
            _ => return Err(ProcessingError::NotATable(self.extension.clone())),
        };

        let mut columns = Vec::with_capacity(self.columns.len());
        for name in &self.columns {
            let description = descriptions
                .iter()
                .find(|d| &d.name == name)
                .ok_or_else(|| ProcessingError::MissingColumn {
                    column: name.clone(),
                    context: format!("extension {}", self.extension),
                })?;

            let data = match scalar_kind(description)? {
                ScalarKind::Int => ColumnData::Int(hdu.read_col::<i32>(&mut fits, name)?),
                ScalarKind::Long => ColumnData::Long(hdu.read_col::<i64>(&mut fits, name)?),
                ScalarKind::Float => ColumnData::Float(hdu.read_col::<f32>(&mut fits, name)?),
                ScalarKind::Double => ColumnData::Double(hdu.read_col::<f64>(&mut fits, name)?),
            };
            columns.push(Column::new(name.clone(), data));
        }

        CoaddTable::new(columns)
    }
}

impl Default for CoaddReader {
    fn default() -> Self {
        Self::new()
    }
}

enum ScalarKind {
    Int,
    Long,
    Float,
    Double,
}

/// Scalar numeric columns only; vector, string and logical columns are
/// rejected. Integers up to 32 bits are read as `J`.
fn scalar_kind(description: &ConcreteColumnDescription) -> Result<ScalarKind> {
    let data_type = &description.data_type;
    let kind = match data_type.typ {
        _ if data_type.repeat != 1 => None,
        ColumnDataType::Byte
        | ColumnDataType::SignedByte
        | ColumnDataType::Short
        | ColumnDataType::UnsignedShort
        | ColumnDataType::Int
        | ColumnDataType::Long => Some(ScalarKind::Int),
        ColumnDataType::UnsignedLong | ColumnDataType::LongLong => Some(ScalarKind::Long),
        ColumnDataType::Float => Some(ScalarKind::Float),
        ColumnDataType::Double => Some(ScalarKind::Double),
        _ => None,
    };

    kind.ok_or_else(|| ProcessingError::UnsupportedColumnType {
        column: description.name.clone(),
        type_name: format!("{}{:?}", data_type.repeat, data_type.typ),
    })
}

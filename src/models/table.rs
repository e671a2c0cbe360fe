use crate::error::{ProcessingError, Result};

/// Typed values of a single table column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// 32-bit integer, FITS TFORM `J`; narrower integer columns widen to it
    Int(Vec<i32>),
    /// 64-bit integer, FITS TFORM `K`
    Long(Vec<i64>),
    /// 32-bit float, FITS TFORM `E`
    Float(Vec<f32>),
    /// 64-bit float, FITS TFORM `D`
    Double(Vec<f64>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int(values) => values.len(),
            ColumnData::Long(values) => values.len(),
            ColumnData::Float(values) => values.len(),
            ColumnData::Double(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render the value at `row`.
    ///
    /// Floats use shortest round-trip formatting, which always keeps a
    /// fractional part (`1.0`) and switches to exponent form for very
    /// small or large magnitudes (`1e-20`).
    pub fn format_value(&self, row: usize) -> Option<String> {
        match self {
            ColumnData::Int(values) => values.get(row).map(|v| v.to_string()),
            ColumnData::Long(values) => values.get(row).map(|v| v.to_string()),
            ColumnData::Float(values) => values.get(row).map(|v| format!("{:?}", v)),
            ColumnData::Double(values) => values.get(row).map(|v| format!("{:?}", v)),
        }
    }

    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            ColumnData::Int(values) => values.iter().map(|&v| f64::from(v)).collect(),
            ColumnData::Long(values) => values.iter().map(|&v| v as f64).collect(),
            ColumnData::Float(values) => values.iter().map(|&v| f64::from(v)).collect(),
            ColumnData::Double(values) => values.clone(),
        }
    }

    fn to_i64(&self) -> Option<Vec<i64>> {
        match self {
            ColumnData::Int(values) => Some(values.iter().map(|&v| i64::from(v)).collect()),
            ColumnData::Long(values) => Some(values.clone()),
            _ => None,
        }
    }

    /// Append `other` to `self`.
    ///
    /// Mixed integer widths widen to `Long`; any other mix is promoted to
    /// `Double`.
    pub fn extend_from(&mut self, other: &ColumnData) {
        match (&mut *self, other) {
            (ColumnData::Int(dst), ColumnData::Int(src)) => {
                dst.extend_from_slice(src);
                return;
            }
            (ColumnData::Long(dst), ColumnData::Long(src)) => {
                dst.extend_from_slice(src);
                return;
            }
            (ColumnData::Long(dst), ColumnData::Int(src)) => {
                dst.extend(src.iter().map(|&v| i64::from(v)));
                return;
            }
            (ColumnData::Float(dst), ColumnData::Float(src)) => {
                dst.extend_from_slice(src);
                return;
            }
            (ColumnData::Double(dst), src) => {
                dst.extend(src.to_f64());
                return;
            }
            _ => {}
        }

        *self = match (self.to_i64(), other.to_i64()) {
            (Some(mut widened), Some(tail)) => {
                widened.extend(tail);
                ColumnData::Long(widened)
            }
            _ => {
                let mut promoted = self.to_f64();
                promoted.extend(other.to_f64());
                ColumnData::Double(promoted)
            }
        };
    }

    fn empty_like(&self) -> Self {
        match self {
            ColumnData::Int(_) => ColumnData::Int(Vec::new()),
            ColumnData::Long(_) => ColumnData::Long(Vec::new()),
            ColumnData::Float(_) => ColumnData::Float(Vec::new()),
            ColumnData::Double(_) => ColumnData::Double(Vec::new()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Where a per-resource table came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSource {
    /// Position of the URL in the input list
    pub index: usize,
    pub url: String,
}

/// A column-oriented table of equal-length named columns.
///
/// Per-resource tables carry the URL they were extracted from; the
/// combined table produced by stacking has no source.
#[derive(Debug, Clone, PartialEq)]
pub struct CoaddTable {
    columns: Vec<Column>,
    source: Option<TableSource>,
}

impl CoaddTable {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let expected = first.len();
            for column in &columns[1..] {
                if column.len() != expected {
                    return Err(ProcessingError::ColumnLengthMismatch {
                        column: column.name.clone(),
                        expected,
                        actual: column.len(),
                    });
                }
            }
        }

        Ok(Self {
            columns,
            source: None,
        })
    }

    pub fn with_source(mut self, index: usize, url: impl Into<String>) -> Self {
        self.source = Some(TableSource {
            index,
            url: url.into(),
        });
        self
    }

    pub fn source(&self) -> Option<&TableSource> {
        self.source.as_ref()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Iterate rows as formatted string values in column order
    pub fn rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        (0..self.num_rows()).map(move |row| {
            self.columns
                .iter()
                .map(|c| c.data.format_value(row).unwrap_or_default())
                .collect()
        })
    }

    /// An empty table with the same column names and types
    pub fn empty_like(&self) -> Self {
        Self {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.data.empty_like()))
                .collect(),
            source: None,
        }
    }

    /// Append the rows of `other`; column names must match in order
    pub fn append(&mut self, other: &CoaddTable) -> Result<()> {
        let expected = self.column_names();
        let actual = other.column_names();
        if expected != actual {
            return Err(ProcessingError::SchemaMismatch { expected, actual });
        }

        for (dst, src) in self.columns.iter_mut().zip(other.columns.iter()) {
            dst.data.extend_from(&src.data);
        }

        Ok(())
    }
}

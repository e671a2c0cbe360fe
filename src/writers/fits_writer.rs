use crate::error::{ProcessingError, Result};
use crate::models::{CoaddTable, ColumnData};
use crate::utils::constants::PRIMARY_HDU_NAME;
use fitsio::hdu::{FitsHdu, HduInfo};
use fitsio::tables::{ColumnDataType, ColumnDescription};
use fitsio::FitsFile;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes a table as a FITS file with one named binary-table extension
pub struct FitsTableWriter {
    extension: String,
}

impl FitsTableWriter {
    pub fn new(extension: &str) -> Self {
        Self {
            extension: extension.to_string(),
        }
    }

    /// Replace any file at `path` with an empty primary HDU followed by the
    /// table extension
    pub fn write(&self, table: &CoaddTable, path: &Path) -> Result<()> {
        let descriptions = table
            .columns()
            .iter()
            .map(|column| {
                let typ = match column.data {
                    ColumnData::Int(_) => ColumnDataType::Int,
                    ColumnData::Long(_) => ColumnDataType::LongLong,
                    ColumnData::Float(_) => ColumnDataType::Float,
                    ColumnData::Double(_) => ColumnDataType::Double,
                };
                ColumnDescription::new(column.name.as_str())
                    .with_type(typ)
                    .create()
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut fits = FitsFile::create(path).overwrite().open()?;
        let hdu = fits.create_table(self.extension.as_str(), &descriptions)?;

        for column in table.columns().iter().filter(|c| !c.is_empty()) {
            match &column.data {
                ColumnData::Int(values) => {
                    hdu.write_col(&mut fits, column.name.as_str(), values)?;
                }
                ColumnData::Long(values) => {
                    hdu.write_col(&mut fits, column.name.as_str(), values)?;
                }
                ColumnData::Float(values) => {
                    hdu.write_col(&mut fits, column.name.as_str(), values)?;
                }
                ColumnData::Double(values) => {
                    hdu.write_col(&mut fits, column.name.as_str(), values)?;
                }
            }
        }

        debug!(
            path = %path.display(),
            rows = table.num_rows(),
            extension = %self.extension,
            "wrote FITS table"
        );

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HduKind {
    Primary,
    Image,
    BinTable,
    Other,
}

impl fmt::Display for HduKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HduKind::Primary => "PrimaryHDU",
            HduKind::Image => "ImageHDU",
            HduKind::BinTable => "BinTableHDU",
            HduKind::Other => "UnknownHDU",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HduSummary {
    pub index: usize,
    pub name: String,
    pub kind: HduKind,
    /// Image axis lengths, or rows and columns for a table
    pub dimensions: Vec<usize>,
    /// TFORM codes of a table's columns
    pub formats: Vec<String>,
}

impl HduSummary {
    fn dimensions_label(&self) -> String {
        match self.kind {
            HduKind::BinTable => match self.dimensions.as_slice() {
                [rows, cols] => format!("{}R x {}C", rows, cols),
                _ => String::new(),
            },
            _ => {
                let axes: Vec<String> = self.dimensions.iter().map(|d| d.to_string()).collect();
                format!("({})", axes.join(", "))
            }
        }
    }
}

/// One column of a binary table as declared in its header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub format: String,
    pub unit: Option<String>,
}

/// HDU layout of a FITS file plus the columns of one extension
#[derive(Debug, Clone)]
pub struct FitsSummary {
    pub path: PathBuf,
    pub hdus: Vec<HduSummary>,
    pub columns: Vec<ColumnDescriptor>,
}

impl FitsSummary {
    pub fn hdu(&self, name: &str) -> Option<&HduSummary> {
        self.hdus.iter().find(|h| h.name.eq_ignore_ascii_case(name))
    }

    pub fn info(&self) -> String {
        let mut out = format!("Filename: {}\n", self.path.display());
        out.push_str(&format!(
            "{:<4} {:<10} {:<12} {:<12} {}\n",
            "No.", "Name", "Type", "Dimensions", "Format"
        ));
        for hdu in &self.hdus {
            let formats = if hdu.formats.is_empty() {
                String::new()
            } else {
                format!("[{}]", hdu.formats.join(", "))
            };
            out.push_str(&format!(
                "{:>3}  {:<10} {:<12} {:<12} {}\n",
                hdu.index,
                hdu.name,
                hdu.kind.to_string(),
                hdu.dimensions_label(),
                formats
            ));
        }
        out
    }

    pub fn column_listing(&self) -> String {
        let mut out = String::from("ColDefs(\n");
        for column in &self.columns {
            out.push_str(&format!(
                "    name = '{}'; format = '{}'",
                column.name, column.format
            ));
            if let Some(unit) = &column.unit {
                out.push_str(&format!("; unit = '{}'", unit));
            }
            out.push('\n');
        }
        out.push(')');
        out
    }
}

impl fmt::Display for FitsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.info())?;
        writeln!(f, "-------------------------------------------------------")?;
        write!(f, "{}", self.column_listing())
    }
}

/// Read-only structural inspection of FITS files
pub struct FitsInspector;

impl FitsInspector {
    pub fn new() -> Self {
        Self
    }

    /// Summarise every HDU in the file and list the columns of `extension`.
    ///
    /// Fails with [`ProcessingError::MissingExtension`] if `extension` is not
    /// in the file.
    pub fn inspect(&self, path: &Path, extension: &str) -> Result<FitsSummary> {
        let mut fits = FitsFile::open(path)?;
        let hdus = self.list_hdus(&mut fits)?;

        let target = hdus
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(extension))
            .map(|h| h.index)
            .ok_or_else(|| ProcessingError::MissingExtension(extension.to_string()))?;
        let columns = self.read_column_descriptors(&mut fits, target)?;

        Ok(FitsSummary {
            path: path.to_path_buf(),
            hdus,
            columns,
        })
    }

    fn list_hdus(&self, fits: &mut FitsFile) -> Result<Vec<HduSummary>> {
        let mut hdus = Vec::new();

        // walk forward until moving past the last HDU fails
        for index in 0usize.. {
            let hdu = match fits.hdu(index) {
                Ok(hdu) => hdu,
                Err(_) if index > 0 => break,
                Err(e) => return Err(e.into()),
            };

            let name = read_string_key(&hdu, fits, "EXTNAME").unwrap_or_else(|| {
                if index == 0 {
                    PRIMARY_HDU_NAME.to_string()
                } else {
                    String::new()
                }
            });

            let (kind, dimensions, formats) = match &hdu.info {
                HduInfo::ImageInfo { shape, .. } if index == 0 => {
                    (HduKind::Primary, shape.clone(), Vec::new())
                }
                HduInfo::ImageInfo { shape, .. } => (HduKind::Image, shape.clone(), Vec::new()),
                HduInfo::TableInfo {
                    column_descriptions,
                    num_rows,
                } => {
                    let formats: Vec<String> = (1..=column_descriptions.len())
                        .map(|n| {
                            read_string_key(&hdu, fits, &format!("TFORM{}", n)).unwrap_or_default()
                        })
                        .collect();
                    (
                        HduKind::BinTable,
                        vec![*num_rows, column_descriptions.len()],
                        formats,
                    )
                }
                _ => (HduKind::Other, Vec::new(), Vec::new()),
            };

            hdus.push(HduSummary {
                index,
                name,
                kind,
                dimensions,
                formats,
            });
        }

        Ok(hdus)
    }

    fn read_column_descriptors(
        &self,
        fits: &mut FitsFile,
        index: usize,
    ) -> Result<Vec<ColumnDescriptor>> {
        let hdu = fits.hdu(index)?;
        let names: Vec<String> = match &hdu.info {
            HduInfo::TableInfo {
                column_descriptions,
                ..
            } => column_descriptions.iter().map(|d| d.name.clone()).collect(),
            _ => {
                let name = read_string_key(&hdu, fits, "EXTNAME").unwrap_or_default();
                return Err(ProcessingError::NotATable(name));
            }
        };

        Ok(names
            .into_iter()
            .enumerate()
            .map(|(i, name)| ColumnDescriptor {
                format: read_string_key(&hdu, fits, &format!("TFORM{}", i + 1))
                    .unwrap_or_default(),
                unit: read_string_key(&hdu, fits, &format!("TUNIT{}", i + 1)),
                name,
            })
            .collect())
    }
}

impl Default for FitsInspector {
    fn default() -> Self {
        Self::new()
    }
}

fn read_string_key(hdu: &FitsHdu, fits: &mut FitsFile, key: &str) -> Option<String> {
    hdu.read_key::<String>(fits, key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

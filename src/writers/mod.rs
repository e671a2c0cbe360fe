pub mod csv_writer;
pub mod fits_writer;

pub use csv_writer::CsvTableWriter;
pub use fits_writer::{
    ColumnDescriptor, FitsInspector, FitsSummary, FitsTableWriter, HduKind, HduSummary,
};

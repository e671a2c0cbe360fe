pub mod table;

pub use table::{CoaddTable, Column, ColumnData, TableSource};

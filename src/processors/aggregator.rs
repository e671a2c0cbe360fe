use crate::error::{ProcessingError, Result};
use crate::models::CoaddTable;
use tracing::debug;

/// Row order of the stacked table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StackOrder {
    /// Sorted by the position of each table's URL in the input list
    #[default]
    Input,
    /// As the tables arrived from the worker pool
    Completion,
}

/// Row-stacks per-resource tables into one combined table
pub struct TableAggregator {
    order: StackOrder,
}

impl TableAggregator {
    pub fn new() -> Self {
        Self {
            order: StackOrder::default(),
        }
    }

    pub fn with_order(order: StackOrder) -> Self {
        Self { order }
    }

    /// Concatenate `tables` vertically.
    ///
    /// All tables must share column names and order. An empty input is an
    /// [`ProcessingError::EmptyResultSet`].
    pub fn stack(&self, mut tables: Vec<CoaddTable>) -> Result<CoaddTable> {
        if self.order == StackOrder::Input {
            tables.sort_by_key(|t| t.source().map(|s| s.index).unwrap_or(usize::MAX));
        }

        let mut tables = tables.into_iter();
        let first = tables.next().ok_or(ProcessingError::EmptyResultSet)?;

        let mut combined = first.empty_like();
        combined.append(&first)?;
        for table in tables {
            combined.append(&table)?;
        }

        debug!(
            rows = combined.num_rows(),
            columns = combined.num_columns(),
            "stacked tables"
        );

        Ok(combined)
    }
}

impl Default for TableAggregator {
    fn default() -> Self {
        Self::new()
    }
}

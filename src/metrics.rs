//! Row/column extents for the grid.
//!
//! Only the explicit size overrides are stored; every other row or column
//! takes the default size. A span sum is the default times its length plus
//! the deltas of the overrides inside it, so extents stay cheap for grids
//! of any row count. Panes use these sums to size their clone surfaces and
//! the adjuster uses them to size the hider.

use std::collections::{BTreeMap, HashMap};

use crate::settings::Settings;

/// Sizes along one grid axis.
#[derive(Debug, Clone, Default)]
struct Axis {
    count: u32,
    default_size: f64,
    /// `size - default_size` for every overridden index below `count`
    deltas: BTreeMap<u32, f64>,
}

impl Axis {
    fn new(count: u32, default_size: f64, overrides: &HashMap<u32, f64>) -> Self {
        let deltas = overrides
            .iter()
            .filter(|(index, _)| **index < count)
            .map(|(index, size)| (*index, size - default_size))
            .collect();
        Self {
            count,
            default_size,
            deltas,
        }
    }

    fn span(&self, from: u32, to: u32) -> f64 {
        let end = to.min(self.count);
        if end <= from {
            return 0.0;
        }
        let base = f64::from(end - from) * self.default_size;
        base + self.deltas.range(from..end).map(|(_, delta)| delta).sum::<f64>()
    }
}

/// Row and column extents for the whole grid.
#[derive(Debug, Clone)]
pub struct GridMetrics {
    rows: Axis,
    columns: Axis,
    pub total_rows: u32,
    pub total_columns: u32,
    pub fixed_rows_top: u32,
    pub fixed_rows_bottom: u32,
    pub fixed_columns_start: u32,
    /// Height of the column header band (0 if not shown)
    pub column_header_height: f64,
    /// Width of the row header band (0 if not shown)
    pub row_header_width: f64,
}

impl GridMetrics {
    /// Build metrics from settings. Frozen counts are clamped to the grid size.
    pub fn new(settings: &Settings) -> Self {
        let rows = Axis::new(
            settings.total_rows,
            settings.default_row_height,
            &settings.row_heights,
        );
        let columns = Axis::new(
            settings.total_columns,
            settings.default_column_width,
            &settings.column_widths,
        );
        let fixed_rows_top = settings.fixed_rows_top.min(settings.total_rows);
        let fixed_rows_bottom = settings
            .fixed_rows_bottom
            .min(settings.total_rows - fixed_rows_top);

        Self {
            rows,
            columns,
            total_rows: settings.total_rows,
            total_columns: settings.total_columns,
            fixed_rows_top,
            fixed_rows_bottom,
            fixed_columns_start: settings.fixed_columns_start.min(settings.total_columns),
            column_header_height: settings.column_header_height,
            row_header_width: settings.row_header_width,
        }
    }

    /// Sum of row heights in `from..to`.
    pub fn sum_row_heights(&self, from: u32, to: u32) -> f64 {
        self.rows.span(from, to)
    }

    /// Sum of column widths in `from..to`.
    pub fn sum_column_widths(&self, from: u32, to: u32) -> f64 {
        self.columns.span(from, to)
    }

    /// Total height of all rows
    pub fn total_height(&self) -> f64 {
        self.sum_row_heights(0, self.total_rows)
    }

    /// Total width of all columns
    pub fn total_width(&self) -> f64 {
        self.sum_column_widths(0, self.total_columns)
    }

    /// Height of the frozen top rows (headers excluded)
    pub fn frozen_top_height(&self) -> f64 {
        self.sum_row_heights(0, self.fixed_rows_top)
    }

    /// Height of the frozen bottom rows
    pub fn frozen_bottom_height(&self) -> f64 {
        self.sum_row_heights(
            self.total_rows - self.fixed_rows_bottom,
            self.total_rows,
        )
    }

    /// Width of the frozen leading columns (headers excluded)
    pub fn frozen_start_width(&self) -> f64 {
        self.sum_column_widths(0, self.fixed_columns_start)
    }
}

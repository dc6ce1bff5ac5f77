mod halve;


use std::num::NonZeroUsize;

use anyhow::{Result, bail};

pub use self::halve::{halve_columns, halve_rows};
use crate::{resolution::Resolution, util::Sample, weights::compute_weights};

/// Dense row-major 2D array of `columns * rows` values.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    columns: NonZeroUsize,
    rows: NonZeroUsize,
    values: Vec<T>,
}

impl<T> Grid<T> {
    /// Wraps a row-major buffer. Fails if either dimension is zero or the
    /// buffer length is not exactly `columns * rows`.
    pub fn new(columns: usize, rows: usize, values: Vec<T>) -> Result<Self> {
        let resolution = Resolution::new(columns, rows)?;
        if values.len() != resolution.cells() {
            bail!(
                "grid of {} needs {} values, got {}",
                resolution,
                resolution.cells(),
                values.len()
            );
        }

        Ok(Self {
            columns: resolution.columns,
            rows: resolution.rows,
            values,
        })
    }

    /// Builds a grid by evaluating `f(column, row)` for every cell.
    pub fn from_fn(columns: usize, rows: usize, mut f: impl FnMut(usize, usize) -> T) -> Result<Self> {
        let resolution = Resolution::new(columns, rows)?;
        let mut values = Vec::with_capacity(resolution.cells());
        for row in 0..rows {
            for column in 0..columns {
                values.push(f(column, row));
            }
        }

        Ok(Self {
            columns: resolution.columns,
            rows: resolution.rows,
            values,
        })
    }

    #[must_use]
    pub fn columns(&self) -> NonZeroUsize {
        self.columns
    }

    #[must_use]
    pub fn rows(&self) -> NonZeroUsize {
        self.rows
    }

    #[must_use]
    pub fn resolution(&self) -> Resolution {
        Resolution::from_non_zero(self.columns, self.rows)
    }

    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    #[must_use]
    pub fn into_values(self) -> Vec<T> {
        self.values
    }

    #[must_use]
    pub fn get(&self, column: usize, row: usize) -> Option<&T> {
        if column >= self.columns.get() || row >= self.rows.get() {
            return None;
        }
        self.values.get(row * self.columns.get() + column)
    }

    #[must_use]
    pub fn row(&self, row: usize) -> Option<&[T]> {
        let columns = self.columns.get();
        self.values.get(row * columns..(row + 1) * columns)
    }
}

impl<T: Clone> Grid<T> {
    /// A grid with every cell set to `value`.
    pub fn filled(columns: usize, rows: usize, value: T) -> Result<Self> {
        let resolution = Resolution::new(columns, rows)?;
        Self::new(columns, rows, vec![value; resolution.cells()])
    }
}

impl<T: Copy> Grid<Option<T>> {
    /// Replaces every missing cell with `sentinel`, producing a dense grid that
    /// can be resampled.
    #[must_use]
    pub fn fill_missing(self, sentinel: T) -> Grid<T> {
        Grid {
            columns: self.columns,
            rows: self.rows,
            values: self
                .values
                .into_iter()
                .map(|value| value.unwrap_or(sentinel))
                .collect(),
        }
    }
}

/// Resamples `input` to exactly `target`.
///
/// Halving one axis while keeping the other goes through a direct pairwise
/// average. Every other size uses the weighted plans from
/// [`compute_weights`] on both axes.
#[must_use]
pub fn resample_grid<T: Sample>(input: &Grid<T>, target: Resolution) -> Grid<T> {
    let source = input.resolution();
    assert_eq!(
        input.values.len(),
        source.cells(),
        "grid value count does not match its dimensions"
    );

    if source == target {
        return input.clone();
    }

    let mut values = vec![T::default(); target.cells()];
    if target.rows == source.rows && source.columns.get() == 2 * target.columns.get() {
        halve_columns(&mut values, &input.values, target.columns, target.rows);
    } else if target.columns == source.columns && source.rows.get() == 2 * target.rows.get() {
        halve_rows(&mut values, &input.values, target.columns, target.rows);
    } else {
        resample_general(&mut values, input, target);
    }

    Grid {
        columns: target.columns,
        rows: target.rows,
        values,
    }
}

/// Weighted-area resampling of `input` into `dest`, which holds `target`
/// row-major.
///
/// Every `(from_row, to_row, wy)` entry of the row plan is combined with every
/// `(from_column, to_column, wx)` entry of the column plan, accumulating
/// `input[from_row, from_column] * wx * wy` into `dest[to_row, to_column]`.
/// Sums are accumulated in `f64` and stored once.
pub fn resample_general<T: Sample>(dest: &mut [T], input: &Grid<T>, target: Resolution) {
    assert!(dest.len() >= target.cells());
    let src_columns = input.columns.get();
    let dest_columns = target.columns.get();
    let column_plan = compute_weights(input.columns, target.columns);
    let row_plan = compute_weights(input.rows, target.rows);

    let mut acc = vec![0f64; target.cells()];
    for (from_row, to_row, wy) in row_plan.iter() {
        let src_row = &input.values[from_row * src_columns..][..src_columns];
        let acc_row = &mut acc[to_row * dest_columns..][..dest_columns];
        for (from_column, to_column, wx) in column_plan.iter() {
            acc_row[to_column] += src_row[from_column].to_f64() * (wx * wy);
        }
    }

    for (dest, acc) in dest.iter_mut().zip(acc) {
        *dest = T::from_f64(acc);
    }
}


use std::{fmt, num::NonZeroUsize};

use anyhow::{Result, anyhow, bail};

/// Exact size of one pyramid level, used as the cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Resolution {
    pub columns: NonZeroUsize,
    pub rows: NonZeroUsize,
}

impl Resolution {
    /// Fails if either dimension is zero or the cell count does not fit in
    /// `usize`.
    pub fn new(columns: usize, rows: usize) -> Result<Self> {
        let resolution = Self {
            columns: NonZeroUsize::new(columns)
                .ok_or_else(|| anyhow!("resolution must have at least one column"))?,
            rows: NonZeroUsize::new(rows)
                .ok_or_else(|| anyhow!("resolution must have at least one row"))?,
        };
        if resolution.checked_cells().is_none() {
            bail!("resolution {resolution} overflows usize");
        }

        Ok(resolution)
    }

    #[must_use]
    pub const fn from_non_zero(columns: NonZeroUsize, rows: NonZeroUsize) -> Self {
        Self { columns, rows }
    }

    /// Number of cells at this resolution, or `None` if it overflows `usize`.
    #[must_use]
    pub fn checked_cells(self) -> Option<usize> {
        self.columns.get().checked_mul(self.rows.get())
    }

    /// Number of cells at this resolution, saturating at `usize::MAX`.
    ///
    /// Resolutions from [`Resolution::new`] never saturate. A saturated count
    /// can never match a real buffer length.
    #[must_use]
    pub fn cells(self) -> usize {
        self.columns.get().saturating_mul(self.rows.get())
    }

    /// Whether this resolution fits inside `other` along both axes.
    #[must_use]
    pub fn fits_within(self, other: Self) -> bool {
        self.columns <= other.columns && self.rows <= other.rows
    }

    /// The canonical cache key for drawing data of resolution `self` into at
    /// least `min` pixels, computed independently per axis by
    /// [`canonical_target`].
    #[must_use]
    pub fn canonical(self, min: Self) -> Self {
        Self {
            columns: canonical_target(self.columns, min.columns),
            rows: canonical_target(self.rows, min.rows),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.columns, self.rows)
    }
}

/// Picks the resolution to render `n_datapoints` values into `n_pixels` pixels.
///
/// When there is more data than pixels, the result is the smallest power of
/// two that is at least `n_pixels`, capped at `n_datapoints`, so that
/// `n_pixels <= result < 2 * n_pixels`. Otherwise the data is already coarser
/// than the display and `n_datapoints` is returned unchanged.
///
/// Quantizing to powers of two bounds the number of distinct pyramid levels
/// created while a viewport is zoomed continuously.
#[must_use]
pub fn canonical_target(n_datapoints: NonZeroUsize, n_pixels: NonZeroUsize) -> NonZeroUsize {
    if n_datapoints <= n_pixels {
        return n_datapoints;
    }

    n_pixels
        .checked_next_power_of_two()
        .map_or(n_datapoints, |pow| pow.min(n_datapoints))
}

/// The visible part of one axis of the heatmap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Physical pixels available for the visible region.
    pub pixels: NonZeroUsize,
    /// Full data extent divided by the visible extent. `1.0` means the whole
    /// axis is on screen, `4.0` means a quarter of it is.
    pub zoom: f64,
}

impl Viewport {
    pub fn new(pixels: usize, zoom: f64) -> Result<Self> {
        let pixels =
            NonZeroUsize::new(pixels).ok_or_else(|| anyhow!("viewport must be at least 1 pixel"))?;
        if !zoom.is_finite() || zoom <= 0.0 {
            bail!("viewport zoom must be a positive finite ratio, got {zoom}");
        }

        Ok(Self { pixels, zoom })
    }

    /// Number of full-resolution datapoints that would be needed to give every
    /// visible pixel its own cell when the whole axis is resampled.
    #[must_use]
    pub fn datapoints_needed(&self) -> NonZeroUsize {
        let needed = (self.pixels.get() as f64 * self.zoom).ceil();
        // Float-to-int `as` saturates, and the result is clamped to at least one.
        NonZeroUsize::new(needed as usize).unwrap_or(NonZeroUsize::MIN)
    }
}

/// Minimum pyramid resolution needed to draw the visible part of both axes.
#[must_use]
pub fn required_resolution(x: &Viewport, y: &Viewport) -> Resolution {
    Resolution::from_non_zero(x.datapoints_needed(), y.datapoints_needed())
}

mod halve;

#[cfg(test)]
mod tests;

use std::num::NonZeroUsize;

use anyhow::{Result, bail};

pub use self::halve::{halve_columns, halve_rows};
use crate::{
    resolution::Resolution,
    util::clamp_u8,
    weights::compute_weights,
};

/// One pixel in premultiplied-alpha encoding.
///
/// The color channels hold `color * alpha / 255`, so blending pixels is a plain
/// weighted sum of all four channels.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Premultiplied {
    pub alpha: u8,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Premultiplied {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    #[must_use]
    pub const fn new(alpha: u8, red: u8, green: u8, blue: u8) -> Self {
        Self {
            alpha,
            red,
            green,
            blue,
        }
    }

    /// Encodes a straight (non-premultiplied) RGBA color.
    #[must_use]
    pub fn from_straight(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        let premultiply = |channel: u8| -> u8 {
            ((u32::from(channel) * u32::from(alpha) + 127) / 255) as u8
        };
        Self {
            alpha,
            red: premultiply(red),
            green: premultiply(green),
            blue: premultiply(blue),
        }
    }

    /// Decodes back to straight `[red, green, blue, alpha]`. Fully transparent
    /// pixels decode to transparent black.
    #[must_use]
    pub fn to_straight(self) -> [u8; 4] {
        if self.alpha == 0 {
            return [0; 4];
        }
        let alpha = u32::from(self.alpha);
        let unpremultiply = |channel: u8| -> u8 {
            ((u32::from(channel) * 255 + alpha / 2) / alpha).min(255) as u8
        };
        [
            unpremultiply(self.red),
            unpremultiply(self.green),
            unpremultiply(self.blue),
            self.alpha,
        ]
    }

    #[must_use]
    pub const fn channels(self) -> [u8; 4] {
        [self.alpha, self.red, self.green, self.blue]
    }

    #[must_use]
    pub const fn from_channels(channels: [u8; 4]) -> Self {
        Self::new(channels[0], channels[1], channels[2], channels[3])
    }
}

/// Dense row-major 2D array of premultiplied pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    columns: NonZeroUsize,
    rows: NonZeroUsize,
    pixels: Vec<Premultiplied>,
}

impl Image {
    /// Wraps a row-major pixel buffer. Fails if either dimension is zero or the
    /// buffer length is not exactly `columns * rows`.
    pub fn new(columns: usize, rows: usize, pixels: Vec<Premultiplied>) -> Result<Self> {
        let resolution = Resolution::new(columns, rows)?;
        if pixels.len() != resolution.cells() {
            bail!(
                "image of {} needs {} pixels, got {}",
                resolution,
                resolution.cells(),
                pixels.len()
            );
        }

        Ok(Self {
            columns: resolution.columns,
            rows: resolution.rows,
            pixels,
        })
    }

    /// Builds an image from straight RGBA8 bytes, four per pixel.
    pub fn from_straight_rgba(columns: usize, rows: usize, rgba: &[u8]) -> Result<Self> {
        if rgba.len() % 4 != 0 {
            bail!("RGBA buffer length {} is not a multiple of 4", rgba.len());
        }
        let pixels = rgba
            .chunks_exact(4)
            .map(|px| Premultiplied::from_straight(px[0], px[1], px[2], px[3]))
            .collect();
        Self::new(columns, rows, pixels)
    }

    /// Decodes every pixel to straight RGBA8 bytes.
    #[must_use]
    pub fn to_straight_rgba(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|px| px.to_straight())
            .collect()
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
    pub fn pixels(&self) -> &[Premultiplied] {
        &self.pixels
    }

    #[must_use]
    pub fn into_pixels(self) -> Vec<Premultiplied> {
        self.pixels
    }

    #[must_use]
    pub fn get(&self, column: usize, row: usize) -> Option<Premultiplied> {
        if column >= self.columns.get() || row >= self.rows.get() {
            return None;
        }
        self.pixels.get(row * self.columns.get() + column).copied()
    }
}

/// Resamples `input` to exactly `target`, with the same dispatch as
/// [`resample_grid`](crate::grid::resample_grid).
#[must_use]
pub fn resample_image(input: &Image, target: Resolution) -> Image {
    let source = input.resolution();
    assert_eq!(
        input.pixels.len(),
        source.cells(),
        "image pixel count does not match its dimensions"
    );

    if source == target {
        return input.clone();
    }

    let mut pixels = vec![Premultiplied::TRANSPARENT; target.cells()];
    if target.rows == source.rows && source.columns.get() == 2 * target.columns.get() {
        halve_columns(&mut pixels, &input.pixels, target.columns, target.rows);
    } else if target.columns == source.columns && source.rows.get() == 2 * target.rows.get() {
        halve_rows(&mut pixels, &input.pixels, target.columns, target.rows);
    } else {
        resample_general(&mut pixels, input, target);
    }

    Image {
        columns: target.columns,
        rows: target.rows,
        pixels,
    }
}

/// Weighted-area resampling of `input` into `dest`, which holds `target`
/// row-major. All four channels share the axis weights and are accumulated in
/// `f32`, then rounded and clamped to 8 bits.
pub fn resample_general(dest: &mut [Premultiplied], input: &Image, target: Resolution) {
    assert!(dest.len() >= target.cells());
    let src_columns = input.columns.get();
    let dest_columns = target.columns.get();
    let column_plan = compute_weights(input.columns, target.columns);
    let row_plan = compute_weights(input.rows, target.rows);

    let mut acc = vec![[0f32; 4]; target.cells()];
    for (from_row, to_row, wy) in row_plan.iter() {
        let src_row = &input.pixels[from_row * src_columns..][..src_columns];
        let acc_row = &mut acc[to_row * dest_columns..][..dest_columns];
        for (from_column, to_column, wx) in column_plan.iter() {
            let weight = (wx * wy) as f32;
            let px = src_row[from_column].channels();
            let cell = &mut acc_row[to_column];
            for (sum, channel) in cell.iter_mut().zip(px) {
                *sum += f32::from(channel) * weight;
            }
        }
    }

    for (dest, acc) in dest.iter_mut().zip(acc) {
        *dest = Premultiplied::from_channels(acc.map(clamp_u8));
    }
}

#[cfg(target_arch = "x86_64")]
mod avx2;
mod rust;


use std::num::NonZeroUsize;

use cfg_if::cfg_if;
use log::trace;

use super::Premultiplied;

/// Halves the width of a premultiplied image by averaging horizontal pixel
/// pairs, channel by channel, rounding halves up.
///
/// # Parameters
/// - `dest`: Destination buffer, `dest_columns * rows` pixels
/// - `src`: Source buffer, `2 * dest_columns * rows` pixels
/// - `dest_columns`: Width of the destination (half of the source width)
/// - `rows`: Height of both images
pub fn halve_columns(
    dest: &mut [Premultiplied],
    src: &[Premultiplied],
    dest_columns: NonZeroUsize,
    rows: NonZeroUsize,
) {
    cfg_if! {
        if #[cfg(all(target_arch = "x86_64", not(feature = "no_simd")))] {
            if crate::util::has_avx2() {
                trace!("halve_columns: avx2");
                // SAFETY: We check for AVX2 first
                unsafe {
                    avx2::halve_columns(dest, src, dest_columns, rows);
                }
                return;
            }
        }
    }

    trace!("halve_columns: scalar");
    rust::halve_columns(dest, src, dest_columns, rows);
}

/// Halves the height of a premultiplied image by averaging vertical pixel
/// pairs, channel by channel, rounding halves up.
///
/// # Parameters
/// - `dest`: Destination buffer, `columns * dest_rows` pixels
/// - `src`: Source buffer, `columns * 2 * dest_rows` pixels
/// - `columns`: Width of both images
/// - `dest_rows`: Height of the destination (half of the source height)
pub fn halve_rows(
    dest: &mut [Premultiplied],
    src: &[Premultiplied],
    columns: NonZeroUsize,
    dest_rows: NonZeroUsize,
) {
    cfg_if! {
        if #[cfg(all(target_arch = "x86_64", not(feature = "no_simd")))] {
            if crate::util::has_avx2() {
                trace!("halve_rows: avx2");
                // SAFETY: We check for AVX2 first
                unsafe {
                    avx2::halve_rows(dest, src, columns, dest_rows);
                }
                return;
            }
        }
    }

    trace!("halve_rows: scalar");
    rust::halve_rows(dest, src, columns, dest_rows);
}

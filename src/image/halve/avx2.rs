#![allow(clippy::undocumented_unsafe_blocks)]

use std::{arch::x86_64::*, num::NonZeroUsize};

use crate::{image::Premultiplied, util::average_u8};

const BYTES_PER_PIXEL: usize = size_of::<Premultiplied>();

/// Halves the width of a premultiplied image, 8 destination pixels per step.
#[target_feature(enable = "avx2")]
pub(super) unsafe fn halve_columns(
    dest: &mut [Premultiplied],
    src: &[Premultiplied],
    dest_columns: NonZeroUsize,
    rows: NonZeroUsize,
) {
    // Check the array bounds once at the start of the loop.
    assert!(src.len() >= dest_columns.get() * 2 * rows.get());
    assert!(dest.len() >= dest_columns.get() * rows.get());

    halve_columns_u8x4(
        dest.as_mut_ptr().cast::<u8>(),
        src.as_ptr().cast::<u8>(),
        dest_columns.get(),
        rows.get(),
    );
}

/// Halves the height of a premultiplied image, 8 pixels per step.
#[target_feature(enable = "avx2")]
pub(super) unsafe fn halve_rows(
    dest: &mut [Premultiplied],
    src: &[Premultiplied],
    columns: NonZeroUsize,
    dest_rows: NonZeroUsize,
) {
    assert!(src.len() >= columns.get() * dest_rows.get() * 2);
    assert!(dest.len() >= columns.get() * dest_rows.get());

    halve_rows_u8(
        dest.as_mut_ptr().cast::<u8>(),
        src.as_ptr().cast::<u8>(),
        columns.get() * BYTES_PER_PIXEL,
        dest_rows.get(),
    );
}

#[target_feature(enable = "avx2")]
unsafe fn halve_columns_u8x4(dest: *mut u8, src: *const u8, dest_columns: usize, rows: usize) {
    let src_stride = dest_columns * 2 * BYTES_PER_PIXEL;
    let dest_stride = dest_columns * BYTES_PER_PIXEL;

    for y in 0..rows {
        let src_row = src.add(y * src_stride);
        let dest_row = dest.add(y * dest_stride);

        // Each step reads 16 source pixels and writes 8 destination pixels.
        let mut x = 0;
        while x + 8 <= dest_columns {
            let lo = _mm256_loadu_si256(src_row.add(x * 2 * BYTES_PER_PIXEL) as *const __m256i);
            let hi = _mm256_loadu_si256(
                src_row.add((x * 2 + 8) * BYTES_PER_PIXEL) as *const __m256i,
            );

            // Split pixels (32-bit lanes) into even and odd ones. Per 128-bit
            // half this yields lo0 lo2 hi0 hi2 / lo1 lo3 hi1 hi3.
            let lo_ps = _mm256_castsi256_ps(lo);
            let hi_ps = _mm256_castsi256_ps(hi);
            let even = _mm256_castps_si256(_mm256_shuffle_ps::<0b10_00_10_00>(lo_ps, hi_ps));
            let odd = _mm256_castps_si256(_mm256_shuffle_ps::<0b11_01_11_01>(lo_ps, hi_ps));

            // (a + b + 1) >> 1 per byte
            let avg = _mm256_avg_epu8(even, odd);

            // Output pairs are ordered 0 2 1 3 in 64-bit units; restore 0 1 2 3.
            let ordered = _mm256_permute4x64_epi64::<0b11_01_10_00>(avg);
            _mm256_storeu_si256(dest_row.add(x * BYTES_PER_PIXEL) as *mut __m256i, ordered);

            x += 8;
        }

        // Handle remaining pixels
        while x < dest_columns {
            let a = src_row.add(x * 2 * BYTES_PER_PIXEL);
            let b = a.add(BYTES_PER_PIXEL);
            let out = dest_row.add(x * BYTES_PER_PIXEL);
            for c in 0..BYTES_PER_PIXEL {
                *out.add(c) = average_u8(*a.add(c), *b.add(c));
            }
            x += 1;
        }
    }
}

#[target_feature(enable = "avx2")]
unsafe fn halve_rows_u8(dest: *mut u8, src: *const u8, row_bytes: usize, dest_rows: usize) {
    for y in 0..dest_rows {
        let top = src.add(y * 2 * row_bytes);
        let bottom = top.add(row_bytes);
        let out = dest.add(y * row_bytes);

        let mut x = 0;
        while x + 32 <= row_bytes {
            let a = _mm256_loadu_si256(top.add(x) as *const __m256i);
            let b = _mm256_loadu_si256(bottom.add(x) as *const __m256i);
            _mm256_storeu_si256(out.add(x) as *mut __m256i, _mm256_avg_epu8(a, b));
            x += 32;
        }

        // Handle remaining bytes
        while x < row_bytes {
            *out.add(x) = average_u8(*top.add(x), *bottom.add(x));
            x += 1;
        }
    }
}

use std::num::NonZeroUsize;

use crate::util::Sample;

/// Halves the width of a row-major grid by averaging horizontal pairs.
///
/// # Parameters
/// - `dest`: Destination buffer, `dest_columns * rows` values
/// - `src`: Source buffer, `2 * dest_columns * rows` values
/// - `dest_columns`: Width of the destination (half of the source width)
/// - `rows`: Height of both grids
pub fn halve_columns<T: Sample>(
    dest: &mut [T],
    src: &[T],
    dest_columns: NonZeroUsize,
    rows: NonZeroUsize,
) {
    let dest_columns = dest_columns.get();
    let src_columns = dest_columns * 2;
    // Check the array bounds once at the start of the loop.
    assert!(src.len() >= src_columns * rows.get());
    assert!(dest.len() >= dest_columns * rows.get());

    for (dest_row, src_row) in dest
        .chunks_exact_mut(dest_columns)
        .zip(src.chunks_exact(src_columns))
        .take(rows.get())
    {
        for (dest, pair) in dest_row.iter_mut().zip(src_row.chunks_exact(2)) {
            *dest = T::from_f64((pair[0].to_f64() + pair[1].to_f64()) * 0.5);
        }
    }
}

/// Halves the height of a row-major grid by averaging vertical pairs.
///
/// # Parameters
/// - `dest`: Destination buffer, `columns * dest_rows` values
/// - `src`: Source buffer, `columns * 2 * dest_rows` values
/// - `columns`: Width of both grids
/// - `dest_rows`: Height of the destination (half of the source height)
pub fn halve_rows<T: Sample>(
    dest: &mut [T],
    src: &[T],
    columns: NonZeroUsize,
    dest_rows: NonZeroUsize,
) {
    let columns = columns.get();
    assert!(src.len() >= columns * dest_rows.get() * 2);
    assert!(dest.len() >= columns * dest_rows.get());

    for (dest_row, src_rows) in dest
        .chunks_exact_mut(columns)
        .zip(src.chunks_exact(columns * 2))
        .take(dest_rows.get())
    {
        let (top, bottom) = src_rows.split_at(columns);
        for ((dest, &a), &b) in dest_row.iter_mut().zip(top).zip(bottom) {
            *dest = T::from_f64((a.to_f64() + b.to_f64()) * 0.5);
        }
    }
}

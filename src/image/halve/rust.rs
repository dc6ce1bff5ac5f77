use std::num::NonZeroUsize;

use crate::{image::Premultiplied, util::average_u8};

#[inline(always)]
fn average(a: Premultiplied, b: Premultiplied) -> Premultiplied {
    Premultiplied {
        alpha: average_u8(a.alpha, b.alpha),
        red: average_u8(a.red, b.red),
        green: average_u8(a.green, b.green),
        blue: average_u8(a.blue, b.blue),
    }
}

pub(super) fn halve_columns(
    dest: &mut [Premultiplied],
    src: &[Premultiplied],
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
            *dest = average(pair[0], pair[1]);
        }
    }
}

pub(super) fn halve_rows(
    dest: &mut [Premultiplied],
    src: &[Premultiplied],
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
            *dest = average(a, b);
        }
    }
}

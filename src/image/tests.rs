#![allow(clippy::unwrap_used, reason = "allow in test files")]

use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro128StarStar;

use super::*;

fn res(columns: usize, rows: usize) -> Resolution {
    Resolution::new(columns, rows).unwrap()
}

fn px(alpha: u8, red: u8, green: u8, blue: u8) -> Premultiplied {
    Premultiplied::new(alpha, red, green, blue)
}

fn random_image(columns: usize, rows: usize, seed: u64) -> Image {
    let mut rng = Xoshiro128StarStar::seed_from_u64(seed);
    let pixels = (0..columns * rows)
        .map(|_| Premultiplied::from_straight(rng.random(), rng.random(), rng.random(), rng.random()))
        .collect();
    Image::new(columns, rows, pixels).unwrap()
}

fn general(input: &Image, target: Resolution) -> Vec<Premultiplied> {
    let mut dest = vec![Premultiplied::TRANSPARENT; target.cells()];
    resample_general(&mut dest, input, target);
    dest
}

fn max_channel_diff(a: &[Premultiplied], b: &[Premultiplied]) -> u8 {
    a.iter()
        .zip(b)
        .flat_map(|(a, b)| a.channels().into_iter().zip(b.channels()))
        .map(|(a, b)| a.abs_diff(b))
        .max()
        .unwrap_or(0)
}

#[test]
fn new_rejects_length_mismatch() {
    assert!(Image::new(2, 1, vec![Premultiplied::TRANSPARENT; 1]).is_err());
    assert!(Image::new(0, 1, Vec::new()).is_err());
    assert!(Image::new(2, 1, vec![Premultiplied::TRANSPARENT; 2]).is_ok());
    assert!(Image::new(1 << 32, 1 << 32, Vec::new()).is_err());
}

#[test]
fn from_straight_rgba_checks_buffer() {
    assert!(Image::from_straight_rgba(1, 1, &[1, 2, 3]).is_err());
    assert!(Image::from_straight_rgba(2, 1, &[1, 2, 3, 4]).is_err());

    let image = Image::from_straight_rgba(2, 1, &[255, 0, 0, 255, 0, 255, 0, 128]).unwrap();
    assert_eq!(image.get(0, 0), Some(px(255, 255, 0, 0)));
    assert_eq!(image.get(1, 0), Some(px(128, 0, 128, 0)));
    assert_eq!(image.get(2, 0), None);
}

#[test]
fn premultiply_scales_by_alpha() {
    assert_eq!(Premultiplied::from_straight(255, 128, 0, 255), px(255, 255, 128, 0));
    assert_eq!(Premultiplied::from_straight(255, 255, 255, 0), Premultiplied::TRANSPARENT);
    assert_eq!(Premultiplied::from_straight(200, 100, 50, 51), px(51, 40, 20, 10));
}

#[test]
fn unpremultiply_restores_color() {
    assert_eq!(px(255, 255, 128, 0).to_straight(), [255, 128, 0, 255]);
    assert_eq!(px(51, 40, 20, 10).to_straight(), [200, 100, 50, 51]);
    assert_eq!(Premultiplied::TRANSPARENT.to_straight(), [0, 0, 0, 0]);
    // Channels larger than alpha are not valid premultiplied data; saturate.
    assert_eq!(px(10, 200, 0, 0).to_straight(), [255, 0, 0, 10]);
}

#[quickcheck]
fn straight_round_trip_opaque(red: u8, green: u8, blue: u8) -> bool {
    Premultiplied::from_straight(red, green, blue, 255).to_straight() == [red, green, blue, 255]
}

#[test]
fn to_straight_rgba_flattens() {
    let image = Image::new(2, 1, vec![px(255, 1, 2, 3), Premultiplied::TRANSPARENT]).unwrap();
    assert_eq!(image.to_straight_rgba(), vec![1, 2, 3, 255, 0, 0, 0, 0]);
}

#[test]
fn opaque_red_and_green_average() {
    let image = Image::new(2, 1, vec![px(255, 255, 0, 0), px(255, 0, 255, 0)]).unwrap();

    for out in [
        resample_image(&image, res(1, 1)).into_pixels(),
        general(&image, res(1, 1)),
    ] {
        let out = out[0];
        assert_eq!(out.alpha, 255);
        assert!((127..=128).contains(&out.red));
        assert!((127..=128).contains(&out.green));
        assert_eq!(out.blue, 0);
    }
}

#[test]
fn general_path_collapses_row() {
    let image = Image::new(
        4,
        1,
        vec![px(0, 0, 0, 0), px(40, 40, 0, 0), px(80, 0, 80, 0), px(120, 0, 0, 120)],
    )
    .unwrap();
    assert_eq!(general(&image, res(1, 1)), vec![px(60, 10, 20, 30)]);
    assert_eq!(
        general(&image, res(2, 1)),
        vec![px(20, 20, 0, 0), px(100, 0, 40, 60)]
    );
}

#[test]
fn general_path_clamps_invalid_channels() {
    // Rounding in the f32 weights must never wrap a full channel around.
    let image = Image::new(3, 1, vec![px(255, 255, 255, 255); 3]).unwrap();
    assert_eq!(general(&image, res(2, 1)), vec![px(255, 255, 255, 255); 2]);
}

#[test]
fn identity_resize_returns_input() {
    let image = random_image(9, 5, 7);
    assert_eq!(resample_image(&image, image.resolution()), image);
    assert_eq!(general(&image, image.resolution()), image.pixels());
}

#[test]
fn fast_paths_match_general_path() {
    let image = random_image(34, 6, 42);

    let fast = resample_image(&image, res(17, 6));
    assert_eq!(fast.pixels(), general(&image, res(17, 6)).as_slice());

    let fast = resample_image(&image, res(34, 3));
    assert_eq!(fast.pixels(), general(&image, res(34, 3)).as_slice());
}

#[quickcheck]
fn uniform_image_stays_uniform(
    columns: u8,
    rows: u8,
    target_columns: u8,
    target_rows: u8,
    alpha: u8,
) -> TestResult {
    if columns == 0
        || rows == 0
        || target_columns == 0
        || target_rows == 0
        || target_columns > columns
        || target_rows > rows
    {
        return TestResult::discard();
    }

    let color = Premultiplied::from_straight(200, 100, 50, alpha);
    let image = Image::new(
        columns as usize,
        rows as usize,
        vec![color; columns as usize * rows as usize],
    )
    .unwrap();
    let out = resample_image(&image, res(target_columns as usize, target_rows as usize));
    TestResult::from_bool(out.pixels().iter().all(|&p| p == color))
}

#[quickcheck]
fn dispatch_matches_general_path(columns: u8, target_columns: u8, seed: u64) -> TestResult {
    if columns == 0 || target_columns == 0 || target_columns > columns {
        return TestResult::discard();
    }

    let image = random_image(columns as usize, 2, seed);
    let target = res(target_columns as usize, 1);
    let out = resample_image(&image, target);
    TestResult::from_bool(max_channel_diff(out.pixels(), &general(&image, target)) == 0)
}

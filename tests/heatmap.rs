#![allow(clippy::unwrap_used, reason = "allow in test files")]

use std::sync::Mutex;

use anyhow::Result;
use heatmap_pyramid::{
    Grid, GridPyramid, Image, ImagePyramid, Pyramid, PyramidSlot, Resolution, Viewport,
    required_resolution,
};

const COLUMNS: usize = 200_000;
const ROWS: usize = 20;

fn wide_grid() -> Result<Grid<f32>> {
    Grid::from_fn(COLUMNS, ROWS, |column, row| (column % 1000 + row) as f32)
}

fn mean(values: &[f32]) -> f64 {
    values.iter().map(|&v| f64::from(v)).sum::<f64>() / values.len() as f64
}

#[test]
fn wide_grid_zoom_levels_share_one_chain() -> Result<()> {
    let grid = wide_grid()?;
    let root_mean = mean(grid.values());
    let mut pyramid = GridPyramid::from_grid(grid);
    let y = Viewport::new(600, 1.0)?;

    let x = Viewport::new(800, 1.0)?;
    let level = pyramid.get_approximate(required_resolution(&x, &y))?;
    assert_eq!(level.resolution(), Resolution::new(1024, ROWS)?);
    assert!((mean(level.values()) - root_mean).abs() < 1e-2 * root_mean);

    // Every level between the root and 1024 columns is now cached, so zooming
    // in along X only ever hits.
    let cached = pyramid.len();
    for zoom in [2.0, 4.0, 8.0, 16.0, 64.0] {
        let x = Viewport::new(800, zoom)?;
        let level = pyramid.get_approximate(required_resolution(&x, &y))?;
        assert!(level.columns().get() >= 800 * zoom as usize);
        assert_eq!(level.rows().get(), ROWS);
    }
    assert_eq!(pyramid.len(), cached);

    // Zooming in far enough needs the root itself.
    let x = Viewport::new(800, 1000.0)?;
    let level = pyramid.get_approximate(required_resolution(&x, &y))?;
    assert_eq!(level.resolution(), pyramid.root_resolution());
    assert_eq!(pyramid.len(), cached);

    Ok(())
}

#[test]
fn row_budgets_meet_in_shared_ancestor() -> Result<()> {
    let mut pyramid = GridPyramid::from_grid(wide_grid()?);

    // Columns are shrunk first while they are reduced by the larger factor.
    let level = pyramid.get_approximate(Resolution::new(800, 4)?)?;
    assert_eq!(level.resolution(), Resolution::new(1024, 4)?);
    assert_eq!(pyramid.len(), 12);
    assert!(pyramid.contains(Resolution::new(65536, 8)?));

    // 1024x8 up to 32768x8 are new, 65536x8 is shared.
    pyramid.get_approximate(Resolution::new(800, 8)?)?;
    assert_eq!(pyramid.len(), 18);

    Ok(())
}

#[test]
fn slot_rebuilds_after_data_changes() -> Result<()> {
    let slot = Mutex::new(PyramidSlot::new());
    let generation = Mutex::new(1.0f32);
    let build = || Grid::filled(4096, 64, *generation.lock().unwrap());
    let min = Resolution::new(100, 10)?;

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let mut slot = slot.lock().unwrap();
                let level = slot.get_or_build(build, min).unwrap();
                assert_eq!(level.resolution(), Resolution::new(128, 16).unwrap());
                assert!(level.values().iter().all(|&v| v == 1.0));
            });
        }
    });

    *generation.lock().unwrap() = 2.0;
    let mut slot = slot.into_inner().unwrap();
    slot.invalidate();
    let level = slot.get_or_build(build, min)?;
    assert!(level.values().iter().all(|&v| v == 2.0));

    Ok(())
}

#[test]
fn sparse_grid_is_filled_before_resampling() -> Result<()> {
    let sparse = Grid::from_fn(8, 2, |column, _| (column % 2 == 0).then_some(4.0f64))?;
    let mut pyramid = Pyramid::from_grid(sparse.fill_missing(0.0));

    let level = pyramid.get(Resolution::new(1, 1)?)?;
    assert_eq!(level.values(), &[2.0]);

    Ok(())
}

#[test]
fn rendered_image_downsamples_to_average_color() -> Result<()> {
    // Left half opaque red, right half fully transparent.
    let rgba: Vec<u8> = (0..64 * 8)
        .flat_map(|i| {
            if i % 64 < 32 {
                [255, 0, 0, 255]
            } else {
                [0, 0, 255, 0]
            }
        })
        .collect();
    let mut pyramid = ImagePyramid::from_image(Image::from_straight_rgba(64, 8, &rgba)?);

    let level = pyramid.get_approximate(Resolution::new(1, 1)?)?;
    let [red, green, blue, alpha] = level.get(0, 0).unwrap().to_straight();
    assert!((127..=128).contains(&alpha));
    assert_eq!((red, green, blue), (255, 0, 0));

    let level = pyramid.get_approximate(Resolution::new(2, 1)?)?;
    assert_eq!(level.to_straight_rgba(), vec![255, 0, 0, 255, 0, 0, 0, 0]);

    Ok(())
}


use std::num::NonZeroUsize;

use anyhow::{Result, bail};
use log::{debug, trace};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::{
    grid::{Grid, resample_grid},
    image::{Image, resample_image},
    resolution::Resolution,
    util::Sample,
};

/// Data that a [`Pyramid`] can hold: it knows its own size and can produce a
/// resampled copy at a smaller size.
pub trait Downsample: Sized {
    #[must_use]
    fn resolution(&self) -> Resolution;

    #[must_use]
    fn downsample(&self, target: Resolution) -> Self;
}

impl<T: Sample> Downsample for Grid<T> {
    fn resolution(&self) -> Resolution {
        Grid::resolution(self)
    }

    fn downsample(&self, target: Resolution) -> Self {
        resample_grid(self, target)
    }
}

impl Downsample for Image {
    fn resolution(&self) -> Resolution {
        Image::resolution(self)
    }

    fn downsample(&self, target: Resolution) -> Self {
        resample_image(self, target)
    }
}

pub type GridPyramid<T = f32> = Pyramid<Grid<T>>;
pub type ImagePyramid = Pyramid<Image>;

/// Memoized set of downsampled copies of one dataset, keyed by exact
/// resolution.
///
/// The root at the native resolution is always present. Every other level is
/// derived from the level one step above it (one axis doubled, capped at the
/// root), computed on first request and kept for the lifetime of the pyramid.
/// When the data changes the whole pyramid is replaced, see
/// [`replace_root`](Self::replace_root) and [`PyramidSlot`].
#[derive(Debug, Clone)]
pub struct Pyramid<D> {
    root: D,
    resolution: Resolution,
    levels: FxHashMap<Resolution, D>,
}

impl<T: Sample> Pyramid<Grid<T>> {
    #[must_use]
    pub fn from_grid(grid: Grid<T>) -> Self {
        Self::new(grid)
    }
}

impl Pyramid<Image> {
    #[must_use]
    pub fn from_image(image: Image) -> Self {
        Self::new(image)
    }
}

impl<D: Downsample> Pyramid<D> {
    /// Seeds a pyramid with `root` at its native resolution.
    #[must_use]
    pub fn new(root: D) -> Self {
        let resolution = root.resolution();
        debug!("creating pyramid with root {resolution}");

        Self {
            root,
            resolution,
            levels: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn root_resolution(&self) -> Resolution {
        self.resolution
    }

    #[must_use]
    pub fn root(&self) -> &D {
        &self.root
    }

    /// Number of materialized levels, including the root.
    #[allow(clippy::len_without_is_empty, reason = "the root is always present")]
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len() + 1
    }

    #[must_use]
    pub fn contains(&self, resolution: Resolution) -> bool {
        resolution == self.resolution || self.levels.contains_key(&resolution)
    }

    /// Materialized resolutions, most cells first. Equal cell counts are
    /// ordered by columns, then rows, descending.
    #[must_use]
    pub fn levels(&self) -> Vec<Resolution> {
        let mut levels: Vec<_> = self.levels.keys().copied().collect();
        levels.push(self.resolution);
        levels.sort_unstable_by(|a, b| b.cells().cmp(&a.cells()).then_with(|| b.cmp(a)));
        levels
    }

    /// Returns the data at the canonical resolution for drawing into at least
    /// `min_resolution` pixels.
    ///
    /// Along each axis the result has `min <= size < 2 * min` cells, unless the
    /// root is already smaller than `min` on that axis, in which case the root
    /// size is used.
    pub fn get_approximate(&mut self, min_resolution: Resolution) -> Result<&D> {
        let target = self.resolution.canonical(min_resolution);
        self.get(target)
    }

    /// Returns the data at exactly `target`, computing any missing levels
    /// between it and the nearest materialized ancestor.
    pub fn get(&mut self, target: Resolution) -> Result<&D> {
        if !target.fits_within(self.resolution) {
            bail!(
                "requested resolution {} exceeds the pyramid root {}",
                target,
                self.resolution
            );
        }
        if target == self.resolution {
            return Ok(&self.root);
        }

        if self.levels.contains_key(&target) {
            trace!("pyramid hit at {target}");
        } else {
            self.materialize(target);
        }

        Ok(&self.levels[&target])
    }

    /// Discards the whole pyramid and starts over from a new root.
    pub fn replace_root(&mut self, root: D) {
        debug!("replacing pyramid root, discarding {} levels", self.len());
        *self = Self::new(root);
    }

    /// The resolution `target` is derived from in one step.
    ///
    /// Doubles one axis, capped at the root. An axis already at the root size
    /// is never doubled. When both axes are reduced, the one reduced by the
    /// larger factor is doubled, ties going to the rows, so the longer
    /// dimension is shrunk first on the way down from the root.
    ///
    /// # Panics
    /// If `target` does not fit within the root.
    #[must_use]
    pub(crate) fn parent_of(&self, target: Resolution) -> Resolution {
        let root = self.resolution;
        assert!(
            target.fits_within(root),
            "{target} has no parent below the pyramid root {root}"
        );
        let double = |value: NonZeroUsize, cap: NonZeroUsize| value.saturating_add(value.get()).min(cap);

        let columns_reduced = target.columns < root.columns;
        let rows_reduced = target.rows < root.rows;
        let double_columns = match (columns_reduced, rows_reduced) {
            (true, false) => true,
            (false, _) => false,
            // root.columns / target.columns > root.rows / target.rows
            (true, true) => {
                (root.columns.get() as u128) * (target.rows.get() as u128)
                    > (root.rows.get() as u128) * (target.columns.get() as u128)
            }
        };

        if double_columns {
            Resolution::from_non_zero(double(target.columns, root.columns), target.rows)
        } else {
            Resolution::from_non_zero(target.columns, double(target.rows, root.rows))
        }
    }

    /// Computes and stores `target` and every missing level between it and its
    /// nearest materialized ancestor.
    fn materialize(&mut self, target: Resolution) {
        // Every step moves strictly closer to the root, which always matches.
        let mut chain: SmallVec<[Resolution; 32]> = SmallVec::new();
        let mut current = target;
        let ancestor = loop {
            if current == self.resolution {
                break &self.root;
            }
            if let Some(level) = self.levels.get(&current) {
                break level;
            }
            chain.push(current);
            current = self.parent_of(current);
        };

        let mut computed: SmallVec<[(Resolution, D); 8]> = SmallVec::with_capacity(chain.len());
        for &resolution in chain.iter().rev() {
            let (parent, level) = match computed.last() {
                Some((parent, previous)) => (*parent, previous.downsample(resolution)),
                None => (current, ancestor.downsample(resolution)),
            };
            debug!("materializing pyramid level {resolution} from {parent}");
            computed.push((resolution, level));
        }

        self.levels.extend(computed);
    }
}

/// Holder for a pyramid that is rebuilt lazily after its source changes.
///
/// [`invalidate`](Self::invalidate) drops the whole pyramid; the next
/// [`get_or_build`](Self::get_or_build) builds a fresh root and starts over.
#[derive(Debug, Clone)]
pub struct PyramidSlot<D> {
    pyramid: Option<Pyramid<D>>,
}

impl<D> Default for PyramidSlot<D> {
    fn default() -> Self {
        Self { pyramid: None }
    }
}

impl<D: Downsample> PyramidSlot<D> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_built(&self) -> bool {
        self.pyramid.is_some()
    }

    #[must_use]
    pub fn pyramid(&self) -> Option<&Pyramid<D>> {
        self.pyramid.as_ref()
    }

    pub fn invalidate(&mut self) {
        if self.pyramid.take().is_some() {
            debug!("pyramid invalidated");
        }
    }

    /// Returns data for `min_resolution` as in [`Pyramid::get_approximate`],
    /// calling `build` for a new root first if the slot is empty.
    pub fn get_or_build<F>(&mut self, build: F, min_resolution: Resolution) -> Result<&D>
    where
        F: FnOnce() -> Result<D>,
    {
        let pyramid = match self.pyramid.take() {
            Some(pyramid) => pyramid,
            None => Pyramid::new(build()?),
        };
        self.pyramid.insert(pyramid).get_approximate(min_resolution)
    }
}

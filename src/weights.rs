
use std::num::NonZeroUsize;

/// Weighted mapping from an axis of `n_old` cells onto an axis of `n_new` cells.
///
/// Entry `k` says that source cell `from[k]` covers `weight[k]` of destination
/// cell `to[k]`. The weights of each destination cell sum to 1, and both index
/// sequences are non-decreasing.
#[derive(Debug, Clone, PartialEq)]
pub struct ResamplingPlan {
    n_old: NonZeroUsize,
    n_new: NonZeroUsize,
    from: Vec<usize>,
    to: Vec<usize>,
    weight: Vec<f64>,
}

impl ResamplingPlan {
    #[must_use]
    pub fn n_old(&self) -> NonZeroUsize {
        self.n_old
    }

    #[must_use]
    pub fn n_new(&self) -> NonZeroUsize {
        self.n_new
    }

    #[must_use]
    pub fn from_indices(&self) -> &[usize] {
        &self.from
    }

    #[must_use]
    pub fn to_indices(&self) -> &[usize] {
        &self.to
    }

    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weight
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.weight.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weight.is_empty()
    }

    /// Iterates over `(from, to, weight)` triples in sweep order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (usize, usize, f64)> + Clone + '_ {
        self.from
            .iter()
            .zip(&self.to)
            .zip(&self.weight)
            .map(|((&from, &to), &weight)| (from, to, weight))
    }

    /// Total weight received by every destination cell.
    #[must_use]
    pub fn destination_weight_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.n_new.get()];
        for (_, to, weight) in self.iter() {
            sums[to] += weight;
        }
        sums
    }
}

/// Computes how much each of `n_old` source cells contributes to each of
/// `n_new` destination cells when an axis is shrunk.
///
/// Both axes are laid over the same interval, and a cursor sweeps it from
/// boundary to boundary, emitting one entry per piece between consecutive
/// source or destination cell boundaries. Positions are kept as exact integers
/// in units of `1 / n_old` of a destination cell, so boundaries that coincide
/// are detected without floating point error and no zero-width pieces are
/// emitted. The plan has at most `n_old + n_new - 1` entries.
///
/// Only `n_new <= n_old` is meaningful for a downsampling pyramid; larger
/// targets still produce a valid coverage plan.
#[must_use]
pub fn compute_weights(n_old: NonZeroUsize, n_new: NonZeroUsize) -> ResamplingPlan {
    let old = n_old.get() as u128;
    let new = n_new.get() as u128;
    let capacity = n_old.get() + n_new.get() - 1;
    let mut from = Vec::with_capacity(capacity);
    let mut to = Vec::with_capacity(capacity);
    let mut weight = Vec::with_capacity(capacity);

    // Source boundary `i + 1` sits at `(i + 1) * new`, destination boundary
    // `j + 1` sits at `(j + 1) * old`. Both axes end at `old * new`.
    let denominator = old as f64;
    let mut cursor = 0u128;
    let mut i = 0usize;
    let mut j = 0usize;
    while i < n_old.get() && j < n_new.get() {
        let next_old = (i as u128 + 1) * new;
        let next_new = (j as u128 + 1) * old;
        let end = next_old.min(next_new);

        from.push(i);
        to.push(j);
        weight.push((end - cursor) as f64 / denominator);
        cursor = end;

        if next_old == end {
            i += 1;
        }
        if next_new == end {
            j += 1;
        }
    }

    ResamplingPlan {
        n_old,
        n_new,
        from,
        to,
        weight,
    }
}

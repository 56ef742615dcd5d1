//! Parallel distance fan-out and k-selection
//!
//! Per fitting frame the engine runs two phases: a parallel phase that fills
//! a distance row (one slot per reference frame, disjoint writes, no locks),
//! and a single-threaded phase that partially orders the row and extracts
//! the ranked neighbor list. The parallel iterator joins before
//! `distance_row` returns, so selection always reads a finished, immutable
//! row — which is what keeps the output independent of worker scheduling.

use std::cmp::Ordering;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

use crate::dataset::FrameSet;
use crate::metric::Metric;

/// One ranked neighbor: a reference-frame index and its distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub distance: f64,
}

/// Number of neighbors actually reported per frame.
///
/// Clamped so a full list can be produced even for tiny reference sets:
/// `min(requested, reference_count - 1)`.
pub fn effective_k(requested: usize, reference_count: usize) -> usize {
    requested.min(reference_count.saturating_sub(1))
}

/// Brute-force searcher owning the worker pool and the distance metric.
pub struct KnnSearcher<M: Metric> {
    pool: ThreadPool,
    metric: M,
}

impl<M: Metric> KnnSearcher<M> {
    /// Build a searcher with a bounded pool of `threads` workers.
    ///
    /// A thread count of 0 lets rayon size the pool from the machine.
    pub fn new(metric: M, threads: usize) -> Result<Self, ThreadPoolBuildError> {
        let pool = ThreadPoolBuilder::new().num_threads(threads).build()?;
        Ok(Self { pool, metric })
    }

    /// Fill `row` with the distance from `query` to every reference frame.
    ///
    /// Each slot is written by exactly one worker and the call returns only
    /// after every worker has finished, so the row is complete on exit.
    pub fn distance_row(&self, query: &[f64], reference: &FrameSet, row: &mut Vec<f64>) {
        row.resize(reference.len(), 0.0);
        let metric = &self.metric;
        self.pool.install(|| {
            row.par_iter_mut().enumerate().for_each(|(i, slot)| {
                *slot = metric.distance(query, reference.get(i));
            });
        });
    }

    /// Compute the ranked neighbor list for one fitting frame.
    ///
    /// `row` is a scratch buffer reused across frames; its previous contents
    /// are fully overwritten.
    pub fn nearest(
        &self,
        query: &[f64],
        reference: &FrameSet,
        row: &mut Vec<f64>,
        k: usize,
    ) -> Vec<Neighbor> {
        self.distance_row(query, reference, row);
        select_nearest(row, k)
    }
}

/// Rank the `k + 1` smallest distances in `row` and drop the single closest.
///
/// The returned list holds the 2nd through (k+1)-th nearest reference
/// indices, ascending by distance. Discarding rank 0 is unconditional: in a
/// self-comparison run it is the query's own frame (distance 0), with a
/// distinct fitting set it is simply the true nearest neighbor. Downstream
/// consumers rely on this fixed width and meaning.
///
/// Ties are broken by reference index, so the result is deterministic for a
/// given row regardless of how many workers produced it. Requires
/// `k < row.len()`.
pub fn select_nearest(row: &[f64], k: usize) -> Vec<Neighbor> {
    debug_assert!(k < row.len(), "k + 1 ranks need k + 1 reference frames");

    let k1 = k + 1;
    let mut order: Vec<usize> = (0..row.len()).collect();
    let by_distance = |a: &usize, b: &usize| -> Ordering {
        row[*a]
            .partial_cmp(&row[*b])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(b))
    };

    // Partial order statistics: pivot the k+1 smallest to the front, then
    // sort only that window.
    if k1 < order.len() {
        order.select_nth_unstable_by(k1 - 1, by_distance);
        order.truncate(k1);
    }
    order.sort_unstable_by(by_distance);

    order[1..k1]
        .iter()
        .map(|&index| Neighbor {
            index,
            distance: row[index],
        })
        .collect()
}

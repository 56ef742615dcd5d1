//! knn-data — brute-force k-nearest-neighbor batch engine
//!
//! For every frame in a fitting set, computes the distance to every frame in
//! a reference set, ranks the k+1 smallest, drops the single closest match,
//! and appends the surviving distances and reference indices to two flat
//! binary output files.
//!
//! # Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  FrameSet loader (mmap, raw f64 records)                │
//! ├─────────────────────────────────────────────────────────┤
//! │  Distance fan-out (rayon pool) → barrier → k-selection  │
//! ├─────────────────────────────────────────────────────────┤
//! │  NeighborWriter (fixed-width distance + index records)  │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod dataset;
pub mod engine;
pub mod knn;
pub mod metric;
pub mod output;
pub mod progress;

pub use dataset::{FrameSet, FrameWriter};
pub use engine::{run, RunConfig, RunSummary};
pub use knn::{effective_k, select_nearest, KnnSearcher, Neighbor};
pub use metric::{l2_distance, l2_distance_squared, Euclidean, Metric};
pub use output::NeighborWriter;

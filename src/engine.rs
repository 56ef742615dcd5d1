//! Batch orchestration: load, compute, write
//!
//! The run is strictly linear: both frame sets are loaded before any output
//! file is created, then each fitting frame is processed in order — parallel
//! distance row, join barrier, single-threaded selection and append. There
//! is no cross-frame parallelism, no carried state between frames, and no
//! retry logic. A failure during loading aborts before anything is written;
//! a failure inside the loop aborts immediately, leaving the outputs
//! truncated at whatever was already flushed.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::dataset::{DatasetError, FrameSet};
use crate::knn::{self, KnnSearcher};
use crate::metric::Euclidean;
use crate::output::{NeighborWriter, OutputError};
use crate::progress::ProgressMeter;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to load {}: {source}", path.display())]
    Load {
        path: PathBuf,
        source: DatasetError,
    },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Everything one batch run needs, as resolved by the CLI.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Worker pool size (0 lets rayon decide).
    pub threads: usize,
    /// Requested neighbors per frame, clamped to the reference count.
    pub knn: usize,
    /// Doubles per frame in both input files.
    pub vector_size: usize,
    pub reference_file: PathBuf,
    /// Defaults to the reference file (self-comparison mode).
    pub fit_file: Option<PathBuf>,
    pub distance_file: PathBuf,
    pub index_file: PathBuf,
}

impl RunConfig {
    pub fn fit_path(&self) -> &Path {
        self.fit_file.as_deref().unwrap_or(&self.reference_file)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Fitting frames processed (records appended per output file).
    pub frames: usize,
    /// Neighbors per record after clamping.
    pub effective_k: usize,
}

/// Execute one batch run end to end.
pub fn run(config: &RunConfig) -> Result<RunSummary, EngineError> {
    let reference = load(&config.reference_file, config.vector_size)?;
    info!(
        "loaded {} reference frames of dimension {} from {}",
        reference.len(),
        reference.dim(),
        config.reference_file.display()
    );

    let fitting = load(config.fit_path(), config.vector_size)?;
    info!(
        "loaded {} fitting frames from {}",
        fitting.len(),
        config.fit_path().display()
    );

    let effective_k = knn::effective_k(config.knn, reference.len());
    if effective_k < config.knn {
        warn!(
            "clamped k from {} to {} ({} reference frames available)",
            config.knn,
            effective_k,
            reference.len()
        );
    }

    let searcher = KnnSearcher::new(Euclidean, config.threads)?;
    let mut writer = NeighborWriter::create(&config.distance_file, &config.index_file)?;

    let mut row = Vec::with_capacity(reference.len());
    let mut progress = ProgressMeter::new(fitting.len());

    for (frame, query) in fitting.iter().enumerate() {
        let neighbors = searcher.nearest(query, &reference, &mut row, effective_k);
        writer.write_record(&neighbors)?;
        progress.tick(frame + 1);
    }

    writer.finish()?;

    Ok(RunSummary {
        frames: fitting.len(),
        effective_k,
    })
}

fn load(path: &Path, dim: usize) -> Result<FrameSet, EngineError> {
    FrameSet::open(path, dim).map_err(|source| EngineError::Load {
        path: path.to_path_buf(),
        source,
    })
}

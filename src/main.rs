//! knn_data CLI
//!
//! Computes the k nearest neighbors of all pairs of vectors in the given
//! binary data files.
//!
//! # Usage
//!
//! ```bash
//! # Self-comparison over one dataset
//! knn_data -k 10 -s 384 -r reference.pts
//!
//! # Separate fitting set, explicit outputs
//! knn_data -k 10 -s 384 -r reference.pts -f fitting.pts \
//!          -d distances.dat -i indices.dat
//! ```

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use knn_data::engine::{self, RunConfig};

#[derive(Parser)]
#[command(name = "knn_data")]
#[command(about = "Computes the k nearest neighbors of all pairs of vectors in the given binary data files")]
#[command(version)]
struct Cli {
    /// Number of worker threads
    #[arg(short, long, default_value_t = 2)]
    threads: usize,

    /// K-nearest neighbors to report per frame
    #[arg(short, long)]
    knn: NonZeroUsize,

    /// Data vector length (doubles per frame)
    #[arg(short, long)]
    size: NonZeroUsize,

    /// Reference data file
    #[arg(short, long, default_value = "reference.pts")]
    reference_file: PathBuf,

    /// Fitting data file (defaults to the reference file)
    #[arg(short, long)]
    fit_file: Option<PathBuf>,

    /// Output distances file
    #[arg(short, long, default_value = "distances.dat")]
    distance_file: PathBuf,

    /// Output indices file
    #[arg(short, long, default_value = "indices.dat")]
    index_file: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = RunConfig {
        threads: cli.threads,
        knn: cli.knn.get(),
        vector_size: cli.size.get(),
        reference_file: cli.reference_file,
        fit_file: cli.fit_file,
        distance_file: cli.distance_file,
        index_file: cli.index_file,
    };

    tracing::info!(
        "knn_data: k={}, size={}, threads={}, reference={}, fitting={}",
        config.knn,
        config.vector_size,
        config.threads,
        config.reference_file.display(),
        config.fit_path().display(),
    );

    let summary = engine::run(&config)?;

    tracing::info!(
        "done: {} frames, {} neighbors per frame",
        summary.frames,
        summary.effective_k
    );
    Ok(())
}

//! Fixed-width binary neighbor records
//!
//! One record pair is appended per processed fitting frame:
//!
//! ```text
//! distance file:  effective_k × 8 bytes   (f64, native order, ascending)
//! index file:     effective_k × 4 bytes   (i32, native order, same rank order)
//! ```
//!
//! There is no per-record header, length prefix, or delimiter; stream
//! position alone encodes which fitting frame a record belongs to. Indices
//! are written as 32-bit native-order integers, the original tool's C `int`
//! width.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::knn::Neighbor;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("reference index {0} exceeds the 32-bit index record width")]
    IndexOverflow(usize),
}

/// Appends ranked neighbor lists to the two output streams.
pub struct NeighborWriter {
    distances: BufWriter<File>,
    indices: BufWriter<File>,
}

impl NeighborWriter {
    /// Create (or truncate) both output files.
    pub fn create<P: AsRef<Path>>(
        distance_path: P,
        index_path: P,
    ) -> Result<Self, OutputError> {
        let distances = BufWriter::new(File::create(distance_path)?);
        let indices = BufWriter::new(File::create(index_path)?);
        Ok(Self { distances, indices })
    }

    /// Append one frame's record pair.
    ///
    /// The caller supplies neighbors already ranked ascending; distances and
    /// indices land at the same rank position in their respective files.
    pub fn write_record(&mut self, neighbors: &[Neighbor]) -> Result<(), OutputError> {
        for neighbor in neighbors {
            self.distances.write_all(&neighbor.distance.to_ne_bytes())?;
        }
        for neighbor in neighbors {
            let index = i32::try_from(neighbor.index)
                .map_err(|_| OutputError::IndexOverflow(neighbor.index))?;
            self.indices.write_all(&index.to_ne_bytes())?;
        }
        Ok(())
    }

    /// Flush and sync both streams so every appended record is durable.
    pub fn finish(mut self) -> Result<(), OutputError> {
        self.distances.flush()?;
        self.indices.flush()?;
        self.distances.get_ref().sync_all()?;
        self.indices.get_ref().sync_all()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_record_layout() {
        let dir = tempdir().unwrap();
        let d_path = dir.path().join("distances.dat");
        let i_path = dir.path().join("indices.dat");

        let mut writer = NeighborWriter::create(&d_path, &i_path).unwrap();
        writer
            .write_record(&[
                Neighbor {
                    index: 3,
                    distance: 1.0,
                },
                Neighbor {
                    index: 1,
                    distance: 2.5,
                },
            ])
            .unwrap();
        writer
            .write_record(&[
                Neighbor {
                    index: 0,
                    distance: 0.5,
                },
                Neighbor {
                    index: 2,
                    distance: 0.75,
                },
            ])
            .unwrap();
        writer.finish().unwrap();

        let d_bytes = std::fs::read(&d_path).unwrap();
        let i_bytes = std::fs::read(&i_path).unwrap();

        // Two records of width 2, no headers or delimiters.
        assert_eq!(d_bytes.len(), 2 * 2 * 8);
        assert_eq!(i_bytes.len(), 2 * 2 * 4);

        assert_eq!(&d_bytes[0..8], &1.0f64.to_ne_bytes());
        assert_eq!(&d_bytes[8..16], &2.5f64.to_ne_bytes());
        assert_eq!(&d_bytes[16..24], &0.5f64.to_ne_bytes());

        assert_eq!(&i_bytes[0..4], &3i32.to_ne_bytes());
        assert_eq!(&i_bytes[4..8], &1i32.to_ne_bytes());
        assert_eq!(&i_bytes[8..12], &0i32.to_ne_bytes());
        assert_eq!(&i_bytes[12..16], &2i32.to_ne_bytes());
    }

    #[test]
    fn test_empty_record_writes_nothing() {
        let dir = tempdir().unwrap();
        let d_path = dir.path().join("distances.dat");
        let i_path = dir.path().join("indices.dat");

        let mut writer = NeighborWriter::create(&d_path, &i_path).unwrap();
        writer.write_record(&[]).unwrap();
        writer.finish().unwrap();

        assert_eq!(std::fs::read(&d_path).unwrap().len(), 0);
        assert_eq!(std::fs::read(&i_path).unwrap().len(), 0);
    }

    #[test]
    fn test_index_overflow() {
        let dir = tempdir().unwrap();
        let mut writer = NeighborWriter::create(
            dir.path().join("d.dat"),
            dir.path().join("i.dat"),
        )
        .unwrap();

        let result = writer.write_record(&[Neighbor {
            index: i32::MAX as usize + 1,
            distance: 1.0,
        }]);

        assert!(matches!(result, Err(OutputError::IndexOverflow(_))));
    }
}

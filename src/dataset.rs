//! Raw `.pts` dataset files
//!
//! A dataset file is a headerless concatenation of fixed-width records, one
//! per frame:
//!
//! ```text
//! Offset        Size    Type     Description
//! ────────────────────────────────────────────────────
//! 0             D*8     [f64]    Frame 0 coordinates
//! D*8           D*8     [f64]    Frame 1 coordinates
//! ...
//! ```
//!
//! Values are IEEE-754 double-precision floats in the platform's native byte
//! order — the format is effectively a raw memory dump. There is no magic,
//! record count, or delimiter; the dimension `D` must be supplied out of
//! band. A file whose byte length is not a multiple of `D * 8` carries a
//! trailing partial record and is rejected as malformed.
//!
//! # Safety
//!
//! `FrameSet` memory-maps the file and uses `bytemuck::try_cast_slice` to
//! convert `&[u8]` to `&[f64]` with alignment checks, so frame access is
//! zero-copy without unaligned reads.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use memmap2::Mmap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("vector size must be positive")]
    ZeroDimension,

    #[error("dataset file is empty")]
    Empty,

    #[error("file length {len} is not a multiple of the record width ({record} bytes)")]
    TrailingPartialRecord { len: u64, record: usize },

    #[error("frame index out of bounds: {index} >= {count}")]
    IndexOutOfBounds { index: usize, count: usize },

    #[error("byte slice not aligned to f64 (8 bytes)")]
    Alignment,

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Memory-mapped, read-only set of fixed-dimension frames.
///
/// The set is loaded once and immutable for the run; the frame index is the
/// neighbor identity used everywhere downstream.
pub struct FrameSet {
    mmap: Mmap,
    count: usize,
    dim: usize,
}

impl FrameSet {
    /// Map a raw dataset file of `dim`-sized f64 records.
    ///
    /// Fails if the file cannot be opened, is empty, or its length is not a
    /// multiple of one record width. Trailing bytes shorter than a full
    /// record are never interpreted as a partial frame.
    pub fn open<P: AsRef<Path>>(path: P, dim: usize) -> Result<Self, DatasetError> {
        if dim == 0 {
            return Err(DatasetError::ZeroDimension);
        }

        let file = File::open(path)?;
        let len = file.metadata()?.len();
        let record = dim * std::mem::size_of::<f64>();

        if len == 0 {
            return Err(DatasetError::Empty);
        }
        if len % record as u64 != 0 {
            return Err(DatasetError::TrailingPartialRecord { len, record });
        }

        let mmap = unsafe { Mmap::map(&file)? };

        Ok(Self {
            mmap,
            count: (len / record as u64) as usize,
            dim,
        })
    }

    /// Number of frames in the set.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Dimension of each frame.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Get a frame by index with zero-copy access.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds. Use `try_get` for a
    /// non-panicking version.
    #[inline]
    pub fn get(&self, index: usize) -> &[f64] {
        self.try_get(index).expect("frame access failed")
    }

    /// Try to get a frame by index.
    pub fn try_get(&self, index: usize) -> Result<&[f64], DatasetError> {
        if index >= self.count {
            return Err(DatasetError::IndexOutOfBounds {
                index,
                count: self.count,
            });
        }

        let start = index * self.dim * std::mem::size_of::<f64>();
        let end = start + self.dim * std::mem::size_of::<f64>();
        let bytes = &self.mmap[start..end];

        // mmap bases are page-aligned, so this only fails on a broken record
        // geometry rather than in normal operation.
        bytemuck::try_cast_slice(bytes).map_err(|_| DatasetError::Alignment)
    }

    /// Total bytes mapped for this set.
    pub fn memory_bytes(&self) -> usize {
        self.mmap.len()
    }

    /// Iterate over all frames in index order.
    pub fn iter(&self) -> FrameIter<'_> {
        FrameIter {
            set: self,
            index: 0,
        }
    }
}

/// Iterator over the frames of a [`FrameSet`].
pub struct FrameIter<'a> {
    set: &'a FrameSet,
    index: usize,
}

impl<'a> Iterator for FrameIter<'a> {
    type Item = &'a [f64];

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.set.count {
            return None;
        }
        let frame = self.set.get(self.index);
        self.index += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.set.count - self.index;
        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for FrameIter<'a> {}

/// Writer for creating raw dataset files.
pub struct FrameWriter {
    writer: BufWriter<File>,
    dim: usize,
    count: usize,
}

impl FrameWriter {
    /// Create (or truncate) a raw dataset file for `dim`-sized frames.
    pub fn create<P: AsRef<Path>>(path: P, dim: usize) -> Result<Self, DatasetError> {
        if dim == 0 {
            return Err(DatasetError::ZeroDimension);
        }
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            dim,
            count: 0,
        })
    }

    /// Append one frame, native byte order.
    pub fn write_frame(&mut self, frame: &[f64]) -> Result<(), DatasetError> {
        if frame.len() != self.dim {
            return Err(DatasetError::DimensionMismatch {
                expected: self.dim,
                actual: frame.len(),
            });
        }

        for &value in frame {
            self.writer.write_all(&value.to_ne_bytes())?;
        }

        self.count += 1;
        Ok(())
    }

    /// Flush and sync the file, returning the number of frames written.
    pub fn finish(mut self) -> Result<usize, DatasetError> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        Ok(self.count)
    }
}

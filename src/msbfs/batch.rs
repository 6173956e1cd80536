//! The sources of one traversal batch.

use core::fmt;

use super::OMEGA;
use crate::error::{MsBfsError, Result};

/// Up to [`OMEGA`] source nodes traversed together. Source `i` owns bit `i` of
/// every bitmask of the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceBatch {
    /// An explicit ascending list of node ids.
    Explicit(Vec<usize>),
    /// The contiguous ids `[offset, offset + len)`.
    Range {
        /// First source id.
        offset: usize,
        /// Number of sources.
        len: usize,
    },
}

impl SourceBatch {
    /// Creates an explicit batch.
    ///
    /// Fails if there are more than [`OMEGA`] sources or they are not sorted ascending.
    pub fn explicit(sources: Vec<usize>) -> Result<Self> {
        check_width(sources.len())?;
        if let Some(w) = sources.windows(2).find(|w| w[0] > w[1]) {
            return Err(MsBfsError::UnsortedSources {
                previous: w[0],
                next: w[1],
            });
        }
        Ok(Self::Explicit(sources))
    }

    /// Creates a batch over the contiguous ids `[offset, offset + len)`.
    pub fn range(offset: usize, len: usize) -> Result<Self> {
        check_width(len)?;
        Ok(Self::Range { offset, len })
    }

    /// Number of sources.
    pub fn len(&self) -> usize {
        match self {
            Self::Explicit(sources) => sources.len(),
            Self::Range { len, .. } => *len,
        }
    }

    /// Returns `true` if the batch has no sources.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The source id owning bit `bit`.
    #[inline]
    pub fn source_at(&self, bit: usize) -> usize {
        debug_assert!(bit < self.len());
        match self {
            Self::Explicit(sources) => sources[bit],
            Self::Range { offset, .. } => offset + bit,
        }
    }

    /// The source ids in bit order.
    pub fn sources(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).map(move |bit| self.source_at(bit))
    }

    /// Fails with [`MsBfsError::SourceOutOfBounds`] unless every source is below `node_count`.
    pub fn check_bounds(&self, node_count: usize) -> Result<()> {
        match self.sources().find(|&node| node >= node_count) {
            Some(node) => Err(MsBfsError::SourceOutOfBounds { node, node_count }),
            None => Ok(()),
        }
    }
}

fn check_width(count: usize) -> Result<()> {
    if count > OMEGA {
        return Err(MsBfsError::TooManySources { count, max: OMEGA });
    }
    Ok(())
}

impl fmt::Display for SourceBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(sources) => write_sources(f, sources),
            Self::Range { offset, len } => write_range(f, *offset, *len),
        }
    }
}

/// Writes `MSBFS{first .. last+1 (count)}` for sorted `sources`, `MSBFS{}` if empty.
pub(super) fn write_sources(f: &mut fmt::Formatter<'_>, sources: &[usize]) -> fmt::Result {
    match (sources.first(), sources.last()) {
        (Some(&first), Some(&last)) => write_span(f, first, last + 1, sources.len()),
        _ => f.write_str("MSBFS{}"),
    }
}

/// Writes `MSBFS{offset .. offset+len (len)}`.
pub(super) fn write_range(f: &mut fmt::Formatter<'_>, offset: usize, len: usize) -> fmt::Result {
    write_span(f, offset, offset + len, len)
}

fn write_span(f: &mut fmt::Formatter<'_>, start: usize, end: usize, count: usize) -> fmt::Result {
    write!(f, "MSBFS{{{start} .. {end} ({count})}}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_batches_are_validated() {
        assert!(matches!(
            SourceBatch::explicit(vec![3, 1]),
            Err(MsBfsError::UnsortedSources { previous: 3, next: 1 })
        ));
        assert!(matches!(
            SourceBatch::explicit((0..65).collect()),
            Err(MsBfsError::TooManySources { count: 65, max: 64 })
        ));
        assert!(matches!(
            SourceBatch::range(0, 65),
            Err(MsBfsError::TooManySources { .. })
        ));
    }

    #[test]
    fn bits_map_to_sources() {
        let batch = SourceBatch::explicit(vec![2, 7, 9]).unwrap();
        assert_eq!(batch.source_at(1), 7);
        assert_eq!(batch.to_string(), "MSBFS{2 .. 10 (3)}");

        let batch = SourceBatch::range(64, 64).unwrap();
        assert_eq!(batch.source_at(63), 127);
        assert_eq!(batch.to_string(), "MSBFS{64 .. 128 (64)}");
        assert_eq!(SourceBatch::explicit(Vec::new()).unwrap().to_string(), "MSBFS{}");
    }

    #[test]
    fn bounds_are_checked() {
        let batch = SourceBatch::explicit(vec![1, 5]).unwrap();
        assert!(batch.check_bounds(6).is_ok());
        assert!(matches!(
            batch.check_bounds(5),
            Err(MsBfsError::SourceOutOfBounds { node: 5, node_count: 5 })
        ));
    }
}

//! Lazy decoding of a source bitmask.

use super::batch::SourceBatch;

/// The sources that reached a node, decoded from a bitmask on demand.
///
/// Callbacks receive a `&mut SourceNodes` that is only valid for the duration of
/// the call; the engine re-arms the same cursor for the next node.
#[derive(Debug)]
pub struct SourceNodes<'a> {
    batch: &'a SourceBatch,
    mask: u64,
    size: usize,
}

impl<'a> SourceNodes<'a> {
    /// Creates an exhausted cursor over `batch`.
    pub fn new(batch: &'a SourceBatch) -> Self {
        Self {
            batch,
            mask: 0,
            size: 0,
        }
    }

    /// Re-arms the cursor with the sources of `mask`.
    ///
    /// # Panics
    ///
    /// Panics if `mask` is zero.
    #[inline]
    pub fn reset(&mut self, mask: u64) {
        assert!(mask != 0, "a source mask must have at least one bit set");
        self.mask = mask;
        self.size = mask.count_ones() as usize;
    }

    /// Returns `true` while undecoded sources remain.
    #[inline]
    pub fn has_next(&self) -> bool {
        self.mask != 0
    }

    /// Number of sources in the mask given to the last [`reset`](Self::reset),
    /// regardless of how many were already decoded.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }
}

impl Iterator for SourceNodes<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.mask == 0 {
            return None;
        }
        let bit = self.mask.trailing_zeros() as usize;
        self.mask &= self.mask - 1;
        Some(self.batch.source_at(bit))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.mask.count_ones() as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SourceNodes<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_explicit_sources_in_bit_order() {
        let batch = SourceBatch::explicit(vec![10, 20, 30, 40]).unwrap();
        let mut sources = SourceNodes::new(&batch);
        assert!(!sources.has_next());

        sources.reset(0b1010);
        assert_eq!(sources.size(), 2);
        assert_eq!(sources.len(), 2);
        assert_eq!(sources.next(), Some(20));
        assert_eq!(sources.size(), 2);
        assert_eq!(sources.next(), Some(40));
        assert!(!sources.has_next());
        assert_eq!(sources.next(), None);
    }

    #[test]
    fn decodes_range_sources_with_offset() {
        let batch = SourceBatch::range(128, 64).unwrap();
        let mut sources = SourceNodes::new(&batch);
        sources.reset(1 | (1 << 63));
        assert_eq!(sources.by_ref().collect::<Vec<_>>(), vec![128, 191]);
    }

    #[test]
    #[should_panic(expected = "at least one bit")]
    fn zero_mask_panics() {
        let batch = SourceBatch::range(0, 1).unwrap();
        SourceNodes::new(&batch).reset(0);
    }
}

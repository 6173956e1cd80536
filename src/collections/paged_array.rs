//! A fixed-length array of `u64` bitmasks stored in pages.
//!
//! Goals:
//! - predictable allocation behavior for billions of entries (no single huge allocation)
//! - good cache locality within each page
//! - bulk operations (`fill`, `copy_from`, `or_assign`) that run page by page
//!
//! Every per-node state array of the traversal engine (`visit`, `visit_next`, `seen`,
//! `seen_next`) is one of these.

use core::mem;

/// log2 of the number of words per page (16 Ki words, 128 KiB).
pub const PAGE_SHIFT: u32 = 14;
/// Number of words per page.
pub const PAGE_SIZE: usize = 1 << PAGE_SHIFT;
const PAGE_MASK: usize = PAGE_SIZE - 1;

/// A fixed-length, zero-initialized array of `u64` words backed by fixed-size pages.
///
/// ### Performance Characteristics
/// | Operation | Complexity | Notes |
/// |-----------|------------|-------|
/// | `new` | \(O(n)\) | Allocates and zeroes every page |
/// | `get` / `set` / `or` | \(O(1)\) | Shift + mask page lookup |
/// | `fill` / `copy_from` / `or_assign` | \(O(n)\) | Page-wise slice operations |
#[derive(Clone)]
pub struct PagedBitmaskArray {
    pages: Vec<Box<[u64]>>,
    len: usize,
}

impl PagedBitmaskArray {
    /// Creates an array of `len` zeroed words.
    pub fn new(len: usize) -> Self {
        let page_count = len.div_ceil(PAGE_SIZE);
        let mut pages = Vec::with_capacity(page_count);
        for page in 0..page_count {
            let page_len = if page + 1 == page_count {
                len - page * PAGE_SIZE
            } else {
                PAGE_SIZE
            };
            pages.push(vec![0u64; page_len].into_boxed_slice());
        }
        Self { pages, len }
    }

    /// Number of bytes an array of `len` words occupies, including page bookkeeping.
    pub fn memory_estimation(len: usize) -> usize {
        let page_count = len.div_ceil(PAGE_SIZE);
        mem::size_of::<Self>()
            + page_count * mem::size_of::<Box<[u64]>>()
            + len * mem::size_of::<u64>()
    }

    /// Number of words.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the array holds no words.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the word at `index`.
    ///
    /// # Panics
    /// Panics if `index >= len()`.
    #[inline(always)]
    pub fn get(&self, index: usize) -> u64 {
        let (page, offset) = index_split(index);
        self.pages[page][offset]
    }

    /// Overwrites the word at `index`.
    ///
    /// # Panics
    /// Panics if `index >= len()`.
    #[inline(always)]
    pub fn set(&mut self, index: usize, value: u64) {
        let (page, offset) = index_split(index);
        self.pages[page][offset] = value;
    }

    /// ORs `value` into the word at `index` and returns the updated word.
    #[inline(always)]
    pub fn or(&mut self, index: usize, value: u64) -> u64 {
        let (page, offset) = index_split(index);
        let slot = &mut self.pages[page][offset];
        *slot |= value;
        *slot
    }

    /// Sets every word to `value`.
    pub fn fill(&mut self, value: u64) {
        for page in &mut self.pages {
            page.fill(value);
        }
    }

    /// Copies every word of `other` into `self`.
    ///
    /// # Panics
    /// Panics if the lengths differ.
    pub fn copy_from(&mut self, other: &Self) {
        assert_eq!(self.len, other.len, "paged arrays must have equal length");
        for (dst, src) in self.pages.iter_mut().zip(&other.pages) {
            dst.copy_from_slice(src);
        }
    }

    /// ORs every word of `other` into the matching word of `self`.
    ///
    /// # Panics
    /// Panics if the lengths differ.
    pub fn or_assign(&mut self, other: &Self) {
        assert_eq!(self.len, other.len, "paged arrays must have equal length");
        for (dst, src) in self.pages.iter_mut().zip(&other.pages) {
            for (d, s) in dst.iter_mut().zip(src.iter()) {
                *d |= *s;
            }
        }
    }

    /// Returns `true` if any word is non-zero.
    pub fn any_set(&self) -> bool {
        self.pages.iter().any(|page| page.iter().any(|&w| w != 0))
    }

    /// Iterates over all words in index order.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.pages.iter().flat_map(|page| page.iter().copied())
    }
}

impl core::fmt::Debug for PagedBitmaskArray {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PagedBitmaskArray")
            .field("len", &self.len)
            .field("pages", &self.pages.len())
            .finish()
    }
}

#[inline(always)]
fn index_split(index: usize) -> (usize, usize) {
    (index >> PAGE_SHIFT, index & PAGE_MASK)
}

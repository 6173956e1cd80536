//! Storage for per-node traversal state.

pub mod paged_array;

pub use paged_array::PagedBitmaskArray;

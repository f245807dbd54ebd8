//! The ordering capability the container is generic over.
//!
//! A `Tree` never requires `R: Ord`. Every comparison it needs - record-to-record
//! during insertion, key-to-record during lookup - goes through a `Comparator`,
//! mirroring the pair of function pointers the original container took instead of
//! baking a single ordering into the node type.

use std::cmp::Ordering;

pub trait Comparator<K, R> {
    /// Orders two records already stored (or about to be stored) in the tree.
    fn cmp_records(&self, a: &R, b: &R) -> Ordering;

    /// Orders a lookup key against a record in the tree.
    fn cmp_key_record(&self, key: &K, record: &R) -> Ordering;
}

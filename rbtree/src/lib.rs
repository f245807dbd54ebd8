//! An intrusive, in-memory red-black tree: an ordered associative container with
//! stable node identity across mutation.
//!
//! Nodes are individually heap-allocated and linked by raw pointers rather than kept
//! in an arena, so that a [`NodeId`] handed back by [`Tree::insert`] stays valid - and
//! keeps pointing at the same record - through any number of rotations, as long as
//! the node it names is not itself deleted. Ordering is never baked into the record
//! type: every comparison goes through a caller-supplied [`Comparator`].
//!
//! ```
//! use rbtree::{Comparator, Tree};
//! use std::cmp::Ordering;
//!
//! struct ByKey;
//! impl Comparator<i64, i64> for ByKey {
//!     fn cmp_records(&self, a: &i64, b: &i64) -> Ordering {
//!         a.cmp(b)
//!     }
//!     fn cmp_key_record(&self, key: &i64, record: &i64) -> Ordering {
//!         key.cmp(record)
//!     }
//! }
//!
//! let mut tree = Tree::new(ByKey);
//! let id = tree.insert(42).unwrap();
//! assert_eq!(*tree.user_record(id), 42);
//! tree.delete(id);
//! tree.teardown();
//! ```

mod alloc;
mod comparator;
mod error;
mod node;
mod tree;
mod validate;

pub use alloc::{AllocError, Allocator, BudgetedAllocator, SystemAllocator};
pub use comparator::Comparator;
pub use error::InsertError;
pub use node::NodeId;
pub use tree::Tree;

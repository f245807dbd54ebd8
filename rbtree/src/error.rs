//! Failure types returned from the container's mutating operations.
//!
//! Flat enums with a hand-written `Display`, the same shape as the rest of this
//! workspace's error types: no context chaining, no `thiserror` - every failure this
//! crate can produce is expressed directly in the return value's sum type.

use crate::node::NodeId;
use core::fmt;

#[derive(Debug)]
pub enum InsertError<R> {
    /// A record comparing equal to `record` is already present, identified by the
    /// node already holding it.
    Exists(NodeId<R>),
    /// The allocator declined to reserve storage for a new node.
    OutOfMemory,
}

impl<R> fmt::Display for InsertError<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exists(_) => write!(f, "a record comparing equal already exists"),
            Self::OutOfMemory => write!(f, "out of memory"),
        }
    }
}

impl<R: fmt::Debug> std::error::Error for InsertError<R> {}

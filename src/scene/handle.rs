//! Node identity
//!
//! Two identifiers exist for every node. [`NodeId`] is process unique and
//! never reused, which makes it safe to hold across frames and to queue for
//! deferred removal. [`NodeHandle`] is the arena address; it is cheap to
//! dereference and goes stale when its slot is freed.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for node IDs
static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique node identifier, assigned monotonically at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw id value.
    #[must_use]
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Generation-checked index into the scene's node pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    index: u32,
    generation: u32,
}

impl NodeHandle {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index inside the pool.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// Generation of the slot when this handle was issued.
    #[must_use]
    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let a = NodeId::next();
        let b = NodeId::next();
        assert!(b > a);
        assert_ne!(a, b);
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(NodeHandle::new(3, 7).to_string(), "3v7");
    }
}

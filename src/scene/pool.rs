//! Generational Node Pool
//!
//! Backing storage for the scene graph. Nodes live in contiguous slots and
//! reference each other by [`NodeHandle`] instead of pointers, so a destroyed
//! node can never be reached through a dangling reference.
//!
//! # Design Principles
//!
//! - **Free List**: Released slots are recycled in LIFO order
//! - **Generations**: Every release bumps the slot generation, so handles
//!   issued before the release stop resolving
//! - **No Aliasing**: `clear` also bumps generations rather than resetting
//!   storage, keeping old handles stale
//!
//! # Example
//!
//! ```ignore
//! let mut pool: Pool<Node> = Pool::with_capacity(256);
//!
//! let handle = pool.insert(Node::new("A"));
//! assert!(pool.get(handle).is_some());
//!
//! pool.remove(handle);
//! assert!(pool.get(handle).is_none());
//! ```

use super::handle::NodeHandle;

// ============================================================================
// Pool Slot
// ============================================================================

/// Internal slot state for pool entries.
#[derive(Debug)]
enum Slot<T> {
    /// Slot contains a live value
    Occupied { generation: u32, value: T },
    /// Slot is empty and links to the next free slot (or `NONE`)
    Vacant { generation: u32, next_free: usize },
}

impl<T> Slot<T> {
    const fn generation(&self) -> u32 {
        match self {
            Self::Occupied { generation, .. } | Self::Vacant { generation, .. } => *generation,
        }
    }
}

// ============================================================================
// Pool
// ============================================================================

/// A generational pool with O(1) insert, remove and lookup.
///
/// | Operation | Time Complexity |
/// |-----------|-----------------|
/// | `insert`  | O(1) amortized  |
/// | `remove`  | O(1)            |
/// | `get`     | O(1)            |
/// | `iter`    | O(capacity)     |
#[derive(Debug)]
pub struct Pool<T> {
    /// Storage for all slots (occupied or vacant)
    slots: Vec<Slot<T>>,
    /// Head of the free list (index of first free slot, or `NONE`)
    free_head: usize,
    /// Number of currently live values
    active_count: usize,
}

impl<T> Pool<T> {
    /// Sentinel value indicating end of free list.
    const NONE: usize = usize::MAX;

    /// Create a new empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a pool with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: Self::NONE,
            active_count: 0,
        }
    }

    /// Store a value, reusing a free slot when one exists.
    pub fn insert(&mut self, value: T) -> NodeHandle {
        self.active_count += 1;

        if self.free_head != Self::NONE {
            let index = self.free_head;
            let (generation, next_free) = match self.slots[index] {
                Slot::Vacant {
                    generation,
                    next_free,
                } => (generation, next_free),
                Slot::Occupied { generation, .. } => (generation, Self::NONE),
            };
            self.free_head = next_free;
            self.slots[index] = Slot::Occupied { generation, value };
            NodeHandle::new(Self::to_u32(index), generation)
        } else {
            let index = self.slots.len();
            self.slots.push(Slot::Occupied {
                generation: 0,
                value,
            });
            NodeHandle::new(Self::to_u32(index), 0)
        }
    }

    /// Remove a value and return it.
    ///
    /// Returns `None` if the handle is stale or the slot is already vacant.
    pub fn remove(&mut self, handle: NodeHandle) -> Option<T> {
        let index = handle.index();
        if !self.contains(handle) {
            return None;
        }

        let generation = handle.generation().wrapping_add(1);
        let vacant = Slot::Vacant {
            generation,
            next_free: self.free_head,
        };
        let old = std::mem::replace(&mut self.slots[index], vacant);
        self.free_head = index;
        self.active_count -= 1;

        match old {
            Slot::Occupied { value, .. } => Some(value),
            Slot::Vacant { .. } => None,
        }
    }

    /// Get a reference to a value by handle.
    #[must_use]
    #[inline]
    pub fn get(&self, handle: NodeHandle) -> Option<&T> {
        match self.slots.get(handle.index()) {
            Some(Slot::Occupied { generation, value }) if *generation == handle.generation() => {
                Some(value)
            }
            _ => None,
        }
    }

    /// Get a mutable reference to a value by handle.
    #[inline]
    pub fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut T> {
        match self.slots.get_mut(handle.index()) {
            Some(Slot::Occupied { generation, value }) if *generation == handle.generation() => {
                Some(value)
            }
            _ => None,
        }
    }

    /// Check if a handle refers to a live value.
    #[must_use]
    #[inline]
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Number of live values.
    #[must_use]
    #[inline]
    pub const fn len(&self) -> usize {
        self.active_count
    }

    /// Check if the pool has no live values.
    #[must_use]
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.active_count == 0
    }

    /// Total slots (live + free).
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Iterate over live values with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                Slot::Occupied { generation, value } => {
                    Some((NodeHandle::new(Self::to_u32(index), *generation), value))
                }
                Slot::Vacant { .. } => None,
            })
    }

    /// Drop every value. All outstanding handles become stale.
    pub fn clear(&mut self) {
        self.free_head = Self::NONE;
        for index in (0..self.slots.len()).rev() {
            let generation = match &self.slots[index] {
                Slot::Occupied { generation, .. } => generation.wrapping_add(1),
                vacant => vacant.generation(),
            };
            self.slots[index] = Slot::Vacant {
                generation,
                next_free: self.free_head,
            };
            self.free_head = index;
        }
        self.active_count = 0;
    }

    #[inline]
    fn to_u32(index: usize) -> u32 {
        u32::try_from(index).unwrap_or(u32::MAX)
    }
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_insert_and_remove() {
        let mut pool: Pool<i32> = Pool::new();

        let h1 = pool.insert(1);
        let h2 = pool.insert(2);
        let h3 = pool.insert(3);
        assert_eq!(pool.len(), 3);

        assert_eq!(pool.remove(h2), Some(2));
        assert_eq!(pool.len(), 2);
        assert!(pool.get(h2).is_none());

        assert_eq!(pool.get(h1), Some(&1));
        assert_eq!(pool.get(h3), Some(&3));
    }

    #[test]
    fn test_pool_reuse_bumps_generation() {
        let mut pool: Pool<i32> = Pool::new();

        let old = pool.insert(100);
        pool.remove(old);
        let new = pool.insert(200);

        assert_eq!(old.index(), new.index(), "Should reuse the same slot");
        assert_ne!(old.generation(), new.generation());
        assert!(pool.get(old).is_none(), "Stale handle must not alias");
        assert_eq!(pool.get(new), Some(&200));
    }

    #[test]
    fn test_pool_free_list_order() {
        let mut pool: Pool<i32> = Pool::new();

        let h0 = pool.insert(0);
        let h1 = pool.insert(1);
        let h2 = pool.insert(2);

        pool.remove(h1);
        pool.remove(h0);
        pool.remove(h2);

        // LIFO: 2, 0, 1
        assert_eq!(pool.insert(10).index(), 2);
        assert_eq!(pool.insert(20).index(), 0);
        assert_eq!(pool.insert(30).index(), 1);
    }

    #[test]
    fn test_pool_double_remove() {
        let mut pool: Pool<i32> = Pool::new();

        let h = pool.insert(1);
        assert!(pool.remove(h).is_some());
        assert!(pool.remove(h).is_none(), "Double remove should be ignored");
    }

    #[test]
    fn test_pool_invalid_handle() {
        let mut pool: Pool<i32> = Pool::new();
        let invalid = NodeHandle::new(999, 0);
        assert!(pool.get(invalid).is_none());
        assert!(pool.remove(invalid).is_none());
    }

    #[test]
    fn test_pool_iteration_skips_vacant() {
        let mut pool: Pool<i32> = Pool::new();

        pool.insert(1);
        let h2 = pool.insert(2);
        pool.insert(3);
        pool.remove(h2);

        let values: Vec<i32> = pool.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![1, 3]);
    }

    #[test]
    fn test_pool_clear_invalidates_handles() {
        let mut pool: Pool<i32> = Pool::new();

        let h0 = pool.insert(1);
        let h1 = pool.insert(2);
        pool.clear();

        assert!(pool.is_empty());
        assert!(pool.get(h0).is_none());

        let fresh = pool.insert(3);
        assert_eq!(fresh.index(), h0.index());
        assert!(pool.get(h0).is_none());
        assert!(pool.get(h1).is_none());
        assert_eq!(pool.capacity(), 2);
    }

    #[test]
    fn test_pool_get_mut() {
        let mut pool: Pool<i32> = Pool::new();
        let h = pool.insert(42);

        if let Some(v) = pool.get_mut(h) {
            *v = 100;
        }
        assert_eq!(pool.get(h), Some(&100));
    }
}

//! Per-frame buffer rotation and workgroup counting.
//!
//! The demos keep several copies of their particle or state buffers: the
//! compute pass reads the current copy and writes the next one, then the
//! render pass draws what was just written. [`FrameRing`] tracks which slot
//! is which; it owns the slots but does no synchronization.

/// Ring of N buffers with a moving "current" slot.
#[derive(Debug, Clone)]
pub struct FrameRing<T> {
    slots: Vec<T>,
    current: usize,
}

impl<T> FrameRing<T> {
    /// Create a ring over `slots`. Returns `None` when `slots` is empty.
    pub fn new(slots: Vec<T>) -> Option<Self> {
        if slots.is_empty() {
            return None;
        }
        Some(Self { slots, current: 0 })
    }

    /// Build a ring of `count` slots from a constructor.
    pub fn from_fn(count: usize, f: impl FnMut(usize) -> T) -> Option<Self> {
        Self::new((0..count).map(f).collect())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn next_index(&self) -> usize {
        (self.current + 1) % self.slots.len()
    }

    /// Slot the next compute pass reads from.
    pub fn current(&self) -> &T {
        &self.slots[self.current]
    }

    /// Slot the next compute pass writes to.
    pub fn next(&self) -> &T {
        &self.slots[self.next_index()]
    }

    /// Move to the next slot.
    ///
    /// Returns `(read, write)` indices for the compute pass that caused the
    /// move; after the call, `current()` is the slot to draw.
    pub fn advance(&mut self) -> (usize, usize) {
        let read = self.current;
        self.current = self.next_index();
        (read, self.current)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter()
    }
}

/// Number of workgroups of `size` needed to cover `extent` items.
pub const fn workgroups(extent: u32, size: u32) -> u32 {
    if size == 0 {
        return 0;
    }
    extent.div_ceil(size)
}

/// Per-axis [`workgroups`] for a 3D dispatch.
pub const fn workgroups_3d(extent: [u32; 3], size: [u32; 3]) -> [u32; 3] {
    [
        workgroups(extent[0], size[0]),
        workgroups(extent[1], size[1]),
        workgroups(extent[2], size[2]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triple_buffer_rotation() {
        let mut ring = FrameRing::new(vec!["a", "b", "c"]).unwrap();
        assert_eq!(*ring.current(), "a");
        assert_eq!(*ring.next(), "b");

        assert_eq!(ring.advance(), (0, 1));
        assert_eq!(*ring.current(), "b");
        assert_eq!(ring.advance(), (1, 2));
        assert_eq!(ring.advance(), (2, 0));
        assert_eq!(*ring.current(), "a");
    }

    #[test]
    fn test_single_slot_ring_reads_and_writes_same_slot() {
        let mut ring = FrameRing::from_fn(1, |i| i).unwrap();
        assert_eq!(ring.advance(), (0, 0));
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn test_empty_ring_is_rejected() {
        assert!(FrameRing::<u8>::new(Vec::new()).is_none());
    }

    #[test]
    fn test_workgroup_counts_round_up() {
        assert_eq!(workgroups(30_000, 32), 938);
        assert_eq!(workgroups(64, 32), 2);
        assert_eq!(workgroups(0, 32), 0);
        assert_eq!(workgroups(10, 0), 0);
        assert_eq!(workgroups_3d([1920, 1080, 1], [32, 32, 1]), [60, 34, 1]);
        assert_eq!(workgroups_3d([128, 128, 128], [8, 8, 8]), [16, 16, 16]);
    }
}

//! Fixed-capacity object pool for transient visual entities.
//!
//! Records cycle between a free list and an active list and are never on
//! both at once. Capacity is a soft target: when the free list runs dry the
//! pool constructs fresh records instead of dropping spawns.

/// Reusable-record allocator parameterized by record shape.
#[derive(Debug)]
pub struct Pool<T> {
    free: Vec<T>,
    active: Vec<T>,
}

impl<T: Default> Pool<T> {
    /// Pre-populate `capacity` default records in the free list.
    pub fn new(capacity: usize) -> Self {
        let mut free = Vec::with_capacity(capacity);
        free.resize_with(capacity, T::default);
        Self {
            free,
            active: Vec::with_capacity(capacity),
        }
    }

    /// Acquire `count` records (at least one), resetting each through `init`
    /// before it becomes active.
    ///
    /// `init` must overwrite every field: a record coming off the free list
    /// still carries state from its previous life.
    pub fn spawn(&mut self, count: usize, mut init: impl FnMut(&mut T)) {
        for _ in 0..count.max(1) {
            let mut record = self.free.pop().unwrap_or_default();
            init(&mut record);
            self.active.push(record);
        }
    }

    /// Step every active record; a record is evicted back to the free list
    /// when `step` returns false. Iterates in reverse index order so
    /// in-place removal is safe.
    pub fn update(&mut self, mut step: impl FnMut(&mut T, usize) -> bool) {
        for i in (0..self.active.len()).rev() {
            if !step(&mut self.active[i], i) {
                let record = self.active.swap_remove(i);
                self.free.push(record);
            }
        }
    }

    /// Evict every active record at once.
    pub fn clear(&mut self) {
        self.free.append(&mut self.active);
    }

    /// Active records, in no particular order.
    pub fn active(&self) -> &[T] {
        &self.active
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn free_len(&self) -> usize {
        self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Rec {
        tag: u32,
        ttl: i32,
    }

    #[test]
    fn spawn_pulls_from_free_list() {
        let mut pool: Pool<Rec> = Pool::new(8);
        pool.spawn(3, |r| {
            r.tag = 7;
            r.ttl = 2;
        });
        assert_eq!(pool.active_len(), 3);
        assert_eq!(pool.free_len(), 5);
        assert!(pool.active().iter().all(|r| r.tag == 7));
    }

    #[test]
    fn spawn_overflows_past_capacity() {
        let mut pool: Pool<Rec> = Pool::new(2);
        pool.spawn(5, |r| r.ttl = 1);
        assert_eq!(pool.active_len(), 5);
        assert_eq!(pool.free_len(), 0);
    }

    #[test]
    fn spawn_zero_still_acquires_one() {
        let mut pool: Pool<Rec> = Pool::new(4);
        pool.spawn(0, |r| r.ttl = 1);
        assert_eq!(pool.active_len(), 1);
    }

    #[test]
    fn update_evicts_expired_records() {
        let mut pool: Pool<Rec> = Pool::new(4);
        pool.spawn(4, |r| r.ttl = 2);

        pool.update(|r, _| {
            r.ttl -= 1;
            r.ttl > 0
        });
        assert_eq!(pool.active_len(), 4);

        pool.update(|r, _| {
            r.ttl -= 1;
            r.ttl > 0
        });
        assert_eq!(pool.active_len(), 0);
        assert_eq!(pool.free_len(), 4);
    }

    #[test]
    fn reused_records_are_reinitialized() {
        let mut pool: Pool<Rec> = Pool::new(1);
        pool.spawn(1, |r| {
            r.tag = 99;
            r.ttl = 0;
        });
        pool.update(|r, _| r.ttl > 0);
        assert_eq!(pool.active_len(), 0);

        // The recycled record must come back with the new initializer's
        // fields, not its previous life.
        pool.spawn(1, |r| {
            r.tag = 1;
            r.ttl = 5;
        });
        assert_eq!(pool.active()[0], Rec { tag: 1, ttl: 5 });
    }

    #[test]
    fn clear_returns_everything() {
        let mut pool: Pool<Rec> = Pool::new(4);
        pool.spawn(6, |r| r.ttl = 10);
        pool.clear();
        assert_eq!(pool.active_len(), 0);
        assert_eq!(pool.free_len(), 6);
    }

    proptest! {
        /// Free/active partition: however spawns and updates interleave, the
        /// total record count only grows past capacity by overflow spawns and
        /// no record is lost.
        #[test]
        fn partition_invariant(ops in proptest::collection::vec((0usize..8, 0i32..4), 0..64)) {
            let mut pool: Pool<Rec> = Pool::new(16);
            let mut spawned_over = 0usize;

            for (count, ttl) in ops {
                let available = pool.free_len();
                let take = count.max(1);
                spawned_over += take.saturating_sub(available);
                pool.spawn(count, |r| {
                    r.tag = 0;
                    r.ttl = ttl;
                });
                pool.update(|r, _| {
                    r.ttl -= 1;
                    r.ttl > 0
                });
                prop_assert_eq!(pool.active_len() + pool.free_len(), 16 + spawned_over);
            }
        }
    }
}

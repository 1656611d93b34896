//! The instance slot registry: mint, validate, recycle.

use std::collections::VecDeque;
use std::marker::PhantomData;

use crate::error::InstanceError;
use crate::handle::{Handle, InstanceKind, GENERATION_WRAP, MAX_INDEX};

/// Configuration for an [`InstanceRegistry`].
///
/// Every value is tolerated (a threshold of 0 simply reuses freed slots
/// immediately); kept as a struct so managers share one tuning surface.
#[derive(Clone, Copy, Debug)]
pub struct RegistryConfig {
    /// Number of freed slots that must accumulate before the oldest is
    /// reused. Larger values push stale-handle collisions further out at
    /// the cost of a longer tail of unoccupied slots.
    ///
    /// Default: 1024.
    pub min_freed_buildup: usize,
}

impl RegistryConfig {
    /// Default reuse threshold.
    pub const DEFAULT_MIN_FREED_BUILDUP: usize = 1024;
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            min_freed_buildup: Self::DEFAULT_MIN_FREED_BUILDUP,
        }
    }
}

/// Mints and validates generational handles for one manager.
///
/// Each slot moves through `Free → Issued(g) → Free(g+1) → Issued(g+1) → …`;
/// a handle is alive iff its encoded generation equals the slot's current
/// one. Freed slots queue FIFO and are only reused once
/// [`RegistryConfig::min_freed_buildup`] of them have piled up, which
/// spreads recycling across the whole index range instead of hammering
/// the most recently freed slot.
///
/// Slot 0 is reserved at construction so the null handle (raw 0) can
/// never alias a live instance.
#[derive(Clone, Debug)]
pub struct InstanceRegistry<K: InstanceKind> {
    /// Current generation per slot, indexed by slot. Slot 0 is reserved.
    generations: Vec<u8>,
    /// Occupancy per slot, same indexing. Feeds [`InstanceRegistry::iter`];
    /// the `alive` check needs only the generation match.
    occupied: Vec<bool>,
    /// Freed slot indices, oldest first.
    free: VecDeque<u32>,
    min_freed_buildup: usize,
    live: usize,
    _kind: PhantomData<K>,
}

impl<K: InstanceKind> Default for InstanceRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: InstanceKind> InstanceRegistry<K> {
    /// Create a registry with the default configuration.
    pub fn new() -> InstanceRegistry<K> {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a registry with an explicit reuse threshold.
    pub fn with_config(config: RegistryConfig) -> InstanceRegistry<K> {
        InstanceRegistry {
            generations: vec![0], // slot 0 = null sentinel, never issued
            occupied: vec![false],
            free: VecDeque::new(),
            min_freed_buildup: config.min_freed_buildup,
            live: 0,
            _kind: PhantomData,
        }
    }

    /// Mint a handle for a new instance.
    ///
    /// Pops the oldest freed slot once the free list has reached the
    /// buildup threshold, reissuing it at its current generation;
    /// otherwise appends a brand-new slot at generation 0. When the
    /// index space is exhausted, freed slots are reused below the
    /// threshold rather than failing; [`InstanceError::IndexSpaceExhausted`]
    /// is returned only when no slot exists at all.
    pub fn create(&mut self) -> Result<Handle<K>, InstanceError> {
        if self.free.len() >= self.min_freed_buildup {
            return Ok(self.reuse_oldest());
        }
        let next = self.generations.len();
        if next <= MAX_INDEX as usize {
            self.generations.push(0);
            self.occupied.push(true);
            self.live += 1;
            return Ok(Handle::pack(next as u32, 0));
        }
        if !self.free.is_empty() {
            return Ok(self.reuse_oldest());
        }
        Err(InstanceError::IndexSpaceExhausted)
    }

    fn reuse_oldest(&mut self) -> Handle<K> {
        let index = self.free.pop_front().expect("free list checked non-empty");
        self.occupied[index as usize] = true;
        self.live += 1;
        Handle::pack(index, u32::from(self.generations[index as usize]))
    }

    /// Whether `handle` refers to a currently live instance.
    ///
    /// This is the sanctioned, non-exceptional way to detect stale
    /// handles; `false` is an expected answer, not an error.
    pub fn alive(&self, handle: Handle<K>) -> bool {
        if handle.is_null() {
            return false;
        }
        let index = handle.index() as usize;
        index < self.generations.len()
            && u32::from(self.generations[index]) == handle.generation()
    }

    /// Destroy an instance: bump its slot's generation (wrapping at the
    /// generation bit-width) and queue the index for deferred reuse.
    ///
    /// Passing a non-alive handle is a programmer error, debug-asserted
    /// only; in release it silently bumps the generation again, which
    /// wastes generation space but corrupts nothing.
    pub fn destroy(&mut self, handle: Handle<K>) {
        debug_assert!(self.alive(handle), "destroy of non-alive {handle}");
        let index = handle.index() as usize;
        if index == 0 || index >= self.generations.len() {
            return;
        }
        self.generations[index] = self.generations[index].wrapping_add(1);
        self.occupied[index] = false;
        self.free.push_back(handle.index());
        self.live = self.live.saturating_sub(1);
    }

    /// Iterate over the handle of every live instance, in slot order.
    ///
    /// Each yielded handle carries its slot's current generation, so it
    /// passes [`InstanceRegistry::alive`].
    pub fn iter(&self) -> impl Iterator<Item = Handle<K>> + '_ {
        self.occupied
            .iter()
            .enumerate()
            .filter(|&(_, &occupied)| occupied)
            .map(|(index, _)| Handle::pack(index as u32, u32::from(self.generations[index])))
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether no instances are live.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of slot indices ever issued (live + freed).
    pub fn issued_slots(&self) -> usize {
        self.generations.len() - 1
    }

    /// Number of freed slots waiting for reuse.
    pub fn pending_reuse(&self) -> usize {
        self.free.len()
    }

    /// Current generation of a slot, if it was ever issued.
    pub fn generation(&self, index: u32) -> Option<u32> {
        if index == 0 {
            return None;
        }
        self.generations.get(index as usize).map(|&g| u32::from(g))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Entity;
    impl InstanceKind for Entity {}

    type Registry = InstanceRegistry<Entity>;

    #[test]
    fn create_issues_distinct_live_handles() {
        let mut reg = Registry::new();
        let a = reg.create().unwrap();
        let b = reg.create().unwrap();
        assert_ne!(a, b);
        assert!(reg.alive(a));
        assert!(reg.alive(b));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn first_handle_is_not_null() {
        let mut reg = Registry::new();
        let h = reg.create().unwrap();
        assert!(!h.is_null());
        assert_eq!(h.index(), 1); // slot 0 reserved for the sentinel
        assert_eq!(h.generation(), 0);
    }

    #[test]
    fn null_is_never_alive() {
        let reg = Registry::new();
        assert!(!reg.alive(Handle::NULL));
    }

    #[test]
    fn destroy_kills_the_handle() {
        let mut reg = Registry::new();
        let h = reg.create().unwrap();
        reg.destroy(h);
        assert!(!reg.alive(h));
        assert_eq!(reg.len(), 0);
        assert_eq!(reg.pending_reuse(), 1);
    }

    #[test]
    fn destroy_bumps_generation() {
        let mut reg = Registry::new();
        let h = reg.create().unwrap();
        assert_eq!(reg.generation(h.index()), Some(0));
        reg.destroy(h);
        assert_eq!(reg.generation(h.index()), Some(1));
    }

    #[test]
    fn reuse_waits_for_buildup_threshold() {
        let mut reg = Registry::with_config(RegistryConfig {
            min_freed_buildup: 4,
        });
        let first = reg.create().unwrap();
        reg.destroy(first);

        // Three more freed slots still leave the list below threshold,
        // so creates keep appending fresh indices.
        for _ in 0..3 {
            let h = reg.create().unwrap();
            reg.destroy(h);
        }
        assert_eq!(reg.pending_reuse(), 4);

        // Threshold reached: the oldest freed index (first's) comes back
        // at its bumped generation.
        let recycled = reg.create().unwrap();
        assert_eq!(recycled.index(), first.index());
        assert_eq!(recycled.generation(), first.generation() + 1);
        assert!(!reg.alive(first));
        assert!(reg.alive(recycled));
    }

    #[test]
    fn default_threshold_defers_reuse_across_many_cycles() {
        let mut reg = Registry::new();
        let victim = reg.create().unwrap();
        reg.destroy(victim);

        // Churn other slots until the free list reaches the default
        // buildup (it already holds the victim, hence the minus one).
        for _ in 0..RegistryConfig::DEFAULT_MIN_FREED_BUILDUP - 1 {
            let h = reg.create().unwrap();
            assert_ne!(h.index(), victim.index(), "reused too early");
            reg.destroy(h);
        }
        assert_eq!(reg.pending_reuse(), RegistryConfig::DEFAULT_MIN_FREED_BUILDUP);

        let recycled = reg.create().unwrap();
        assert_eq!(recycled.index(), victim.index());
        assert!(!reg.alive(victim));
        assert!(reg.alive(recycled));
    }

    #[test]
    fn generation_wraps_at_bit_width() {
        let mut reg = Registry::with_config(RegistryConfig {
            min_freed_buildup: 1,
        });
        let first = reg.create().unwrap();
        let index = first.index();
        reg.destroy(first);

        // 255 more destroy/create cycles on the same slot wrap the
        // 8-bit counter back to the original generation.
        for _ in 0..(GENERATION_WRAP - 1) {
            let h = reg.create().unwrap();
            assert_eq!(h.index(), index);
            reg.destroy(h);
        }
        assert_eq!(reg.generation(index), Some(first.generation()));
        // The ancient handle now passes the check again: the documented
        // wrap-around hazard the buildup threshold exists to postpone.
        let revived = reg.create().unwrap();
        assert_eq!(revived, first);
    }

    #[test]
    fn forged_out_of_range_handle_is_dead() {
        let reg = Registry::new();
        let forged = Handle::<Entity>::from_raw(0x0300_0064);
        assert!(!reg.alive(forged));
    }

    #[test]
    fn iter_yields_exactly_the_live_handles() {
        let mut reg = Registry::new();
        let a = reg.create().unwrap();
        let b = reg.create().unwrap();
        let c = reg.create().unwrap();
        reg.destroy(b);

        let live: Vec<_> = reg.iter().collect();
        assert_eq!(live, vec![a, c]);
        for h in &live {
            assert!(reg.alive(*h));
        }
    }

    #[test]
    fn iter_is_empty_for_an_empty_registry() {
        let reg = Registry::new();
        assert_eq!(reg.iter().count(), 0);
    }

    #[test]
    fn iter_sees_recycled_slots_at_their_new_generation() {
        let mut reg = Registry::with_config(RegistryConfig {
            min_freed_buildup: 1,
        });
        let old = reg.create().unwrap();
        reg.destroy(old);
        let fresh = reg.create().unwrap();

        let live: Vec<_> = reg.iter().collect();
        assert_eq!(live, vec![fresh]);
        assert_eq!(live[0].index(), old.index());
        assert_ne!(live[0].generation(), old.generation());
    }

    #[test]
    fn issued_slots_counts_live_and_freed() {
        let mut reg = Registry::new();
        let a = reg.create().unwrap();
        let _b = reg.create().unwrap();
        reg.destroy(a);
        assert_eq!(reg.issued_slots(), 2);
        assert_eq!(reg.len(), 1);
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        struct PropEntity;
        impl InstanceKind for PropEntity {}

        proptest! {
            #[test]
            fn live_handles_stay_alive_until_destroyed(count in 1usize..200) {
                let mut reg = InstanceRegistry::<PropEntity>::new();
                let handles: Vec<_> = (0..count).map(|_| reg.create().unwrap()).collect();

                for h in &handles {
                    prop_assert!(reg.alive(*h));
                }
                prop_assert_eq!(reg.len(), count);
                prop_assert_eq!(reg.iter().count(), count);

                for h in &handles {
                    reg.destroy(*h);
                }
                for h in &handles {
                    prop_assert!(!reg.alive(*h));
                }
                prop_assert_eq!(reg.len(), 0);
                prop_assert_eq!(reg.iter().count(), 0);
            }

            #[test]
            fn recycling_never_resurrects_old_handles(
                churn in 1usize..50,
                threshold in 1usize..8,
            ) {
                let mut reg = InstanceRegistry::<PropEntity>::with_config(RegistryConfig {
                    min_freed_buildup: threshold,
                });
                let mut retired = Vec::new();
                for _ in 0..churn {
                    let h = reg.create().unwrap();
                    reg.destroy(h);
                    retired.push(h);
                }
                // Generations are 8-bit; under 256 cycles nothing can wrap.
                for h in retired {
                    prop_assert!(!reg.alive(h));
                }
            }
        }
    }
}

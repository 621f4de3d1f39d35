use core::ops::{Deref, DerefMut};

use crate::constants::AUDIO_BLOCK_SAMPLES;

use super::pool::{BlockPool, POOL};

/// Exclusive handle to a pool block.
///
/// There is exactly one `AudioBlockMut` per claimed slot. Dropping it
/// releases the block back to its pool.
pub struct AudioBlockMut {
    pool: &'static BlockPool,
    slot: u8,
}

impl AudioBlockMut {
    /// The caller must have just claimed `slot` with refcount 1.
    pub(crate) fn new(pool: &'static BlockPool, slot: u8) -> Self {
        AudioBlockMut { pool, slot }
    }

    /// Allocate a block from the global [`POOL`].
    pub fn alloc() -> Option<Self> {
        POOL.alloc()
    }

    /// Freeze into a shared handle without touching the refcount.
    pub fn into_shared(self) -> AudioBlockRef {
        let shared = AudioBlockRef {
            pool: self.pool,
            slot: self.slot,
        };
        core::mem::forget(self);
        shared
    }

    /// Pool slot index.
    pub fn slot(&self) -> u8 {
        self.slot
    }
}

impl Deref for AudioBlockMut {
    type Target = [i16; AUDIO_BLOCK_SAMPLES];

    fn deref(&self) -> &Self::Target {
        // SAFETY: we are the only handle for this claimed slot.
        unsafe { &*self.pool.samples(self.slot) }
    }
}

impl DerefMut for AudioBlockMut {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: we are the only handle for this claimed slot.
        unsafe { &mut *self.pool.samples(self.slot) }
    }
}

impl Drop for AudioBlockMut {
    fn drop(&mut self) {
        self.pool.release(self.slot);
    }
}

/// Shared, read-only handle to a pool block.
///
/// Cloning adds a reference; dropping releases one. The slot returns to the
/// pool when the last handle is dropped.
pub struct AudioBlockRef {
    pool: &'static BlockPool,
    slot: u8,
}

impl AudioBlockRef {
    /// Pool slot index.
    pub fn slot(&self) -> u8 {
        self.slot
    }

    /// Whether both handles refer to the same pool slot.
    pub fn ptr_eq(&self, other: &AudioBlockRef) -> bool {
        core::ptr::eq(self.pool, other.pool) && self.slot == other.slot
    }
}

impl Deref for AudioBlockRef {
    type Target = [i16; AUDIO_BLOCK_SAMPLES];

    fn deref(&self) -> &Self::Target {
        // SAFETY: shared handles never hand out mutable access.
        unsafe { &*self.pool.samples(self.slot) }
    }
}

impl Clone for AudioBlockRef {
    fn clone(&self) -> Self {
        self.pool.retain(self.slot);
        AudioBlockRef {
            pool: self.pool,
            slot: self.slot,
        }
    }
}

impl Drop for AudioBlockRef {
    fn drop(&mut self) {
        self.pool.release(self.slot);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::boxed::Box;

    fn fresh_pool() -> &'static BlockPool {
        Box::leak(Box::new(BlockPool::new()))
    }

    #[test]
    fn write_and_read() {
        let pool = fresh_pool();
        let mut block = pool.alloc().unwrap();
        block[0] = 1234;
        block[127] = -5678;
        assert_eq!(block[0], 1234);
        assert_eq!(block[127], -5678);
    }

    #[test]
    fn into_shared_keeps_refcount_and_data() {
        let pool = fresh_pool();
        let mut block = pool.alloc().unwrap();
        block[0] = 42;
        let slot = block.slot();

        let shared = block.into_shared();
        assert_eq!(shared.slot(), slot);
        assert_eq!(shared[0], 42);
        assert_eq!(pool.refcount(slot), 1);
    }

    #[test]
    fn clones_share_a_slot() {
        let pool = fresh_pool();
        let shared = pool.alloc().unwrap().into_shared();
        let other = pool.alloc().unwrap().into_shared();
        let clone = shared.clone();

        assert!(clone.ptr_eq(&shared));
        assert!(!clone.ptr_eq(&other));
    }

    #[test]
    fn global_pool_round_trip() {
        let block = AudioBlockMut::alloc().unwrap();
        let slot = block.slot();
        let shared = block.into_shared();
        assert_eq!(POOL.refcount(slot), 1);
        drop(shared);
    }
}

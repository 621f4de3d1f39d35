use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use crate::constants::{AUDIO_BLOCK_SAMPLES, POOL_SIZE};

use super::handle::AudioBlockMut;

const _: () = assert!(POOL_SIZE <= 32, "pool bitmap is a single u32");

/// Raw audio block storage: 128 signed 16-bit samples, 4-byte aligned.
#[repr(C, align(4))]
struct AudioBlockData {
    samples: [i16; AUDIO_BLOCK_SAMPLES],
}

impl AudioBlockData {
    const ZEROED: Self = AudioBlockData {
        samples: [0; AUDIO_BLOCK_SAMPLES],
    };
}

/// Lock-free pool of audio blocks, the allocator the audio graph hands
/// blocks out of.
///
/// An atomic bitmap tracks which slots are claimed and per-slot atomic
/// reference counts track shared ownership. Every operation is ISR-safe.
/// Handles keep a `&'static` reference to the pool they came from, so a
/// block is always released back into the right pool.
pub struct BlockPool {
    /// Bit N set means slot N is claimed.
    bitmap: AtomicU32,
    refcounts: [AtomicU8; POOL_SIZE],
    storage: UnsafeCell<[AudioBlockData; POOL_SIZE]>,
}

// SAFETY: claimed/shared state is atomic. A slot's storage is only written
// while its bitmap bit is exclusively held (claim) or through the single
// `AudioBlockMut` handle for it.
unsafe impl Sync for BlockPool {}

impl BlockPool {
    /// Create an empty pool.
    #[allow(clippy::declare_interior_mut_const)]
    pub const fn new() -> Self {
        const FREE: AtomicU8 = AtomicU8::new(0);
        BlockPool {
            bitmap: AtomicU32::new(0),
            refcounts: [FREE; POOL_SIZE],
            storage: UnsafeCell::new([AudioBlockData::ZEROED; POOL_SIZE]),
        }
    }

    /// Allocate a zeroed block. Returns `None` when every slot is in use.
    pub fn alloc(&'static self) -> Option<AudioBlockMut> {
        self.claim().map(|slot| AudioBlockMut::new(self, slot))
    }

    fn claim(&self) -> Option<u8> {
        loop {
            let bitmap = self.bitmap.load(Ordering::Acquire);
            let slot = (!bitmap).trailing_zeros();
            if slot as usize >= POOL_SIZE {
                return None;
            }
            let bit = 1u32 << slot;
            if self
                .bitmap
                .compare_exchange_weak(bitmap, bitmap | bit, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                // Raced with another context.
                continue;
            }
            self.refcounts[slot as usize].store(1, Ordering::Release);
            // SAFETY: the CAS above gave us exclusive ownership of `slot`.
            unsafe {
                (*self.storage.get())[slot as usize] = AudioBlockData::ZEROED;
            }
            return Some(slot as u8);
        }
    }

    /// Add a reference to a claimed slot.
    pub(crate) fn retain(&self, slot: u8) {
        let old = self.refcounts[slot as usize].fetch_add(1, Ordering::AcqRel);
        debug_assert!(old > 0, "retain on a free slot");
        debug_assert!(old < u8::MAX, "refcount overflow");
    }

    /// Drop a reference. The last release returns the slot to the pool.
    pub(crate) fn release(&self, slot: u8) {
        let old = self.refcounts[slot as usize].fetch_sub(1, Ordering::AcqRel);
        debug_assert!(old > 0, "release on a free slot");
        if old == 1 {
            self.bitmap.fetch_and(!(1u32 << slot), Ordering::Release);
        }
    }

    /// Current reference count of `slot` (0 when free).
    pub fn refcount(&self, slot: u8) -> u8 {
        self.refcounts[slot as usize].load(Ordering::Acquire)
    }

    /// Number of claimed slots.
    pub fn allocated(&self) -> usize {
        self.bitmap.load(Ordering::Acquire).count_ones() as usize
    }

    /// Pointer to the samples of `slot`.
    ///
    /// # Safety
    ///
    /// `slot` must be claimed, and the caller must uphold the handle
    /// aliasing rules (one `AudioBlockMut`, or any number of readers).
    pub(crate) unsafe fn samples(&self, slot: u8) -> *mut [i16; AUDIO_BLOCK_SAMPLES] {
        // SAFETY: in-bounds place projection, no reference is created.
        unsafe { core::ptr::addr_of_mut!((*self.storage.get())[slot as usize].samples) }
    }
}

impl Default for BlockPool {
    fn default() -> Self {
        Self::new()
    }
}

/// The global audio block pool.
pub static POOL: BlockPool = BlockPool::new();

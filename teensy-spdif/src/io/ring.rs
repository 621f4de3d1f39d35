use core::cell::UnsafeCell;

use super::geometry::{Half, HALF_WORDS, RING_WORDS};

/// The hardware-visible circular transmit buffer.
///
/// 512 words, cache-line aligned so that flushing one half never touches a
/// line shared with the other. Starts zeroed, which the transmitter plays
/// as silence.
///
/// The DMA engine reads it continuously. Software writes only through
/// [`half_mut`](Self::half_mut), and only into the half the engine is not
/// reading.
#[repr(C, align(32))]
pub struct TransmitRing {
    words: UnsafeCell<[u32; RING_WORDS]>,
}

// SAFETY: the only writer is the transmit interrupt, which is not
// reentrant, and it writes the half the engine isn't reading. Readers other
// than the engine use volatile word reads.
unsafe impl Sync for TransmitRing {}

impl TransmitRing {
    /// A zeroed ring.
    pub const fn new() -> Self {
        TransmitRing {
            words: UnsafeCell::new([0; RING_WORDS]),
        }
    }

    /// Pointer to the first word.
    pub fn as_ptr(&self) -> *const u32 {
        self.words.get().cast::<u32>()
    }

    /// Ring base as a 32-bit bus address, the way the DMA engine sees it.
    pub fn base_address(&self) -> u32 {
        self.as_ptr() as usize as u32
    }

    /// Mutable view of one half.
    ///
    /// # Safety
    ///
    /// Caller must be the only writer, and the engine must not be reading
    /// `half` for as long as the returned reference lives.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn half_mut(&self, half: Half) -> &mut [u32; HALF_WORDS] {
        // SAFETY: `word_offset + HALF_WORDS <= RING_WORDS`; exclusivity is
        // the caller's contract.
        unsafe {
            &mut *self
                .words
                .get()
                .cast::<u32>()
                .add(half.word_offset())
                .cast::<[u32; HALF_WORDS]>()
        }
    }

    /// Volatile read of one word, wrapping at the ring length.
    pub fn read(&self, index: usize) -> u32 {
        // SAFETY: the index is reduced into the ring.
        unsafe { self.as_ptr().add(index % RING_WORDS).read_volatile() }
    }
}

impl Default for TransmitRing {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::geometry::RING_ALIGN;

    #[test]
    fn starts_silent_and_aligned() {
        let ring = TransmitRing::new();
        assert_eq!(ring.as_ptr() as usize % RING_ALIGN, 0);
        assert!((0..RING_WORDS).all(|i| ring.read(i) == 0));
    }

    #[test]
    fn halves_do_not_overlap() {
        let ring = TransmitRing::new();
        unsafe {
            ring.half_mut(Half::Lower).fill(0x1111_1100);
            ring.half_mut(Half::Upper).fill(0x2222_2200);
        }
        assert_eq!(ring.read(0), 0x1111_1100);
        assert_eq!(ring.read(HALF_WORDS - 1), 0x1111_1100);
        assert_eq!(ring.read(HALF_WORDS), 0x2222_2200);
        assert_eq!(ring.read(RING_WORDS - 1), 0x2222_2200);
        assert_eq!(ring.read(RING_WORDS), 0x1111_1100);
    }
}

//! Audio blocks handed over by the audio graph.
//!
//! The transmitter only needs to read a block's 128 samples and to release
//! it once transmitted. [`AudioBlock`] is that boundary; releasing a block
//! is dropping it. The pool-backed [`AudioBlockRef`] is the production
//! implementation.

mod handle;
pub mod pool;

pub use handle::{AudioBlockMut, AudioBlockRef};
pub use pool::{BlockPool, POOL};

use crate::constants::AUDIO_BLOCK_SAMPLES;

/// A fixed-length mono block of 16-bit PCM samples.
pub trait AudioBlock {
    /// The block's samples.
    fn samples(&self) -> &[i16; AUDIO_BLOCK_SAMPLES];
}

impl AudioBlock for AudioBlockRef {
    fn samples(&self) -> &[i16; AUDIO_BLOCK_SAMPLES] {
        self
    }
}

impl AudioBlock for AudioBlockMut {
    fn samples(&self) -> &[i16; AUDIO_BLOCK_SAMPLES] {
        self
    }
}

//! S/PDIF transmit word encoding.
//!
//! The transmitter's data registers take 24-bit audio in bits 23:0 of a
//! 32-bit word and ignore bits 31:24. A 16-bit sample therefore goes in the
//! two center bytes with the low byte zero:
//!
//! ```text
//!  31      24 23              8 7       0
//! ┌──────────┬─────────────────┬─────────┐
//! │ ignored  │  16-bit sample  │ 0x00    │
//! └──────────┴─────────────────┴─────────┘
//! ```
//!
//! The sample is sign-extended into the ignored byte. Frames are written
//! as consecutive `[left, right]` word pairs, matching the left/right data
//! register pair the DMA engine writes per service request.

use crate::constants::AUDIO_BLOCK_SAMPLES;

/// Words per stereo frame.
pub const WORDS_PER_FRAME: usize = 2;

/// Words produced by encoding one block per channel.
pub const ENCODED_BLOCK_WORDS: usize = AUDIO_BLOCK_SAMPLES * WORDS_PER_FRAME;

/// Place one sample in the center bytes of a transmit word.
#[inline(always)]
pub const fn encode_sample(sample: i16) -> u32 {
    ((sample as i32) << 8) as u32
}

/// Recover the sample from a transmit word.
#[inline(always)]
pub const fn decode_sample(word: u32) -> i16 {
    ((word as i32) >> 8) as i16
}

/// Interleave one block per channel into transmit words: L, R, L, R, ...
///
/// Runs in the transmit interrupt, so it must stay branch-free and
/// allocation-free. Inputs are taken as-is; there is no clamping.
pub fn interleave(
    dest: &mut [u32; ENCODED_BLOCK_WORDS],
    left: &[i16; AUDIO_BLOCK_SAMPLES],
    right: &[i16; AUDIO_BLOCK_SAMPLES],
) {
    for ((frame, &l), &r) in dest
        .chunks_exact_mut(WORDS_PER_FRAME)
        .zip(left.iter())
        .zip(right.iter())
    {
        frame[0] = encode_sample(l);
        frame[1] = encode_sample(r);
    }
}

/// Split transmit words back into left and right samples.
pub fn deinterleave(
    src: &[u32],
    left: &mut [i16],
    right: &mut [i16],
) {
    debug_assert_eq!(src.len(), left.len() * WORDS_PER_FRAME);
    debug_assert_eq!(left.len(), right.len());

    for ((frame, l), r) in src
        .chunks_exact(WORDS_PER_FRAME)
        .zip(left.iter_mut())
        .zip(right.iter_mut())
    {
        *l = decode_sample(frame[0]);
        *r = decode_sample(frame[1]);
    }
}

//! DMA-driven S/PDIF stereo output.
//!
//! [`AudioOutputSpdif`] owns the transmit ring and the pending-block queues.
//! The audio graph hands it one stereo pair per period through
//! [`produce`](AudioOutputSpdif::produce); the DMA interrupt calls
//! [`on_transfer_boundary`](AudioOutputSpdif::on_transfer_boundary) twice
//! per ring traversal to encode the next pair into the half the engine is
//! not reading.
//!
//! ## Architecture
//!
//! ```text
//! Audio Graph        StereoQueue (2 slots)       TransmitRing (512 × u32)      SPDIF
//! ┌──────────┐      ┌──────────────────┐  ISR   ┌────────────┬────────────┐   ┌──────┐
//! │ left     ├─────►│ L[0] L[1]        ├──enc──►│  lower     │  upper     ├──►│ STL  │
//! │ right    ├─────►│ R[0] R[1]        │        │ 128 frames │ 128 frames │DMA│ STR  │
//! └──────────┘      └──────────────────┘        └────────────┴────────────┘   └──────┘
//!      ▲                                                                          │
//!      └─────────────────────── update_all() once per half ◄────────────────────┘
//! ```
//!
//! ## Usage with RTIC
//!
//! ```ignore
//! static SPDIF: AudioOutputSpdif = AudioOutputSpdif::new();
//!
//! // In init: bring up clocks, arm the DMA channel, enable the transmitter
//! teensy_spdif::startup::start(&SPDIF, &mut platform, &mut channel, &mut delay)?;
//!
//! // In the DMA ISR: refill the free half and tick the graph
//! SPDIF.on_transfer_boundary(&mut channel, &mut graph);
//!
//! // In the graph's output node: hand over the rendered pair
//! SPDIF.produce(Some(left), Some(right));
//! ```

use core::cell::RefCell;
use core::sync::atomic::{compiler_fence, Ordering};

use critical_section::Mutex;

use crate::block::{AudioBlock, AudioBlockRef};
use crate::graph::AudioGraph;

use super::encode::interleave;
use super::engine::TransferEngine;
use super::geometry::{Half, TransferDescriptor};
use super::queue::StereoQueue;
use super::ring::TransmitRing;

/// What [`AudioOutputSpdif::produce`] did with a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Delivery {
    /// Neither channel had a block. Nothing changed.
    Empty,
    /// Only one channel had a block. It was released unqueued.
    Incomplete,
    /// The pair was queued.
    Queued,
    /// The pair was queued and the oldest pending pair was released.
    Overrun,
}

/// S/PDIF transmitter front end.
///
/// Designed to live in a `static`: every entry point takes `&self`. The
/// queues sit behind a [`critical_section::Mutex`] shared by the producer
/// and the interrupt; the ring needs no lock because the two halves are
/// only ever written by the interrupt, and only when the engine is reading
/// the other one.
pub struct AudioOutputSpdif<B = AudioBlockRef> {
    queue: Mutex<RefCell<StereoQueue<B>>>,
    ring: TransmitRing,
}

impl<B> AudioOutputSpdif<B> {
    /// An idle output with empty queues and a silent ring.
    pub const fn new() -> Self {
        AudioOutputSpdif {
            queue: Mutex::new(RefCell::new(StereoQueue::new())),
            ring: TransmitRing::new(),
        }
    }

    /// The hardware-visible ring.
    pub fn ring(&self) -> &TransmitRing {
        &self.ring
    }

    /// The descriptor that walks this output's ring into the transmit data
    /// register pair at `destination`.
    pub fn descriptor(&self, destination: u32) -> TransferDescriptor {
        TransferDescriptor::circular(self.ring.base_address(), destination)
    }

    /// Pairs waiting to be transmitted.
    pub fn queued(&self) -> usize {
        critical_section::with(|cs| self.queue.borrow_ref(cs).len())
    }
}

impl<B: AudioBlock> AudioOutputSpdif<B> {
    /// Queue one period's stereo pair.
    ///
    /// Both channels must arrive together. A lone channel is released
    /// without being queued so left and right never drift apart. When both
    /// slots are full the oldest pair is evicted. Released blocks are
    /// dropped after the interrupt is re-enabled.
    pub fn produce(&self, left: Option<B>, right: Option<B>) -> Delivery {
        let (left, right) = match (left, right) {
            (Some(left), Some(right)) => (left, right),
            (None, None) => return Delivery::Empty,
            partial => {
                trace!("spdif: dropping single-channel delivery");
                drop(partial);
                return Delivery::Incomplete;
            }
        };

        let evicted =
            critical_section::with(|cs| self.queue.borrow_ref_mut(cs).push(left, right));

        match evicted {
            (None, None) => Delivery::Queued,
            evicted => {
                debug!("spdif: queue overrun, dropping oldest pair");
                drop(evicted);
                Delivery::Overrun
            }
        }
    }

    /// Transmit interrupt body. Call it from the DMA channel's ISR.
    ///
    /// Encodes the front pair (silence for an empty channel) into the half
    /// the engine is not reading, releases the pair once both channels were
    /// real, then ticks `graph`. Returns the half that was written.
    pub fn on_transfer_boundary<E, G>(&self, engine: &mut E, graph: &mut G) -> Half
    where
        E: TransferEngine + ?Sized,
        G: AudioGraph + ?Sized,
    {
        engine.acknowledge_interrupt();
        let half = Half::write_target(engine.current_read_offset());

        let released = critical_section::with(|cs| {
            let mut queue = self.queue.borrow_ref_mut(cs);
            let (left, right) = queue.front();

            // SAFETY: the interrupt is the ring's only writer and doesn't
            // nest, and `half` is the half the engine isn't reading.
            let dest = unsafe { self.ring.half_mut(half) };
            interleave(dest, left.samples(), right.samples());

            compiler_fence(Ordering::SeqCst);
            engine.flush_dcache(&dest[..]);

            queue.advance()
        });
        drop(released);

        graph.update_all();
        half
    }
}

impl<B> Default for AudioOutputSpdif<B> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::block::BlockPool;
    use crate::constants::AUDIO_BLOCK_SAMPLES;
    use crate::io::encode::{decode_sample, encode_sample};
    use crate::io::engine::SimulatedEngine;
    use crate::io::geometry::{HALF_BYTES, HALF_WORDS};
    use std::boxed::Box;

    const STL: u32 = 0x4038_002C;

    fn fresh_pool() -> &'static BlockPool {
        Box::leak(Box::new(BlockPool::new()))
    }

    /// Helper: allocate a block filled with a constant value.
    fn make_block(pool: &'static BlockPool, value: i16) -> AudioBlockRef {
        let mut block = pool.alloc().unwrap();
        block.fill(value);
        block.into_shared()
    }

    fn armed(output: &AudioOutputSpdif) -> SimulatedEngine {
        let mut engine = SimulatedEngine::new();
        engine.arm(&output.descriptor(STL)).unwrap();
        engine.enable();
        engine
    }

    /// Decode the constant (left, right) pair held by `half`, asserting every
    /// frame carries the same pair.
    fn decoded(output: &AudioOutputSpdif, half: Half) -> (i16, i16) {
        let base = half.word_offset();
        let pair = (
            decode_sample(output.ring().read(base)),
            decode_sample(output.ring().read(base + 1)),
        );
        for frame in 0..AUDIO_BLOCK_SAMPLES {
            assert_eq!(output.ring().read(base + 2 * frame), encode_sample(pair.0));
            assert_eq!(output.ring().read(base + 2 * frame + 1), encode_sample(pair.1));
        }
        pair
    }

    #[test]
    fn new_is_idle() {
        let output: AudioOutputSpdif = AudioOutputSpdif::new();
        assert_eq!(output.queued(), 0);
        assert_eq!(output.ring().read(0), 0);
    }

    #[test]
    fn descriptor_points_at_ring() {
        let output: AudioOutputSpdif = AudioOutputSpdif::new();
        let d = output.descriptor(STL);
        assert_eq!(d.source, output.ring().base_address());
        assert_eq!(d.destination, STL);
        assert_eq!(d.validate(), Ok(()));
    }

    #[test]
    fn produce_nothing_is_a_no_op() {
        let output: AudioOutputSpdif = AudioOutputSpdif::new();
        assert_eq!(output.produce(None, None), Delivery::Empty);
        assert_eq!(output.queued(), 0);
    }

    #[test]
    fn produce_single_channel_is_released() {
        let pool = fresh_pool();
        let output = AudioOutputSpdif::new();

        assert_eq!(output.produce(Some(make_block(pool, 1)), None), Delivery::Incomplete);
        assert_eq!(output.produce(None, Some(make_block(pool, 2))), Delivery::Incomplete);
        assert_eq!(output.queued(), 0);
        assert_eq!(pool.allocated(), 0);
    }

    #[test]
    fn two_pairs_fill_both_slots() {
        let pool = fresh_pool();
        let output = AudioOutputSpdif::new();

        assert_eq!(
            output.produce(Some(make_block(pool, 1)), Some(make_block(pool, -1))),
            Delivery::Queued
        );
        assert_eq!(
            output.produce(Some(make_block(pool, 2)), Some(make_block(pool, -2))),
            Delivery::Queued
        );
        assert_eq!(output.queued(), 2);
        assert_eq!(pool.allocated(), 4);
    }

    #[test]
    fn boundary_encodes_front_pair_and_releases_it() {
        let pool = fresh_pool();
        let output = AudioOutputSpdif::new();
        let mut engine = armed(&output);
        let mut ticks = 0;

        output.produce(Some(make_block(pool, 100)), Some(make_block(pool, 200)));
        output.produce(Some(make_block(pool, 300)), Some(make_block(pool, 400)));

        let half = output.on_transfer_boundary(&mut engine, &mut || ticks += 1);

        assert_eq!(half, Half::Upper);
        assert_eq!(decoded(&output, Half::Upper), (100, 200));
        assert_eq!(output.queued(), 1);
        assert_eq!(pool.allocated(), 2);
        assert_eq!(ticks, 1);

        engine.set_read_offset(HALF_BYTES);
        let half = output.on_transfer_boundary(&mut engine, &mut || ticks += 1);

        assert_eq!(half, Half::Lower);
        assert_eq!(decoded(&output, Half::Lower), (300, 400));
        assert_eq!(output.queued(), 0);
        assert_eq!(pool.allocated(), 0);
        assert_eq!(ticks, 2);
    }

    #[test]
    fn overrun_evicts_oldest_pair() {
        let pool = fresh_pool();
        let output = AudioOutputSpdif::new();
        let mut engine = armed(&output);

        output.produce(Some(make_block(pool, 1)), Some(make_block(pool, 11)));
        output.produce(Some(make_block(pool, 2)), Some(make_block(pool, 12)));
        assert_eq!(
            output.produce(Some(make_block(pool, 3)), Some(make_block(pool, 13))),
            Delivery::Overrun
        );
        assert_eq!(output.queued(), 2);
        assert_eq!(pool.allocated(), 4);

        output.on_transfer_boundary(&mut engine, &mut || {});
        assert_eq!(decoded(&output, Half::Upper), (2, 12));

        engine.set_read_offset(HALF_BYTES);
        output.on_transfer_boundary(&mut engine, &mut || {});
        assert_eq!(decoded(&output, Half::Lower), (3, 13));
        assert_eq!(pool.allocated(), 0);
    }

    #[test]
    fn empty_queue_plays_silence_without_releases() {
        let pool = fresh_pool();
        let output: AudioOutputSpdif = AudioOutputSpdif::new();
        let mut engine = armed(&output);
        unsafe {
            output.ring().half_mut(Half::Upper).fill(0xDEAD_BE00);
            output.ring().half_mut(Half::Lower).fill(0xDEAD_BE00);
        }

        output.on_transfer_boundary(&mut engine, &mut || {});
        engine.set_read_offset(HALF_BYTES);
        output.on_transfer_boundary(&mut engine, &mut || {});

        assert!((0..2 * HALF_WORDS).all(|i| output.ring().read(i) == 0));
        assert_eq!(output.queued(), 0);
        assert_eq!(pool.allocated(), 0);
    }

    #[test]
    fn held_reference_survives_transmission() {
        let pool = fresh_pool();
        let output = AudioOutputSpdif::new();
        let mut engine = armed(&output);

        let left = make_block(pool, 7);
        let kept = left.clone();
        output.produce(Some(left), Some(make_block(pool, 8)));
        output.on_transfer_boundary(&mut engine, &mut || {});

        // The graph's own reference is untouched; only ours was released.
        assert_eq!(pool.refcount(kept.slot()), 1);
        assert_eq!(pool.allocated(), 1);
        assert_eq!(kept[0], 7);
    }

    #[test]
    fn every_boundary_acknowledges_and_flushes_one_half() {
        let output: AudioOutputSpdif = AudioOutputSpdif::new();
        let mut engine = armed(&output);

        for _ in 0..3 {
            output.on_transfer_boundary(&mut engine, &mut || {});
        }
        assert_eq!(engine.acknowledged(), 3);
        assert_eq!(engine.flushed_words(), 3 * HALF_WORDS);
    }

    #[test]
    fn graph_may_produce_from_the_tick() {
        let pool = fresh_pool();
        let output = AudioOutputSpdif::new();
        let mut engine = armed(&output);
        let mut next = 0i16;

        let mut graph = || {
            next += 1;
            output.produce(Some(make_block(pool, next)), Some(make_block(pool, -next)));
        };

        output.on_transfer_boundary(&mut engine, &mut graph);
        assert_eq!(output.queued(), 1);

        engine.set_read_offset(HALF_BYTES);
        output.on_transfer_boundary(&mut engine, &mut graph);
        assert_eq!(decoded(&output, Half::Lower), (1, -1));
        assert_eq!(output.queued(), 1);
        assert_eq!(pool.allocated(), 2);
    }
}

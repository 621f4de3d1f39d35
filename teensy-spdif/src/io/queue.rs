//! Two-slot pending-block queues, one per channel.
//!
//! The producer fills them once per graph period; the transmit interrupt
//! drains them once per ring half. Slot 0 is always the next block to be
//! transmitted and is always filled before slot 1.

use crate::block::AudioBlock;
use crate::constants::AUDIO_BLOCK_SAMPLES;

/// Slots per channel.
pub const QUEUE_DEPTH: usize = 2;

/// The process-lifetime silent block. It never enters a queue and so can
/// never be released.
static SILENCE: [i16; AUDIO_BLOCK_SAMPLES] = [0; AUDIO_BLOCK_SAMPLES];

/// What the interrupt encodes for one channel.
#[derive(Debug)]
pub enum Source<'a, B> {
    /// A queued block.
    Real(&'a B),
    /// The channel's queue was empty.
    Silence,
}

impl<'a, B> Source<'a, B> {
    /// Whether the silent block stands in for this channel.
    pub fn is_silence(&self) -> bool {
        matches!(self, Source::Silence)
    }
}

impl<'a, B: AudioBlock> Source<'a, B> {
    /// Samples to encode.
    pub fn samples(&self) -> &'a [i16; AUDIO_BLOCK_SAMPLES] {
        match *self {
            Source::Real(block) => block.samples(),
            Source::Silence => &SILENCE,
        }
    }
}

/// FIFO of at most two blocks for one channel.
#[derive(Debug)]
pub struct ChannelQueue<B> {
    slots: [Option<B>; QUEUE_DEPTH],
}

impl<B> ChannelQueue<B> {
    /// An empty queue.
    pub const fn new() -> Self {
        ChannelQueue { slots: [None, None] }
    }

    /// Append `block`. When both slots are taken the oldest block is
    /// evicted and handed back for release.
    pub fn push(&mut self, block: B) -> Option<B> {
        match &mut self.slots {
            [first @ None, _] => {
                *first = Some(block);
                None
            }
            [Some(_), second @ None] => {
                *second = Some(block);
                None
            }
            [first @ Some(_), second @ Some(_)] => {
                let evicted = first.take();
                *first = second.replace(block);
                evicted
            }
        }
    }

    /// Next block to transmit.
    pub fn front(&self) -> Option<&B> {
        self.slots[0].as_ref()
    }

    /// Remove the front block and move slot 1 up.
    pub fn pop(&mut self) -> Option<B> {
        let front = self.slots[0].take();
        self.slots[0] = self.slots[1].take();
        front
    }

    /// Occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether no block is pending.
    pub fn is_empty(&self) -> bool {
        self.slots[0].is_none()
    }
}

impl<B> Default for ChannelQueue<B> {
    fn default() -> Self {
        Self::new()
    }
}

/// Left and right queues, advanced in lockstep.
#[derive(Debug)]
pub struct StereoQueue<B> {
    left: ChannelQueue<B>,
    right: ChannelQueue<B>,
}

impl<B> StereoQueue<B> {
    /// Empty queues.
    pub const fn new() -> Self {
        StereoQueue {
            left: ChannelQueue::new(),
            right: ChannelQueue::new(),
        }
    }

    /// Append a stereo pair. Returns the evicted pair on overrun.
    pub fn push(&mut self, left: B, right: B) -> (Option<B>, Option<B>) {
        (self.left.push(left), self.right.push(right))
    }

    /// What the next interrupt encodes for each channel.
    pub fn front(&self) -> (Source<'_, B>, Source<'_, B>) {
        (source(self.left.front()), source(self.right.front()))
    }

    /// Consume the front pair, but only when both channels had a real block.
    ///
    /// A channel that fell back to silence leaves the other channel's block
    /// queued, so the channels never drift apart.
    pub fn advance(&mut self) -> Option<(B, B)> {
        if self.left.is_empty() || self.right.is_empty() {
            return None;
        }
        match (self.left.pop(), self.right.pop()) {
            (Some(left), Some(right)) => Some((left, right)),
            _ => None,
        }
    }

    /// Occupied slots in the fuller channel.
    pub fn len(&self) -> usize {
        self.left.len().max(self.right.len())
    }

    /// Whether neither channel has a pending block.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }

    /// The left channel's queue.
    pub fn left(&self) -> &ChannelQueue<B> {
        &self.left
    }

    /// The right channel's queue.
    pub fn right(&self) -> &ChannelQueue<B> {
        &self.right
    }
}

fn source<B>(block: Option<&B>) -> Source<'_, B> {
    block.map_or(Source::Silence, Source::Real)
}

impl<B> Default for StereoQueue<B> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use proptest::prelude::*;
    use std::collections::VecDeque;
    use std::vec::Vec;

    #[test]
    fn fills_slot_zero_then_one() {
        let mut q = ChannelQueue::new();
        assert_eq!(q.push(1), None);
        assert_eq!(q.front(), Some(&1));
        assert_eq!(q.push(2), None);
        assert_eq!(q.front(), Some(&1));
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn overrun_evicts_oldest() {
        let mut q = ChannelQueue::new();
        q.push(1);
        q.push(2);
        assert_eq!(q.push(3), Some(1));
        assert_eq!(q.pop(), Some(2));
        assert_eq!(q.pop(), Some(3));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn pop_rotates_left() {
        let mut q = ChannelQueue::new();
        q.push(1);
        q.push(2);
        assert_eq!(q.pop(), Some(1));
        assert_eq!(q.front(), Some(&2));
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn stereo_overrun_evicts_pair() {
        let mut q = StereoQueue::new();
        assert_eq!(q.push(10, 20), (None, None));
        assert_eq!(q.push(11, 21), (None, None));
        assert_eq!(q.push(12, 22), (Some(10), Some(20)));
        assert_eq!(q.left().front(), Some(&11));
        assert_eq!(q.right().front(), Some(&21));
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn empty_front_is_silence() {
        let q: StereoQueue<u32> = StereoQueue::new();
        let (left, right) = q.front();
        assert!(left.is_silence());
        assert!(right.is_silence());
    }

    #[test]
    fn advance_requires_both_channels() {
        let mut q = StereoQueue::new();
        q.left.push(1);
        assert!(q.right().front().is_none());
        let (left, right) = q.front();
        assert!(!left.is_silence());
        assert!(right.is_silence());

        assert_eq!(q.advance(), None);
        assert_eq!(q.left().front(), Some(&1));

        q.right.push(2);
        assert_eq!(q.advance(), Some((1, 2)));
        assert!(q.is_empty());
    }

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Push,
        Consume,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![Just(Op::Push), Just(Op::Consume)]
    }

    proptest! {
        #[test]
        fn matches_bounded_fifo_model(ops in proptest::collection::vec(op(), 0..64)) {
            let mut queue = StereoQueue::new();
            let mut model: VecDeque<u32> = VecDeque::new();
            let mut evicted = Vec::new();
            let mut next = 0u32;

            for op in ops {
                match op {
                    Op::Push => {
                        let dropped = queue.push(next, next + 1000);
                        model.push_back(next);
                        if model.len() > QUEUE_DEPTH {
                            let oldest = model.pop_front().unwrap();
                            prop_assert_eq!(dropped, (Some(oldest), Some(oldest + 1000)));
                            evicted.push(oldest);
                        } else {
                            prop_assert_eq!(dropped, (None, None));
                        }
                        next += 1;
                    }
                    Op::Consume => {
                        let expected = model.pop_front().map(|l| (l, l + 1000));
                        prop_assert_eq!(queue.advance(), expected);
                    }
                }
                prop_assert!(queue.left().len() <= QUEUE_DEPTH);
                prop_assert_eq!(queue.left().len(), model.len());
                prop_assert_eq!(queue.right().len(), model.len());
                prop_assert_eq!(queue.left().front(), model.front());
            }
            // Every eviction is of a distinct, oldest-first block.
            prop_assert!(evicted.windows(2).all(|w| w[0] < w[1]));
        }
    }
}

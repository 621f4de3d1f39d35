//! The DMA engine behind the transmit ring.
//!
//! [`TransferEngine`] is the narrow surface the transmit interrupt needs from
//! the hardware. The i.MX RT eDMA implementation lives in `hw::edma` (feature
//! `imxrt1062`); [`SimulatedEngine`] walks the ring deterministically so the
//! queue and interrupt logic can be exercised on a host.

use super::encode::WORDS_PER_FRAME;
use super::geometry::{
    Boundary, DescriptorError, TransferDescriptor, MAJOR_ITERATIONS, WORD_BYTES,
};
use super::ring::TransmitRing;

/// A DMA channel that endlessly feeds the transmitter from the ring.
pub trait TransferEngine {
    /// Error raised while arming.
    type Error;

    /// Program the channel with `descriptor`. Called once at start-up.
    fn arm(&mut self, descriptor: &TransferDescriptor) -> Result<(), Self::Error>;

    /// Start honoring the peripheral's service requests.
    fn enable(&mut self);

    /// Live source position, in bytes from the ring base.
    fn current_read_offset(&self) -> usize;

    /// Clear this channel's pending interrupt.
    fn acknowledge_interrupt(&mut self);

    /// Write `region` back from the data cache so the engine sees it.
    ///
    /// The default does nothing, for cores without a data cache in front of
    /// DMA memory.
    fn flush_dcache(&mut self, region: &[u32]) {
        let _ = region;
    }
}

/// One simulated service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    /// The frame written to the left/right data registers.
    pub frame: [u32; WORDS_PER_FRAME],
    /// Set when this request completed a half or the whole traversal.
    pub boundary: Option<Boundary>,
}

/// Host-side stand-in for the DMA engine.
///
/// Every [`step`](Self::step) performs one minor loop exactly as the armed
/// descriptor describes it and latches an interrupt at the half and major
/// boundaries.
#[derive(Debug, Default)]
pub struct SimulatedEngine {
    descriptor: Option<TransferDescriptor>,
    enabled: bool,
    /// Source offset in bytes from the ring base.
    read_offset: usize,
    /// Remaining major iterations (CITER).
    iterations_left: u16,
    interrupt_pending: bool,
    acknowledged: u32,
    flushed_words: usize,
}

impl SimulatedEngine {
    /// An unarmed engine.
    pub const fn new() -> Self {
        SimulatedEngine {
            descriptor: None,
            enabled: false,
            read_offset: 0,
            iterations_left: 0,
            interrupt_pending: false,
            acknowledged: 0,
            flushed_words: 0,
        }
    }

    /// The descriptor passed to the last successful `arm`.
    pub fn descriptor(&self) -> Option<&TransferDescriptor> {
        self.descriptor.as_ref()
    }

    /// Whether `enable` was called.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether an interrupt is latched and not yet acknowledged.
    pub fn interrupt_pending(&self) -> bool {
        self.interrupt_pending
    }

    /// Number of `acknowledge_interrupt` calls.
    pub fn acknowledged(&self) -> u32 {
        self.acknowledged
    }

    /// Total words passed to `flush_dcache`.
    pub fn flushed_words(&self) -> usize {
        self.flushed_words
    }

    /// Move the source cursor, e.g. to model interrupts that were never
    /// serviced. `offset` must be frame aligned.
    pub fn set_read_offset(&mut self, offset: usize) {
        let Some(descriptor) = self.descriptor else {
            return;
        };
        let frame_bytes = descriptor.minor_loop_bytes as usize;
        let traversal = frame_bytes * usize::from(descriptor.beginning_iterations);
        debug_assert_eq!(offset % frame_bytes, 0);
        self.read_offset = offset % traversal;
        self.iterations_left = descriptor.beginning_iterations - (self.read_offset / frame_bytes) as u16;
    }

    /// Perform one service request against `ring`.
    ///
    /// Returns `None` while the engine is unarmed or disabled.
    pub fn step(&mut self, ring: &TransmitRing) -> Option<Transfer> {
        let descriptor = self.descriptor?;
        if !self.enabled {
            return None;
        }

        let stride = descriptor.source_offset as usize;
        let mut frame = [0u32; WORDS_PER_FRAME];
        for word in frame.iter_mut() {
            *word = ring.read(self.read_offset / WORD_BYTES);
            self.read_offset += stride;
        }

        self.iterations_left -= 1;
        let boundary = if self.iterations_left == 0 {
            self.read_offset = (self.read_offset as isize
                + descriptor.source_last_adjustment as isize) as usize;
            self.iterations_left = descriptor.beginning_iterations;
            descriptor.interrupt_on_major.then_some(Boundary::Complete)
        } else if self.iterations_left == descriptor.beginning_iterations / 2 {
            descriptor.interrupt_on_half.then_some(Boundary::Half)
        } else {
            None
        };
        if boundary.is_some() {
            self.interrupt_pending = true;
        }

        Some(Transfer { frame, boundary })
    }

    /// Step until the next interrupt, handing every frame to `sink`.
    ///
    /// Returns `None` while the engine is unarmed or disabled.
    pub fn run_to_boundary<F>(&mut self, ring: &TransmitRing, mut sink: F) -> Option<Boundary>
    where
        F: FnMut([u32; WORDS_PER_FRAME]),
    {
        for _ in 0..MAJOR_ITERATIONS {
            let transfer = self.step(ring)?;
            sink(transfer.frame);
            if transfer.boundary.is_some() {
                return transfer.boundary;
            }
        }
        None
    }
}

impl TransferEngine for SimulatedEngine {
    type Error = DescriptorError;

    fn arm(&mut self, descriptor: &TransferDescriptor) -> Result<(), Self::Error> {
        descriptor.validate()?;
        self.descriptor = Some(*descriptor);
        self.read_offset = 0;
        self.iterations_left = descriptor.current_iterations;
        self.interrupt_pending = false;
        Ok(())
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn current_read_offset(&self) -> usize {
        self.read_offset
    }

    fn acknowledge_interrupt(&mut self) {
        self.interrupt_pending = false;
        self.acknowledged += 1;
    }

    fn flush_dcache(&mut self, region: &[u32]) {
        self.flushed_words += region.len();
    }
}

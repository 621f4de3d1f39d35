//! Circular transmit buffer geometry and the DMA descriptor that walks it.
//!
//! ```text
//!   ring base                      midpoint                         wrap
//!   │◄──────── half A (lower) ──────►│◄──────── half B (upper) ───────►│
//!   │ 256 words = 128 frames         │ 256 words = 128 frames          │
//!   └────────────────────────────────┴─────────────────────────────────┘
//!            ▲ INTHALF fires here ───┘         INTMAJOR fires here ───┘
//! ```
//!
//! Each service request moves one frame (two words) into the transmitter's
//! left/right data registers. The destination address steps by one word
//! inside the minor loop and is pulled back by the minor-loop offset, so it
//! lands on the left register again for every frame. After the last
//! iteration the source is pulled back to the ring base. Software never
//! recomputes an address.

use super::encode::{ENCODED_BLOCK_WORDS, WORDS_PER_FRAME};

/// Size of one transfer word in bytes.
pub const WORD_BYTES: usize = core::mem::size_of::<u32>();

/// Words in one ring half. A half holds exactly one encoded stereo block.
pub const HALF_WORDS: usize = ENCODED_BLOCK_WORDS;

/// Words in the whole ring.
pub const RING_WORDS: usize = HALF_WORDS * 2;

/// Bytes in one ring half.
pub const HALF_BYTES: usize = HALF_WORDS * WORD_BYTES;

/// Bytes in the whole ring.
pub const RING_BYTES: usize = RING_WORDS * WORD_BYTES;

/// Bytes moved per service request (one stereo frame).
pub const MINOR_LOOP_BYTES: usize = WORDS_PER_FRAME * WORD_BYTES;

/// Service requests per full ring traversal.
pub const MAJOR_ITERATIONS: usize = RING_BYTES / MINOR_LOOP_BYTES;

/// Required ring alignment: one data cache line.
pub const RING_ALIGN: usize = 32;

/// eDMA transfer size encoding for 32-bit accesses.
const SIZE_32_BIT: u16 = 0b010;

const NBYTES_DMLOE: u32 = 1 << 30;
const NBYTES_MLOFF_SHIFT: u32 = 10;
const NBYTES_MLOFF_MASK: u32 = 0xF_FFFF;
const NBYTES_NBYTES_MASK: u32 = 0x3FF;

const CSR_INTMAJOR: u16 = 1 << 1;
const CSR_INTHALF: u16 = 1 << 2;

/// One half of the ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Half {
    /// Words `0..256`.
    Lower,
    /// Words `256..512`.
    Upper,
}

impl Half {
    /// Pick the half that is safe to write, given where the engine reads now.
    ///
    /// `read_offset` is the engine's live source offset in bytes from the ring
    /// base. Below the midpoint the engine is still draining the lower half,
    /// so the upper half is free. At or past the midpoint it has crossed into
    /// the upper half and the lower half is free. Because the choice comes
    /// from live engine state, a missed interrupt can't leave it out of phase.
    pub const fn write_target(read_offset: usize) -> Half {
        if read_offset % RING_BYTES < HALF_BYTES {
            Half::Upper
        } else {
            Half::Lower
        }
    }

    /// Offset of this half in words.
    pub const fn word_offset(self) -> usize {
        match self {
            Half::Lower => 0,
            Half::Upper => HALF_WORDS,
        }
    }

    /// Offset of this half in bytes.
    pub const fn byte_offset(self) -> usize {
        self.word_offset() * WORD_BYTES
    }

    /// The other half.
    pub const fn other(self) -> Half {
        match self {
            Half::Lower => Half::Upper,
            Half::Upper => Half::Lower,
        }
    }
}

/// Which traversal point raised the transfer interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Boundary {
    /// The engine finished the lower half.
    Half,
    /// The engine finished the upper half and wrapped to the base.
    Complete,
}

/// Reasons a descriptor can't be armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DescriptorError {
    /// Ring base is not cache-line aligned.
    UnalignedSource {
        /// Offending source address.
        address: u32,
    },
    /// Destination register is not word aligned.
    UnalignedDestination {
        /// Offending destination address.
        address: u32,
    },
    /// Beginning and current major iteration counts differ.
    IterationMismatch,
    /// Source advance per traversal doesn't match the last-address adjustment.
    WrapMismatch,
    /// Destination doesn't return to the left data register every frame.
    DestinationDrift,
    /// Half or major interrupt is disabled.
    MissingInterrupt,
}

impl core::fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DescriptorError::UnalignedSource { address } => {
                write!(f, "ring base {address:#010X} is not {RING_ALIGN}-byte aligned")
            }
            DescriptorError::UnalignedDestination { address } => {
                write!(f, "destination {address:#010X} is not word aligned")
            }
            DescriptorError::IterationMismatch => f.write_str("CITER and BITER differ"),
            DescriptorError::WrapMismatch => {
                f.write_str("source last adjustment does not rewind one traversal")
            }
            DescriptorError::DestinationDrift => {
                f.write_str("destination offsets do not return to the data register")
            }
            DescriptorError::MissingInterrupt => {
                f.write_str("half and major interrupts must both be enabled")
            }
        }
    }
}

/// Transfer control descriptor for the endless ring traversal.
///
/// Built once by [`circular`](Self::circular) and never mutated afterwards.
/// Fields mirror the eDMA TCD; the register encoders produce the raw values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferDescriptor {
    /// SADDR: ring base.
    pub source: u32,
    /// SOFF: source step per read, in bytes.
    pub source_offset: i16,
    /// NBYTES: bytes per service request.
    pub minor_loop_bytes: u32,
    /// MLOFF, applied to the destination after every minor loop.
    pub destination_minor_loop_offset: i32,
    /// SLAST: source adjustment after the last iteration.
    pub source_last_adjustment: i32,
    /// DADDR: transmitter left data register.
    pub destination: u32,
    /// DOFF: destination step per write, in bytes.
    pub destination_offset: i16,
    /// CITER.
    pub current_iterations: u16,
    /// BITER.
    pub beginning_iterations: u16,
    /// DLAST_SGA: destination adjustment after the last iteration.
    pub destination_last_adjustment: i32,
    /// CSR.INTHALF.
    pub interrupt_on_half: bool,
    /// CSR.INTMAJOR.
    pub interrupt_on_major: bool,
}

impl TransferDescriptor {
    /// Describe an endless traversal of the ring at `source`, writing each
    /// frame into the left/right register pair starting at `destination`.
    pub const fn circular(source: u32, destination: u32) -> Self {
        TransferDescriptor {
            source,
            source_offset: WORD_BYTES as i16,
            minor_loop_bytes: MINOR_LOOP_BYTES as u32,
            destination_minor_loop_offset: -(MINOR_LOOP_BYTES as i32),
            source_last_adjustment: -(RING_BYTES as i32),
            destination,
            destination_offset: WORD_BYTES as i16,
            current_iterations: MAJOR_ITERATIONS as u16,
            beginning_iterations: MAJOR_ITERATIONS as u16,
            destination_last_adjustment: -(MINOR_LOOP_BYTES as i32),
            interrupt_on_half: true,
            interrupt_on_major: true,
        }
    }

    /// Check that the descriptor walks the ring the way the transmit
    /// interrupt expects.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if self.source as usize % RING_ALIGN != 0 {
            return Err(DescriptorError::UnalignedSource {
                address: self.source,
            });
        }
        if self.destination as usize % WORD_BYTES != 0 {
            return Err(DescriptorError::UnalignedDestination {
                address: self.destination,
            });
        }
        if self.current_iterations != self.beginning_iterations {
            return Err(DescriptorError::IterationMismatch);
        }
        let traversal = i64::from(self.beginning_iterations) * i64::from(self.minor_loop_bytes);
        if self.source_offset as i64 * WORDS_PER_FRAME as i64 != i64::from(self.minor_loop_bytes)
            || traversal != RING_BYTES as i64
            || i64::from(self.source_last_adjustment) != -traversal
        {
            return Err(DescriptorError::WrapMismatch);
        }
        let per_frame = self.destination_offset as i32 * WORDS_PER_FRAME as i32;
        if per_frame + self.destination_minor_loop_offset != 0
            || per_frame + self.destination_last_adjustment != 0
        {
            return Err(DescriptorError::DestinationDrift);
        }
        if !(self.interrupt_on_half && self.interrupt_on_major) {
            return Err(DescriptorError::MissingInterrupt);
        }
        Ok(())
    }

    /// TCD ATTR: 32-bit source and destination, no modulo.
    pub const fn attr_register(&self) -> u16 {
        (SIZE_32_BIT << 8) | SIZE_32_BIT
    }

    /// TCD NBYTES in minor-loop-offset form (DMLOE set, SMLOE clear).
    pub const fn nbytes_register(&self) -> u32 {
        NBYTES_DMLOE
            | ((self.destination_minor_loop_offset as u32 & NBYTES_MLOFF_MASK) << NBYTES_MLOFF_SHIFT)
            | (self.minor_loop_bytes & NBYTES_NBYTES_MASK)
    }

    /// TCD CSR: half/major interrupt enables, everything else clear.
    pub const fn csr_register(&self) -> u16 {
        let mut csr = 0;
        if self.interrupt_on_half {
            csr |= CSR_INTHALF;
        }
        if self.interrupt_on_major {
            csr |= CSR_INTMAJOR;
        }
        csr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const RING: u32 = 0x2020_0000;
    const STL: u32 = 0x4038_002C;

    #[test]
    fn ring_dimensions() {
        assert_eq!(RING_WORDS, 512);
        assert_eq!(HALF_BYTES, 1024);
        assert_eq!(RING_BYTES, 2048);
        assert_eq!(MINOR_LOOP_BYTES, 8);
        assert_eq!(MAJOR_ITERATIONS, 256);
    }

    #[test]
    fn midpoint_belongs_to_upper_half() {
        // Exactly at the midpoint the engine has started on the upper half.
        assert_eq!(Half::write_target(HALF_BYTES), Half::Lower);
        assert_eq!(Half::write_target(HALF_BYTES - MINOR_LOOP_BYTES), Half::Upper);
        assert_eq!(Half::write_target(0), Half::Upper);
        assert_eq!(Half::write_target(RING_BYTES - MINOR_LOOP_BYTES), Half::Lower);
        // Wrapped back to the base.
        assert_eq!(Half::write_target(RING_BYTES), Half::Upper);
    }

    proptest! {
        #[test]
        fn write_target_is_never_the_half_being_read(offset in 0usize..RING_BYTES) {
            let target = Half::write_target(offset);
            let reading = if offset < HALF_BYTES { Half::Lower } else { Half::Upper };
            prop_assert_eq!(target, reading.other());
            prop_assert!(
                offset < target.byte_offset() || offset >= target.byte_offset() + HALF_BYTES
            );
        }
    }

    #[test]
    fn half_offsets() {
        assert_eq!(Half::Lower.word_offset(), 0);
        assert_eq!(Half::Upper.word_offset(), 256);
        assert_eq!(Half::Upper.byte_offset(), 0x0400);
        assert_eq!(Half::Lower.other(), Half::Upper);
    }

    #[test]
    fn circular_descriptor_fields() {
        let d = TransferDescriptor::circular(RING, STL);
        assert_eq!(d.source, RING);
        assert_eq!(d.source_offset, 4);
        assert_eq!(d.minor_loop_bytes, 8);
        assert_eq!(d.destination_minor_loop_offset, -8);
        assert_eq!(d.source_last_adjustment, -2048);
        assert_eq!(d.destination, STL);
        assert_eq!(d.destination_offset, 4);
        assert_eq!(d.current_iterations, 256);
        assert_eq!(d.beginning_iterations, 256);
        assert_eq!(d.destination_last_adjustment, -8);
        assert!(d.interrupt_on_half && d.interrupt_on_major);
        assert_eq!(d.validate(), Ok(()));
    }

    #[test]
    fn register_encodings() {
        let d = TransferDescriptor::circular(RING, STL);
        assert_eq!(d.attr_register(), 0x0202);
        assert_eq!(d.nbytes_register(), 0x7FFF_E008);
        assert_eq!(d.csr_register(), 0x0006);
    }

    #[test]
    fn validate_rejects_broken_geometry() {
        let good = TransferDescriptor::circular(RING, STL);

        let d = TransferDescriptor { source: RING + 4, ..good };
        assert_eq!(d.validate(), Err(DescriptorError::UnalignedSource { address: RING + 4 }));

        let d = TransferDescriptor { destination: STL + 2, ..good };
        assert_eq!(d.validate(), Err(DescriptorError::UnalignedDestination { address: STL + 2 }));

        let d = TransferDescriptor { current_iterations: 128, ..good };
        assert_eq!(d.validate(), Err(DescriptorError::IterationMismatch));

        let d = TransferDescriptor { source_last_adjustment: -1024, ..good };
        assert_eq!(d.validate(), Err(DescriptorError::WrapMismatch));

        let d = TransferDescriptor { destination_minor_loop_offset: 0, ..good };
        assert_eq!(d.validate(), Err(DescriptorError::DestinationDrift));

        let d = TransferDescriptor { interrupt_on_half: false, ..good };
        assert_eq!(d.validate(), Err(DescriptorError::MissingInterrupt));
    }
}

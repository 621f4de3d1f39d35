//! eDMA channel that feeds the transmitter.

use crate::io::{DescriptorError, TransferDescriptor, TransferEngine};

use super::ral::{dma, dmamux, Static, DMA, MULTIPLEXER};

/// Number of eDMA channels on the i.MX RT1060.
pub const CHANNEL_COUNT: usize = 32;

/// Data cache line size of the Cortex-M7.
const DCACHE_LINE: usize = 32;

/// An eDMA channel driving the S/PDIF transmit ring.
///
/// Once armed, the channel walks the ring forever; software only reads its
/// live source address and clears its interrupt.
pub struct EdmaChannel {
    /// Our channel number, within `0..CHANNEL_COUNT`.
    index: usize,
    /// Ring base from the armed descriptor.
    ring_base: u32,
    registers: Static<dma::RegisterBlock>,
    multiplexer: Static<dmamux::RegisterBlock>,
}

impl EdmaChannel {
    /// Creates the DMA channel described by `index`, or `None` when there is
    /// no such channel.
    ///
    /// # Safety
    ///
    /// The handle aliases global, mutable DMA state. Nothing else may use
    /// channel `index`.
    pub unsafe fn new(index: usize) -> Option<Self> {
        (index < CHANNEL_COUNT).then_some(EdmaChannel {
            index,
            ring_base: 0,
            registers: DMA,
            multiplexer: MULTIPLEXER,
        })
    }

    /// Returns the DMA channel number.
    pub fn channel(&self) -> usize {
        self.index
    }

    fn tcd(&self) -> &dma::Tcd {
        &self.registers.TCD[self.index]
    }

    fn program(&self, descriptor: &TransferDescriptor) {
        let tcd = self.tcd();
        tcd.CSR.write(0);
        tcd.SADDR.write(descriptor.source);
        tcd.SOFF.write(descriptor.source_offset);
        tcd.ATTR.write(descriptor.attr_register());
        tcd.NBYTES.write(descriptor.nbytes_register());
        tcd.SLAST.write(descriptor.source_last_adjustment);
        tcd.DADDR.write(descriptor.destination);
        tcd.DOFF.write(descriptor.destination_offset);
        tcd.CITER.write(descriptor.current_iterations);
        tcd.DLASTSGA.write(descriptor.destination_last_adjustment);
        tcd.BITER.write(descriptor.beginning_iterations);
        tcd.CSR.write(descriptor.csr_register());
    }
}

// SAFETY: the channel only touches its own TCD and DMAMUX slot, plus the
// byte-wide set/clear registers that target a single channel.
unsafe impl Send for EdmaChannel {}

impl TransferEngine for EdmaChannel {
    type Error = DescriptorError;

    fn arm(&mut self, descriptor: &TransferDescriptor) -> Result<(), Self::Error> {
        descriptor.validate()?;

        let index = self.index as u8;
        self.registers.CERQ.write(index);
        // NBYTES only carries the minor-loop offset with mapping enabled.
        self.registers
            .CR
            .write(self.registers.CR.read() | dma::CR_EMLM);

        self.program(descriptor);
        self.ring_base = descriptor.source;

        let chcfg = &self.multiplexer.CHCFG[self.index];
        chcfg.write(0);
        chcfg.write(dmamux::SOURCE_SPDIF_TX | dmamux::CHCFG_ENBL);

        debug!("edma: channel {} armed", self.index);
        Ok(())
    }

    fn enable(&mut self) {
        self.registers.SERQ.write(self.index as u8);
    }

    fn current_read_offset(&self) -> usize {
        self.tcd().SADDR.read().wrapping_sub(self.ring_base) as usize
    }

    fn acknowledge_interrupt(&mut self) {
        self.registers.CINT.write(self.index as u8);
    }

    fn flush_dcache(&mut self, region: &[u32]) {
        let start = region.as_ptr() as usize & !(DCACHE_LINE - 1);
        let end = region.as_ptr() as usize + core::mem::size_of_val(region);

        cortex_m::asm::dsb();
        // SAFETY: clean-and-invalidate by address is harmless for any
        // address, and the region is whole cache lines of the ring.
        unsafe {
            let cbp = &*cortex_m::peripheral::CBP::PTR;
            for line in (start..end).step_by(DCACHE_LINE) {
                cbp.dccimvac.write(line as u32);
            }
        }
        cortex_m::asm::dsb();
        cortex_m::asm::isb();
    }
}

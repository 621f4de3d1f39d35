//! Register blocks for the peripherals the transmitter touches.
//!
//! Registers the transmitter uses, and a few of their neighbours, are
//! named; the rest is padding. Offsets follow the i.MX RT1060 reference
//! manual.

#![allow(dead_code, non_snake_case, clippy::upper_case_acronyms)]

use core::ops::Deref;

use ral_registers::RWRegister;

/// A pointer to a register block that lives forever.
pub struct Static<T>(pub(crate) *const T);

impl<T> Clone for Static<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Static<T> {}

impl<T> Deref for Static<T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: every `Static` is built from a fixed peripheral address.
        unsafe { &*self.0 }
    }
}

pub mod dma {
    use super::RWRegister;

    /// Enable minor loop mapping (NBYTES carries MLOFF).
    pub const CR_EMLM: u32 = 1 << 7;

    /// Transfer control descriptor, 32 bytes.
    #[repr(C)]
    pub struct Tcd {
        pub SADDR: RWRegister<u32>,
        pub SOFF: RWRegister<i16>,
        pub ATTR: RWRegister<u16>,
        pub NBYTES: RWRegister<u32>,
        pub SLAST: RWRegister<i32>,
        pub DADDR: RWRegister<u32>,
        pub DOFF: RWRegister<i16>,
        pub CITER: RWRegister<u16>,
        pub DLASTSGA: RWRegister<i32>,
        pub CSR: RWRegister<u16>,
        pub BITER: RWRegister<u16>,
    }

    #[repr(C)]
    pub struct RegisterBlock {
        pub CR: RWRegister<u32>,
        pub ES: RWRegister<u32>,
        _reserved0: [u32; 1],
        pub ERQ: RWRegister<u32>,
        _reserved1: [u32; 1],
        pub EEI: RWRegister<u32>,
        pub CEEI: RWRegister<u8>,
        pub SEEI: RWRegister<u8>,
        pub CERQ: RWRegister<u8>,
        pub SERQ: RWRegister<u8>,
        pub CDNE: RWRegister<u8>,
        pub SSRT: RWRegister<u8>,
        pub CERR: RWRegister<u8>,
        pub CINT: RWRegister<u8>,
        _reserved2: [u8; 0x1000 - 0x20],
        pub TCD: [Tcd; 32],
    }
}

pub mod dmamux {
    use super::RWRegister;

    /// Channel enable.
    pub const CHCFG_ENBL: u32 = 1 << 31;

    /// Request source: S/PDIF transmitter.
    pub const SOURCE_SPDIF_TX: u32 = 36;

    #[repr(C)]
    pub struct RegisterBlock {
        pub CHCFG: [RWRegister<u32>; 32],
    }
}

pub mod spdif {
    use super::RWRegister;

    // ── SCR ───────────────────────────────────────────────────────────
    pub const SCR_USRC_SEL_SHIFT: u32 = 0;
    pub const SCR_TXSEL_SHIFT: u32 = 2;
    pub const SCR_VALCTRL: u32 = 1 << 5;
    pub const SCR_DMA_TX_EN: u32 = 1 << 8;
    pub const SCR_DMA_RX_EN: u32 = 1 << 9;
    pub const SCR_TXFIFO_CTRL_SHIFT: u32 = 10;
    pub const SCR_SOFT_RESET: u32 = 1 << 12;
    pub const SCR_TXFIFOEMPTY_SEL_SHIFT: u32 = 15;
    pub const SCR_TXAUTOSYNC: u32 = 1 << 17;
    pub const SCR_RXAUTOSYNC: u32 = 1 << 18;
    pub const SCR_RXFIFOFULL_SEL_SHIFT: u32 = 19;

    // ── SRPC ──────────────────────────────────────────────────────────
    pub const SRPC_GAINSEL_SHIFT: u32 = 3;
    pub const SRPC_CLKSRC_SEL_SHIFT: u32 = 7;

    // ── STC ───────────────────────────────────────────────────────────
    pub const STC_TXCLK_DF_MASK: u32 = 0x7F;
    pub const STC_TX_ALL_CLK_EN: u32 = 1 << 7;
    pub const STC_TXCLK_SOURCE_SHIFT: u32 = 8;

    #[repr(C)]
    pub struct RegisterBlock {
        pub SCR: RWRegister<u32>,
        pub SRCD: RWRegister<u32>,
        pub SRPC: RWRegister<u32>,
        _reserved0: [u32; 8],
        pub STL: RWRegister<u32>,
        pub STR: RWRegister<u32>,
        _reserved1: [u32; 7],
        pub STC: RWRegister<u32>,
    }
}

pub mod ccm_analog {
    use super::RWRegister;

    pub const PLL_AUDIO_DIV_SELECT_MASK: u32 = 0x7F;
    pub const PLL_AUDIO_POWERDOWN: u32 = 1 << 12;
    pub const PLL_AUDIO_ENABLE: u32 = 1 << 13;
    pub const PLL_AUDIO_BYPASS: u32 = 1 << 16;
    pub const PLL_AUDIO_POST_DIV_SELECT_SHIFT: u32 = 19;
    /// POST_DIV_SELECT value for divide-by-one.
    pub const PLL_AUDIO_POST_DIV_1: u32 = 0b10;
    pub const PLL_AUDIO_LOCK: u32 = 1 << 31;

    /// NUM and DENOM are 30 bits wide.
    pub const PLL_AUDIO_FRACTION_MASK: u32 = 0x3FFF_FFFF;

    pub const MISC2_AUDIO_DIV_LSB: u32 = 1 << 15;
    pub const MISC2_AUDIO_DIV_MSB: u32 = 1 << 23;

    #[repr(C)]
    pub struct RegisterBlock {
        _reserved0: [u32; 0x70 / 4],
        pub PLL_AUDIO: RWRegister<u32>,
        _reserved1: [u32; 3],
        pub PLL_AUDIO_NUM: RWRegister<u32>,
        _reserved2: [u32; 3],
        pub PLL_AUDIO_DENOM: RWRegister<u32>,
        _reserved3: [u32; (0x170 - 0x94) / 4],
        pub MISC2: RWRegister<u32>,
    }
}

pub mod ccm {
    use super::RWRegister;

    pub const CDCDR_SPDIF0_CLK_SEL_SHIFT: u32 = 20;
    pub const CDCDR_SPDIF0_CLK_PODF_SHIFT: u32 = 22;
    pub const CDCDR_SPDIF0_CLK_PRED_SHIFT: u32 = 25;
    /// CLK_SEL, PODF and PRED together.
    pub const CDCDR_SPDIF0_MASK: u32 = 0x0FF0_0000;
    /// CLK_SEL value for PLL4.
    pub const CDCDR_SPDIF0_CLK_SEL_PLL4: u32 = 0;

    /// CG7 of CCGR5 gates the SPDIF clock.
    pub const CCGR5_SPDIF_MASK: u32 = 0b11 << 14;

    #[repr(C)]
    pub struct RegisterBlock {
        _reserved0: [u32; 0x30 / 4],
        pub CDCDR: RWRegister<u32>,
        _reserved1: [u32; (0x7C - 0x34) / 4],
        pub CCGR5: RWRegister<u32>,
    }
}

/// SW_MUX_CTL_PAD_GPIO_AD_B1_02, Teensy 4 pin 14.
pub mod pad {
    /// ALT3 selects SPDIF_OUT.
    pub const MUX_MODE_SPDIF_OUT: u32 = 3;
}

pub const DMA: Static<dma::RegisterBlock> = Static(0x400E_8000 as *const _);
pub const MULTIPLEXER: Static<dmamux::RegisterBlock> = Static(0x400E_C000 as *const _);
pub const SPDIF: Static<spdif::RegisterBlock> = Static(0x4038_0000 as *const _);
pub const CCM_ANALOG: Static<ccm_analog::RegisterBlock> = Static(0x400D_8000 as *const _);
pub const CCM: Static<ccm::RegisterBlock> = Static(0x400F_C000 as *const _);
pub const PAD_MUX_GPIO_AD_B1_02: Static<RWRegister<u32>> = Static(0x401F_8104 as *const _);

const _: () = {
    use core::mem::{offset_of, size_of};
    assert!(size_of::<dma::Tcd>() == 32);
    assert!(offset_of!(dma::RegisterBlock, SERQ) == 0x1B);
    assert!(offset_of!(dma::RegisterBlock, CINT) == 0x1F);
    assert!(offset_of!(dma::RegisterBlock, TCD) == 0x1000);
    assert!(offset_of!(spdif::RegisterBlock, STL) == 0x2C);
    assert!(offset_of!(spdif::RegisterBlock, STC) == 0x50);
    assert!(offset_of!(ccm_analog::RegisterBlock, PLL_AUDIO_NUM) == 0x80);
    assert!(offset_of!(ccm_analog::RegisterBlock, PLL_AUDIO_DENOM) == 0x90);
    assert!(offset_of!(ccm_analog::RegisterBlock, MISC2) == 0x170);
    assert!(offset_of!(ccm::RegisterBlock, CDCDR) == 0x30);
    assert!(offset_of!(ccm::RegisterBlock, CCGR5) == 0x7C);
};

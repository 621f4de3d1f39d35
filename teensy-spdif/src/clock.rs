//! Transmit clock derivation.
//!
//! The transmitter runs from the audio PLL (PLL4) through the SPDIF0 clock
//! root:
//!
//! ```text
//!  24 MHz ──► PLL4 × (DIV_SELECT + NUM/DENOM) ──► ÷ PRED ÷ PODF ──► SPDIF0_CLK_ROOT = 256·fs
//!                                                                     │
//!                                               STC ÷ TXCLK_DF ◄──────┘ ──► tx clock = 64·fs
//! ```
//!
//! [`ClockPlan::DEFAULT`] is worked out at compile time from
//! [`AUDIO_SAMPLE_RATE_MILLIHZ`]. All arithmetic is in integer millihertz.

use crate::constants::AUDIO_SAMPLE_RATE_MILLIHZ;

/// PLL4 reference oscillator, in millihertz.
pub const REFERENCE_MILLIHZ: u64 = 24_000_000_000;

/// Lowest PLL4 output the VCO supports, in millihertz.
pub const PLL_MIN_MILLIHZ: u64 = 648_000_000_000;

/// Highest PLL4 output the VCO supports, in millihertz.
pub const PLL_MAX_MILLIHZ: u64 = 1_300_000_000_000;

/// Denominator of the PLL4 fractional loop divider.
pub const PLL_DENOMINATOR: u32 = 10_000;

/// SPDIF0 clock root as a multiple of the sample rate.
pub const ROOT_OVERSAMPLING: u32 = 256;

/// Transmit clock as a multiple of the sample rate.
pub const TX_OVERSAMPLING: u32 = 64;

/// Largest value either clock-root divider takes.
pub const MAX_ROOT_DIVIDER: u32 = 8;

/// Receiver DPLL gain selector written to SRPC.GAINSEL.
pub const DPLL_GAIN: u8 = 0b011;

/// Every divider and multiplier the start-up sequence programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockPlan {
    /// Sample rate the plan was derived for.
    pub sample_rate_millihz: u64,
    /// PLL_AUDIO.DIV_SELECT, the integer loop divider.
    pub loop_divider: u32,
    /// PLL_AUDIO_NUM.
    pub numerator: u32,
    /// PLL_AUDIO_DENOM.
    pub denominator: u32,
    /// SPDIF0 clock-root pre-divider, 1..=8.
    pub root_pre_divider: u32,
    /// SPDIF0 clock-root post-divider, 1..=8.
    pub root_post_divider: u32,
    /// Clock root to transmit clock divider.
    pub tx_divider: u32,
    /// Receiver DPLL gain selector.
    pub dpll_gain: u8,
}

impl ClockPlan {
    /// The plan for the crate's fixed sample rate.
    pub const DEFAULT: ClockPlan = ClockPlan::derive(AUDIO_SAMPLE_RATE_MILLIHZ);

    const fn derive(sample_rate_millihz: u64) -> Self {
        let root = sample_rate_millihz * ROOT_OVERSAMPLING as u64;

        // Fixed pre-divider; the smallest post-divider that lifts the VCO
        // above its floor.
        let root_pre_divider = MAX_ROOT_DIVIDER;
        let root_post_divider =
            1 + (PLL_MIN_MILLIHZ / (root * root_pre_divider as u64)) as u32;

        let pll = root * root_pre_divider as u64 * root_post_divider as u64;
        let loop_divider = (pll / REFERENCE_MILLIHZ) as u32;
        let remainder = pll % REFERENCE_MILLIHZ;
        let numerator = (remainder * PLL_DENOMINATOR as u64 / REFERENCE_MILLIHZ) as u32;

        ClockPlan {
            sample_rate_millihz,
            loop_divider,
            numerator,
            denominator: PLL_DENOMINATOR,
            root_pre_divider,
            root_post_divider,
            tx_divider: ROOT_OVERSAMPLING / TX_OVERSAMPLING,
            dpll_gain: DPLL_GAIN,
        }
    }

    /// PLL4 output this plan actually produces, in millihertz.
    pub const fn pll_millihz(&self) -> u64 {
        REFERENCE_MILLIHZ * self.loop_divider as u64
            + REFERENCE_MILLIHZ * self.numerator as u64 / self.denominator as u64
    }

    /// SPDIF0_CLK_ROOT, in millihertz.
    pub const fn root_millihz(&self) -> u64 {
        self.pll_millihz() / (self.root_pre_divider as u64 * self.root_post_divider as u64)
    }

    /// Transmit clock, in millihertz.
    pub const fn tx_clock_millihz(&self) -> u64 {
        self.root_millihz() / self.tx_divider as u64
    }

    /// Sample rate this plan actually produces, in millihertz.
    pub const fn actual_sample_rate_millihz(&self) -> u64 {
        self.root_millihz() / ROOT_OVERSAMPLING as u64
    }

    /// CCM_CDCDR.SPDIF0_CLK_PRED field value.
    pub const fn pred_field(&self) -> u32 {
        self.root_pre_divider - 1
    }

    /// CCM_CDCDR.SPDIF0_CLK_PODF field value.
    pub const fn podf_field(&self) -> u32 {
        self.root_post_divider - 1
    }

    /// SPDIF_STC.TXCLK_DF field value.
    pub const fn txclk_df_field(&self) -> u32 {
        self.tx_divider - 1
    }
}

impl Default for ClockPlan {
    fn default() -> Self {
        Self::DEFAULT
    }
}

//! Clock, reset and pin control for the i.MX RT1062 S/PDIF transmitter.

use crate::clock::ClockPlan;
use crate::startup::SpdifPlatform;

use super::ral::{
    ccm, ccm_analog, pad, spdif, Static, CCM, CCM_ANALOG, PAD_MUX_GPIO_AD_B1_02, SPDIF,
};

/// PLL_AUDIO: bypassed, enabled, no post divider, loop divider from `plan`.
const fn pll_audio(plan: &ClockPlan) -> u32 {
    ccm_analog::PLL_AUDIO_BYPASS
        | ccm_analog::PLL_AUDIO_ENABLE
        | (ccm_analog::PLL_AUDIO_POST_DIV_1 << ccm_analog::PLL_AUDIO_POST_DIV_SELECT_SHIFT)
        | (plan.loop_divider & ccm_analog::PLL_AUDIO_DIV_SELECT_MASK)
}

/// CDCDR with the SPDIF0 root fed from PLL4 through the plan's dividers.
const fn cdcdr(current: u32, plan: &ClockPlan) -> u32 {
    (current & !ccm::CDCDR_SPDIF0_MASK)
        | (ccm::CDCDR_SPDIF0_CLK_SEL_PLL4 << ccm::CDCDR_SPDIF0_CLK_SEL_SHIFT)
        | (plan.pred_field() << ccm::CDCDR_SPDIF0_CLK_PRED_SHIFT)
        | (plan.podf_field() << ccm::CDCDR_SPDIF0_CLK_PODF_SHIFT)
}

/// SCR: Rx FIFO full at one sample, Rx/Tx auto-sync, Tx FIFO empty at
/// eight samples, Tx FIFO normal, validity cleared, Tx normal, U channel
/// from the on-chip transmitter.
const SCR_CONFIG: u32 = (0b00 << spdif::SCR_RXFIFOFULL_SEL_SHIFT)
    | spdif::SCR_RXAUTOSYNC
    | spdif::SCR_TXAUTOSYNC
    | (0b10 << spdif::SCR_TXFIFOEMPTY_SEL_SHIFT)
    | (0b01 << spdif::SCR_TXFIFO_CTRL_SHIFT)
    | spdif::SCR_VALCTRL
    | (0b101 << spdif::SCR_TXSEL_SHIFT)
    | (0b11 << spdif::SCR_USRC_SEL_SHIFT);

/// SRPC: Rx clock when the DPLL is locked, else the transmit clock.
const fn srpc(plan: &ClockPlan) -> u32 {
    (0b001 << spdif::SRPC_CLKSRC_SEL_SHIFT) | ((plan.dpll_gain as u32) << spdif::SRPC_GAINSEL_SHIFT)
}

/// STC: transmit clock from SPDIF0_CLK_ROOT, divided per `plan`.
const fn stc(plan: &ClockPlan) -> u32 {
    (0b001 << spdif::STC_TXCLK_SOURCE_SHIFT) | (plan.txclk_df_field() & spdif::STC_TXCLK_DF_MASK)
}

/// The i.MX RT1062 clock tree, S/PDIF block and output pad.
pub struct Imxrt1062Spdif {
    ccm_analog: Static<ccm_analog::RegisterBlock>,
    ccm: Static<ccm::RegisterBlock>,
    spdif: Static<spdif::RegisterBlock>,
}

impl Imxrt1062Spdif {
    /// # Safety
    ///
    /// The handle aliases global clock and S/PDIF registers. Nothing else
    /// may reconfigure PLL4, the SPDIF0 clock root or the S/PDIF block.
    pub unsafe fn new() -> Self {
        Imxrt1062Spdif {
            ccm_analog: CCM_ANALOG,
            ccm: CCM,
            spdif: SPDIF,
        }
    }
}

impl SpdifPlatform for Imxrt1062Spdif {
    fn power_up_audio_pll(&mut self, plan: &ClockPlan) {
        let analog = &*self.ccm_analog;
        analog.PLL_AUDIO.write(pll_audio(plan));
        analog
            .PLL_AUDIO_NUM
            .write(plan.numerator & ccm_analog::PLL_AUDIO_FRACTION_MASK);
        analog
            .PLL_AUDIO_DENOM
            .write(plan.denominator & ccm_analog::PLL_AUDIO_FRACTION_MASK);
        analog
            .PLL_AUDIO
            .write(analog.PLL_AUDIO.read() & !ccm_analog::PLL_AUDIO_POWERDOWN);
    }

    fn audio_pll_locked(&self) -> bool {
        self.ccm_analog.PLL_AUDIO.read() & ccm_analog::PLL_AUDIO_LOCK != 0
    }

    fn route_spdif_clock(&mut self, plan: &ClockPlan) {
        let analog = &*self.ccm_analog;
        analog.MISC2.write(
            analog.MISC2.read() & !(ccm_analog::MISC2_AUDIO_DIV_MSB | ccm_analog::MISC2_AUDIO_DIV_LSB),
        );
        analog
            .PLL_AUDIO
            .write(analog.PLL_AUDIO.read() & !ccm_analog::PLL_AUDIO_BYPASS);

        // Gate the SPDIF clock while its dividers change.
        let ccm = &*self.ccm;
        ccm.CCGR5.write(ccm.CCGR5.read() & !ccm::CCGR5_SPDIF_MASK);
        ccm.CDCDR.write(cdcdr(ccm.CDCDR.read(), plan));
        ccm.CCGR5.write(ccm.CCGR5.read() | ccm::CCGR5_SPDIF_MASK);
    }

    fn transmitter_dma_enabled(&self) -> bool {
        self.spdif.SCR.read() & (spdif::SCR_DMA_RX_EN | spdif::SCR_DMA_TX_EN) != 0
    }

    fn begin_soft_reset(&mut self) {
        self.spdif.SCR.write(spdif::SCR_SOFT_RESET);
    }

    fn soft_reset_pending(&self) -> bool {
        self.spdif.SCR.read() & spdif::SCR_SOFT_RESET != 0
    }

    fn configure_transmitter(&mut self, plan: &ClockPlan) {
        self.spdif.SCR.write(SCR_CONFIG);
        self.spdif.SRPC.write(srpc(plan));
        self.spdif.STC.write(stc(plan));
    }

    fn mux_output_pin(&mut self) {
        PAD_MUX_GPIO_AD_B1_02.write(pad::MUX_MODE_SPDIF_OUT);
    }

    fn transmit_register(&self) -> u32 {
        &self.spdif.STL as *const _ as u32
    }

    fn enable_transmit(&mut self) {
        let spdif = &*self.spdif;
        spdif.SCR.write(spdif.SCR.read() | spdif::SCR_DMA_TX_EN);
        spdif.STC.write(spdif.STC.read() | spdif::STC_TX_ALL_CLK_EN);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pll_audio_value() {
        // BYPASS | ENABLE | POST_DIV_SELECT(0b10) | DIV_SELECT(30)
        assert_eq!(pll_audio(&ClockPlan::DEFAULT), 0x0011_201E);
    }

    #[test]
    fn cdcdr_keeps_other_roots() {
        let value = cdcdr(0xFFFF_FFFF, &ClockPlan::DEFAULT);
        assert_eq!(value & !ccm::CDCDR_SPDIF0_MASK, 0xF00F_FFFF);
        // CLK_SEL = 0 (PLL4), PODF = 7, PRED = 7
        assert_eq!(value & ccm::CDCDR_SPDIF0_MASK, 0x0FC0_0000);
    }

    #[test]
    fn transmitter_register_values() {
        assert_eq!(SCR_CONFIG, 0x0007_0437);
        assert_eq!(srpc(&ClockPlan::DEFAULT), 0x0000_0098);
        assert_eq!(stc(&ClockPlan::DEFAULT), 0x0000_0103);
    }
}

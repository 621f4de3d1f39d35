//! One-time transmitter bring-up.
//!
//! [`start`] runs the fixed, order-dependent sequence that takes the
//! transmitter from reset to streaming the ring. Register access goes
//! through [`SpdifPlatform`] and the DMA channel through
//! [`TransferEngine`], so the ordering can be checked without hardware.
//!
//! Binding the DMA interrupt to
//! [`AudioOutputSpdif::on_transfer_boundary`] is left to the application
//! (e.g. an RTIC `#[task(binds = DMA0_DMA16)]`).

use embedded_hal::delay::DelayNs;

use crate::clock::ClockPlan;
use crate::io::{AudioOutputSpdif, TransferEngine};

/// Settling time before the clock tree is touched.
pub const POWER_UP_DELAY_MS: u32 = 3;

/// Clock, reset and pin control for the S/PDIF transmitter.
///
/// Each method is one step of the bring-up sequence; [`start`] calls them
/// in order. Implementations only poke registers and never wait.
pub trait SpdifPlatform {
    /// Program PLL4 dividers from `plan`, enable it in bypass, then clear
    /// its power-down bit.
    fn power_up_audio_pll(&mut self, plan: &ClockPlan);

    /// Whether PLL4 reports lock.
    fn audio_pll_locked(&self) -> bool;

    /// Leave bypass and feed the SPDIF0 clock root from PLL4 through the
    /// plan's dividers, gating the SPDIF clock while the dividers change.
    fn route_spdif_clock(&mut self, plan: &ClockPlan);

    /// Whether the transmitter or receiver DMA request is already enabled,
    /// i.e. the peripheral is running from an earlier start.
    fn transmitter_dma_enabled(&self) -> bool;

    /// Request a peripheral soft reset.
    fn begin_soft_reset(&mut self);

    /// Whether the soft reset is still in progress.
    fn soft_reset_pending(&self) -> bool;

    /// Write the transmitter configuration, phase and transmit clock
    /// registers from `plan`.
    fn configure_transmitter(&mut self, plan: &ClockPlan);

    /// Route the transmitter output to its pad.
    fn mux_output_pin(&mut self);

    /// Bus address of the left transmit data register. The right register
    /// follows it.
    fn transmit_register(&self) -> u32;

    /// Enable the transmit DMA request and the transmit clock.
    fn enable_transmit(&mut self);
}

/// Bring the transmitter up and start streaming `output`'s ring.
///
/// The sequence:
///
/// 1. wait [`POWER_UP_DELAY_MS`];
/// 2. arm `engine` with the ring descriptor (the only fallible step);
/// 3. power up PLL4, wait for lock, route the SPDIF clock root;
/// 4. unless the transmitter is already running: soft reset, configure,
///    mux the output pin;
/// 5. enable the engine;
/// 6. enable the transmit request and clock.
///
/// PLL lock and soft reset are waited on indefinitely. The transmitter
/// can't run on an unlocked clock, so there is nothing to fall back to.
pub fn start<B, P, E, D>(
    output: &'static AudioOutputSpdif<B>,
    platform: &mut P,
    engine: &mut E,
    delay: &mut D,
) -> Result<(), E::Error>
where
    P: SpdifPlatform + ?Sized,
    E: TransferEngine + ?Sized,
    D: DelayNs + ?Sized,
{
    let plan = ClockPlan::DEFAULT;
    delay.delay_ms(POWER_UP_DELAY_MS);

    let descriptor = output.descriptor(platform.transmit_register());
    if let Err(err) = engine.arm(&descriptor) {
        warn!("spdif: transfer descriptor rejected");
        return Err(err);
    }
    debug!(
        "spdif: ring {:#x} armed into {:#x}",
        descriptor.source,
        descriptor.destination
    );

    platform.power_up_audio_pll(&plan);
    while !platform.audio_pll_locked() {
        core::hint::spin_loop();
    }
    platform.route_spdif_clock(&plan);
    debug!("spdif: audio PLL locked, loop divider {}", plan.loop_divider);

    if platform.transmitter_dma_enabled() {
        info!("spdif: transmitter already running, keeping its configuration");
    } else {
        platform.begin_soft_reset();
        while platform.soft_reset_pending() {
            core::hint::spin_loop();
        }
        platform.configure_transmitter(&plan);
        platform.mux_output_pin();
        trace!("spdif: transmitter reset and configured");
    }

    engine.enable();
    platform.enable_transmit();
    info!("spdif: transmitting");
    Ok(())
}

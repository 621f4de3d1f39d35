//! # teensy-spdif
//!
//! A `no_std` S/PDIF transmitter for the
//! [Teensy 4.x](https://www.pjrc.com/teensy/) (i.MX RT1062, Cortex-M7). An
//! audio graph hands over pairs of 128-sample blocks; a DMA channel streams
//! them, interleaved and left-justified, into the transmitter from a
//! double-buffered ring. Each ring-half boundary refills the half the DMA
//! just left and ticks the graph.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Memory | [`block`] | Fixed-size audio block pool with refcounted handles |
//! | Graph | [`graph`] | [`AudioGraph`](graph::AudioGraph), the per-period tick |
//! | I/O | [`io`] | Ring, pending-block queue, encoder, transfer descriptor |
//! | Clocks | [`clock`] | PLL4 and divider plan for the sample rate |
//! | Bring-up | [`startup`] | Ordered power-up of clocks, peripheral and DMA |
//! | Hardware | [`hw`] | eDMA channel and register access (feature-gated) |
//!
//! ## Quick start
//!
//! ```ignore
//! use teensy_spdif::hw::{EdmaChannel, Imxrt1062Spdif};
//! use teensy_spdif::io::AudioOutputSpdif;
//!
//! static OUTPUT: AudioOutputSpdif = AudioOutputSpdif::new();
//!
//! let mut channel = unsafe { EdmaChannel::new(0) }.unwrap();
//! let mut spdif = unsafe { Imxrt1062Spdif::new() };
//! teensy_spdif::startup::start(&OUTPUT, &mut spdif, &mut channel, &mut delay)?;
//!
//! // Once per period, from the graph:
//! OUTPUT.produce(Some(left), Some(right));
//!
//! // In the DMA interrupt:
//! OUTPUT.on_transfer_boundary(&mut channel, &mut || graph.update_all());
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `imxrt1062` | no | [`hw`]: eDMA channel and S/PDIF register access |
//! | `defmt` | no | Log through `defmt` |
//! | `log` | no | Log through `log` (ignored when `defmt` is on) |
//!
//! The queue is guarded by `critical-section`; single-core firmware enables
//! `cortex-m`'s `critical-section-single-core` feature.
//!
//! ## Audio parameters
//!
//! - **Block size:** 128 samples ([`constants::AUDIO_BLOCK_SAMPLES`])
//! - **Sample rate:** 44 117.647 Hz ([`constants::AUDIO_SAMPLE_RATE_EXACT`])
//! - **Sample format:** `i16` in, 24-bit left-justified out
//! - **Ring:** 512 words, two halves of 128 stereo frames
//! - **Block pool:** 32 blocks ([`constants::POOL_SIZE`])

#![no_std]

#[cfg(test)]
extern crate std;

// Must come first so the logging macros are visible to later modules.
mod fmt;

pub mod constants;
pub mod block;
pub mod graph;
pub mod io;
pub mod clock;
pub mod startup;

#[cfg(feature = "imxrt1062")]
pub mod hw;

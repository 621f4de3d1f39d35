//! i.MX RT1062 back end (feature `imxrt1062`).
//!
//! [`EdmaChannel`] is the [`TransferEngine`](crate::io::TransferEngine) that
//! streams the ring into the transmitter, and [`Imxrt1062Spdif`] is the
//! [`SpdifPlatform`](crate::startup::SpdifPlatform) that brings up the clock
//! tree and the peripheral.
//!
//! ```ignore
//! static OUTPUT: AudioOutputSpdif = AudioOutputSpdif::new();
//!
//! let mut channel = unsafe { EdmaChannel::new(0) }.unwrap();
//! let mut spdif = unsafe { Imxrt1062Spdif::new() };
//! teensy_spdif::startup::start(&OUTPUT, &mut spdif, &mut channel, &mut delay)?;
//!
//! // DMA0_DMA16 handler:
//! OUTPUT.on_transfer_boundary(&mut channel, &mut graph);
//! ```

mod edma;
mod ral;
mod spdif;

pub use edma::{EdmaChannel, CHANNEL_COUNT};
pub use spdif::Imxrt1062Spdif;

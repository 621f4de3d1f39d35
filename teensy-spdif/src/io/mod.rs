//! The S/PDIF transmit pipeline.
//!
//! The audio graph pushes stereo pairs into a two-deep queue, the DMA
//! interrupt encodes them into a circular ring, and the eDMA channel walks
//! the ring into the transmitter's data registers on its own.
//!
//! ## Components
//!
//! | Module | Type | Description |
//! |--------|------|-------------|
//! | [`output_spdif`] | [`AudioOutputSpdif`] | Producer entry point and transmit interrupt |
//! | [`queue`] | [`StereoQueue`] | Two-slot per-channel pending-block queues |
//! | [`encode`] | [`encode::interleave`] | 16-bit sample → 32-bit transmit word interleaving |
//! | [`geometry`] | [`TransferDescriptor`] | Ring layout and the DMA descriptor that walks it |
//! | [`ring`] | [`TransmitRing`] | The 512-word hardware-visible buffer |
//! | [`engine`] | [`TransferEngine`] | DMA engine boundary, with a host-side simulation |
//!
//! ## Ring Layout
//!
//! - `[u32; 512]`, 32-byte aligned: two halves of 128 stereo frames
//! - Each frame: `[left << 8, right << 8]`
//! - The DMA engine interrupts at the midpoint and again at the wrap
//! - The ISR fills the half the engine is not reading, chosen from the
//!   engine's live source address

pub mod encode;
pub mod engine;
pub mod geometry;
pub mod output_spdif;
pub mod queue;
pub mod ring;

pub use engine::{SimulatedEngine, TransferEngine};
pub use geometry::{Boundary, DescriptorError, Half, TransferDescriptor};
pub use output_spdif::{AudioOutputSpdif, Delivery};
pub use queue::{Source, StereoQueue};
pub use ring::TransmitRing;

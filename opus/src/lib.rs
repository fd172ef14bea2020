//! Safe bindings to libopus.
//!
//! This crate wraps the libopus C API:
//!
//! - `Encoder` / `Decoder`: native codec states with deterministic release
//! - `ctl`: typed, range-checked codec parameters
//! - `packet`: stateless packet inspection and float soft clipping
//! - `toc`: pure Rust TOC byte interpretation (RFC 6716 Section 3.1)
//!
//! Every native error code surfaces as an [`Error`]. Once an encoder or
//! decoder is disposed, all its operations fail with [`Error::Disposed`]
//! without reaching native code.
//!
//! The façades are generic over the [`Native`] binding. The default
//! `libopus` feature links the system library and provides [`LibOpus`].
//!
//! # Example
//!
//! ```ignore
//! use giztoy_opus::{Application, Channels, Decoder, Encoder, SampleRate};
//!
//! let mut encoder = Encoder::new(SampleRate::Hz16000, Channels::Mono, Application::VoIP)?;
//! encoder.set_bitrate(24000)?;
//!
//! // 20ms at 16kHz
//! let pcm = vec![0i16; 320];
//! let packet = encoder.encode_packet(&pcm, 320)?;
//!
//! let mut decoder = Decoder::new(SampleRate::Hz16000, Channels::Mono)?;
//! let decoded = decoder.decode_packet(Some(&packet))?;
//! assert_eq!(decoded.len(), 320);
//!
//! // A lost packet: conceal 20ms.
//! let concealed = decoder.conceal(320)?;
//! ```

pub mod config;
pub mod ctl;
mod decoder;
mod encoder;
pub mod error;
pub mod ffi;
mod handle;
pub mod native;
pub mod packet;
mod pcm;
pub mod toc;
pub mod types;

#[cfg(test)]
mod stub;

pub use config::{DecoderConfig, EncoderConfig};
pub use ctl::{DecoderParameter, EncoderParameter};
pub use decoder::{Decoder, MAX_FRAME_SIZE};
pub use encoder::{Encoder, MAX_PACKET_SIZE};
pub use error::{Error, Result};
#[cfg(feature = "libopus")]
pub use native::LibOpus;
pub use native::Native;
pub use packet::{FrameRange, ParsedPacket};
pub use pcm::SAMPLE_WIDTH;
pub use toc::{Bandwidth, Configuration, ConfigurationMode, FrameCode, FrameDuration, Toc};
pub use types::{Application, Channels, SampleRate, Signal};

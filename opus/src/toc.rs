//! Opus TOC (Table of Contents) byte interpretation.
//!
//! Implements RFC 6716 Section 3.1. Pure Rust; no native calls.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ffi;
use crate::types::SampleRate;

/// TOC byte from an Opus packet header.
///
/// Layout:
/// ```text
///          0 1 2 3 4 5 6 7
///         +-+-+-+-+-+-+-+-+
///         | config  |s| c |
///         +-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toc(pub u8);

impl Toc {
    /// Creates a TOC from a byte.
    pub const fn new(byte: u8) -> Self {
        Self(byte)
    }

    /// Returns the configuration number (0-31).
    pub fn configuration(&self) -> Configuration {
        Configuration(self.0 >> 3)
    }

    /// Returns true if the TOC indicates stereo audio.
    pub fn is_stereo(&self) -> bool {
        (self.0 & 0b00000100) != 0
    }

    /// Returns the frame code (number of frames per packet).
    pub fn frame_code(&self) -> FrameCode {
        FrameCode::from_bits(self.0 & 0b00000011)
    }
}

impl std::fmt::Display for Toc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "opus_toc: stereo={}, mode={}, bw={}, {}, {}",
            self.is_stereo(),
            self.configuration().mode(),
            self.configuration().bandwidth(),
            self.frame_code(),
            self.configuration().frame_duration(),
        )
    }
}

/// Opus configuration number (0-31).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Configuration(pub u8);

impl Configuration {
    /// Returns the configuration mode (SILK, CELT, or Hybrid).
    pub fn mode(&self) -> ConfigurationMode {
        match self.0 & 0x1f {
            0..=11 => ConfigurationMode::Silk,
            12..=15 => ConfigurationMode::Hybrid,
            _ => ConfigurationMode::Celt,
        }
    }

    /// Returns the audio bandwidth.
    pub fn bandwidth(&self) -> Bandwidth {
        match self.0 & 0x1f {
            0..=3 | 16..=19 => Bandwidth::Narrowband,
            4..=7 => Bandwidth::Mediumband,
            8..=11 | 20..=23 => Bandwidth::Wideband,
            12..=13 | 24..=27 => Bandwidth::Superwideband,
            _ => Bandwidth::Fullband,
        }
    }

    /// Returns the duration of each frame.
    pub fn frame_duration(&self) -> FrameDuration {
        let c = self.0 & 0x1f;
        match c {
            16..=31 => match c & 0b11 {
                0 => FrameDuration::Ms2_5,
                1 => FrameDuration::Ms5,
                2 => FrameDuration::Ms10,
                _ => FrameDuration::Ms20,
            },
            12..=15 => {
                if c & 1 == 0 {
                    FrameDuration::Ms10
                } else {
                    FrameDuration::Ms20
                }
            }
            _ => match c & 0b11 {
                0 => FrameDuration::Ms10,
                1 => FrameDuration::Ms20,
                2 => FrameDuration::Ms40,
                _ => FrameDuration::Ms60,
            },
        }
    }
}

/// Configuration mode (SILK, CELT, or Hybrid).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationMode {
    Silk,
    Celt,
    Hybrid,
}

impl std::fmt::Display for ConfigurationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Silk => write!(f, "Silk"),
            Self::Celt => write!(f, "CELT"),
            Self::Hybrid => write!(f, "Hybrid"),
        }
    }
}

/// Frame code indicating number of frames per packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameCode {
    /// One frame in the packet.
    OneFrame,
    /// Two frames with equal compressed size.
    TwoEqualFrames,
    /// Two frames with different compressed sizes.
    TwoDifferentFrames,
    /// Arbitrary number of frames.
    ArbitraryFrames,
}

impl FrameCode {
    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::OneFrame,
            1 => Self::TwoEqualFrames,
            2 => Self::TwoDifferentFrames,
            _ => Self::ArbitraryFrames,
        }
    }
}

impl std::fmt::Display for FrameCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OneFrame => write!(f, "One Frame"),
            Self::TwoEqualFrames => write!(f, "Two Equal Frames"),
            Self::TwoDifferentFrames => write!(f, "Two Different Frames"),
            Self::ArbitraryFrames => write!(f, "Arbitrary Frames"),
        }
    }
}

/// Legal Opus frame durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDuration {
    Ms2_5,
    Ms5,
    Ms10,
    Ms20,
    Ms40,
    Ms60,
}

impl FrameDuration {
    /// Returns the duration in microseconds.
    pub fn micros(&self) -> u32 {
        match self {
            Self::Ms2_5 => 2500,
            Self::Ms5 => 5000,
            Self::Ms10 => 10000,
            Self::Ms20 => 20000,
            Self::Ms40 => 40000,
            Self::Ms60 => 60000,
        }
    }

    /// Returns the duration as a Duration.
    pub fn duration(&self) -> Duration {
        Duration::from_micros(self.micros() as u64)
    }

    /// Returns the per-channel sample count of one frame at `rate`.
    pub fn samples(&self, rate: SampleRate) -> usize {
        rate.hz() as usize * self.micros() as usize / 1_000_000
    }
}

impl std::fmt::Display for FrameDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ms2_5 => write!(f, "2.5ms"),
            Self::Ms5 => write!(f, "5ms"),
            Self::Ms10 => write!(f, "10ms"),
            Self::Ms20 => write!(f, "20ms"),
            Self::Ms40 => write!(f, "40ms"),
            Self::Ms60 => write!(f, "60ms"),
        }
    }
}

/// Audio bandwidth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bandwidth {
    /// 4 kHz audio bandpass.
    Narrowband,
    /// 6 kHz audio bandpass.
    Mediumband,
    /// 8 kHz audio bandpass.
    Wideband,
    /// 12 kHz audio bandpass.
    Superwideband,
    /// 20 kHz audio bandpass.
    Fullband,
}

impl Bandwidth {
    /// Returns the effective sample rate for this bandwidth.
    pub fn sample_rate(&self) -> SampleRate {
        match self {
            Self::Narrowband => SampleRate::Hz8000,
            Self::Mediumband => SampleRate::Hz12000,
            Self::Wideband => SampleRate::Hz16000,
            Self::Superwideband => SampleRate::Hz24000,
            Self::Fullband => SampleRate::Hz48000,
        }
    }

    pub(crate) fn to_ffi(self) -> i32 {
        match self {
            Self::Narrowband => ffi::OPUS_BANDWIDTH_NARROWBAND,
            Self::Mediumband => ffi::OPUS_BANDWIDTH_MEDIUMBAND,
            Self::Wideband => ffi::OPUS_BANDWIDTH_WIDEBAND,
            Self::Superwideband => ffi::OPUS_BANDWIDTH_SUPERWIDEBAND,
            Self::Fullband => ffi::OPUS_BANDWIDTH_FULLBAND,
        }
    }

    pub(crate) fn from_ffi(value: i32) -> Result<Self> {
        match value {
            ffi::OPUS_BANDWIDTH_NARROWBAND => Ok(Self::Narrowband),
            ffi::OPUS_BANDWIDTH_MEDIUMBAND => Ok(Self::Mediumband),
            ffi::OPUS_BANDWIDTH_WIDEBAND => Ok(Self::Wideband),
            ffi::OPUS_BANDWIDTH_SUPERWIDEBAND => Ok(Self::Superwideband),
            ffi::OPUS_BANDWIDTH_FULLBAND => Ok(Self::Fullband),
            other => Err(Error::Unknown(other)),
        }
    }
}

impl std::fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Narrowband => write!(f, "Narrowband"),
            Self::Mediumband => write!(f, "Mediumband"),
            Self::Wideband => write!(f, "Wideband"),
            Self::Superwideband => write!(f, "Superwideband"),
            Self::Fullband => write!(f, "Fullband"),
        }
    }
}

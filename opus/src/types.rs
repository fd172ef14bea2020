//! Codec construction parameters.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ffi;

/// Sampling rates libopus accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum SampleRate {
    Hz8000,
    Hz12000,
    Hz16000,
    Hz24000,
    Hz48000,
}

impl SampleRate {
    /// All supported rates, ascending.
    pub const ALL: [SampleRate; 5] = [
        Self::Hz8000,
        Self::Hz12000,
        Self::Hz16000,
        Self::Hz24000,
        Self::Hz48000,
    ];

    /// Returns the rate in Hz.
    pub const fn hz(self) -> i32 {
        match self {
            Self::Hz8000 => 8000,
            Self::Hz12000 => 12000,
            Self::Hz16000 => 16000,
            Self::Hz24000 => 24000,
            Self::Hz48000 => 48000,
        }
    }
}

impl TryFrom<i32> for SampleRate {
    type Error = Error;

    fn try_from(hz: i32) -> Result<Self> {
        match hz {
            8000 => Ok(Self::Hz8000),
            12000 => Ok(Self::Hz12000),
            16000 => Ok(Self::Hz16000),
            24000 => Ok(Self::Hz24000),
            48000 => Ok(Self::Hz48000),
            _ => Err(Error::BadArgument),
        }
    }
}

impl From<SampleRate> for i32 {
    fn from(rate: SampleRate) -> Self {
        rate.hz()
    }
}

impl std::fmt::Display for SampleRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}Hz", self.hz())
    }
}

/// Channel layout of interleaved PCM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Channels {
    Mono,
    Stereo,
}

impl Channels {
    /// Returns the channel count (1 or 2).
    pub const fn count(self) -> usize {
        match self {
            Self::Mono => 1,
            Self::Stereo => 2,
        }
    }
}

impl TryFrom<i32> for Channels {
    type Error = Error;

    fn try_from(n: i32) -> Result<Self> {
        match n {
            1 => Ok(Self::Mono),
            2 => Ok(Self::Stereo),
            _ => Err(Error::BadArgument),
        }
    }
}

impl From<Channels> for i32 {
    fn from(channels: Channels) -> Self {
        channels.count() as i32
    }
}

/// Opus application type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Application {
    /// Best quality for voice signals.
    #[serde(rename = "voip")]
    VoIP,
    /// Best quality for non-voice signals.
    #[default]
    #[serde(rename = "audio")]
    Audio,
    /// Minimum possible coding delay.
    #[serde(rename = "restricted_lowdelay")]
    RestrictedLowdelay,
}

impl Application {
    pub(crate) fn to_ffi(self) -> i32 {
        match self {
            Self::VoIP => ffi::OPUS_APPLICATION_VOIP,
            Self::Audio => ffi::OPUS_APPLICATION_AUDIO,
            Self::RestrictedLowdelay => ffi::OPUS_APPLICATION_RESTRICTED_LOWDELAY,
        }
    }

    #[cfg(test)]
    pub(crate) fn from_ffi(value: i32) -> Result<Self> {
        match value {
            ffi::OPUS_APPLICATION_VOIP => Ok(Self::VoIP),
            ffi::OPUS_APPLICATION_AUDIO => Ok(Self::Audio),
            ffi::OPUS_APPLICATION_RESTRICTED_LOWDELAY => Ok(Self::RestrictedLowdelay),
            other => Err(Error::Unknown(other)),
        }
    }
}

/// Signal type hint for the encoder mode decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    #[default]
    Auto,
    Voice,
    Music,
}

impl Signal {
    pub(crate) fn to_ffi(self) -> i32 {
        match self {
            Self::Auto => ffi::OPUS_AUTO,
            Self::Voice => ffi::OPUS_SIGNAL_VOICE,
            Self::Music => ffi::OPUS_SIGNAL_MUSIC,
        }
    }
}

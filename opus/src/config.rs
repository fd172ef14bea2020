//! Serializable encoder/decoder configuration.

use serde::{Deserialize, Serialize};

use crate::toc::Bandwidth;
use crate::types::{Application, Channels, SampleRate, Signal};

/// Encoder construction parameters plus optional initial CTL settings.
///
/// Unset options keep the libopus defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderConfig {
    pub sample_rate: SampleRate,
    pub channels: Channels,
    #[serde(default)]
    pub application: Application,

    /// Target bitrate in bits per second.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<i32>,

    /// Encoder complexity (0-10).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_bandwidth: Option<Bandwidth>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<Signal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vbr: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inband_fec: Option<bool>,

    /// Expected packet loss percentage (0-100).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packet_loss_perc: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtx: Option<bool>,
}

impl EncoderConfig {
    pub fn new(sample_rate: SampleRate, channels: Channels, application: Application) -> Self {
        Self {
            sample_rate,
            channels,
            application,
            bitrate: None,
            complexity: None,
            max_bandwidth: None,
            signal: None,
            vbr: None,
            inband_fec: None,
            packet_loss_perc: None,
            dtx: None,
        }
    }
}

impl Default for EncoderConfig {
    /// 48 kHz stereo, general audio.
    fn default() -> Self {
        Self::new(SampleRate::Hz48000, Channels::Stereo, Application::Audio)
    }
}

/// Decoder construction parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    pub sample_rate: SampleRate,
    pub channels: Channels,

    /// Output gain in Q8 dB units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gain: Option<i32>,
}

impl DecoderConfig {
    pub fn new(sample_rate: SampleRate, channels: Channels) -> Self {
        Self {
            sample_rate,
            channels,
            gain: None,
        }
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::new(SampleRate::Hz48000, Channels::Stereo)
    }
}

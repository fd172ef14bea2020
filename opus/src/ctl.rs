//! CTL parameter tables.
//!
//! Encoder and decoder accept different parameter sets, so each has its own
//! closed enumeration. A parameter knows its get/set request codes (a
//! missing set code means read-only) and the values a set may carry.

use std::os::raw::c_int;

use crate::error::{Error, Result};
use crate::ffi;

/// Value ranges, checked before a set request reaches native code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Range {
    /// Inclusive bounds.
    Between(c_int, c_int),
    /// Inclusive bounds, or one of the listed special values.
    BetweenOr(c_int, c_int, &'static [c_int]),
    /// Exactly one of the listed values.
    OneOf(&'static [c_int]),
}

impl Range {
    fn contains(self, value: c_int) -> bool {
        match self {
            Self::Between(lo, hi) => (lo..=hi).contains(&value),
            Self::BetweenOr(lo, hi, extra) => (lo..=hi).contains(&value) || extra.contains(&value),
            Self::OneOf(values) => values.contains(&value),
        }
    }
}

const BOOL: Range = Range::Between(0, 1);

const BANDWIDTHS: &[c_int] = &[
    ffi::OPUS_BANDWIDTH_NARROWBAND,
    ffi::OPUS_BANDWIDTH_MEDIUMBAND,
    ffi::OPUS_BANDWIDTH_WIDEBAND,
    ffi::OPUS_BANDWIDTH_SUPERWIDEBAND,
    ffi::OPUS_BANDWIDTH_FULLBAND,
];

/// Runtime parameters of an [`Encoder`](crate::Encoder).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncoderParameter {
    /// Application mode (`OPUS_APPLICATION_*`), fixed at construction (read-only).
    Application,
    /// Target bitrate in bits/s: 500..=512000, `OPUS_AUTO` or `OPUS_BITRATE_MAX`.
    Bitrate,
    /// Upper bandpass limit (`OPUS_BANDWIDTH_*`).
    MaxBandwidth,
    /// Forced bandpass (`OPUS_BANDWIDTH_*` or `OPUS_AUTO`).
    Bandwidth,
    /// Variable bitrate, 0 or 1.
    Vbr,
    /// Constrained VBR, 0 or 1.
    VbrConstraint,
    /// Computational complexity, 0..=10.
    Complexity,
    /// In-band forward error correction: 0 off, 1 or 2 on.
    InbandFec,
    /// Expected packet loss percentage, 0..=100.
    PacketLossPerc,
    /// Discontinuous transmission, 0 or 1.
    Dtx,
    /// Forced channel count: 1, 2 or `OPUS_AUTO`.
    ForceChannels,
    /// Signal type hint (`OPUS_SIGNAL_*` or `OPUS_AUTO`).
    Signal,
    /// Input sample depth in bits, 8..=24.
    LsbDepth,
    /// Samples of lookahead (read-only).
    Lookahead,
    /// Sampling rate the encoder was created with (read-only).
    SampleRate,
    /// Disables phase inversion for intensity stereo, 0 or 1.
    PhaseInversionDisabled,
}

impl EncoderParameter {
    pub(crate) fn get_request(self) -> c_int {
        match self {
            Self::Application => ffi::OPUS_GET_APPLICATION_REQUEST,
            Self::Bitrate => ffi::OPUS_GET_BITRATE_REQUEST,
            Self::MaxBandwidth => ffi::OPUS_GET_MAX_BANDWIDTH_REQUEST,
            Self::Bandwidth => ffi::OPUS_GET_BANDWIDTH_REQUEST,
            Self::Vbr => ffi::OPUS_GET_VBR_REQUEST,
            Self::VbrConstraint => ffi::OPUS_GET_VBR_CONSTRAINT_REQUEST,
            Self::Complexity => ffi::OPUS_GET_COMPLEXITY_REQUEST,
            Self::InbandFec => ffi::OPUS_GET_INBAND_FEC_REQUEST,
            Self::PacketLossPerc => ffi::OPUS_GET_PACKET_LOSS_PERC_REQUEST,
            Self::Dtx => ffi::OPUS_GET_DTX_REQUEST,
            Self::ForceChannels => ffi::OPUS_GET_FORCE_CHANNELS_REQUEST,
            Self::Signal => ffi::OPUS_GET_SIGNAL_REQUEST,
            Self::LsbDepth => ffi::OPUS_GET_LSB_DEPTH_REQUEST,
            Self::Lookahead => ffi::OPUS_GET_LOOKAHEAD_REQUEST,
            Self::SampleRate => ffi::OPUS_GET_SAMPLE_RATE_REQUEST,
            Self::PhaseInversionDisabled => ffi::OPUS_GET_PHASE_INVERSION_DISABLED_REQUEST,
        }
    }

    /// Returns the set request, or `None` for read-only parameters.
    pub(crate) fn set_request(self) -> Option<c_int> {
        match self {
            Self::Bitrate => Some(ffi::OPUS_SET_BITRATE_REQUEST),
            Self::MaxBandwidth => Some(ffi::OPUS_SET_MAX_BANDWIDTH_REQUEST),
            Self::Bandwidth => Some(ffi::OPUS_SET_BANDWIDTH_REQUEST),
            Self::Vbr => Some(ffi::OPUS_SET_VBR_REQUEST),
            Self::VbrConstraint => Some(ffi::OPUS_SET_VBR_CONSTRAINT_REQUEST),
            Self::Complexity => Some(ffi::OPUS_SET_COMPLEXITY_REQUEST),
            Self::InbandFec => Some(ffi::OPUS_SET_INBAND_FEC_REQUEST),
            Self::PacketLossPerc => Some(ffi::OPUS_SET_PACKET_LOSS_PERC_REQUEST),
            Self::Dtx => Some(ffi::OPUS_SET_DTX_REQUEST),
            Self::ForceChannels => Some(ffi::OPUS_SET_FORCE_CHANNELS_REQUEST),
            Self::Signal => Some(ffi::OPUS_SET_SIGNAL_REQUEST),
            Self::LsbDepth => Some(ffi::OPUS_SET_LSB_DEPTH_REQUEST),
            Self::PhaseInversionDisabled => Some(ffi::OPUS_SET_PHASE_INVERSION_DISABLED_REQUEST),
            Self::Application | Self::Lookahead | Self::SampleRate => None,
        }
    }

    fn range(self) -> Option<Range> {
        let range = match self {
            Self::Bitrate => Range::BetweenOr(500, 512_000, &[ffi::OPUS_AUTO, ffi::OPUS_BITRATE_MAX]),
            Self::MaxBandwidth => Range::OneOf(BANDWIDTHS),
            Self::Bandwidth => Range::BetweenOr(
                ffi::OPUS_BANDWIDTH_NARROWBAND,
                ffi::OPUS_BANDWIDTH_FULLBAND,
                &[ffi::OPUS_AUTO],
            ),
            Self::Vbr | Self::VbrConstraint | Self::Dtx | Self::PhaseInversionDisabled => BOOL,
            Self::Complexity => Range::Between(0, 10),
            Self::InbandFec => Range::Between(0, 2),
            Self::PacketLossPerc => Range::Between(0, 100),
            Self::ForceChannels => Range::BetweenOr(1, 2, &[ffi::OPUS_AUTO]),
            Self::Signal => Range::OneOf(&[ffi::OPUS_AUTO, ffi::OPUS_SIGNAL_VOICE, ffi::OPUS_SIGNAL_MUSIC]),
            Self::LsbDepth => Range::Between(8, 24),
            Self::Application | Self::Lookahead | Self::SampleRate => return None,
        };
        Some(range)
    }

    /// Returns the set request code if `value` may be written.
    pub(crate) fn validate_set(self, value: c_int) -> Result<c_int> {
        let request = self.set_request().ok_or(Error::BadArgument)?;
        match self.range() {
            Some(range) if range.contains(value) => Ok(request),
            _ => Err(Error::BadArgument),
        }
    }

    /// Returns true if the parameter cannot be set.
    pub fn is_read_only(self) -> bool {
        self.set_request().is_none()
    }
}

/// Runtime parameters of a [`Decoder`](crate::Decoder).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoderParameter {
    /// Output gain in Q8 dB units, -32768..=32767. Defaults to 0.
    Gain,
    /// Duration in samples of the last packet decoded or concealed (read-only).
    LastPacketDuration,
    /// Pitch period of the last decoded frame, 0 if unvoiced (read-only).
    Pitch,
    /// Bandwidth of the last decoded packet (read-only).
    Bandwidth,
    /// Sampling rate the decoder was created with (read-only).
    SampleRate,
    /// Disables phase inversion for intensity stereo, 0 or 1.
    PhaseInversionDisabled,
}

impl DecoderParameter {
    pub(crate) fn get_request(self) -> c_int {
        match self {
            Self::Gain => ffi::OPUS_GET_GAIN_REQUEST,
            Self::LastPacketDuration => ffi::OPUS_GET_LAST_PACKET_DURATION_REQUEST,
            Self::Pitch => ffi::OPUS_GET_PITCH_REQUEST,
            Self::Bandwidth => ffi::OPUS_GET_BANDWIDTH_REQUEST,
            Self::SampleRate => ffi::OPUS_GET_SAMPLE_RATE_REQUEST,
            Self::PhaseInversionDisabled => ffi::OPUS_GET_PHASE_INVERSION_DISABLED_REQUEST,
        }
    }

    /// Returns the set request, or `None` for read-only parameters.
    pub(crate) fn set_request(self) -> Option<c_int> {
        match self {
            Self::Gain => Some(ffi::OPUS_SET_GAIN_REQUEST),
            Self::PhaseInversionDisabled => Some(ffi::OPUS_SET_PHASE_INVERSION_DISABLED_REQUEST),
            Self::LastPacketDuration | Self::Pitch | Self::Bandwidth | Self::SampleRate => None,
        }
    }

    fn range(self) -> Option<Range> {
        match self {
            Self::Gain => Some(Range::Between(-32768, 32767)),
            Self::PhaseInversionDisabled => Some(BOOL),
            Self::LastPacketDuration | Self::Pitch | Self::Bandwidth | Self::SampleRate => None,
        }
    }

    /// Returns the set request code if `value` may be written.
    pub(crate) fn validate_set(self, value: c_int) -> Result<c_int> {
        let request = self.set_request().ok_or(Error::BadArgument)?;
        match self.range() {
            Some(range) if range.contains(value) => Ok(request),
            _ => Err(Error::BadArgument),
        }
    }

    /// Returns true if the parameter cannot be set.
    pub fn is_read_only(self) -> bool {
        self.set_request().is_none()
    }
}

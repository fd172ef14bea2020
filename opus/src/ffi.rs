//! FFI bindings to libopus.
//!
//! These declarations match `opus.h` / `opus_defines.h`. They are
//! hand-written instead of generated so the surface stays exactly the
//! subset this crate drives.

use std::os::raw::c_int;
#[cfg(feature = "libopus")]
use std::os::raw::c_uchar;

/// Opaque encoder state.
pub enum OpusEncoder {}

/// Opaque decoder state.
pub enum OpusDecoder {}

/// opus_int32 type (from opus_types.h)
pub type OpusInt32 = i32;

/// opus_int16 type (from opus_types.h)
pub type OpusInt16 = i16;

/// Maximum number of frames `opus_packet_parse` can report (120ms of 2.5ms frames).
pub const OPUS_MAX_FRAMES: usize = 48;

// Return codes
pub const OPUS_OK: c_int = 0;
pub const OPUS_BAD_ARG: c_int = -1;
pub const OPUS_BUFFER_TOO_SMALL: c_int = -2;
pub const OPUS_INTERNAL_ERROR: c_int = -3;
pub const OPUS_INVALID_PACKET: c_int = -4;
pub const OPUS_UNIMPLEMENTED: c_int = -5;
pub const OPUS_INVALID_STATE: c_int = -6;
pub const OPUS_ALLOC_FAIL: c_int = -7;

// Special values
pub const OPUS_AUTO: c_int = -1000;
pub const OPUS_BITRATE_MAX: c_int = -1;

// Application types
pub const OPUS_APPLICATION_VOIP: c_int = 2048;
pub const OPUS_APPLICATION_AUDIO: c_int = 2049;
pub const OPUS_APPLICATION_RESTRICTED_LOWDELAY: c_int = 2051;

// Signal types
pub const OPUS_SIGNAL_VOICE: c_int = 3001;
pub const OPUS_SIGNAL_MUSIC: c_int = 3002;

// Bandwidths
pub const OPUS_BANDWIDTH_NARROWBAND: c_int = 1101;
pub const OPUS_BANDWIDTH_MEDIUMBAND: c_int = 1102;
pub const OPUS_BANDWIDTH_WIDEBAND: c_int = 1103;
pub const OPUS_BANDWIDTH_SUPERWIDEBAND: c_int = 1104;
pub const OPUS_BANDWIDTH_FULLBAND: c_int = 1105;

// CTL macros (request codes)
pub const OPUS_GET_APPLICATION_REQUEST: c_int = 4001;
pub const OPUS_SET_BITRATE_REQUEST: c_int = 4002;
pub const OPUS_GET_BITRATE_REQUEST: c_int = 4003;
pub const OPUS_SET_MAX_BANDWIDTH_REQUEST: c_int = 4004;
pub const OPUS_GET_MAX_BANDWIDTH_REQUEST: c_int = 4005;
pub const OPUS_SET_VBR_REQUEST: c_int = 4006;
pub const OPUS_GET_VBR_REQUEST: c_int = 4007;
pub const OPUS_SET_BANDWIDTH_REQUEST: c_int = 4008;
pub const OPUS_GET_BANDWIDTH_REQUEST: c_int = 4009;
pub const OPUS_SET_COMPLEXITY_REQUEST: c_int = 4010;
pub const OPUS_GET_COMPLEXITY_REQUEST: c_int = 4011;
pub const OPUS_SET_INBAND_FEC_REQUEST: c_int = 4012;
pub const OPUS_GET_INBAND_FEC_REQUEST: c_int = 4013;
pub const OPUS_SET_PACKET_LOSS_PERC_REQUEST: c_int = 4014;
pub const OPUS_GET_PACKET_LOSS_PERC_REQUEST: c_int = 4015;
pub const OPUS_SET_DTX_REQUEST: c_int = 4016;
pub const OPUS_GET_DTX_REQUEST: c_int = 4017;
pub const OPUS_SET_VBR_CONSTRAINT_REQUEST: c_int = 4020;
pub const OPUS_GET_VBR_CONSTRAINT_REQUEST: c_int = 4021;
pub const OPUS_SET_FORCE_CHANNELS_REQUEST: c_int = 4022;
pub const OPUS_GET_FORCE_CHANNELS_REQUEST: c_int = 4023;
pub const OPUS_SET_SIGNAL_REQUEST: c_int = 4024;
pub const OPUS_GET_SIGNAL_REQUEST: c_int = 4025;
pub const OPUS_GET_LOOKAHEAD_REQUEST: c_int = 4027;
pub const OPUS_RESET_STATE: c_int = 4028;
pub const OPUS_GET_SAMPLE_RATE_REQUEST: c_int = 4029;
pub const OPUS_GET_PITCH_REQUEST: c_int = 4033;
pub const OPUS_SET_GAIN_REQUEST: c_int = 4034;
pub const OPUS_SET_LSB_DEPTH_REQUEST: c_int = 4036;
pub const OPUS_GET_LSB_DEPTH_REQUEST: c_int = 4037;
pub const OPUS_GET_LAST_PACKET_DURATION_REQUEST: c_int = 4039;
pub const OPUS_GET_GAIN_REQUEST: c_int = 4045;
pub const OPUS_SET_PHASE_INVERSION_DISABLED_REQUEST: c_int = 4046;
pub const OPUS_GET_PHASE_INVERSION_DISABLED_REQUEST: c_int = 4047;

#[cfg(feature = "libopus")]
unsafe extern "C" {
    // Encoder
    pub fn opus_encoder_get_size(channels: c_int) -> c_int;

    pub fn opus_encoder_create(
        fs: OpusInt32,
        channels: c_int,
        application: c_int,
        error: *mut c_int,
    ) -> *mut OpusEncoder;

    pub fn opus_encoder_init(
        st: *mut OpusEncoder,
        fs: OpusInt32,
        channels: c_int,
        application: c_int,
    ) -> c_int;

    pub fn opus_encode(
        st: *mut OpusEncoder,
        pcm: *const OpusInt16,
        frame_size: c_int,
        data: *mut c_uchar,
        max_data_bytes: OpusInt32,
    ) -> OpusInt32;

    pub fn opus_encode_float(
        st: *mut OpusEncoder,
        pcm: *const f32,
        frame_size: c_int,
        data: *mut c_uchar,
        max_data_bytes: OpusInt32,
    ) -> OpusInt32;

    pub fn opus_encoder_destroy(st: *mut OpusEncoder);

    pub fn opus_encoder_ctl(st: *mut OpusEncoder, request: c_int, ...) -> c_int;

    // Decoder
    pub fn opus_decoder_get_size(channels: c_int) -> c_int;

    pub fn opus_decoder_create(
        fs: OpusInt32,
        channels: c_int,
        error: *mut c_int,
    ) -> *mut OpusDecoder;

    pub fn opus_decoder_init(st: *mut OpusDecoder, fs: OpusInt32, channels: c_int) -> c_int;

    pub fn opus_decode(
        st: *mut OpusDecoder,
        data: *const c_uchar,
        len: OpusInt32,
        pcm: *mut OpusInt16,
        frame_size: c_int,
        decode_fec: c_int,
    ) -> c_int;

    pub fn opus_decode_float(
        st: *mut OpusDecoder,
        data: *const c_uchar,
        len: OpusInt32,
        pcm: *mut f32,
        frame_size: c_int,
        decode_fec: c_int,
    ) -> c_int;

    pub fn opus_decoder_ctl(st: *mut OpusDecoder, request: c_int, ...) -> c_int;

    pub fn opus_decoder_destroy(st: *mut OpusDecoder);

    pub fn opus_decoder_get_nb_samples(
        st: *const OpusDecoder,
        packet: *const c_uchar,
        len: OpusInt32,
    ) -> c_int;

    // Packet inspection
    pub fn opus_packet_parse(
        data: *const c_uchar,
        len: OpusInt32,
        out_toc: *mut c_uchar,
        frames: *mut *const c_uchar,
        size: *mut OpusInt16,
        payload_offset: *mut c_int,
    ) -> c_int;

    pub fn opus_packet_get_bandwidth(data: *const c_uchar) -> c_int;

    pub fn opus_packet_get_samples_per_frame(data: *const c_uchar, fs: OpusInt32) -> c_int;

    pub fn opus_packet_get_nb_channels(data: *const c_uchar) -> c_int;

    pub fn opus_packet_get_nb_frames(packet: *const c_uchar, len: OpusInt32) -> c_int;

    pub fn opus_packet_get_nb_samples(
        packet: *const c_uchar,
        len: OpusInt32,
        fs: OpusInt32,
    ) -> c_int;

    pub fn opus_pcm_soft_clip(
        pcm: *mut f32,
        frame_size: c_int,
        channels: c_int,
        softclip_mem: *mut f32,
    );
}

//! The native binding seam.
//!
//! [`Native`] mirrors the libopus entry points one-to-one: same parameter
//! layout, same return convention, no validation. The safe façades are
//! generic over it so that tests can drive them with a recording stub
//! instead of the real library.

use std::os::raw::{c_int, c_uchar};

use crate::ffi::{OpusDecoder, OpusEncoder, OpusInt16, OpusInt32};

/// Raw libopus function surface.
///
/// # Safety
///
/// Every method has the contract of the C function of the same name.
/// Implementations must not add behavior beyond forwarding; negative
/// returns are error codes and are interpreted by the caller.
pub trait Native {
    unsafe fn encoder_get_size(channels: c_int) -> c_int;
    unsafe fn encoder_create(
        fs: OpusInt32,
        channels: c_int,
        application: c_int,
        error: *mut c_int,
    ) -> *mut OpusEncoder;
    unsafe fn encoder_init(
        st: *mut OpusEncoder,
        fs: OpusInt32,
        channels: c_int,
        application: c_int,
    ) -> c_int;
    unsafe fn encode(
        st: *mut OpusEncoder,
        pcm: *const OpusInt16,
        frame_size: c_int,
        data: *mut c_uchar,
        max_data_bytes: OpusInt32,
    ) -> OpusInt32;
    unsafe fn encode_float(
        st: *mut OpusEncoder,
        pcm: *const f32,
        frame_size: c_int,
        data: *mut c_uchar,
        max_data_bytes: OpusInt32,
    ) -> OpusInt32;
    unsafe fn encoder_destroy(st: *mut OpusEncoder);
    /// `opus_encoder_ctl(st, request, int *value)`
    unsafe fn encoder_ctl_get(st: *mut OpusEncoder, request: c_int, value: *mut c_int) -> c_int;
    /// `opus_encoder_ctl(st, request, int value)`
    unsafe fn encoder_ctl_set(st: *mut OpusEncoder, request: c_int, value: c_int) -> c_int;

    unsafe fn decoder_get_size(channels: c_int) -> c_int;
    unsafe fn decoder_create(fs: OpusInt32, channels: c_int, error: *mut c_int)
    -> *mut OpusDecoder;
    unsafe fn decoder_init(st: *mut OpusDecoder, fs: OpusInt32, channels: c_int) -> c_int;
    unsafe fn decode(
        st: *mut OpusDecoder,
        data: *const c_uchar,
        len: OpusInt32,
        pcm: *mut OpusInt16,
        frame_size: c_int,
        decode_fec: c_int,
    ) -> c_int;
    unsafe fn decode_float(
        st: *mut OpusDecoder,
        data: *const c_uchar,
        len: OpusInt32,
        pcm: *mut f32,
        frame_size: c_int,
        decode_fec: c_int,
    ) -> c_int;
    unsafe fn decoder_destroy(st: *mut OpusDecoder);
    /// `opus_decoder_ctl(st, request, int *value)`
    unsafe fn decoder_ctl_get(st: *mut OpusDecoder, request: c_int, value: *mut c_int) -> c_int;
    /// `opus_decoder_ctl(st, request, int value)`
    unsafe fn decoder_ctl_set(st: *mut OpusDecoder, request: c_int, value: c_int) -> c_int;
    unsafe fn decoder_get_nb_samples(
        st: *const OpusDecoder,
        packet: *const c_uchar,
        len: OpusInt32,
    ) -> c_int;

    /// `frames` and `size` must each have room for
    /// [`OPUS_MAX_FRAMES`](crate::ffi::OPUS_MAX_FRAMES) entries.
    unsafe fn packet_parse(
        data: *const c_uchar,
        len: OpusInt32,
        out_toc: *mut c_uchar,
        frames: *mut *const c_uchar,
        size: *mut OpusInt16,
        payload_offset: *mut c_int,
    ) -> c_int;
    unsafe fn packet_get_bandwidth(data: *const c_uchar) -> c_int;
    unsafe fn packet_get_samples_per_frame(data: *const c_uchar, fs: OpusInt32) -> c_int;
    unsafe fn packet_get_nb_channels(data: *const c_uchar) -> c_int;
    unsafe fn packet_get_nb_frames(packet: *const c_uchar, len: OpusInt32) -> c_int;
    unsafe fn packet_get_nb_samples(packet: *const c_uchar, len: OpusInt32, fs: OpusInt32)
    -> c_int;
    unsafe fn pcm_soft_clip(
        pcm: *mut f32,
        frame_size: c_int,
        channels: c_int,
        softclip_mem: *mut f32,
    );
}

/// The system libopus, linked by the build script.
#[cfg(feature = "libopus")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LibOpus;

#[cfg(feature = "libopus")]
impl Native for LibOpus {
    unsafe fn encoder_get_size(channels: c_int) -> c_int {
        unsafe { crate::ffi::opus_encoder_get_size(channels) }
    }

    unsafe fn encoder_create(
        fs: OpusInt32,
        channels: c_int,
        application: c_int,
        error: *mut c_int,
    ) -> *mut OpusEncoder {
        unsafe { crate::ffi::opus_encoder_create(fs, channels, application, error) }
    }

    unsafe fn encoder_init(
        st: *mut OpusEncoder,
        fs: OpusInt32,
        channels: c_int,
        application: c_int,
    ) -> c_int {
        unsafe { crate::ffi::opus_encoder_init(st, fs, channels, application) }
    }

    unsafe fn encode(
        st: *mut OpusEncoder,
        pcm: *const OpusInt16,
        frame_size: c_int,
        data: *mut c_uchar,
        max_data_bytes: OpusInt32,
    ) -> OpusInt32 {
        unsafe { crate::ffi::opus_encode(st, pcm, frame_size, data, max_data_bytes) }
    }

    unsafe fn encode_float(
        st: *mut OpusEncoder,
        pcm: *const f32,
        frame_size: c_int,
        data: *mut c_uchar,
        max_data_bytes: OpusInt32,
    ) -> OpusInt32 {
        unsafe { crate::ffi::opus_encode_float(st, pcm, frame_size, data, max_data_bytes) }
    }

    unsafe fn encoder_destroy(st: *mut OpusEncoder) {
        unsafe { crate::ffi::opus_encoder_destroy(st) }
    }

    unsafe fn encoder_ctl_get(st: *mut OpusEncoder, request: c_int, value: *mut c_int) -> c_int {
        unsafe { crate::ffi::opus_encoder_ctl(st, request, value) }
    }

    unsafe fn encoder_ctl_set(st: *mut OpusEncoder, request: c_int, value: c_int) -> c_int {
        unsafe { crate::ffi::opus_encoder_ctl(st, request, value) }
    }

    unsafe fn decoder_get_size(channels: c_int) -> c_int {
        unsafe { crate::ffi::opus_decoder_get_size(channels) }
    }

    unsafe fn decoder_create(
        fs: OpusInt32,
        channels: c_int,
        error: *mut c_int,
    ) -> *mut OpusDecoder {
        unsafe { crate::ffi::opus_decoder_create(fs, channels, error) }
    }

    unsafe fn decoder_init(st: *mut OpusDecoder, fs: OpusInt32, channels: c_int) -> c_int {
        unsafe { crate::ffi::opus_decoder_init(st, fs, channels) }
    }

    unsafe fn decode(
        st: *mut OpusDecoder,
        data: *const c_uchar,
        len: OpusInt32,
        pcm: *mut OpusInt16,
        frame_size: c_int,
        decode_fec: c_int,
    ) -> c_int {
        unsafe { crate::ffi::opus_decode(st, data, len, pcm, frame_size, decode_fec) }
    }

    unsafe fn decode_float(
        st: *mut OpusDecoder,
        data: *const c_uchar,
        len: OpusInt32,
        pcm: *mut f32,
        frame_size: c_int,
        decode_fec: c_int,
    ) -> c_int {
        unsafe { crate::ffi::opus_decode_float(st, data, len, pcm, frame_size, decode_fec) }
    }

    unsafe fn decoder_destroy(st: *mut OpusDecoder) {
        unsafe { crate::ffi::opus_decoder_destroy(st) }
    }

    unsafe fn decoder_ctl_get(st: *mut OpusDecoder, request: c_int, value: *mut c_int) -> c_int {
        unsafe { crate::ffi::opus_decoder_ctl(st, request, value) }
    }

    unsafe fn decoder_ctl_set(st: *mut OpusDecoder, request: c_int, value: c_int) -> c_int {
        unsafe { crate::ffi::opus_decoder_ctl(st, request, value) }
    }

    unsafe fn decoder_get_nb_samples(
        st: *const OpusDecoder,
        packet: *const c_uchar,
        len: OpusInt32,
    ) -> c_int {
        unsafe { crate::ffi::opus_decoder_get_nb_samples(st, packet, len) }
    }

    unsafe fn packet_parse(
        data: *const c_uchar,
        len: OpusInt32,
        out_toc: *mut c_uchar,
        frames: *mut *const c_uchar,
        size: *mut OpusInt16,
        payload_offset: *mut c_int,
    ) -> c_int {
        unsafe { crate::ffi::opus_packet_parse(data, len, out_toc, frames, size, payload_offset) }
    }

    unsafe fn packet_get_bandwidth(data: *const c_uchar) -> c_int {
        unsafe { crate::ffi::opus_packet_get_bandwidth(data) }
    }

    unsafe fn packet_get_samples_per_frame(data: *const c_uchar, fs: OpusInt32) -> c_int {
        unsafe { crate::ffi::opus_packet_get_samples_per_frame(data, fs) }
    }

    unsafe fn packet_get_nb_channels(data: *const c_uchar) -> c_int {
        unsafe { crate::ffi::opus_packet_get_nb_channels(data) }
    }

    unsafe fn packet_get_nb_frames(packet: *const c_uchar, len: OpusInt32) -> c_int {
        unsafe { crate::ffi::opus_packet_get_nb_frames(packet, len) }
    }

    unsafe fn packet_get_nb_samples(
        packet: *const c_uchar,
        len: OpusInt32,
        fs: OpusInt32,
    ) -> c_int {
        unsafe { crate::ffi::opus_packet_get_nb_samples(packet, len, fs) }
    }

    unsafe fn pcm_soft_clip(
        pcm: *mut f32,
        frame_size: c_int,
        channels: c_int,
        softclip_mem: *mut f32,
    ) {
        unsafe { crate::ffi::opus_pcm_soft_clip(pcm, frame_size, channels, softclip_mem) }
    }
}

//! Recording stand-in for libopus used by the unit tests.
//!
//! Every entry point bumps a per-thread call counter, so tests can assert
//! that an operation did (or did not) reach native code. Codec states are
//! boxed [`StubCodec`]s keeping CTL values in a map.

use std::cell::RefCell;
use std::collections::HashMap;
use std::os::raw::{c_int, c_uchar};

use crate::ffi::{self, OpusDecoder, OpusEncoder, OpusInt16, OpusInt32};
use crate::native::Native;
use crate::toc::Toc;
use crate::types::SampleRate;

#[derive(Default)]
struct State {
    calls: HashMap<&'static str, usize>,
    fail_create: Option<c_int>,
    last_frame_size: c_int,
    decode_extra: c_int,
}

thread_local! {
    static STATE: RefCell<State> = RefCell::new(State::default());
}

fn record(name: &'static str) {
    STATE.with(|s| *s.borrow_mut().calls.entry(name).or_default() += 1);
}

/// Clears counters and injected failures.
pub fn reset() {
    STATE.with(|s| *s.borrow_mut() = State::default());
}

/// Number of calls to `name` since the last reset.
pub fn count(name: &str) -> usize {
    STATE.with(|s| s.borrow().calls.get(name).copied().unwrap_or(0))
}

/// Number of native calls of any kind since the last reset.
pub fn total() -> usize {
    STATE.with(|s| s.borrow().calls.values().sum())
}

/// Makes the next create call report `code`.
pub fn fail_create(code: c_int) {
    STATE.with(|s| s.borrow_mut().fail_create = Some(code));
}

/// `frame_size` argument of the last encode/decode call.
pub fn last_frame_size() -> c_int {
    STATE.with(|s| s.borrow().last_frame_size)
}

/// Makes decode calls report `extra` more samples than they wrote.
pub fn overreport_decode(extra: c_int) {
    STATE.with(|s| s.borrow_mut().decode_extra = extra);
}

fn decode_extra() -> c_int {
    STATE.with(|s| s.borrow().decode_extra)
}

fn take_failure() -> Option<c_int> {
    STATE.with(|s| s.borrow_mut().fail_create.take())
}

fn set_last_frame_size(n: c_int) {
    STATE.with(|s| s.borrow_mut().last_frame_size = n);
}

struct StubCodec {
    fs: c_int,
    channels: c_int,
    application: c_int,
    ctl: HashMap<c_int, c_int>,
    last_duration: c_int,
}

impl StubCodec {
    fn new(fs: c_int, channels: c_int, application: c_int) -> Self {
        Self {
            fs,
            channels,
            application,
            ctl: HashMap::new(),
            last_duration: 0,
        }
    }

    /// Legal frame sizes are 2.5, 5, 10, 20, 40, 60, 80, 100 and 120 ms.
    fn valid_frame(&self, frame_size: c_int) -> bool {
        let units = frame_size as i64 * 400;
        if frame_size <= 0 || units % self.fs as i64 != 0 {
            return false;
        }
        matches!(units / self.fs as i64, 1 | 2 | 4 | 8 | 16 | 24 | 32 | 40 | 48)
    }

    fn get(&self, request: c_int) -> c_int {
        match request {
            ffi::OPUS_GET_APPLICATION_REQUEST => self.application,
            ffi::OPUS_GET_SAMPLE_RATE_REQUEST => self.fs,
            ffi::OPUS_GET_LAST_PACKET_DURATION_REQUEST => self.last_duration,
            ffi::OPUS_GET_LOOKAHEAD_REQUEST => self.fs / 400,
            other => self.ctl.get(&other).copied().unwrap_or(0),
        }
    }

    fn set(&mut self, request: c_int, value: c_int) -> c_int {
        match request {
            ffi::OPUS_RESET_STATE => {
                self.last_duration = 0;
            }
            ffi::OPUS_SET_GAIN_REQUEST => {
                if !(-32768..=32767).contains(&value) {
                    return ffi::OPUS_BAD_ARG;
                }
                self.ctl.insert(ffi::OPUS_GET_GAIN_REQUEST, value);
            }
            other => {
                self.ctl.insert(other + 1, value);
            }
        }
        ffi::OPUS_OK
    }
}

unsafe fn codec<'a, T>(st: *mut T) -> &'a mut StubCodec {
    unsafe { &mut *(st as *mut StubCodec) }
}

fn create(fs: c_int, channels: c_int, application: c_int, error: *mut c_int) -> *mut StubCodec {
    if let Some(code) = take_failure() {
        unsafe { *error = code };
        return std::ptr::null_mut();
    }
    if SampleRate::try_from(fs).is_err() || !(1..=2).contains(&channels) {
        unsafe { *error = ffi::OPUS_BAD_ARG };
        return std::ptr::null_mut();
    }
    unsafe { *error = ffi::OPUS_OK };
    Box::into_raw(Box::new(StubCodec::new(fs, channels, application)))
}

fn encode_into(c: &StubCodec, frame_size: c_int, data: *mut c_uchar, max_data_bytes: OpusInt32) -> c_int {
    set_last_frame_size(frame_size);
    if !c.valid_frame(frame_size) {
        return ffi::OPUS_BAD_ARG;
    }
    if max_data_bytes < 3 {
        return ffi::OPUS_BUFFER_TOO_SMALL;
    }
    let stereo: u8 = if c.channels == 2 { 0b100 } else { 0 };
    let packet = [(31 << 3) | stereo, 0xAA, 0x55];
    unsafe { std::ptr::copy_nonoverlapping(packet.as_ptr(), data, packet.len()) };
    packet.len() as c_int
}

fn decode_len(c: &mut StubCodec, data: *const c_uchar, frame_size: c_int) -> c_int {
    set_last_frame_size(frame_size);
    if frame_size <= 0 {
        return ffi::OPUS_BAD_ARG;
    }
    // Loss concealment fills the requested duration, a packet one 20ms frame.
    let n = if data.is_null() {
        frame_size
    } else if frame_size < c.fs / 50 {
        return ffi::OPUS_BUFFER_TOO_SMALL;
    } else {
        c.fs / 50
    };
    c.last_duration = n;
    n
}

/// Zero-sized binding whose calls land in the thread-local recorder.
pub struct Stub;

impl Native for Stub {
    unsafe fn encoder_get_size(channels: c_int) -> c_int {
        record("encoder_get_size");
        1024 * channels
    }

    unsafe fn encoder_create(
        fs: OpusInt32,
        channels: c_int,
        application: c_int,
        error: *mut c_int,
    ) -> *mut OpusEncoder {
        record("encoder_create");
        create(fs, channels, application, error) as *mut OpusEncoder
    }

    unsafe fn encoder_init(
        st: *mut OpusEncoder,
        fs: OpusInt32,
        channels: c_int,
        application: c_int,
    ) -> c_int {
        record("encoder_init");
        *unsafe { codec(st) } = StubCodec::new(fs, channels, application);
        ffi::OPUS_OK
    }

    unsafe fn encode(
        st: *mut OpusEncoder,
        _pcm: *const OpusInt16,
        frame_size: c_int,
        data: *mut c_uchar,
        max_data_bytes: OpusInt32,
    ) -> OpusInt32 {
        record("encode");
        encode_into(unsafe { codec(st) }, frame_size, data, max_data_bytes)
    }

    unsafe fn encode_float(
        st: *mut OpusEncoder,
        _pcm: *const f32,
        frame_size: c_int,
        data: *mut c_uchar,
        max_data_bytes: OpusInt32,
    ) -> OpusInt32 {
        record("encode_float");
        encode_into(unsafe { codec(st) }, frame_size, data, max_data_bytes)
    }

    unsafe fn encoder_destroy(st: *mut OpusEncoder) {
        record("encoder_destroy");
        drop(unsafe { Box::from_raw(st as *mut StubCodec) });
    }

    unsafe fn encoder_ctl_get(st: *mut OpusEncoder, request: c_int, value: *mut c_int) -> c_int {
        record("encoder_ctl_get");
        unsafe { *value = codec(st).get(request) };
        ffi::OPUS_OK
    }

    unsafe fn encoder_ctl_set(st: *mut OpusEncoder, request: c_int, value: c_int) -> c_int {
        record("encoder_ctl_set");
        unsafe { codec(st) }.set(request, value)
    }

    unsafe fn decoder_get_size(channels: c_int) -> c_int {
        record("decoder_get_size");
        512 * channels
    }

    unsafe fn decoder_create(
        fs: OpusInt32,
        channels: c_int,
        error: *mut c_int,
    ) -> *mut OpusDecoder {
        record("decoder_create");
        create(fs, channels, 0, error) as *mut OpusDecoder
    }

    unsafe fn decoder_init(st: *mut OpusDecoder, fs: OpusInt32, channels: c_int) -> c_int {
        record("decoder_init");
        *unsafe { codec(st) } = StubCodec::new(fs, channels, 0);
        ffi::OPUS_OK
    }

    unsafe fn decode(
        st: *mut OpusDecoder,
        data: *const c_uchar,
        _len: OpusInt32,
        pcm: *mut OpusInt16,
        frame_size: c_int,
        _decode_fec: c_int,
    ) -> c_int {
        record("decode");
        let c = unsafe { codec(st) };
        let n = decode_len(c, data, frame_size);
        if n > 0 {
            let total = (n * c.channels) as usize;
            let out = unsafe { std::slice::from_raw_parts_mut(pcm, total) };
            for (i, s) in out.iter_mut().enumerate() {
                *s = i as i16;
            }
            return n + decode_extra();
        }
        n
    }

    unsafe fn decode_float(
        st: *mut OpusDecoder,
        data: *const c_uchar,
        _len: OpusInt32,
        pcm: *mut f32,
        frame_size: c_int,
        _decode_fec: c_int,
    ) -> c_int {
        record("decode_float");
        let c = unsafe { codec(st) };
        let n = decode_len(c, data, frame_size);
        if n > 0 {
            let total = (n * c.channels) as usize;
            unsafe { std::slice::from_raw_parts_mut(pcm, total) }.fill(0.25);
        }
        n
    }

    unsafe fn decoder_destroy(st: *mut OpusDecoder) {
        record("decoder_destroy");
        drop(unsafe { Box::from_raw(st as *mut StubCodec) });
    }

    unsafe fn decoder_ctl_get(st: *mut OpusDecoder, request: c_int, value: *mut c_int) -> c_int {
        record("decoder_ctl_get");
        unsafe { *value = codec(st).get(request) };
        ffi::OPUS_OK
    }

    unsafe fn decoder_ctl_set(st: *mut OpusDecoder, request: c_int, value: c_int) -> c_int {
        record("decoder_ctl_set");
        unsafe { codec(st) }.set(request, value)
    }

    unsafe fn decoder_get_nb_samples(
        st: *const OpusDecoder,
        _packet: *const c_uchar,
        _len: OpusInt32,
    ) -> c_int {
        record("decoder_get_nb_samples");
        unsafe { &*(st as *const StubCodec) }.fs / 50
    }

    /// Code 0 packets hold one frame; code 3 packets hold `data[1] & 0x3f`
    /// equal-sized frames. Codes 1 and 2 are reported as invalid.
    unsafe fn packet_parse(
        data: *const c_uchar,
        len: OpusInt32,
        out_toc: *mut c_uchar,
        frames: *mut *const c_uchar,
        size: *mut OpusInt16,
        payload_offset: *mut c_int,
    ) -> c_int {
        record("packet_parse");
        let packet = unsafe { std::slice::from_raw_parts(data, len as usize) };
        let (count, header) = match packet[0] & 0b11 {
            0 => (1usize, 1usize),
            3 if packet.len() >= 2 => ((packet[1] & 0x3f) as usize, 2usize),
            _ => return ffi::OPUS_INVALID_PACKET,
        };
        if count == 0 || count > ffi::OPUS_MAX_FRAMES || (packet.len() - header) % count != 0 {
            return ffi::OPUS_INVALID_PACKET;
        }
        let frame_len = (packet.len() - header) / count;
        unsafe {
            *out_toc = packet[0];
            *payload_offset = header as c_int;
            for i in 0..count {
                *frames.add(i) = data.add(header + i * frame_len);
                *size.add(i) = frame_len as OpusInt16;
            }
        }
        count as c_int
    }

    unsafe fn packet_get_bandwidth(data: *const c_uchar) -> c_int {
        record("packet_get_bandwidth");
        Toc::new(unsafe { *data }).configuration().bandwidth().to_ffi()
    }

    unsafe fn packet_get_samples_per_frame(data: *const c_uchar, fs: OpusInt32) -> c_int {
        record("packet_get_samples_per_frame");
        let duration = Toc::new(unsafe { *data }).configuration().frame_duration();
        (fs as i64 * duration.micros() as i64 / 1_000_000) as c_int
    }

    unsafe fn packet_get_nb_channels(data: *const c_uchar) -> c_int {
        record("packet_get_nb_channels");
        if Toc::new(unsafe { *data }).is_stereo() { 2 } else { 1 }
    }

    unsafe fn packet_get_nb_frames(packet: *const c_uchar, len: OpusInt32) -> c_int {
        record("packet_get_nb_frames");
        if len < 1 {
            return ffi::OPUS_BAD_ARG;
        }
        match unsafe { *packet } & 0b11 {
            0 => 1,
            1 | 2 => 2,
            _ if len < 2 => ffi::OPUS_INVALID_PACKET,
            _ => (unsafe { *packet.add(1) } & 0x3f) as c_int,
        }
    }

    unsafe fn packet_get_nb_samples(packet: *const c_uchar, len: OpusInt32, fs: OpusInt32) -> c_int {
        record("packet_get_nb_samples");
        let frames = unsafe { Self::packet_get_nb_frames(packet, len) };
        if frames < 0 {
            return frames;
        }
        frames * unsafe { Self::packet_get_samples_per_frame(packet, fs) }
    }

    unsafe fn pcm_soft_clip(
        pcm: *mut f32,
        frame_size: c_int,
        channels: c_int,
        softclip_mem: *mut f32,
    ) {
        record("pcm_soft_clip");
        let pcm = unsafe { std::slice::from_raw_parts_mut(pcm, (frame_size * channels) as usize) };
        for s in pcm.iter_mut() {
            *s = s.clamp(-1.0, 1.0);
        }
        unsafe { std::slice::from_raw_parts_mut(softclip_mem, channels as usize) }.fill(0.0);
    }
}

//! PCM buffer sizing and int16 byte marshaling.
//!
//! Interleaved buffers hold `frame_size * channels` samples. Byte buffers
//! carry int16 samples in native byte order, two bytes each.

use std::os::raw::c_int;

use crate::error::{Error, Result};

/// Bytes per int16 sample.
pub const SAMPLE_WIDTH: usize = std::mem::size_of::<i16>();

/// Converts a length to a C int, rejecting lengths native code cannot express.
pub(crate) fn to_c_int(n: usize) -> Result<c_int> {
    c_int::try_from(n).map_err(|_| Error::BadArgument)
}

/// Output capacity as libopus sees it; larger buffers are simply not filled past `i32::MAX`.
pub(crate) fn capacity(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

/// Interleaved samples covered by `frame_size` samples per channel.
pub(crate) fn interleaved_len(frame_size: usize, channels: usize) -> Result<usize> {
    frame_size.checked_mul(channels).ok_or(Error::BadArgument)
}

/// Input must hold a whole frame, or native code would read past its end.
pub(crate) fn check_input(available: usize, frame_size: usize, channels: usize) -> Result<()> {
    if frame_size == 0 || available < interleaved_len(frame_size, channels)? {
        return Err(Error::BadArgument);
    }
    Ok(())
}

/// Output must have room for `frame_size` samples per channel.
pub(crate) fn check_output(available: usize, frame_size: usize, channels: usize) -> Result<()> {
    if frame_size == 0 {
        return Err(Error::BadArgument);
    }
    if available < interleaved_len(frame_size, channels)? {
        return Err(Error::BufferTooSmall);
    }
    Ok(())
}

/// Refills `dst` with the int16 samples stored in `src`.
///
/// A trailing odd byte is ignored.
pub(crate) fn read_samples(src: &[u8], dst: &mut Vec<i16>) {
    dst.clear();
    dst.extend(
        src.chunks_exact(SAMPLE_WIDTH)
            .map(|b| i16::from_ne_bytes([b[0], b[1]])),
    );
}

/// Writes `src` into `dst` as int16 bytes. `dst` must hold `src.len() * 2` bytes.
pub(crate) fn write_samples(src: &[i16], dst: &mut [u8]) {
    for (s, out) in src.iter().zip(dst.chunks_exact_mut(SAMPLE_WIDTH)) {
        out.copy_from_slice(&s.to_ne_bytes());
    }
}

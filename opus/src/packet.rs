//! Stateless packet inspection and PCM soft clipping.
//!
//! These functions read a packet without decoding it. They are generic
//! over the [`Native`] binding; with the default feature use
//! `packet::bandwidth::<LibOpus>(&data)`.

use std::os::raw::{c_int, c_uchar};
use std::ptr;

use crate::error::{self, Error, Result};
use crate::ffi::{self, OpusInt16};
use crate::native::Native;
use crate::pcm;
use crate::toc::{Bandwidth, Toc};
use crate::types::{Channels, SampleRate};

/// Location of one compressed frame inside a packet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameRange {
    /// Byte offset from the start of the packet.
    pub offset: usize,
    /// Frame length in bytes.
    pub len: usize,
}

impl FrameRange {
    /// Returns the frame bytes within `packet`.
    pub fn slice<'a>(&self, packet: &'a [u8]) -> Option<&'a [u8]> {
        packet.get(self.offset..self.offset.checked_add(self.len)?)
    }
}

/// Result of [`parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedPacket {
    pub toc: Toc,
    pub frame_count: usize,
    /// Offset of the first frame's payload, past the TOC and framing bytes.
    pub payload_offset: usize,
}

fn packet_len(packet: &[u8]) -> Result<c_int> {
    if packet.is_empty() {
        return Err(Error::BadArgument);
    }
    pcm::to_c_int(packet.len())
}

/// Returns the audio bandwidth signalled by the TOC byte.
pub fn bandwidth<B: Native>(packet: &[u8]) -> Result<Bandwidth> {
    packet_len(packet)?;
    let value = error::check(unsafe { B::packet_get_bandwidth(packet.as_ptr()) })?;
    Bandwidth::from_ffi(value)
}

/// Returns the samples per channel in each frame of `packet` at `sample_rate`.
pub fn samples_per_frame<B: Native>(packet: &[u8], sample_rate: SampleRate) -> Result<usize> {
    packet_len(packet)?;
    let n = error::check(unsafe {
        B::packet_get_samples_per_frame(packet.as_ptr(), sample_rate.hz())
    })?;
    Ok(n as usize)
}

/// Returns the channel count coded in `packet`.
pub fn channel_count<B: Native>(packet: &[u8]) -> Result<Channels> {
    packet_len(packet)?;
    let n = error::check(unsafe { B::packet_get_nb_channels(packet.as_ptr()) })?;
    Channels::try_from(n)
}

/// Returns the number of frames in `packet`.
pub fn frame_count<B: Native>(packet: &[u8]) -> Result<usize> {
    let len = packet_len(packet)?;
    let n = error::check(unsafe { B::packet_get_nb_frames(packet.as_ptr(), len) })?;
    Ok(n as usize)
}

/// Returns the samples per channel `packet` decodes to at `sample_rate`.
pub fn sample_count<B: Native>(packet: &[u8], sample_rate: SampleRate) -> Result<usize> {
    let len = packet_len(packet)?;
    let n = error::check(unsafe {
        B::packet_get_nb_samples(packet.as_ptr(), len, sample_rate.hz())
    })?;
    Ok(n as usize)
}

/// Splits `packet` into its frames.
///
/// Frame locations are written to the front of `frames`. If the packet holds
/// more frames than `frames` can take, nothing is written and
/// [`Error::BufferTooSmall`] is returned.
pub fn parse<B: Native>(packet: &[u8], frames: &mut [FrameRange]) -> Result<ParsedPacket> {
    let len = packet_len(packet)?;

    let mut toc: c_uchar = 0;
    let mut starts: [*const c_uchar; ffi::OPUS_MAX_FRAMES] = [ptr::null(); ffi::OPUS_MAX_FRAMES];
    let mut sizes: [OpusInt16; ffi::OPUS_MAX_FRAMES] = [0; ffi::OPUS_MAX_FRAMES];
    let mut payload_offset: c_int = 0;

    let count = error::check(unsafe {
        B::packet_parse(
            packet.as_ptr(),
            len,
            &mut toc,
            starts.as_mut_ptr(),
            sizes.as_mut_ptr(),
            &mut payload_offset,
        )
    })? as usize;

    if count > frames.len() {
        tracing::debug!("opus packet has {} frames, room for {}", count, frames.len());
        return Err(Error::BufferTooSmall);
    }
    if count > ffi::OPUS_MAX_FRAMES {
        return Err(Error::InvalidPacket);
    }

    let base = packet.as_ptr() as usize;
    for (out, (&start, &size)) in frames.iter_mut().zip(starts.iter().zip(&sizes)).take(count) {
        *out = FrameRange {
            offset: (start as usize).wrapping_sub(base),
            len: size.max(0) as usize,
        };
    }

    Ok(ParsedPacket {
        toc: Toc::new(toc),
        frame_count: count,
        payload_offset: payload_offset.max(0) as usize,
    })
}

/// Splits `packet` into its frames, allocating room for the maximum count.
pub fn parse_all<B: Native>(packet: &[u8]) -> Result<(ParsedPacket, Vec<FrameRange>)> {
    let mut frames = vec![FrameRange::default(); ffi::OPUS_MAX_FRAMES];
    let parsed = parse::<B>(packet, &mut frames)?;
    frames.truncate(parsed.frame_count);
    Ok((parsed, frames))
}

/// Soft-clips float PCM into [-1, 1] in place.
///
/// `state` keeps one value per channel and must be carried between
/// consecutive calls on the same stream so the clipping stays continuous
/// across buffer boundaries. Start a stream with zeros.
pub fn soft_clip<B: Native>(
    pcm: &mut [f32],
    frame_size: usize,
    channels: Channels,
    state: &mut [f32],
) -> Result<()> {
    let ch = channels.count();
    pcm::check_input(pcm.len(), frame_size, ch)?;
    if state.len() < ch {
        return Err(Error::BadArgument);
    }
    let frame_size = pcm::to_c_int(frame_size)?;
    unsafe { B::pcm_soft_clip(pcm.as_mut_ptr(), frame_size, ch as c_int, state.as_mut_ptr()) };
    Ok(())
}

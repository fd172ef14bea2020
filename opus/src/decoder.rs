//! Opus decoder.

use std::marker::PhantomData;
use std::os::raw::{c_int, c_uchar};
use std::ptr;

use crate::config::DecoderConfig;
use crate::ctl::DecoderParameter;
use crate::error::{Error, Result};
use crate::ffi::{self, OpusDecoder as OpusDecoderHandle};
use crate::handle::Handle;
use crate::native::Native;
use crate::pcm::{self, SAMPLE_WIDTH};
use crate::toc::Bandwidth;
use crate::types::{Channels, SampleRate};

/// Largest frame libopus can return: 120ms at 48kHz, per channel.
pub const MAX_FRAME_SIZE: usize = 5760;

/// Opus decoder.
///
/// Same lifecycle as [`Encoder`](crate::Encoder): one native state, released
/// by [`dispose`](Decoder::dispose) or on drop, `Error::Disposed` afterwards.
pub struct Decoder<B: Native> {
    sample_rate: SampleRate,
    channels: Channels,
    handle: Handle<OpusDecoderHandle>,
    scratch: Vec<i16>,
    _native: PhantomData<fn() -> B>,
}

#[cfg(feature = "libopus")]
impl Decoder<crate::LibOpus> {
    /// Creates a new Opus decoder backed by the system libopus.
    ///
    /// # Parameters
    /// - `sample_rate`: Sample rate to decode at
    /// - `channels`: Number of channels to decode
    pub fn new(sample_rate: SampleRate, channels: Channels) -> Result<Self> {
        Self::from_config(&DecoderConfig::new(sample_rate, channels))
    }
}

/// Splits an optional packet into the pointer/length pair libopus expects.
/// A missing or empty packet is a loss and becomes `(NULL, 0)`.
fn packet_ptr(packet: Option<&[u8]>) -> Result<(*const c_uchar, i32)> {
    match packet {
        Some(data) if !data.is_empty() => Ok((data.as_ptr(), pcm::to_c_int(data.len())?)),
        _ => Ok((ptr::null(), 0)),
    }
}

impl<B: Native> Decoder<B> {
    /// Creates a decoder and applies the optional settings in `config`.
    pub fn from_config(config: &DecoderConfig) -> Result<Self> {
        let fs = config.sample_rate.hz();
        let channels = config.channels.count() as c_int;

        let handle = unsafe {
            Handle::create(
                "decoder",
                |error| B::decoder_create(fs, channels, error),
                B::decoder_destroy,
            )
        }?;

        let mut decoder = Self {
            sample_rate: config.sample_rate,
            channels: config.channels,
            handle,
            scratch: Vec::new(),
            _native: PhantomData,
        };
        if let Some(gain) = config.gain {
            if let Err(err) = decoder.set_gain(gain) {
                decoder.dispose();
                return Err(err);
            }
        }
        Ok(decoder)
    }

    /// Returns the size in bytes of a native decoder state for `channels`.
    pub fn state_size(channels: Channels) -> Result<usize> {
        let n = unsafe { B::decoder_get_size(channels.count() as c_int) };
        if n <= 0 {
            return Err(Error::BadArgument);
        }
        Ok(n as usize)
    }

    /// Returns the sample rate.
    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// Returns the number of channels.
    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Decodes one packet into int16 PCM.
    ///
    /// # Parameters
    /// - `packet`: Compressed data; `None` (or an empty slice) signals a lost
    ///   packet and triggers loss concealment
    /// - `pcm`: Interleaved output with room for `frame_size * channels` samples
    /// - `frame_size`: Samples per channel available in `pcm`. For concealment
    ///   and FEC it must be exactly the missing duration, a multiple of 2.5ms.
    /// - `decode_fec`: Decode in-band FEC data of the next packet instead
    ///
    /// Returns the number of samples written across all channels.
    pub fn decode(
        &mut self,
        packet: Option<&[u8]>,
        pcm: &mut [i16],
        frame_size: usize,
        decode_fec: bool,
    ) -> Result<usize> {
        let channels = self.channels.count();
        let n = self.handle.call(|st| {
            pcm::check_output(pcm.len(), frame_size, channels)?;
            let frame_size = pcm::to_c_int(frame_size)?;
            let (data, len) = packet_ptr(packet)?;
            Ok(unsafe {
                B::decode(st, data, len, pcm.as_mut_ptr(), frame_size, decode_fec as c_int)
            })
        })?;
        Ok(n as usize * channels)
    }

    /// Decodes one packet into int16 PCM stored as native-endian bytes.
    ///
    /// `frame_bytes` is the per-channel frame length in bytes; native code
    /// receives `frame_bytes / 2` samples per channel, so it must be even.
    /// `pcm` needs `frame_bytes * channels` bytes. Returns the number of
    /// bytes written across all channels.
    pub fn decode_bytes(
        &mut self,
        packet: Option<&[u8]>,
        pcm: &mut [u8],
        frame_bytes: usize,
        decode_fec: bool,
    ) -> Result<usize> {
        let channels = self.channels.count();
        let n = self.handle.call(|st| {
            if frame_bytes % SAMPLE_WIDTH != 0 {
                return Err(Error::BadArgument);
            }
            let frame_size = frame_bytes / SAMPLE_WIDTH;
            pcm::check_output(pcm.len() / SAMPLE_WIDTH, frame_size, channels)?;
            let total = pcm::interleaved_len(frame_size, channels)?;
            let frame_size = pcm::to_c_int(frame_size)?;
            let (data, len) = packet_ptr(packet)?;
            self.scratch.clear();
            self.scratch.resize(total, 0);
            Ok(unsafe {
                B::decode(
                    st,
                    data,
                    len,
                    self.scratch.as_mut_ptr(),
                    frame_size,
                    decode_fec as c_int,
                )
            })
        })?;

        let samples = self
            .scratch
            .get(..n as usize * channels)
            .ok_or(Error::InternalError)?;
        pcm::write_samples(samples, pcm);
        Ok(samples.len() * SAMPLE_WIDTH)
    }

    /// Decodes one packet into float PCM.
    ///
    /// Returns the number of samples written across all channels.
    pub fn decode_float(
        &mut self,
        packet: Option<&[u8]>,
        pcm: &mut [f32],
        frame_size: usize,
        decode_fec: bool,
    ) -> Result<usize> {
        let channels = self.channels.count();
        let n = self.handle.call(|st| {
            pcm::check_output(pcm.len(), frame_size, channels)?;
            let frame_size = pcm::to_c_int(frame_size)?;
            let (data, len) = packet_ptr(packet)?;
            Ok(unsafe {
                B::decode_float(st, data, len, pcm.as_mut_ptr(), frame_size, decode_fec as c_int)
            })
        })?;
        Ok(n as usize * channels)
    }

    /// Decodes into a freshly allocated buffer sized for the largest frame.
    pub fn decode_packet(&mut self, packet: Option<&[u8]>) -> Result<Vec<i16>> {
        let mut buf = vec![0i16; MAX_FRAME_SIZE * self.channels.count()];
        let n = self.decode(packet, &mut buf, MAX_FRAME_SIZE, false)?;
        buf.truncate(n);
        Ok(buf)
    }

    /// Conceals `frame_size` samples per channel of lost audio.
    ///
    /// `frame_size` above [`MAX_FRAME_SIZE`] fails with `Error::BadArgument`.
    pub fn conceal(&mut self, frame_size: usize) -> Result<Vec<i16>> {
        if self.is_disposed() {
            return Err(Error::Disposed);
        }
        if frame_size > MAX_FRAME_SIZE {
            return Err(Error::BadArgument);
        }
        let mut buf = vec![0i16; pcm::interleaved_len(frame_size, self.channels.count())?];
        let n = self.decode(None, &mut buf, frame_size, false)?;
        buf.truncate(n);
        Ok(buf)
    }

    /// Returns the per-channel sample count `packet` would decode to.
    pub fn packet_samples(&self, packet: &[u8]) -> Result<usize> {
        let n = self.handle.call(|st| {
            if packet.is_empty() {
                return Err(Error::BadArgument);
            }
            let len = pcm::to_c_int(packet.len())?;
            Ok(unsafe { B::decoder_get_nb_samples(st, packet.as_ptr(), len) })
        })?;
        Ok(n as usize)
    }

    /// Reads a CTL parameter.
    pub fn get_parameter(&self, param: DecoderParameter) -> Result<i32> {
        let mut value: c_int = 0;
        self.handle
            .call(|st| Ok(unsafe { B::decoder_ctl_get(st, param.get_request(), &mut value) }))?;
        tracing::trace!("opus decoder get {:?} = {}", param, value);
        Ok(value)
    }

    /// Writes a CTL parameter.
    ///
    /// Read-only parameters and out-of-range values fail with
    /// [`Error::BadArgument`] before reaching native code.
    pub fn set_parameter(&mut self, param: DecoderParameter, value: i32) -> Result<()> {
        self.handle.call(|st| {
            let request = param.validate_set(value)?;
            Ok(unsafe { B::decoder_ctl_set(st, request, value) })
        })?;
        tracing::trace!("opus decoder set {:?} = {}", param, value);
        Ok(())
    }

    /// Returns the output gain in Q8 dB units.
    pub fn gain(&self) -> Result<i32> {
        self.get_parameter(DecoderParameter::Gain)
    }

    /// Scales decoded output by `gain / 256` dB (-32768..=32767).
    pub fn set_gain(&mut self, gain: i32) -> Result<()> {
        self.set_parameter(DecoderParameter::Gain, gain)
    }

    /// Returns the duration in samples per channel of the last packet
    /// decoded or concealed.
    pub fn last_packet_duration(&self) -> Result<usize> {
        Ok(self.get_parameter(DecoderParameter::LastPacketDuration)?.max(0) as usize)
    }

    /// Returns the pitch period of the last decoded frame, or 0 when it was
    /// not voiced.
    pub fn pitch(&self) -> Result<i32> {
        self.get_parameter(DecoderParameter::Pitch)
    }

    /// Returns the bandwidth of the last decoded packet, `None` before the first.
    pub fn bandwidth(&self) -> Result<Option<Bandwidth>> {
        match self.get_parameter(DecoderParameter::Bandwidth)? {
            0 => Ok(None),
            value => Bandwidth::from_ffi(value).map(Some),
        }
    }

    /// Resets the codec state, keeping CTL settings.
    pub fn reset(&mut self) -> Result<()> {
        self.handle
            .call(|st| Ok(unsafe { B::decoder_ctl_set(st, ffi::OPUS_RESET_STATE, 0) }))?;
        Ok(())
    }

    /// Re-runs native initialization with the construction parameters.
    pub fn reinitialize(&mut self) -> Result<()> {
        let fs = self.sample_rate.hz();
        let channels = self.channels.count() as c_int;
        self.handle
            .call(|st| Ok(unsafe { B::decoder_init(st, fs, channels) }))?;
        Ok(())
    }

    /// Releases the native state. Calling it again does nothing.
    pub fn dispose(&mut self) {
        self.handle.release();
    }

    /// Returns true once [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.handle.is_closed()
    }
}

impl<B: Native> std::fmt::Debug for Decoder<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decoder")
            .field("sample_rate", &self.sample_rate)
            .field("channels", &self.channels)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

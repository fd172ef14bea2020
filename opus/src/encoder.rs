//! Opus encoder.

use std::marker::PhantomData;
use std::os::raw::c_int;

use crate::config::EncoderConfig;
use crate::ctl::EncoderParameter;
use crate::error::{Error, Result};
use crate::ffi::{self, OpusEncoder as OpusEncoderHandle};
use crate::handle::Handle;
use crate::native::Native;
use crate::pcm::{self, SAMPLE_WIDTH};
use crate::toc::{Bandwidth, FrameDuration};
use crate::types::{Application, Channels, SampleRate, Signal};

/// Opus encoder.
///
/// Owns one native encoder state. The state is released by [`dispose`]
/// or, failing that, when the encoder is dropped. After disposal every
/// operation fails with [`Error::Disposed`] without touching native code.
///
/// An encoder is `Send` but not `Sync`: move it between threads freely,
/// but never drive one instance from two threads at once.
///
/// [`dispose`]: Encoder::dispose
pub struct Encoder<B: Native> {
    sample_rate: SampleRate,
    channels: Channels,
    application: Application,
    handle: Handle<OpusEncoderHandle>,
    scratch: Vec<i16>,
    _native: PhantomData<fn() -> B>,
}

#[cfg(feature = "libopus")]
impl Encoder<crate::LibOpus> {
    /// Creates a new Opus encoder backed by the system libopus.
    ///
    /// # Parameters
    /// - `sample_rate`: Sample rate of the input signal
    /// - `channels`: Number of channels in the input signal
    /// - `application`: Intended application type
    pub fn new(sample_rate: SampleRate, channels: Channels, application: Application) -> Result<Self> {
        Self::from_config(&EncoderConfig::new(sample_rate, channels, application))
    }

    /// Creates a new VoIP encoder.
    pub fn new_voip(sample_rate: SampleRate, channels: Channels) -> Result<Self> {
        Self::new(sample_rate, channels, Application::VoIP)
    }

    /// Creates a new audio encoder.
    pub fn new_audio(sample_rate: SampleRate, channels: Channels) -> Result<Self> {
        Self::new(sample_rate, channels, Application::Audio)
    }
}

impl<B: Native> Encoder<B> {
    /// Creates an encoder and applies the optional settings in `config`.
    ///
    /// If any setting is rejected the native state is released before the
    /// error is returned.
    pub fn from_config(config: &EncoderConfig) -> Result<Self> {
        let fs = config.sample_rate.hz();
        let channels = config.channels.count() as c_int;
        let application = config.application.to_ffi();

        let handle = unsafe {
            Handle::create(
                "encoder",
                |error| B::encoder_create(fs, channels, application, error),
                B::encoder_destroy,
            )
        }?;

        let mut encoder = Self {
            sample_rate: config.sample_rate,
            channels: config.channels,
            application: config.application,
            handle,
            scratch: Vec::new(),
            _native: PhantomData,
        };
        if let Err(err) = encoder.apply(config) {
            encoder.dispose();
            return Err(err);
        }
        Ok(encoder)
    }

    fn apply(&mut self, config: &EncoderConfig) -> Result<()> {
        if let Some(bitrate) = config.bitrate {
            self.set_bitrate(bitrate)?;
        }
        if let Some(complexity) = config.complexity {
            self.set_complexity(complexity)?;
        }
        if let Some(bw) = config.max_bandwidth {
            self.set_max_bandwidth(bw)?;
        }
        if let Some(signal) = config.signal {
            self.set_signal(signal)?;
        }
        if let Some(vbr) = config.vbr {
            self.set_vbr(vbr)?;
        }
        if let Some(fec) = config.inband_fec {
            self.set_inband_fec(fec)?;
        }
        if let Some(perc) = config.packet_loss_perc {
            self.set_packet_loss_perc(perc)?;
        }
        if let Some(dtx) = config.dtx {
            self.set_dtx(dtx)?;
        }
        Ok(())
    }

    /// Returns the size in bytes of a native encoder state for `channels`.
    pub fn state_size(channels: Channels) -> Result<usize> {
        let n = unsafe { B::encoder_get_size(channels.count() as c_int) };
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

    /// Returns the application mode chosen at construction.
    pub fn application(&self) -> Application {
        self.application
    }

    /// Returns the frame size for a given duration.
    pub fn frame_size_for(&self, duration: FrameDuration) -> usize {
        duration.samples(self.sample_rate)
    }

    /// Encodes one frame of int16 PCM.
    ///
    /// # Parameters
    /// - `pcm`: Interleaved input, at least `frame_size * channels` samples
    /// - `frame_size`: Samples per channel; must be a legal Opus frame size
    ///   for the sample rate (checked by libopus)
    /// - `out`: Packet buffer; its length is the byte budget
    ///
    /// Returns the packet length in bytes.
    pub fn encode(&mut self, pcm: &[i16], frame_size: usize, out: &mut [u8]) -> Result<usize> {
        let channels = self.channels.count();
        let n = self.handle.call(|st| {
            pcm::check_input(pcm.len(), frame_size, channels)?;
            let frame_size = pcm::to_c_int(frame_size)?;
            Ok(unsafe {
                B::encode(st, pcm.as_ptr(), frame_size, out.as_mut_ptr(), pcm::capacity(out.len()))
            })
        })?;
        Ok(n as usize)
    }

    /// Encodes one frame of int16 PCM stored as native-endian bytes.
    ///
    /// `frame_size` is still counted in samples per channel, so `pcm` must
    /// hold at least `frame_size * channels * 2` bytes.
    pub fn encode_bytes(&mut self, pcm: &[u8], frame_size: usize, out: &mut [u8]) -> Result<usize> {
        let channels = self.channels.count();
        let n = self.handle.call(|st| {
            pcm::check_input(pcm.len() / SAMPLE_WIDTH, frame_size, channels)?;
            let frame_size = pcm::to_c_int(frame_size)?;
            pcm::read_samples(pcm, &mut self.scratch);
            Ok(unsafe {
                B::encode(
                    st,
                    self.scratch.as_ptr(),
                    frame_size,
                    out.as_mut_ptr(),
                    pcm::capacity(out.len()),
                )
            })
        })?;
        Ok(n as usize)
    }

    /// Encodes one frame of float PCM with a nominal range of +/-1.0.
    ///
    /// Returns the value libopus reports, unchanged.
    pub fn encode_float(&mut self, pcm: &[f32], frame_size: usize, out: &mut [u8]) -> Result<usize> {
        let channels = self.channels.count();
        let n = self.handle.call(|st| {
            pcm::check_input(pcm.len(), frame_size, channels)?;
            let frame_size = pcm::to_c_int(frame_size)?;
            Ok(unsafe {
                B::encode_float(st, pcm.as_ptr(), frame_size, out.as_mut_ptr(), pcm::capacity(out.len()))
            })
        })?;
        Ok(n as usize)
    }

    /// Encodes into a freshly allocated packet.
    pub fn encode_packet(&mut self, pcm: &[i16], frame_size: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; MAX_PACKET_SIZE];
        let n = self.encode(pcm, frame_size, &mut buf)?;
        buf.truncate(n);
        Ok(buf)
    }

    /// Reads a CTL parameter.
    pub fn get_parameter(&self, param: EncoderParameter) -> Result<i32> {
        let mut value: c_int = 0;
        self.handle
            .call(|st| Ok(unsafe { B::encoder_ctl_get(st, param.get_request(), &mut value) }))?;
        tracing::trace!("opus encoder get {:?} = {}", param, value);
        Ok(value)
    }

    /// Writes a CTL parameter.
    ///
    /// Read-only parameters and out-of-range values fail with
    /// [`Error::BadArgument`] before reaching native code.
    pub fn set_parameter(&mut self, param: EncoderParameter, value: i32) -> Result<()> {
        self.handle.call(|st| {
            let request = param.validate_set(value)?;
            Ok(unsafe { B::encoder_ctl_set(st, request, value) })
        })?;
        tracing::trace!("opus encoder set {:?} = {}", param, value);
        Ok(())
    }

    /// Sets the target bitrate in bits per second.
    pub fn set_bitrate(&mut self, bitrate: i32) -> Result<()> {
        self.set_parameter(EncoderParameter::Bitrate, bitrate)
    }

    /// Returns the target bitrate in bits per second.
    pub fn bitrate(&self) -> Result<i32> {
        self.get_parameter(EncoderParameter::Bitrate)
    }

    /// Sets the encoder complexity (0-10).
    pub fn set_complexity(&mut self, complexity: i32) -> Result<()> {
        self.set_parameter(EncoderParameter::Complexity, complexity)
    }

    /// Returns the encoder complexity.
    pub fn complexity(&self) -> Result<i32> {
        self.get_parameter(EncoderParameter::Complexity)
    }

    /// Forces a bandpass, or lets the encoder choose with `None`.
    pub fn set_bandwidth(&mut self, bandwidth: Option<Bandwidth>) -> Result<()> {
        let value = bandwidth.map_or(ffi::OPUS_AUTO, Bandwidth::to_ffi);
        self.set_parameter(EncoderParameter::Bandwidth, value)
    }

    /// Limits the bandpass the encoder may select.
    pub fn set_max_bandwidth(&mut self, bandwidth: Bandwidth) -> Result<()> {
        self.set_parameter(EncoderParameter::MaxBandwidth, bandwidth.to_ffi())
    }

    pub fn set_vbr(&mut self, enabled: bool) -> Result<()> {
        self.set_parameter(EncoderParameter::Vbr, enabled as i32)
    }

    pub fn set_inband_fec(&mut self, enabled: bool) -> Result<()> {
        self.set_parameter(EncoderParameter::InbandFec, enabled as i32)
    }

    /// Sets the expected packet loss percentage (0-100).
    pub fn set_packet_loss_perc(&mut self, perc: i32) -> Result<()> {
        self.set_parameter(EncoderParameter::PacketLossPerc, perc)
    }

    pub fn set_dtx(&mut self, enabled: bool) -> Result<()> {
        self.set_parameter(EncoderParameter::Dtx, enabled as i32)
    }

    pub fn set_signal(&mut self, signal: Signal) -> Result<()> {
        self.set_parameter(EncoderParameter::Signal, signal.to_ffi())
    }

    /// Returns the encoder lookahead in samples per channel.
    pub fn lookahead(&self) -> Result<usize> {
        Ok(self.get_parameter(EncoderParameter::Lookahead)?.max(0) as usize)
    }

    /// Resets the codec state to that of a freshly created encoder,
    /// keeping CTL settings.
    pub fn reset(&mut self) -> Result<()> {
        self.handle
            .call(|st| Ok(unsafe { B::encoder_ctl_set(st, ffi::OPUS_RESET_STATE, 0) }))?;
        Ok(())
    }

    /// Re-runs native initialization with the construction parameters.
    ///
    /// Unlike [`reset`](Self::reset) this also restores every CTL setting
    /// to its default.
    pub fn reinitialize(&mut self) -> Result<()> {
        let fs = self.sample_rate.hz();
        let channels = self.channels.count() as c_int;
        let application = self.application.to_ffi();
        self.handle
            .call(|st| Ok(unsafe { B::encoder_init(st, fs, channels, application) }))?;
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

impl<B: Native> std::fmt::Debug for Encoder<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Encoder")
            .field("sample_rate", &self.sample_rate)
            .field("channels", &self.channels)
            .field("application", &self.application)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Recommended packet buffer size; no single Opus packet needs more.
pub const MAX_PACKET_SIZE: usize = 4000;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::{self, Stub};

    fn voip(rate: SampleRate, channels: Channels) -> Encoder<Stub> {
        Encoder::from_config(&EncoderConfig::new(rate, channels, Application::VoIP)).unwrap()
    }

    #[test]
    fn test_encoder_create_dispose_all_layouts() {
        for rate in SampleRate::ALL {
            for channels in [Channels::Mono, Channels::Stereo] {
                stub::reset();
                let mut enc = voip(rate, channels);
                assert_eq!(enc.sample_rate(), rate);
                assert_eq!(enc.channels(), channels);
                enc.dispose();
                enc.dispose();
                assert!(enc.is_disposed());
                drop(enc);
                assert_eq!(stub::count("encoder_destroy"), 1);
            }
        }
    }

    #[test]
    fn test_encoder_create_failure() {
        stub::reset();
        stub::fail_create(ffi::OPUS_ALLOC_FAIL);
        let res = Encoder::<Stub>::from_config(&EncoderConfig::default());
        assert_eq!(res.unwrap_err(), Error::AllocationFailure);
        assert_eq!(stub::count("encoder_destroy"), 0);
    }

    #[test]
    fn test_encoder_config_applied() {
        stub::reset();
        let mut cfg = EncoderConfig::new(SampleRate::Hz16000, Channels::Mono, Application::VoIP);
        cfg.bitrate = Some(24000);
        cfg.complexity = Some(5);
        cfg.dtx = Some(true);
        let enc = Encoder::<Stub>::from_config(&cfg).unwrap();
        assert_eq!(enc.bitrate().unwrap(), 24000);
        assert_eq!(enc.complexity().unwrap(), 5);
        assert_eq!(enc.get_parameter(EncoderParameter::Dtx).unwrap(), 1);
    }

    #[test]
    fn test_encoder_bad_config_releases() {
        stub::reset();
        let mut cfg = EncoderConfig::default();
        cfg.complexity = Some(11);
        let res = Encoder::<Stub>::from_config(&cfg);
        assert_eq!(res.unwrap_err(), Error::BadArgument);
        assert_eq!(stub::count("encoder_destroy"), 1);
    }

    #[test]
    fn test_encode() {
        let mut enc = voip(SampleRate::Hz16000, Channels::Mono);
        let pcm = vec![0i16; 320];
        let mut out = vec![0u8; MAX_PACKET_SIZE];
        let n = enc.encode(&pcm, 320, &mut out).unwrap();
        assert!(n > 0 && n <= out.len());
        assert_eq!(stub::last_frame_size(), 320);
    }

    #[test]
    fn test_encode_bytes_counts_samples() {
        let mut enc = voip(SampleRate::Hz48000, Channels::Stereo);
        let pcm = vec![0u8; 960 * 2 * SAMPLE_WIDTH];
        let mut out = vec![0u8; MAX_PACKET_SIZE];
        assert!(enc.encode_bytes(&pcm, 960, &mut out).is_ok());
        assert_eq!(stub::last_frame_size(), 960);

        let short = vec![0u8; 960 * 2 * SAMPLE_WIDTH - 1];
        assert_eq!(enc.encode_bytes(&short, 960, &mut out), Err(Error::BadArgument));
    }

    #[test]
    fn test_encode_float() {
        let mut enc = voip(SampleRate::Hz48000, Channels::Mono);
        let pcm = vec![0.0f32; 480];
        let mut out = vec![0u8; MAX_PACKET_SIZE];
        assert!(enc.encode_float(&pcm, 480, &mut out).unwrap() > 0);
    }

    #[test]
    fn test_encode_rejects_short_input() {
        stub::reset();
        let mut enc = voip(SampleRate::Hz16000, Channels::Stereo);
        let pcm = vec![0i16; 320];
        let mut out = vec![0u8; MAX_PACKET_SIZE];
        assert_eq!(enc.encode(&pcm, 320, &mut out), Err(Error::BadArgument));
        assert_eq!(stub::count("encode"), 0);
    }

    #[test]
    fn test_encode_surfaces_native_error() {
        let mut enc = voip(SampleRate::Hz16000, Channels::Mono);
        let pcm = vec![0i16; 321];
        let mut out = vec![0u8; MAX_PACKET_SIZE];
        // The stub only accepts 2.5ms multiples, like libopus.
        assert_eq!(enc.encode(&pcm, 321, &mut out), Err(Error::BadArgument));
    }

    #[test]
    fn test_disposed_encoder_makes_no_native_calls() {
        let mut enc = voip(SampleRate::Hz16000, Channels::Mono);
        enc.dispose();
        stub::reset();

        let pcm = vec![0i16; 320];
        let bytes = vec![0u8; 640];
        let float = vec![0.0f32; 320];
        let mut out = vec![0u8; MAX_PACKET_SIZE];
        assert_eq!(enc.encode(&pcm, 320, &mut out), Err(Error::Disposed));
        assert_eq!(enc.encode_bytes(&bytes, 320, &mut out), Err(Error::Disposed));
        assert_eq!(enc.encode_float(&float, 320, &mut out), Err(Error::Disposed));
        assert_eq!(enc.get_parameter(EncoderParameter::Bitrate), Err(Error::Disposed));
        assert_eq!(enc.set_bitrate(32000), Err(Error::Disposed));
        // Validation failures still report Disposed first.
        assert_eq!(enc.set_complexity(99), Err(Error::Disposed));
        assert_eq!(enc.reset(), Err(Error::Disposed));
        assert_eq!(enc.reinitialize(), Err(Error::Disposed));
        assert_eq!(stub::total(), 0);
    }

    #[test]
    fn test_set_parameter_validation() {
        stub::reset();
        let mut enc = voip(SampleRate::Hz16000, Channels::Mono);
        assert_eq!(enc.set_complexity(11), Err(Error::BadArgument));
        assert_eq!(enc.set_bitrate(100), Err(Error::BadArgument));
        assert_eq!(enc.set_parameter(EncoderParameter::Lookahead, 0), Err(Error::BadArgument));
        assert_eq!(stub::count("encoder_ctl_set"), 0);

        enc.set_bitrate(32000).unwrap();
        enc.set_bandwidth(Some(Bandwidth::Wideband)).unwrap();
        assert_eq!(
            enc.get_parameter(EncoderParameter::Bandwidth).unwrap(),
            ffi::OPUS_BANDWIDTH_WIDEBAND
        );
        enc.set_bandwidth(None).unwrap();
        assert_eq!(enc.get_parameter(EncoderParameter::Bandwidth).unwrap(), ffi::OPUS_AUTO);
    }

    #[test]
    fn test_reinitialize_restores_defaults() {
        let mut enc = voip(SampleRate::Hz16000, Channels::Mono);
        enc.set_complexity(3).unwrap();
        enc.reinitialize().unwrap();
        assert_eq!(enc.complexity().unwrap(), 0);
        assert_eq!(enc.application(), Application::VoIP);
        assert_eq!(
            enc.get_parameter(EncoderParameter::Application).unwrap(),
            ffi::OPUS_APPLICATION_VOIP
        );
    }

    #[test]
    fn test_state_size() {
        assert!(Encoder::<Stub>::state_size(Channels::Stereo).unwrap() > 0);
    }

    #[test]
    fn test_frame_size_for() {
        let enc = voip(SampleRate::Hz16000, Channels::Mono);
        assert_eq!(enc.frame_size_for(FrameDuration::Ms10), 160);
        assert_eq!(enc.frame_size_for(FrameDuration::Ms20), 320);
        assert_eq!(enc.frame_size_for(FrameDuration::Ms40), 640);
    }
}

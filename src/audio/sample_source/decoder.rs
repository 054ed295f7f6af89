// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::fs::File;
use std::path::Path;

use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{Decoder as SymphoniaCodecDecoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};

use super::error::DecodeError;
use crate::audio::format::AudioFormat;

/// A decoder that yields interleaved f32 PCM.
///
/// This is the seam between the mixing core and the actual codec machinery:
/// sources pull from a `PcmDecoder` and never see packets, containers or
/// integer sample formats. Dropping the decoder releases its resources.
pub trait PcmDecoder: Send {
    /// Fills `out` with up to `out.len()` interleaved samples and returns the
    /// number written. Returns `Ok(0)` at end of stream. Reads may be short
    /// before the end.
    fn read(&mut self, out: &mut [f32]) -> Result<usize, DecodeError>;

    /// Returns the PCM format this decoder produces.
    fn format(&self) -> AudioFormat;
}

/// A `PcmDecoder` backed by symphonia. Handles WAV, MP3, FLAC, OGG and any
/// other format symphonia supports, converting all sample formats to f32.
pub struct SymphoniaDecoder {
    format_reader: Box<dyn FormatReader>,
    decoder: Box<dyn SymphoniaCodecDecoder>,
    track_id: u32,
    format: AudioFormat,
    // Samples decoded from the last packet that did not fit the caller's
    // buffer. Served first on the next read.
    leftover: Vec<f32>,
    finished: bool,
}

impl SymphoniaDecoder {
    /// Opens an audio file and prepares its first audio track for decoding.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<SymphoniaDecoder, DecodeError> {
        let path = path.as_ref();
        let display_path = path.display().to_string();

        let file = File::open(path).map_err(|e| {
            DecodeError::Io(std::io::Error::new(
                e.kind(),
                format!("{}: {}", display_path, e),
            ))
        })?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // The file extension helps the probe guess the container format.
        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(extension);
        }

        let meta_opts: MetadataOptions = Default::default();
        let fmt_opts: FormatOptions = Default::default();
        let probed = get_probe()
            .format(&hint, mss, &fmt_opts, &meta_opts)
            .map_err(|_| DecodeError::UnsupportedMedia(display_path.clone()))?;

        let mut format_reader = probed.format;

        let track = format_reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| DecodeError::NoAudioTrack(display_path.clone()))?;

        let track_id = track.id;
        let params = &track.codec_params;

        let sample_rate = params
            .sample_rate
            .ok_or_else(|| DecodeError::UnknownSampleRate(display_path.clone()))?;

        let decoder_opts: DecoderOptions = Default::default();
        let mut decoder = get_codecs()
            .make(params, &decoder_opts)
            .map_err(DecodeError::Codec)?;

        // Prefer the container's channel count. Some containers omit it, in
        // which case we decode the first audio packet and derive it from the
        // decoded buffer; those samples become the initial leftover so they
        // are not lost.
        let channels = params.channels.map(|c| c.count() as u16).unwrap_or(0);
        let (channels, leftover) = if channels > 0 {
            (channels, Vec::new())
        } else {
            match Self::next_decoded(format_reader.as_mut(), decoder.as_mut(), track_id)? {
                Some((samples, decoded_channels)) => (decoded_channels as u16, samples),
                None => return Err(DecodeError::UnknownChannelCount(display_path)),
            }
        };

        let format = AudioFormat::new(sample_rate, channels)
            .map_err(|_| DecodeError::UnknownChannelCount(display_path))?;

        Ok(SymphoniaDecoder {
            format_reader,
            decoder,
            track_id,
            format,
            leftover,
            finished: false,
        })
    }

    /// Reads the next packet, mapping the assorted ways symphonia signals end
    /// of stream to `Ok(None)`. ResetRequired is propagated so the caller can
    /// reset the decoder and retry.
    fn next_packet(format_reader: &mut dyn FormatReader) -> Result<Option<Packet>, DecodeError> {
        match format_reader.next_packet() {
            Ok(packet) => Ok(Some(packet)),
            Err(SymphoniaError::ResetRequired) => {
                Err(DecodeError::Codec(SymphoniaError::ResetRequired))
            }
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                Ok(None)
            }
            // Some decoders return DecodeError at EOF instead of IoError.
            Err(SymphoniaError::DecodeError(_)) => Ok(None),
            Err(e) => Err(DecodeError::Codec(e)),
        }
    }

    /// Reads and decodes packets for our track until one yields PCM. Returns
    /// the interleaved samples and the channel count observed in the decoded
    /// buffer, or `None` at end of stream.
    fn next_decoded(
        format_reader: &mut dyn FormatReader,
        decoder: &mut dyn SymphoniaCodecDecoder,
        track_id: u32,
    ) -> Result<Option<(Vec<f32>, usize)>, DecodeError> {
        loop {
            let packet = match Self::next_packet(format_reader) {
                Ok(Some(packet)) => packet,
                Ok(None) => return Ok(None),
                Err(DecodeError::Codec(SymphoniaError::ResetRequired)) => {
                    decoder.reset();
                    continue;
                }
                Err(e) => return Err(e),
            };
            if packet.track_id() != track_id {
                continue;
            }
            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::ResetRequired) => {
                    decoder.reset();
                    decoder.decode(&packet).map_err(DecodeError::Codec)?
                }
                Err(e) => return Err(DecodeError::Codec(e)),
            };
            let (samples, channels) = Self::buffer_to_f32(decoded);
            // Header packets (e.g. Ogg) decode to zero PCM frames; skip them.
            if channels > 0 && !samples.is_empty() {
                return Ok(Some((samples, channels)));
            }
        }
    }

    /// Converts a decoded buffer of any sample format to interleaved f32,
    /// returning the observed channel count alongside the samples.
    fn buffer_to_f32(decoded: AudioBufferRef) -> (Vec<f32>, usize) {
        match decoded {
            AudioBufferRef::F32(buf) => Self::interleave(&buf, |sample| sample),
            AudioBufferRef::F64(buf) => Self::interleave(&buf, |sample| sample as f32),
            AudioBufferRef::S8(buf) => Self::interleave(&buf, Self::scale_s8),
            AudioBufferRef::S16(buf) => Self::interleave(&buf, Self::scale_s16),
            AudioBufferRef::S24(buf) => Self::interleave(&buf, |sample| {
                Self::scale_s24(sample.inner())
            }),
            AudioBufferRef::S32(buf) => Self::interleave(&buf, Self::scale_s32),
            AudioBufferRef::U8(buf) => Self::interleave(&buf, Self::scale_u8),
            AudioBufferRef::U16(buf) => Self::interleave(&buf, Self::scale_u16),
            AudioBufferRef::U24(buf) => Self::interleave(&buf, |sample| {
                Self::scale_u24(sample.inner())
            }),
            AudioBufferRef::U32(buf) => Self::interleave(&buf, Self::scale_u32),
        }
    }

    /// Interleaves a planar decoded buffer, converting each sample with the
    /// given closure.
    fn interleave<T, F>(buf: &AudioBuffer<T>, convert: F) -> (Vec<f32>, usize)
    where
        T: symphonia::core::sample::Sample,
        F: Fn(T) -> f32,
    {
        let frames = buf.frames();
        let channels = buf.spec().channels.count();
        let planes = buf.planes();
        let mut samples = Vec::with_capacity(frames * channels);
        for frame_idx in 0..frames {
            for ch_idx in 0..channels {
                samples.push(convert(planes.planes()[ch_idx][frame_idx]));
            }
        }
        (samples, channels)
    }

    // Scaling helpers for all integer formats. These are `pub(crate)` so they
    // can be validated directly in unit tests.

    #[inline]
    pub(crate) fn scale_s8(sample: i8) -> f32 {
        sample as f32 / (1i64 << 7) as f32
    }

    #[inline]
    pub(crate) fn scale_s16(sample: i16) -> f32 {
        sample as f32 / (1i64 << 15) as f32
    }

    #[inline]
    pub(crate) fn scale_s24(sample: i32) -> f32 {
        sample as f32 / (1i64 << 23) as f32
    }

    #[inline]
    pub(crate) fn scale_s32(sample: i32) -> f32 {
        sample as f32 / (1i64 << 31) as f32
    }

    #[inline]
    pub(crate) fn scale_u8(sample: u8) -> f32 {
        (sample as f32 / u8::MAX as f32) * 2.0 - 1.0
    }

    #[inline]
    pub(crate) fn scale_u16(sample: u16) -> f32 {
        (sample as f32 / u16::MAX as f32) * 2.0 - 1.0
    }

    #[inline]
    pub(crate) fn scale_u24(sample: u32) -> f32 {
        let max = (1u32 << 24) - 1;
        (sample as f32 / max as f32) * 2.0 - 1.0
    }

    #[inline]
    pub(crate) fn scale_u32(sample: u32) -> f32 {
        (sample as f32 / u32::MAX as f32) * 2.0 - 1.0
    }
}

impl PcmDecoder for SymphoniaDecoder {
    fn read(&mut self, out: &mut [f32]) -> Result<usize, DecodeError> {
        if self.finished {
            return Ok(0);
        }

        let mut written = 0;

        // Serve leftovers from the previous packet first.
        if !self.leftover.is_empty() {
            let to_take = out.len().min(self.leftover.len());
            out[..to_take].copy_from_slice(&self.leftover[..to_take]);
            self.leftover.drain(..to_take);
            written += to_take;
        }

        while written < out.len() {
            let samples = match Self::next_decoded(
                self.format_reader.as_mut(),
                self.decoder.as_mut(),
                self.track_id,
            )? {
                Some((samples, _)) => samples,
                None => {
                    if written == 0 {
                        self.finished = true;
                    }
                    break;
                }
            };

            let to_take = (out.len() - written).min(samples.len());
            out[written..written + to_take].copy_from_slice(&samples[..to_take]);
            written += to_take;
            if samples.len() > to_take {
                self.leftover.extend_from_slice(&samples[to_take..]);
            }
        }

        Ok(written)
    }

    fn format(&self) -> AudioFormat {
        self.format
    }
}

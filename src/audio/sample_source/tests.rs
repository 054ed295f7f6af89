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

//! Shared sample source test utilities, plus decoder tests that need real
//! audio files on disk.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::decoder::PcmDecoder;
use super::error::DecodeError;
use crate::audio::format::AudioFormat;

/// A scripted `PcmDecoder` for tests: serves a fixed sample buffer in reads
/// of at most `chunk` samples (modelling decoders that return less than
/// asked), can be told to fail after N reads, and can report its drop via a
/// shared counter so release-exactly-once behavior is observable.
pub struct FakeDecoder {
    samples: Vec<f32>,
    position: usize,
    chunk: usize,
    format: AudioFormat,
    reads: usize,
    fail_after: Option<usize>,
    drop_counter: Option<Arc<AtomicUsize>>,
}

impl FakeDecoder {
    pub fn new(samples: Vec<f32>, chunk: usize) -> FakeDecoder {
        FakeDecoder {
            samples,
            position: 0,
            chunk,
            format: AudioFormat::mono(44100).unwrap(),
            reads: 0,
            fail_after: None,
            drop_counter: None,
        }
    }

    pub fn with_format(mut self, format: AudioFormat) -> FakeDecoder {
        self.format = format;
        self
    }

    pub fn with_drop_counter(mut self, counter: Arc<AtomicUsize>) -> FakeDecoder {
        self.drop_counter = Some(counter);
        self
    }

    pub fn fail_after(mut self, reads: usize) -> FakeDecoder {
        self.fail_after = Some(reads);
        self
    }
}

impl PcmDecoder for FakeDecoder {
    fn read(&mut self, out: &mut [f32]) -> Result<usize, DecodeError> {
        if let Some(fail_after) = self.fail_after {
            if self.reads >= fail_after {
                return Err(DecodeError::UnsupportedMedia("fake decoder".to_string()));
            }
        }
        self.reads += 1;

        let remaining = self.samples.len() - self.position;
        let to_copy = remaining.min(self.chunk).min(out.len());
        out[..to_copy].copy_from_slice(&self.samples[self.position..self.position + to_copy]);
        self.position += to_copy;
        Ok(to_copy)
    }

    fn format(&self) -> AudioFormat {
        self.format
    }
}

impl Drop for FakeDecoder {
    fn drop(&mut self) {
        if let Some(counter) = &self.drop_counter {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Writes a 16-bit PCM WAV file and returns its temp dir and path. Used by
/// decoder, cache and player tests to author real fixtures on the fly.
pub fn write_wav(
    samples: &[i16],
    channels: u16,
    sample_rate: u32,
) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("test.wav");
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).expect("failed to create wav");
    for &sample in samples {
        writer.write_sample(sample).expect("failed to write sample");
    }
    writer.finalize().expect("failed to finalize wav");
    (dir, path)
}

mod decoder_tests {
    use super::*;
    use crate::audio::sample_source::decoder::SymphoniaDecoder;
    use crate::audio::sample_source::{SampleSource, StreamingSampleSource};

    #[test]
    fn test_open_reports_format() {
        let samples: Vec<i16> = vec![0; 512];
        let (_dir, path) = write_wav(&samples, 2, 48000);

        let decoder = SymphoniaDecoder::open(&path).unwrap();
        assert_eq!(decoder.format().sample_rate(), 48000);
        assert_eq!(decoder.format().channels(), 2);
    }

    #[test]
    fn test_open_missing_file() {
        let result = SymphoniaDecoder::open("/nonexistent/missing.wav");
        assert!(matches!(result, Err(DecodeError::Io(_))));
    }

    #[test]
    fn test_reads_scaled_samples() {
        // Full-scale positive and negative, plus silence.
        let samples: Vec<i16> = vec![i16::MAX, i16::MIN, 0, 0];
        let (_dir, path) = write_wav(&samples, 1, 44100);

        let mut decoder = SymphoniaDecoder::open(&path).unwrap();
        let mut out = vec![0.0f32; 4];
        let mut read = 0;
        while read < out.len() {
            let n = decoder.read(&mut out[read..]).unwrap();
            if n == 0 {
                break;
            }
            read += n;
        }

        assert_eq!(read, 4);
        assert!((out[0] - 1.0).abs() < 1e-3);
        assert!((out[1] + 1.0).abs() < 1e-3);
        assert!(out[2].abs() < 1e-6);
    }

    #[test]
    fn test_read_past_end_returns_zero() {
        let samples: Vec<i16> = vec![100; 16];
        let (_dir, path) = write_wav(&samples, 1, 44100);

        let mut decoder = SymphoniaDecoder::open(&path).unwrap();
        let mut out = vec![0.0f32; 1024];
        while decoder.read(&mut out).unwrap() > 0 {}

        assert_eq!(decoder.read(&mut out).unwrap(), 0);
        assert_eq!(decoder.read(&mut out).unwrap(), 0);
    }

    #[test]
    fn test_small_read_buffer_preserves_order() {
        let samples: Vec<i16> = (0..64).map(|i| i * 256).collect();
        let (_dir, path) = write_wav(&samples, 1, 44100);

        let mut decoder = SymphoniaDecoder::open(&path).unwrap();
        let mut collected = Vec::new();
        let mut out = vec![0.0f32; 7]; // deliberately not a multiple of anything
        loop {
            let n = decoder.read(&mut out).unwrap();
            if n == 0 {
                break;
            }
            collected.extend_from_slice(&out[..n]);
        }

        assert_eq!(collected.len(), 64);
        for (i, &sample) in collected.iter().enumerate() {
            let expected = (i as f32 * 256.0) / 32768.0;
            assert!((sample - expected).abs() < 1e-4, "sample {} mismatched", i);
        }
    }

    #[test]
    fn test_streaming_source_over_real_file() {
        let samples: Vec<i16> = vec![1000; 100];
        let (_dir, path) = write_wav(&samples, 1, 44100);

        let decoder = SymphoniaDecoder::open(&path).unwrap();
        let mut source = StreamingSampleSource::new(Box::new(decoder));
        let mut out = vec![0.0f32; 64];
        let mut total = 0;
        loop {
            let n = source.pull(&mut out).unwrap();
            total += n;
            if source.exhausted() {
                break;
            }
            assert!(n > 0);
        }

        assert_eq!(total, 100);
    }

    // Integer scaling helpers, validated at their extremes.

    #[test]
    fn test_integer_scaling_signed_ranges() {
        assert!((SymphoniaDecoder::scale_s8(0) - 0.0).abs() < 1e-7);
        assert!(SymphoniaDecoder::scale_s8(i8::MAX) <= 1.0 + 1e-7);
        assert!(SymphoniaDecoder::scale_s8(i8::MIN) >= -1.0 - 1e-7);

        assert!((SymphoniaDecoder::scale_s16(0) - 0.0).abs() < 1e-7);
        assert!(SymphoniaDecoder::scale_s16(i16::MAX) <= 1.0 + 1e-7);
        assert!(SymphoniaDecoder::scale_s16(i16::MIN) >= -1.0 - 1e-7);

        assert!((SymphoniaDecoder::scale_s24(0) - 0.0).abs() < 1e-7);
        assert!(SymphoniaDecoder::scale_s24((1 << 23) - 1) <= 1.0 + 1e-7);
        assert!(SymphoniaDecoder::scale_s24(-(1 << 23)) >= -1.0 - 1e-7);

        assert!((SymphoniaDecoder::scale_s32(0) - 0.0).abs() < 1e-7);
        assert!(SymphoniaDecoder::scale_s32(i32::MAX) <= 1.0 + 1e-7);
        assert!(SymphoniaDecoder::scale_s32(i32::MIN) >= -1.0 - 1e-7);
    }

    #[test]
    fn test_integer_scaling_unsigned_ranges() {
        assert!((SymphoniaDecoder::scale_u8(0) + 1.0).abs() < 1e-7);
        assert!((SymphoniaDecoder::scale_u8(u8::MAX) - 1.0).abs() < 1e-7);

        assert!((SymphoniaDecoder::scale_u16(0) + 1.0).abs() < 1e-7);
        assert!((SymphoniaDecoder::scale_u16(u16::MAX) - 1.0).abs() < 1e-7);

        let max_u24 = (1u32 << 24) - 1;
        assert!((SymphoniaDecoder::scale_u24(0) + 1.0).abs() < 1e-7);
        assert!((SymphoniaDecoder::scale_u24(max_u24) - 1.0).abs() < 1e-7);

        assert!((SymphoniaDecoder::scale_u32(0) + 1.0).abs() < 1e-7);
        assert!((SymphoniaDecoder::scale_u32(u32::MAX) - 1.0).abs() < 1e-7);
    }
}

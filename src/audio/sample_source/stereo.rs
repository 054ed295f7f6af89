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
use super::error::DecodeError;
use super::SampleSource;
use crate::audio::format::AudioFormat;

/// Adapts a mono source to stereo by duplicating every sample (L = R).
///
/// Wrapped around mono inputs when the mixer output is stereo, so that by the
/// time a source is active its channel count always matches the output. The
/// mono scratch buffer grows to the largest half-pull seen and is then reused.
pub struct MonoToStereoSource {
    inner: Box<dyn SampleSource>,
    format: AudioFormat,
    mono: Vec<f32>,
}

impl MonoToStereoSource {
    /// Wraps a mono source. The inner source must actually be mono; the
    /// mixer's insertion path guarantees this.
    pub fn new(inner: Box<dyn SampleSource>) -> MonoToStereoSource {
        debug_assert_eq!(inner.format().channels(), 1);
        let format = inner.format().with_channels(2);
        MonoToStereoSource {
            inner,
            format,
            mono: Vec::new(),
        }
    }
}

impl SampleSource for MonoToStereoSource {
    fn pull(&mut self, out: &mut [f32]) -> Result<usize, DecodeError> {
        let frames = out.len() / 2;
        if self.mono.len() < frames {
            self.mono.resize(frames, 0.0);
        }

        let read = self.inner.pull(&mut self.mono[..frames])?;
        for (i, &sample) in self.mono[..read].iter().enumerate() {
            out[i * 2] = sample;
            out[i * 2 + 1] = sample;
        }
        Ok(read * 2)
    }

    fn format(&self) -> AudioFormat {
        self.format
    }

    fn exhausted(&self) -> bool {
        self.inner.exhausted()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::audio::sample_source::CachedSampleSource;

    fn mono_source(samples: Vec<f32>) -> Box<dyn SampleSource> {
        Box::new(CachedSampleSource::new(
            Arc::new(samples),
            AudioFormat::mono(44100).unwrap(),
        ))
    }

    #[test]
    fn test_duplicates_each_sample() {
        let mut source = MonoToStereoSource::new(mono_source(vec![0.1, 0.2, 0.3]));
        let mut out = vec![0.0; 6];

        assert_eq!(source.pull(&mut out).unwrap(), 6);
        assert_eq!(out, vec![0.1, 0.1, 0.2, 0.2, 0.3, 0.3]);
        assert!(source.exhausted());
    }

    #[test]
    fn test_reports_stereo_format() {
        let source = MonoToStereoSource::new(mono_source(vec![0.1]));
        assert_eq!(source.format().channels(), 2);
        assert_eq!(source.format().sample_rate(), 44100);
    }

    #[test]
    fn test_short_inner_read_stays_interleaved() {
        let mut source = MonoToStereoSource::new(mono_source(vec![0.5, 0.6, 0.7]));
        let mut out = vec![0.0; 4];

        assert_eq!(source.pull(&mut out).unwrap(), 4);
        assert_eq!(out, vec![0.5, 0.5, 0.6, 0.6]);

        // One mono sample left: a short stereo read of two samples.
        assert_eq!(source.pull(&mut out).unwrap(), 2);
        assert_eq!(&out[..2], &[0.7, 0.7]);
        assert!(source.exhausted());
        assert_eq!(source.pull(&mut out).unwrap(), 0);
    }
}

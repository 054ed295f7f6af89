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
use super::decoder::PcmDecoder;
use super::error::DecodeError;
use super::SampleSource;
use crate::audio::format::AudioFormat;

/// A sample source that decodes incrementally from a live decoder.
///
/// Suited to sounds too long to cache. The decoder is released the moment it
/// reports end of stream, exactly once; after that the source is exhausted and
/// pulls are no-ops, so the mixer may safely poll it again before removal.
pub struct StreamingSampleSource {
    decoder: Option<Box<dyn PcmDecoder>>,
    format: AudioFormat,
}

impl StreamingSampleSource {
    /// Creates a new source that pulls from the given decoder.
    pub fn new(decoder: Box<dyn PcmDecoder>) -> StreamingSampleSource {
        let format = decoder.format();
        StreamingSampleSource {
            decoder: Some(decoder),
            format,
        }
    }
}

impl SampleSource for StreamingSampleSource {
    fn pull(&mut self, out: &mut [f32]) -> Result<usize, DecodeError> {
        let Some(decoder) = self.decoder.as_mut() else {
            return Ok(0);
        };

        // Decoder reads may be short, so keep reading until the buffer is
        // full or the stream ends. This stays within one buffer's worth of
        // I/O per pull.
        let mut written = 0;
        while written < out.len() {
            match decoder.read(&mut out[written..]) {
                Ok(0) => {
                    self.decoder = None;
                    break;
                }
                Ok(n) => written += n,
                Err(e) => {
                    // The stream is unusable after an error; release the
                    // decoder and report the failure once.
                    self.decoder = None;
                    return Err(e);
                }
            }
        }

        Ok(written)
    }

    fn format(&self) -> AudioFormat {
        self.format
    }

    fn exhausted(&self) -> bool {
        self.decoder.is_none()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::audio::sample_source::tests::FakeDecoder;

    #[test]
    fn test_streams_until_end() {
        let decoder = FakeDecoder::new(vec![0.1; 10], 3);
        let mut source = StreamingSampleSource::new(Box::new(decoder));
        let mut out = vec![0.0; 4];

        // Short decoder reads (3 at a time) are assembled into full pulls.
        assert_eq!(source.pull(&mut out).unwrap(), 4);
        assert_eq!(source.pull(&mut out).unwrap(), 4);
        assert!(!source.exhausted());

        // Final pull drains the remaining 2 samples and hits end of stream.
        assert_eq!(source.pull(&mut out).unwrap(), 2);
        assert!(source.exhausted());
        assert_eq!(source.pull(&mut out).unwrap(), 0);
    }

    #[test]
    fn test_decoder_released_exactly_once() {
        let drops = Arc::new(AtomicUsize::new(0));
        let decoder = FakeDecoder::new(vec![0.5; 2], 2).with_drop_counter(drops.clone());
        let mut source = StreamingSampleSource::new(Box::new(decoder));
        let mut out = vec![0.0; 8];

        assert_eq!(source.pull(&mut out).unwrap(), 2);
        assert!(source.exhausted());
        assert_eq!(drops.load(Ordering::SeqCst), 1);

        // Further pulls have no side effects.
        assert_eq!(source.pull(&mut out).unwrap(), 0);
        assert_eq!(source.pull(&mut out).unwrap(), 0);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_error_releases_decoder() {
        let drops = Arc::new(AtomicUsize::new(0));
        let decoder = FakeDecoder::new(vec![0.5; 100], 10)
            .with_drop_counter(drops.clone())
            .fail_after(1);
        let mut source = StreamingSampleSource::new(Box::new(decoder));
        let mut out = vec![0.0; 32];

        assert!(source.pull(&mut out).is_err());
        assert!(source.exhausted());
        assert_eq!(drops.load(Ordering::SeqCst), 1);

        // The error is reported once; after that the source is just done.
        assert_eq!(source.pull(&mut out).unwrap(), 0);
    }

    #[test]
    fn test_format_available_after_exhaustion() {
        let decoder = FakeDecoder::new(vec![0.5; 2], 2);
        let format = decoder.format();
        let mut source = StreamingSampleSource::new(Box::new(decoder));
        let mut out = vec![0.0; 8];

        source.pull(&mut out).unwrap();
        assert!(source.exhausted());
        assert_eq!(source.format(), format);
    }
}

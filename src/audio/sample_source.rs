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
pub mod cached;
pub mod decoder;
pub mod error;
pub mod stereo;
pub mod streaming;

#[cfg(test)]
pub(crate) mod tests;

// Re-exports for use by other modules
pub use cached::CachedSampleSource;
pub use decoder::{PcmDecoder, SymphoniaDecoder};
pub use error::DecodeError;
pub use stereo::MonoToStereoSource;
pub use streaming::StreamingSampleSource;

use crate::audio::format::AudioFormat;

/// A pull-based producer of interleaved f32 samples.
///
/// `pull` fills as much of `out` as the source can provide right now and
/// returns the number of samples written. A short read is not the end: callers
/// must only treat a source as finished once [`SampleSource::exhausted`]
/// reports true (or a pull at the true end returns 0). After exhaustion every
/// further pull returns `Ok(0)` with no side effects.
pub trait SampleSource: Send {
    /// Fills `out` with up to `out.len()` interleaved samples and returns the
    /// number of samples written.
    fn pull(&mut self, out: &mut [f32]) -> Result<usize, DecodeError>;

    /// Returns the format of the samples this source produces. Stable for the
    /// lifetime of the source, including after exhaustion.
    fn format(&self) -> AudioFormat;

    /// Returns true once the source has no more samples to provide.
    fn exhausted(&self) -> bool;
}

/// Blanket implementation so `Box<dyn SampleSource>` can be used directly with
/// generic functions that require `S: SampleSource`.
impl SampleSource for Box<dyn SampleSource> {
    fn pull(&mut self, out: &mut [f32]) -> Result<usize, DecodeError> {
        (**self).pull(out)
    }

    fn format(&self) -> AudioFormat {
        (**self).format()
    }

    fn exhausted(&self) -> bool {
        (**self).exhausted()
    }
}

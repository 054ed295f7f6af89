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

use std::fmt;

/// The format of a stream of interleaved 32-bit float PCM samples.
///
/// Every stage of this crate works in f32, so the sample format is implied and
/// only the sample rate and channel count vary. A format can describe any
/// channel count a decoder reports, but output formats (mixer, sink) are
/// restricted to mono or stereo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    sample_rate: u32,
    channels: u16,
}

/// Errors constructing an [`AudioFormat`].
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("sample rate must be greater than 0")]
    ZeroSampleRate,

    #[error("channel count must be greater than 0")]
    ZeroChannels,

    #[error("{0} channel output is not supported (only mono and stereo)")]
    UnsupportedOutputChannels(u16),
}

impl AudioFormat {
    /// Creates a new format. The sample rate and channel count must be nonzero.
    pub fn new(sample_rate: u32, channels: u16) -> Result<AudioFormat, FormatError> {
        if sample_rate == 0 {
            return Err(FormatError::ZeroSampleRate);
        }
        if channels == 0 {
            return Err(FormatError::ZeroChannels);
        }
        Ok(AudioFormat {
            sample_rate,
            channels,
        })
    }

    /// Creates a mono format at the given sample rate.
    pub fn mono(sample_rate: u32) -> Result<AudioFormat, FormatError> {
        AudioFormat::new(sample_rate, 1)
    }

    /// Creates a stereo format at the given sample rate.
    pub fn stereo(sample_rate: u32) -> Result<AudioFormat, FormatError> {
        AudioFormat::new(sample_rate, 2)
    }

    /// Validates this format for use as an output format. Output formats are
    /// limited to mono and stereo; anything wider is rejected up front rather
    /// than at mix time.
    pub fn validate_output(self) -> Result<AudioFormat, FormatError> {
        if self.channels > 2 {
            return Err(FormatError::UnsupportedOutputChannels(self.channels));
        }
        Ok(self)
    }

    /// Returns the sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Returns the number of channels.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Returns the number of interleaved samples in one second of audio.
    pub fn samples_per_second(&self) -> usize {
        self.sample_rate as usize * self.channels as usize
    }

    /// Returns this format with the channel count replaced.
    pub fn with_channels(self, channels: u16) -> AudioFormat {
        AudioFormat { channels, ..self }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Hz/{}ch/f32", self.sample_rate, self.channels)
    }
}

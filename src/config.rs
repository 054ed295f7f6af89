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
use serde::Deserialize;

use crate::audio::format::{AudioFormat, FormatError};

const DEFAULT_SAMPLE_RATE: u32 = 44100;
const DEFAULT_CHANNELS: u16 = 2;

/// Audio output configuration. All fields are optional so applications can
/// deserialize it from their own config files and only override what they
/// care about.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct AudioConfig {
    /// The output device name. When unset, the default output device is used.
    device: Option<String>,

    /// Output sample rate in Hz (default: 44100).
    sample_rate: Option<u32>,

    /// Output channel count, 1 or 2 (default: 2).
    channels: Option<u16>,
}

impl AudioConfig {
    /// Returns the configured device name, if any.
    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }

    /// Returns the output sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE)
    }

    /// Returns the output channel count.
    pub fn channels(&self) -> u16 {
        self.channels.unwrap_or(DEFAULT_CHANNELS)
    }

    /// Builds the output format this configuration describes.
    pub fn output_format(&self) -> Result<AudioFormat, FormatError> {
        AudioFormat::new(self.sample_rate(), self.channels())?.validate_output()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AudioConfig::default();
        assert_eq!(config.device(), None);
        assert_eq!(config.sample_rate(), 44100);
        assert_eq!(config.channels(), 2);

        let format = config.output_format().unwrap();
        assert_eq!(format.sample_rate(), 44100);
        assert_eq!(format.channels(), 2);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: AudioConfig =
            serde_json::from_str(r#"{"device": "Speakers", "sample_rate": 48000}"#).unwrap();
        assert_eq!(config.device(), Some("Speakers"));
        assert_eq!(config.sample_rate(), 48000);
        // Unspecified fields fall back to defaults.
        assert_eq!(config.channels(), 2);
    }

    #[test]
    fn test_rejects_invalid_output_format() {
        let config: AudioConfig = serde_json::from_str(r#"{"channels": 6}"#).unwrap();
        assert!(config.output_format().is_err());

        let config: AudioConfig = serde_json::from_str(r#"{"sample_rate": 0}"#).unwrap();
        assert!(config.output_format().is_err());
    }
}

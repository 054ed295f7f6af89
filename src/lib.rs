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

//! A polyphonic sound effect mixer and player for games.
//!
//! Sound files are decoded once into memory ([`cache::SoundAsset`]) and can then
//! be played any number of times, concurrently, with no per-play decode cost.
//! Longer files can instead be streamed from disk. All active sounds are summed
//! by a [`audio::mixer::Mixer`] whose output is pulled by an audio sink
//! (a real cpal device, or a mock for tests).
//!
//! ```no_run
//! use sfxmix::{AudioConfig, Player};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut player = Player::with_default_output(&AudioConfig::default())?;
//! player.start()?;
//!
//! let explosion = player.load_cached("assets/explosion.wav")?;
//! player.play_cached(&explosion)?;
//! player.play_file("assets/music-sting.ogg")?;
//! # Ok(())
//! # }
//! ```

pub mod audio;
pub mod cache;
pub mod config;
pub mod player;

pub use audio::format::AudioFormat;
pub use audio::mixer::{Mixer, MixerControl, MixerError};
pub use audio::sample_source::DecodeError;
pub use audio::{DeviceError, Sink};
pub use cache::{SoundAsset, SoundCache};
pub use config::AudioConfig;
pub use player::{PlayError, PlaybackState, Player};

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

//! The player facade: one mixer, one sink, one sound cache.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use crate::audio::cpal::CpalSink;
use crate::audio::mixer::{Mixer, MixerControl, MixerError};
use crate::audio::sample_source::{DecodeError, StreamingSampleSource, SymphoniaDecoder};
use crate::audio::{DeviceError, Sink};
use crate::cache::{SoundAsset, SoundCache};
use crate::config::AudioConfig;

/// The player's lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
}

/// Errors starting a sound.
#[derive(Debug, thiserror::Error)]
pub enum PlayError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Mixer(#[from] MixerError),
}

/// A sound player that mixes any number of concurrent sounds into one output
/// stream.
///
/// The player is an explicitly constructed, caller-owned value: it takes its
/// sink and mixer control by injection (see [`Player::new`]) so tests can
/// substitute a mock sink, with [`Player::with_default_output`] as the
/// convenience path for real devices.
///
/// Sounds may be registered while stopped; they queue in the mixer and start
/// sounding on the next [`Player::start`]. There is no auto-start.
/// [`Player::stop`] pauses the sink and preserves every source's position, so
/// start/stop acts as resume/pause; [`Player::stop_all`] is the operation
/// that actually discards the active sounds.
pub struct Player {
    sink: Box<dyn Sink>,
    control: MixerControl,
    cache: Mutex<SoundCache>,
    state: PlaybackState,
}

impl Player {
    /// Creates a player from a sink and the control handle of the mixer that
    /// sink drives.
    pub fn new(sink: Box<dyn Sink>, control: MixerControl) -> Player {
        Player {
            sink,
            control,
            cache: Mutex::new(SoundCache::new()),
            state: PlaybackState::Stopped,
        }
    }

    /// Creates a player wired to a cpal output sink described by the given
    /// configuration. The device itself is not opened until `start`.
    pub fn with_default_output(config: &AudioConfig) -> Result<Player, DeviceError> {
        let format = config
            .output_format()
            .map_err(|e| DeviceError::UnsupportedFormat(e.to_string()))?;
        let (mixer, control) = Mixer::new(format);
        let sink = CpalSink::new(mixer, config.device().map(String::from));
        Ok(Player::new(Box::new(sink), control))
    }

    /// Loads a sound into the player's cache (or returns the cached copy),
    /// fully decoded and ready for repeated low-latency playback.
    pub fn load_cached<P: AsRef<Path>>(&self, path: P) -> Result<Arc<SoundAsset>, DecodeError> {
        self.cache.lock().load(path)
    }

    /// Plays a cached sound. May be called with the same asset any number of
    /// times, concurrently; each call is an independent playback.
    pub fn play_cached(&self, asset: &Arc<SoundAsset>) -> Result<(), PlayError> {
        self.control.add(Box::new(asset.source()))?;
        Ok(())
    }

    /// Plays a sound file by streaming it from disk, decoding incrementally.
    /// The decoder is released as soon as the sound finishes.
    pub fn play_file<P: AsRef<Path>>(&self, path: P) -> Result<(), PlayError> {
        let decoder = SymphoniaDecoder::open(path)?;
        self.control
            .add(Box::new(StreamingSampleSource::new(Box::new(decoder))))?;
        Ok(())
    }

    /// Starts (or resumes) playback. Idempotent while already playing.
    pub fn start(&mut self) -> Result<(), DeviceError> {
        if self.state == PlaybackState::Playing {
            return Ok(());
        }
        self.sink.start()?;
        self.state = PlaybackState::Playing;
        info!("Playback started");
        Ok(())
    }

    /// Stops playback. Active sounds keep their positions and resume on the
    /// next `start`; use [`Player::stop_all`] to discard them instead.
    pub fn stop(&mut self) {
        if self.state == PlaybackState::Stopped {
            return;
        }
        self.sink.stop();
        self.state = PlaybackState::Stopped;
        info!("Playback stopped");
    }

    /// Removes all active sounds. The player's running state is unchanged.
    pub fn stop_all(&self) {
        // Ignore a closed mixer: there is nothing left to clear.
        let _ = self.control.clear();
    }

    /// Returns the player's lifecycle state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Returns the number of sounds in the cache.
    pub fn cached_sounds(&self) -> usize {
        self.cache.lock().len()
    }

    /// Returns the memory held by cached sounds, in bytes.
    pub fn cache_memory_usage(&self) -> usize {
        self.cache.lock().total_memory_usage()
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        // Releases the sink (stopping its output). Sources are not force
        // released; they die with the mixer.
        self.sink.stop();
    }
}

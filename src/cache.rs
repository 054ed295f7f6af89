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

//! Whole-file sound loading and caching.
//!
//! Assets are decoded entirely into memory at load time, trading memory for
//! zero per-play decode latency. Intended for short effects; stream long
//! material instead.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::audio::format::AudioFormat;
use crate::audio::sample_source::{CachedSampleSource, DecodeError, PcmDecoder, SymphoniaDecoder};

/// A fully decoded, immutable sound. The sample data sits behind an `Arc`, so
/// every concurrent playback of the same asset shares one allocation and the
/// data lives until the cache and the last playing source release it.
#[derive(Clone)]
pub struct SoundAsset {
    data: Arc<Vec<f32>>,
    format: AudioFormat,
}

impl SoundAsset {
    /// Loads a sound file, decoding it completely into memory. Reads the
    /// decoder in one-second chunks until end of stream.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<SoundAsset, DecodeError> {
        let mut decoder = SymphoniaDecoder::open(path.as_ref())?;
        let format = decoder.format();

        let chunk_size = format.samples_per_second();
        let mut chunk = vec![0.0f32; chunk_size];
        let mut data = Vec::new();
        loop {
            let read = decoder.read(&mut chunk)?;
            if read == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..read]);
        }

        Ok(SoundAsset {
            data: Arc::new(data),
            format,
        })
    }

    /// Creates a new playback source over this asset. Cheap: no decoding, no
    /// copying, just a new cursor over the shared data.
    pub fn source(&self) -> CachedSampleSource {
        CachedSampleSource::new(self.data.clone(), self.format)
    }

    /// Returns the asset's format.
    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Returns the number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.data.len() / self.format.channels() as usize
    }

    /// Returns the duration of the asset.
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frames() as f64 / self.format.sample_rate() as f64)
    }

    /// Returns the memory held by the decoded samples, in bytes.
    pub fn memory_size(&self) -> usize {
        self.data.len() * std::mem::size_of::<f32>()
    }
}

/// A path-keyed cache of loaded sounds. Loading an already cached path
/// returns the shared entry instead of touching the disk again.
#[derive(Default)]
pub struct SoundCache {
    entries: HashMap<PathBuf, Arc<SoundAsset>>,
}

impl SoundCache {
    /// Creates an empty cache.
    pub fn new() -> SoundCache {
        SoundCache {
            entries: HashMap::new(),
        }
    }

    /// Loads a sound, or returns the cached copy if this path has already
    /// been loaded.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<Arc<SoundAsset>, DecodeError> {
        let path = path.as_ref();
        if let Some(asset) = self.entries.get(path) {
            debug!(path = ?path, "Using cached sound");
            return Ok(asset.clone());
        }

        let asset = Arc::new(SoundAsset::load(path)?);
        info!(
            path = ?path,
            format = %asset.format(),
            duration_ms = asset.duration().as_millis(),
            memory_kb = asset.memory_size() / 1024,
            "Sound loaded"
        );

        self.entries.insert(path.to_path_buf(), asset.clone());
        Ok(asset)
    }

    /// Removes a single entry. Sources already playing it keep their shared
    /// data alive until they finish.
    pub fn evict<P: AsRef<Path>>(&mut self, path: P) -> bool {
        self.entries.remove(path.as_ref()).is_some()
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns the number of cached sounds.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the total memory held by cached sounds, in bytes.
    pub fn total_memory_usage(&self) -> usize {
        self.entries.values().map(|asset| asset.memory_size()).sum()
    }
}

impl std::fmt::Debug for SoundCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundCache")
            .field("cached_sounds", &self.entries.len())
            .field("total_memory_kb", &(self.total_memory_usage() / 1024))
            .finish()
    }
}

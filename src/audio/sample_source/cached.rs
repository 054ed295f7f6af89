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
use std::sync::Arc;

use super::error::DecodeError;
use super::SampleSource;
use crate::audio::format::AudioFormat;

/// A sample source that reads from decoded audio shared in memory.
///
/// The data is behind an `Arc`, so any number of these can play the same sound
/// concurrently; each source only carries its own cursor. Creating one is
/// cheap and never touches the disk, which is the whole point of caching.
pub struct CachedSampleSource {
    data: Arc<Vec<f32>>,
    format: AudioFormat,
    position: usize,
}

impl CachedSampleSource {
    /// Creates a new source over shared interleaved sample data.
    pub fn new(data: Arc<Vec<f32>>, format: AudioFormat) -> CachedSampleSource {
        CachedSampleSource {
            data,
            format,
            position: 0,
        }
    }

    /// Returns the number of samples not yet pulled.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }
}

impl SampleSource for CachedSampleSource {
    fn pull(&mut self, out: &mut [f32]) -> Result<usize, DecodeError> {
        let to_copy = self.remaining().min(out.len());
        if to_copy > 0 {
            out[..to_copy].copy_from_slice(&self.data[self.position..self.position + to_copy]);
            self.position += to_copy;
        }
        Ok(to_copy)
    }

    fn format(&self) -> AudioFormat {
        self.format
    }

    fn exhausted(&self) -> bool {
        self.position >= self.data.len()
    }
}

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

//! Additive mixing of all active sample sources into a single output stream.
//!
//! The mixer is split into two halves connected by a channel: [`Mixer`] lives
//! on the audio thread and is driven by the sink's pull callback, while the
//! cloneable [`MixerControl`] lets application threads register sources
//! without ever making the audio callback wait on a lock. The callback drains
//! pending registrations at the start of each pull and otherwise only touches
//! its own state.

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, warn};

use crate::audio::format::AudioFormat;
use crate::audio::sample_source::{MonoToStereoSource, SampleSource};

/// Default scratch capacity in frames, sized so that typical device buffer
/// requests never allocate on the audio thread.
const DEFAULT_BLOCK_FRAMES: usize = 4096;

enum Command {
    Add(Box<dyn SampleSource>),
    Clear,
}

/// Errors registering a source with the mixer.
#[derive(Debug, thiserror::Error)]
pub enum MixerError {
    #[error("cannot mix a {source_channels} channel source into {output_channels} channel output")]
    UnsupportedChannelLayout {
        source_channels: u16,
        output_channels: u16,
    },

    #[error("source sample rate {source_rate}Hz does not match output rate {output_rate}Hz")]
    SampleRateMismatch { source_rate: u32, output_rate: u32 },

    #[error("the mixer is no longer running")]
    Closed,
}

/// The audio-thread half of the mixer. Owns the active source set and sums
/// sources into the output buffer on every pull.
pub struct Mixer {
    format: AudioFormat,
    active: Vec<Box<dyn SampleSource>>,
    scratch: Vec<f32>,
    commands: Receiver<Command>,
}

/// The control half of the mixer: registers sources and requests clears from
/// application threads. Cloneable; all clones feed the same mixer.
#[derive(Clone)]
pub struct MixerControl {
    format: AudioFormat,
    commands: Sender<Command>,
}

impl Mixer {
    /// Creates a mixer with the given output format, returning the audio-side
    /// mixer and the application-side control handle.
    pub fn new(format: AudioFormat) -> (Mixer, MixerControl) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mixer = Mixer {
            format,
            active: Vec::new(),
            scratch: vec![0.0; DEFAULT_BLOCK_FRAMES * format.channels() as usize],
            commands: rx,
        };
        let control = MixerControl {
            format,
            commands: tx,
        };
        (mixer, control)
    }

    /// Returns the output format.
    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Returns the number of currently active sources. Pending registrations
    /// are counted only after the next pull drains them.
    pub fn active_sources(&self) -> usize {
        self.active.len()
    }

    /// Mixes all active sources into `out` and returns `out.len()`.
    ///
    /// The buffer is always filled completely: silence covers whatever no
    /// source contributed, so the sink never sees a short buffer. Sources
    /// that reach their end (or fail) during this pull are removed before
    /// returning; removal never affects the samples already mixed.
    pub fn pull(&mut self, out: &mut [f32]) -> usize {
        self.drain_commands();

        out.fill(0.0);

        // Growing is the rare case: only when the device asks for a larger
        // buffer than ever before.
        if self.scratch.len() < out.len() {
            self.scratch.resize(out.len(), 0.0);
        }
        let scratch = &mut self.scratch[..out.len()];

        self.active.retain_mut(|source| match source.pull(scratch) {
            Ok(written) => {
                for (mixed, &sample) in out[..written].iter_mut().zip(scratch.iter()) {
                    *mixed += sample;
                }
                !source.exhausted()
            }
            Err(e) => {
                // One bad stream must not take down the mix; drop the source
                // and keep going.
                warn!(error = %e, "Dropping source after mid-stream decode failure");
                false
            }
        });

        out.len()
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            match command {
                Command::Add(source) => self.active.push(source),
                Command::Clear => self.active.clear(),
            }
        }
    }
}

impl MixerControl {
    /// Returns the output format.
    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Registers a source with the mixer.
    ///
    /// Channel layouts are reconciled here, never at mix time: a source whose
    /// channel count matches the output is inserted as-is, a mono source
    /// going to stereo output is wrapped in a duplicating adapter, and any
    /// other combination is rejected. The source starts sounding on the next
    /// pull (immediately if the sink is running, otherwise once it starts).
    pub fn add(&self, source: Box<dyn SampleSource>) -> Result<(), MixerError> {
        let source_format = source.format();

        if source_format.sample_rate() != self.format.sample_rate() {
            return Err(MixerError::SampleRateMismatch {
                source_rate: source_format.sample_rate(),
                output_rate: self.format.sample_rate(),
            });
        }

        let source_channels = source_format.channels();
        let output_channels = self.format.channels();
        let adapted: Box<dyn SampleSource> = if source_channels == output_channels {
            source
        } else if source_channels == 1 && output_channels == 2 {
            Box::new(MonoToStereoSource::new(source))
        } else {
            return Err(MixerError::UnsupportedChannelLayout {
                source_channels,
                output_channels,
            });
        };

        debug!(format = %source_format, "Registering source");
        self.commands
            .send(Command::Add(adapted))
            .map_err(|_| MixerError::Closed)
    }

    /// Removes all active (and pending) sources on the next pull.
    pub fn clear(&self) -> Result<(), MixerError> {
        self.commands
            .send(Command::Clear)
            .map_err(|_| MixerError::Closed)
    }
}

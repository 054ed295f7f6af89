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
pub mod cpal;
pub mod format;
pub mod mixer;
pub mod mock;
pub mod sample_source;

/// An audio output sink. The sink owns the mixer and drives it: while running,
/// the platform audio layer periodically pulls a buffer of mixed samples.
///
/// Stopping a sink pauses pulling without discarding registered sources, so a
/// later `start` resumes every sound from its current position.
pub trait Sink: Send {
    /// Starts (or resumes) pulling from the mixer. Idempotent.
    fn start(&mut self) -> Result<(), DeviceError>;

    /// Stops pulling from the mixer. Sources keep their positions.
    fn stop(&mut self);

    /// Returns true if the sink is currently pulling from the mixer.
    fn is_running(&self) -> bool;
}

/// Errors initializing or starting an audio output sink.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("no output device named {0}")]
    NoDevice(String),

    #[error("no default output device available")]
    NoDefaultDevice,

    #[error("output device does not support {0}")]
    UnsupportedFormat(String),

    #[error("failed to initialize output stream: {0}")]
    StreamInit(String),

    #[error("output thread terminated unexpectedly")]
    OutputThreadDied,
}

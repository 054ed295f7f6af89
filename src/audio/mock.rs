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
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use parking_lot::Mutex;

use crate::audio::mixer::Mixer;
use crate::audio::{DeviceError, Sink};

/// A mock sink. Doesn't open any audio device; instead, tests step the
/// "audio callback" by hand through a [`MockSinkHandle`], which behaves like
/// the real callback: it pulls the mixer while the sink is running and
/// produces silence while it is stopped.
pub struct MockSink {
    mixer: Arc<Mutex<Mixer>>,
    playing: Arc<AtomicBool>,
}

/// A handle for driving a [`MockSink`]'s pulls from test code.
#[derive(Clone)]
pub struct MockSinkHandle {
    mixer: Arc<Mutex<Mixer>>,
    playing: Arc<AtomicBool>,
}

impl MockSink {
    /// Creates a mock sink around the given mixer.
    pub fn new(mixer: Mixer) -> MockSink {
        MockSink {
            mixer: Arc::new(Mutex::new(mixer)),
            playing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns a handle for stepping this sink's callback.
    pub fn handle(&self) -> MockSinkHandle {
        MockSinkHandle {
            mixer: self.mixer.clone(),
            playing: self.playing.clone(),
        }
    }
}

impl MockSinkHandle {
    /// Simulates one callback invocation: returns `sample_count` mixed
    /// samples, or silence if the sink is stopped (matching the real sink,
    /// which keeps emitting zeroes without advancing any source).
    pub fn pull(&self, sample_count: usize) -> Vec<f32> {
        let mut out = vec![0.0; sample_count];
        if self.playing.load(Ordering::Relaxed) {
            self.mixer.lock().pull(&mut out);
        }
        out
    }

    /// Returns the number of active sources in the mixer.
    pub fn active_sources(&self) -> usize {
        self.mixer.lock().active_sources()
    }
}

impl Sink for MockSink {
    fn start(&mut self) -> Result<(), DeviceError> {
        self.playing.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn stop(&mut self) {
        self.playing.store(false, Ordering::Relaxed);
    }

    fn is_running(&self) -> bool {
        self.playing.load(Ordering::Relaxed)
    }
}

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
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{error, info};

use crate::audio::mixer::Mixer;
use crate::audio::{DeviceError, Sink};

/// An audio sink backed by a cpal output device.
///
/// The first `start` hands the mixer to a dedicated output thread (cpal
/// streams are not `Send`, so the stream must be created and kept on one
/// thread) which builds an f32 output stream. The stream callback pulls the
/// mixer directly into the device buffer while the `playing` flag is set and
/// emits silence otherwise, which is how `stop` pauses playback without
/// discarding source positions.
pub struct CpalSink {
    /// The mixer, until the output thread takes it on first start.
    mixer: Option<Mixer>,
    /// Requested device name; None selects the default output device.
    device_name: Option<String>,
    playing: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
    output_thread: Option<thread::JoinHandle<()>>,
}

impl CpalSink {
    /// Creates a sink that will play the mixer's output on the named device,
    /// or on the default output device if no name is given. No device access
    /// happens until `start`.
    pub fn new(mixer: Mixer, device_name: Option<String>) -> CpalSink {
        CpalSink {
            mixer: Some(mixer),
            device_name,
            playing: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(AtomicBool::new(false)),
            output_thread: None,
        }
    }

    /// Finds the requested output device.
    fn find_device(name: Option<&str>) -> Result<cpal::Device, DeviceError> {
        let host = cpal::default_host();
        match name {
            Some(name) => host
                .output_devices()
                .map_err(|e| DeviceError::StreamInit(e.to_string()))?
                .find(|device| {
                    device
                        .name()
                        .map(|device_name| device_name.trim() == name)
                        .unwrap_or(false)
                })
                .ok_or_else(|| DeviceError::NoDevice(name.to_string())),
            None => host
                .default_output_device()
                .ok_or(DeviceError::NoDefaultDevice),
        }
    }

    /// Builds the output stream and runs it until shutdown. Runs on the
    /// output thread; the build result is reported back through `ready_tx`
    /// so `start` can surface initialization errors synchronously.
    fn run_output(
        mut mixer: Mixer,
        device_name: Option<String>,
        playing: Arc<AtomicBool>,
        shutdown: Arc<AtomicBool>,
        ready_tx: crossbeam_channel::Sender<Result<(), DeviceError>>,
    ) {
        let format = mixer.format();
        let device = match Self::find_device(device_name.as_deref()) {
            Ok(device) => device,
            Err(e) => {
                let _ = ready_tx.send(Err(e));
                return;
            }
        };

        let config = cpal::StreamConfig {
            channels: format.channels(),
            sample_rate: cpal::SampleRate(format.sample_rate()),
            buffer_size: cpal::BufferSize::Default,
        };

        let playing_for_callback = playing.clone();
        let stream = device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                if playing_for_callback.load(Ordering::Relaxed) {
                    mixer.pull(data);
                } else {
                    data.fill(0.0);
                }
            },
            |err| error!(error = %err, "Output stream error"),
            None,
        );

        let stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                let _ = ready_tx.send(Err(DeviceError::StreamInit(e.to_string())));
                return;
            }
        };
        if let Err(e) = stream.play() {
            let _ = ready_tx.send(Err(DeviceError::StreamInit(e.to_string())));
            return;
        }

        info!(
            device = device.name().unwrap_or_else(|_| "unknown".to_string()),
            format = %format,
            "Output stream started"
        );
        let _ = ready_tx.send(Ok(()));

        // Keep the stream alive until the sink is dropped.
        while !shutdown.load(Ordering::Relaxed) {
            thread::sleep(Duration::from_millis(50));
        }
    }
}

impl Sink for CpalSink {
    fn start(&mut self) -> Result<(), DeviceError> {
        if self.output_thread.is_none() {
            let mixer = self.mixer.take().ok_or(DeviceError::OutputThreadDied)?;
            let device_name = self.device_name.clone();
            let playing = self.playing.clone();
            let shutdown = self.shutdown.clone();
            let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);

            let handle = thread::spawn(move || {
                Self::run_output(mixer, device_name, playing, shutdown, ready_tx);
            });

            match ready_rx.recv() {
                Ok(Ok(())) => self.output_thread = Some(handle),
                Ok(Err(e)) => {
                    let _ = handle.join();
                    return Err(e);
                }
                Err(_) => {
                    let _ = handle.join();
                    return Err(DeviceError::OutputThreadDied);
                }
            }
        }

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

impl Drop for CpalSink {
    fn drop(&mut self) {
        self.playing.store(false, Ordering::Relaxed);
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.output_thread.take() {
            let _ = handle.join();
        }
    }
}

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
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Sender;
use tracing::{error, info, span, Level};

use super::{error::DeviceError, mixer::AudioMixer, OutputStream};
use crate::config::DEFAULT_STREAM_BUFFER_FRAMES;

/// The host's default output device, opened through cpal.
pub struct Device {
    /// The name used to select this device.
    name: String,
}

impl Device {
    /// Gets the host's default output device. Nothing is opened until `start`.
    pub fn default_output() -> Device {
        Device {
            name: "default".to_string(),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (cpal)", self.name)
    }
}

impl super::Device for Device {
    /// Starts the output stream on a dedicated thread. cpal streams can't move
    /// between threads, so the stream is created, played and dropped there; this
    /// call waits until the stream is either running or has failed.
    fn start(
        &self,
        mixer: AudioMixer,
        buffer_frames: usize,
    ) -> Result<Box<dyn OutputStream>, DeviceError> {
        let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Result<(), DeviceError>>(1);
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(0);
        let running = Arc::new(AtomicBool::new(false));

        let output_thread = {
            let running = running.clone();
            thread::Builder::new()
                .name("sfx-output".to_string())
                .spawn(move || {
                    let span = span!(Level::INFO, "output stream (cpal)");
                    let _enter = span.enter();

                    let stream = match open_stream(mixer, buffer_frames) {
                        Ok(stream) => stream,
                        Err(e) => {
                            let _ = ready_tx.send(Err(e));
                            return;
                        }
                    };

                    running.store(true, Ordering::Release);
                    let _ = ready_tx.send(Ok(()));

                    // Returns once the handle drops its sender.
                    let _ = shutdown_rx.recv();

                    running.store(false, Ordering::Release);
                    drop(stream);
                    info!("Output stream stopped.");
                })
                .map_err(|e| DeviceError::Unavailable(e.to_string()))?
        };

        let startup = match ready_rx.recv() {
            Ok(result) => result,
            Err(_) => Err(DeviceError::Unavailable(
                "output thread exited before the stream started".to_string(),
            )),
        };

        match startup {
            Ok(()) => Ok(Box::new(CpalStream {
                shutdown: Some(shutdown_tx),
                output_thread: Some(output_thread),
                running,
            })),
            Err(e) => {
                let _ = output_thread.join();
                Err(e)
            }
        }
    }
}

/// Opens the default output device and starts a stream driven by the mixer.
fn open_stream(mixer: AudioMixer, buffer_frames: usize) -> Result<cpal::Stream, DeviceError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| DeviceError::Unavailable("no default output device".to_string()))?;
    let supported = device
        .default_output_config()
        .map_err(|e| DeviceError::Unavailable(e.to_string()))?;

    let config = cpal::StreamConfig {
        channels: mixer.num_channels(),
        sample_rate: cpal::SampleRate(mixer.sample_rate()),
        buffer_size: if buffer_frames > 0 {
            cpal::BufferSize::Fixed(buffer_frames as u32)
        } else {
            cpal::BufferSize::Default
        },
    };

    info!(
        device = device.name().unwrap_or_else(|_| "unknown".to_string()),
        host = host.id().name(),
        sample_rate = config.sample_rate.0,
        channels = config.channels,
        buffer_frames,
        device_format = format!("{:?}", supported.sample_format()),
        "Opening output stream."
    );

    let stream = match supported.sample_format() {
        cpal::SampleFormat::F32 => build_f32_stream(&device, &config, mixer)?,
        cpal::SampleFormat::I16 => {
            build_converting_stream::<i16>(&device, &config, mixer, buffer_frames)?
        }
        cpal::SampleFormat::U16 => {
            build_converting_stream::<u16>(&device, &config, mixer, buffer_frames)?
        }
        cpal::SampleFormat::I32 => {
            build_converting_stream::<i32>(&device, &config, mixer, buffer_frames)?
        }
        other => {
            return Err(DeviceError::Unavailable(format!(
                "unsupported device sample format {:?}",
                other
            )))
        }
    };

    stream.play()?;
    Ok(stream)
}

/// f32 devices: mix straight into the device buffer, then clamp in place.
fn build_f32_stream(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut mixer: AudioMixer,
) -> Result<cpal::Stream, DeviceError> {
    Ok(device.build_output_stream(
        config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            mixer.process_into_output(data);
            for sample in data.iter_mut() {
                *sample = sample.clamp(-1.0, 1.0);
            }
        },
        stream_error,
        None,
    )?)
}

/// Integer devices: mix into a preallocated scratch buffer and convert. Device
/// buffers larger than the scratch are mixed in several frame-aligned chunks.
fn build_converting_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut mixer: AudioMixer,
    buffer_frames: usize,
) -> Result<cpal::Stream, DeviceError>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let mut scratch = vec![0.0f32; scratch_len(buffer_frames, config.channels)];
    Ok(device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            for chunk in data.chunks_mut(scratch.len()) {
                let mixed = &mut scratch[..chunk.len()];
                mixer.process_into_output(mixed);
                for (dst, &src) in chunk.iter_mut().zip(mixed.iter()) {
                    *dst = T::from_sample(src.clamp(-1.0, 1.0));
                }
            }
        },
        stream_error,
        None,
    )?)
}

/// Returns the scratch size in samples. A backend-chosen buffer size gets the
/// default size.
fn scratch_len(buffer_frames: usize, channels: u16) -> usize {
    let frames = if buffer_frames > 0 {
        buffer_frames
    } else {
        DEFAULT_STREAM_BUFFER_FRAMES
    };
    frames * channels.max(1) as usize
}

fn stream_error(err: cpal::StreamError) {
    error!(err = err.to_string(), "cpal output stream error");
}

/// Handle to a running cpal stream. Dropping it stops the stream and joins the
/// output thread, which releases the device.
struct CpalStream {
    shutdown: Option<Sender<()>>,
    output_thread: Option<thread::JoinHandle<()>>,
    running: Arc<AtomicBool>,
}

impl OutputStream for CpalStream {
    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl Drop for CpalStream {
    fn drop(&mut self) {
        // Disconnecting the channel wakes the output thread.
        self.shutdown.take();
        if let Some(output_thread) = self.output_thread.take() {
            if output_thread.join().is_err() {
                error!("Output thread panicked.");
            }
        }
    }
}

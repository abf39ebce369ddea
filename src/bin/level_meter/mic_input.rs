//! CPAL-based microphone input
//!
//! Handles device selection, stream configuration and sample format conversion,
//! and drives the capture node from the input callback.

use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SampleFormat, SizedSample, StreamConfig};
use dasp_sample::FromSample;
use level_capture::registry::BoxedNode;
use level_capture::CaptureNode;

// Upper bound on frames converted per pass; larger callbacks are handled in pieces.
const SCRATCH_FRAMES: usize = 4096;

/// Configuration of the running input stream
#[derive(Debug, Clone)]
pub struct MicConfig {
    pub sample_rate: u32,
    pub channels: u16,
    pub device_name: String,
    pub host_name: String,
}

/// Keeps the input stream alive for as long as it is held
pub struct MicInput {
    _stream: cpal::Stream,
    config: MicConfig,
}

impl MicInput {
    /// Opens the default input device and starts feeding `node`.
    ///
    /// If `preferred_host` names an available host it is tried first before
    /// falling back to the others.
    pub fn start(node: BoxedNode, preferred_host: Option<&str>) -> anyhow::Result<Self> {
        let (device, config, sample_format, host_name) = select_input_device(preferred_host)?;

        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, node)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &config, node)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &config, node)?,
            other => anyhow::bail!("unsupported sample format: {:?}", other),
        };

        stream.play().context("failed to start input stream")?;

        let config = MicConfig {
            sample_rate: config.sample_rate.0,
            channels: config.channels,
            device_name,
            host_name,
        };
        log::info!(
            "capturing from '{}' on {} ({} Hz, {} channel(s), first channel metered)",
            config.device_name,
            config.host_name,
            config.sample_rate,
            config.channels
        );

        Ok(Self {
            _stream: stream,
            config,
        })
    }

    pub fn config(&self) -> &MicConfig {
        &self.config
    }
}

fn select_input_device(
    preferred_host: Option<&str>,
) -> anyhow::Result<(cpal::Device, StreamConfig, SampleFormat, String)> {
    let mut last_error: Option<anyhow::Error> = None;
    let available_hosts = cpal::available_hosts();

    for host_id in &available_hosts {
        log::debug!("available audio host: {}", host_id.name());
    }

    // Preferred host first, then the rest in the order CPAL reports them
    let mut host_priority = Vec::new();
    if let Some(preferred) = preferred_host {
        match available_hosts.iter().find(|h| h.name() == preferred) {
            Some(&host_id) => host_priority.push(host_id),
            None => log::warn!("preferred host '{}' is not available", preferred),
        }
    }
    for host_id in available_hosts {
        if !host_priority.contains(&host_id) {
            host_priority.push(host_id);
        }
    }

    for host_id in host_priority {
        let host = cpal::host_from_id(host_id)?;
        let host_name = host_id.name().to_string();

        let Some(device) = host.default_input_device() else {
            last_error = Some(anyhow::anyhow!(
                "host {} has no default input device",
                host_name
            ));
            continue;
        };

        match device.default_input_config() {
            Ok(supported) => {
                let sample_format = supported.sample_format();
                let config = supported.config();
                return Ok((device, config, sample_format, host_name));
            }
            Err(err) => {
                last_error = Some(anyhow::anyhow!(
                    "failed to query default input config for host {}: {}",
                    host_name,
                    err
                ));
            }
        }
    }

    Err(last_error.unwrap_or_else(|| anyhow::anyhow!("no usable input device found")))
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    mut node: BoxedNode,
) -> anyhow::Result<cpal::Stream>
where
    T: Sample + SizedSample,
    f32: FromSample<T>,
{
    let channels = config.channels as usize;
    let mut scratch = vec![0.0f32; SCRATCH_FRAMES];

    let stream = device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                process_input_callback(data, channels, &mut scratch, node.as_mut());
            },
            move |err| {
                log::error!("input stream error: {}", err);
            },
            None,
        )
        .context("failed to build input stream")?;

    Ok(stream)
}

/// Extracts the first channel of interleaved `data` into `scratch` and hands it to
/// the node. Nothing here allocates; `scratch` is sized once up front.
fn process_input_callback<T>(
    data: &[T],
    channels: usize,
    scratch: &mut [f32],
    node: &mut dyn CaptureNode,
) where
    T: Sample,
    f32: FromSample<T>,
{
    if channels == 0 || scratch.is_empty() {
        return;
    }

    for block in data.chunks(channels * scratch.len()) {
        let frames = block.len() / channels;
        for (slot, frame) in scratch.iter_mut().zip(block.chunks_exact(channels)) {
            *slot = f32::from_sample(frame[0]);
        }
        node.process(Some(&scratch[..frames]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use level_capture::{Batch, CaptureBatcher};

    #[test]
    fn first_channel_is_forwarded() {
        let mut node = CaptureBatcher::new(4, Vec::<Batch>::new());
        let mut scratch = vec![0.0f32; 3];
        // Stereo, left = 0.1 * n, right = -1.0
        let data: Vec<f32> = (0..10)
            .flat_map(|n| [0.1 * n as f32, -1.0])
            .collect();

        process_input_callback(&data, 2, &mut scratch, &mut node);

        let batches = node.sink();
        assert_eq!(batches.len(), 2);
        assert!((batches[0][3] - 0.3).abs() < 1e-6);
        assert!(batches.iter().all(|b| b.iter().all(|&s| s >= 0.0)));
        assert_eq!(node.pending().len(), 2);
    }

    #[test]
    fn integer_samples_are_normalised() {
        let mut node = CaptureBatcher::new(2, Vec::<Batch>::new());
        let mut scratch = vec![0.0f32; 8];
        process_input_callback(&[i16::MAX, 0i16], 1, &mut scratch, &mut node);
        let batch = &node.sink()[0];
        assert!((batch[0] - 1.0).abs() < 1e-3);
        assert_eq!(batch[1], 0.0);
    }
}

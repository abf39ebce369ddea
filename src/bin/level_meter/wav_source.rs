//! WAV replay source
//!
//! Decodes a file up front and feeds it to the capture node in render-quantum
//! sized chunks, paced against the wall clock so the meter behaves as it would
//! with a live microphone.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::Context;
use level_capture::registry::BoxedNode;
use level_capture::CaptureNode;

/// Frames per call, matching a Web Audio render quantum.
const QUANTUM_FRAMES: usize = 128;
const PACING_INTERVAL: Duration = Duration::from_millis(5);

pub struct WavReplay {
    finished: Arc<AtomicBool>,
    _handle: JoinHandle<()>,
    pub sample_rate: u32,
    pub frames: usize,
}

impl WavReplay {
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }
}

/// Reads the first channel of `path` as normalised `f32` samples.
pub fn read_first_channel(path: &Path) -> anyhow::Result<(Vec<f32>, u32)> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match (spec.bits_per_sample, spec.sample_format) {
        (32, hound::SampleFormat::Float) => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()?,
        (16, hound::SampleFormat::Int) => reader
            .samples::<i16>()
            .map(|s| s.map(|s| s as f32 / i16::MAX as f32))
            .collect::<Result<_, _>>()?,
        (24, hound::SampleFormat::Int) => reader
            .samples::<i32>()
            .map(|s| s.map(|s| s as f32 / 8_388_607.0))
            .collect::<Result<_, _>>()?,
        (32, hound::SampleFormat::Int) => reader
            .samples::<i32>()
            .map(|s| s.map(|s| s as f32 / i32::MAX as f32))
            .collect::<Result<_, _>>()?,
        (bits, format) => anyhow::bail!(
            "unsupported WAV format: bits_per_sample={} sample_format={:?}",
            bits,
            format
        ),
    };

    let samples = interleaved.into_iter().step_by(channels).collect();
    Ok((samples, spec.sample_rate))
}

/// Starts replaying `path` into `node` on its own thread.
pub fn spawn(path: &Path, mut node: BoxedNode) -> anyhow::Result<WavReplay> {
    let (samples, sample_rate) = read_first_channel(path)?;
    let frames = samples.len();
    log::info!(
        "replaying {} ({} frames at {} Hz)",
        path.display(),
        frames,
        sample_rate
    );

    let finished = Arc::new(AtomicBool::new(false));
    let done = Arc::clone(&finished);

    let handle = std::thread::Builder::new()
        .name("wav-replay".to_string())
        .spawn(move || {
            let started = Instant::now();
            let mut position = 0;

            while position < samples.len() {
                let due = (started.elapsed().as_secs_f64() * sample_rate as f64) as usize;
                while position < due.min(samples.len()) {
                    let end = (position + QUANTUM_FRAMES).min(samples.len());
                    node.process(Some(&samples[position..end]));
                    position = end;
                }
                std::thread::sleep(PACING_INTERVAL);
            }

            let stats = node.stats();
            log::info!(
                "replay finished: {} batches emitted, {} dropped, {} samples left pending",
                stats.emitted,
                stats.dropped,
                node.pending_len()
            );
            done.store(true, Ordering::Release);
        })
        .context("failed to spawn replay thread")?;

    Ok(WavReplay {
        finished,
        _handle: handle,
        sample_rate,
        frames,
    })
}

mod mic_input;
mod wav_source;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use level_capture::{
    batch_channel, BatchSender, CaptureConfig, LevelRecorder, ProcessorRegistry,
    CAPTURE_PROCESSOR_ID,
};

use mic_input::MicInput;
use wav_source::WavReplay;

// Roughly one display refresh.
const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);
const BAR_WIDTH: usize = 50;

#[derive(Parser, Debug)]
#[command(
    name = "level_meter",
    about = "Meter microphone input through the level capture pipeline."
)]
struct Args {
    /// Replay a WAV file instead of capturing from the microphone
    #[arg(long, value_name = "PATH")]
    wav: Option<PathBuf>,

    /// Audio host to try first (for example "ALSA" or "JACK")
    #[arg(long, value_name = "NAME")]
    host: Option<String>,

    /// JSON capture options, same keys as the worklet's processorOptions
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Stop after this many seconds instead of running until interrupted
    #[arg(long, value_name = "SECONDS")]
    seconds: Option<f64>,
}

enum Source {
    Mic(MicInput),
    Wav(WavReplay),
}

impl Source {
    fn is_finished(&self) -> bool {
        match self {
            Source::Mic(_) => false,
            Source::Wav(replay) => replay.is_finished(),
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<CaptureConfig> {
    let Some(path) = path else {
        return Ok(CaptureConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    CaptureConfig::from_json(&text).with_context(|| format!("invalid config in {}", path.display()))
}

fn render_meter(level_db: f64, floor_db: f64) -> String {
    if level_db.is_nan() {
        return format!("{:>8} |{:<width$}|", "-- dBFS", "", width = BAR_WIDTH);
    }
    let fraction = ((level_db - floor_db) / -floor_db).clamp(0.0, 1.0);
    let filled = (fraction * BAR_WIDTH as f64).round() as usize;
    format!(
        "{:>8.1} |{:<width$}|",
        level_db,
        "#".repeat(filled),
        width = BAR_WIDTH
    )
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    let registry = ProcessorRegistry::<BatchSender>::with_defaults();
    let (sender, mut receiver) = batch_channel(config.queue_depth);
    let node = registry.create(CAPTURE_PROCESSOR_ID, &config, sender)?;

    let source = match &args.wav {
        Some(path) => Source::Wav(wav_source::spawn(path, node)?),
        None => Source::Mic(MicInput::start(node, args.host.as_deref())?),
    };
    match &source {
        Source::Mic(mic) => log::info!("input sample rate {} Hz", mic.config().sample_rate),
        Source::Wav(replay) => log::info!(
            "replay length {:.1} s",
            replay.frames as f64 / replay.sample_rate.max(1) as f64
        ),
    }

    let mut recorder = LevelRecorder::new(&config)?;
    let started = Instant::now();
    let mut last_frame = started;
    let mut stdout = std::io::stdout();

    loop {
        while let Some(batch) = receiver.try_recv() {
            recorder.ingest(&batch);
            receiver.recycle(batch);
        }

        let now = Instant::now();
        let elapsed_ms = now.duration_since(last_frame).as_secs_f64() * 1000.0;
        last_frame = now;
        recorder.tick(elapsed_ms);

        write!(stdout, "\r{}", render_meter(recorder.latest(), config.floor_db))?;
        stdout.flush()?;

        if source.is_finished() && receiver.is_empty() {
            break;
        }
        if let Some(limit) = args.seconds {
            if started.elapsed().as_secs_f64() >= limit {
                break;
            }
        }
        std::thread::sleep(FRAME_INTERVAL);
    }

    writeln!(stdout)?;
    let series = recorder.series();
    let measured = series.as_slice().iter().filter(|v| !v.is_nan()).count();
    log::info!(
        "recorded {} series values ({} with signal) in {:.1} s",
        series.len(),
        measured,
        started.elapsed().as_secs_f64()
    );

    Ok(())
}

use js_sys::{Array, Float32Array};
use wasm_bindgen::prelude::*;
use web_sys::MessagePort;

use crate::audio::Batch;
use crate::capture::BatchSink;
use crate::config::CaptureConfig;
use crate::logging::log_console;
use crate::registry::{BoxedNode, ProcessorRegistry, CAPTURE_PROCESSOR_ID};
use crate::series::LevelRecorder;
use crate::timeline::step_timeline;
use crate::utils::interpolate;
use crate::worklet::{forward_input, RENDER_QUANTUM_FRAMES};

/// Posts every batch to the main thread as a `Float32Array` whose buffer is in the
/// transfer list, so the JS side receives it without a second copy.
///
/// The Rust-side storage is free again as soon as it has been copied out, and is
/// handed straight back to the batcher as the next write buffer.
pub struct PortBatchSink {
    port: MessagePort,
    spare: Option<Box<[f32]>>,
}

impl PortBatchSink {
    pub fn new(port: MessagePort) -> Self {
        Self { port, spare: None }
    }
}

// SAFETY: the worklet global scope owns a single wasm instance on one thread. The
// sink is created and used inside it and never sent anywhere else.
unsafe impl Send for PortBatchSink {}

impl BatchSink for PortBatchSink {
    fn send(&mut self, batch: Batch) -> Result<(), Batch> {
        let array = Float32Array::from(batch.as_slice());
        let transfer = Array::of1(&array.buffer());
        match self.port.post_message_with_transferable(&array, &transfer) {
            Ok(()) => {
                self.spare = Some(batch.into_storage());
                Ok(())
            }
            Err(_) => Err(batch),
        }
    }

    fn reclaim(&mut self) -> Option<Box<[f32]>> {
        self.spare.take()
    }
}

fn parse_options(options: &JsValue) -> Result<CaptureConfig, JsValue> {
    if options.is_undefined() || options.is_null() {
        return Ok(CaptureConfig::default());
    }
    let config: CaptureConfig = serde_wasm_bindgen::from_value(options.clone())
        .map_err(|e| JsValue::from_str(&format!("invalid capture options: {}", e)))?;
    config.validate()?;
    Ok(config)
}

/// Identifier to pass to `registerProcessor` in the worklet script.
#[wasm_bindgen(js_name = processorId)]
pub fn processor_id() -> String {
    CAPTURE_PROCESSOR_ID.to_string()
}

#[wasm_bindgen]
pub struct LevelCaptureProcessor {
    node: BoxedNode,
    scratch: Box<[f32]>,
}

#[wasm_bindgen]
impl LevelCaptureProcessor {
    /// Builds the capture node for an `AudioWorkletProcessor`. `port` is the
    /// processor's own message port, `options` its `processorOptions`.
    #[wasm_bindgen(constructor)]
    pub fn new(port: MessagePort, options: JsValue) -> Result<LevelCaptureProcessor, JsValue> {
        let config = parse_options(&options)?;
        let registry = ProcessorRegistry::with_defaults();
        let node = registry.create(CAPTURE_PROCESSOR_ID, &config, PortBatchSink::new(port))?;
        log_console(&format!(
            "level capture ready, {} samples per batch",
            config.batch_capacity
        ));
        Ok(Self {
            node,
            scratch: vec![0.0; RENDER_QUANTUM_FRAMES].into_boxed_slice(),
        })
    }

    /// Feeds one render quantum of the first input channel. `undefined` or `null`
    /// means the input is disconnected.
    pub fn process(&mut self, input: Option<Float32Array>) {
        let len = input.as_ref().map(|array| array.length() as usize);
        forward_input(self.node.as_mut(), len, &mut self.scratch, |offset, chunk| {
            if let Some(array) = &input {
                let start = offset as u32;
                array
                    .subarray(start, start + chunk.len() as u32)
                    .copy_to(chunk);
            }
        });
    }

    pub fn pending(&self) -> usize {
        self.node.pending_len()
    }

    pub fn emitted(&self) -> f64 {
        self.node.stats().emitted as f64
    }

    pub fn dropped(&self) -> f64 {
        self.node.stats().dropped as f64
    }

    pub fn reset(&mut self) {
        self.node.reset();
    }
}

#[wasm_bindgen(js_name = LevelRecorder)]
pub struct WasmLevelRecorder {
    inner: LevelRecorder,
}

#[wasm_bindgen(js_class = LevelRecorder)]
impl WasmLevelRecorder {
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<WasmLevelRecorder, JsValue> {
        let config = parse_options(&options)?;
        Ok(Self {
            inner: LevelRecorder::new(&config)?,
        })
    }

    /// Meters a batch posted by the capture processor; returns its level in dBFS.
    #[wasm_bindgen(js_name = ingestBatch)]
    pub fn ingest_batch(&mut self, samples: &[f32]) -> f64 {
        self.inner.ingest(samples).dbfs
    }

    pub fn tick(&mut self, elapsed_ms: f64) -> usize {
        self.inner.tick(elapsed_ms)
    }

    pub fn latest(&self) -> f64 {
        self.inner.latest()
    }

    pub fn series(&self) -> Vec<f64> {
        self.inner.series().as_slice().to_vec()
    }

    pub fn window(&self) -> Vec<f64> {
        self.inner.window()
    }
}

#[wasm_bindgen(js_name = TimelineStep)]
pub struct JsTimelineStep {
    steps: f64,
    accumulator: f64,
}

#[wasm_bindgen(js_class = TimelineStep)]
impl JsTimelineStep {
    #[wasm_bindgen(getter)]
    pub fn steps(&self) -> f64 {
        self.steps
    }

    #[wasm_bindgen(getter)]
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }
}

#[wasm_bindgen(js_name = stepTimeline)]
pub fn step_timeline_js(
    elapsed_ms: f64,
    samples_per_second: f64,
    accumulator: f64,
) -> JsTimelineStep {
    let step = step_timeline(elapsed_ms, samples_per_second, accumulator);
    JsTimelineStep {
        steps: step.steps as f64,
        accumulator: step.accumulator,
    }
}

/// JS numbers may be fractional or non-finite; the count is truncated and anything
/// non-finite counts as zero steps.
#[wasm_bindgen(js_name = interpolate)]
pub fn interpolate_js(previous: f64, next: f64, steps: f64) -> Vec<f64> {
    let steps = if steps.is_finite() { steps.trunc() as i64 } else { 0 };
    interpolate(previous, next, steps)
}

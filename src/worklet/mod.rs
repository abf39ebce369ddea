use crate::traits::CaptureNode;

#[cfg(feature = "wasm")]
pub mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::*;

/// Frames in one Web Audio render quantum.
pub const RENDER_QUANTUM_FRAMES: usize = 128;

/// Hands `len` input samples to `node` through a preallocated `scratch` buffer.
///
/// `fill(offset, chunk)` copies the samples starting at `offset` into `chunk`.
/// `None` is a disconnected input and reaches the node as `None`.
pub fn forward_input<F>(
    node: &mut dyn CaptureNode,
    len: Option<usize>,
    scratch: &mut [f32],
    mut fill: F,
) where
    F: FnMut(usize, &mut [f32]),
{
    let Some(len) = len else {
        node.process(None);
        return;
    };
    if scratch.is_empty() {
        return;
    }

    let mut offset = 0;
    while offset < len {
        let scratch_len = scratch.len();
        let chunk = &mut scratch[..(len - offset).min(scratch_len)];
        fill(offset, &mut *chunk);
        node.process(Some(&*chunk));
        offset += chunk.len();
    }
}

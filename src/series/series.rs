/// Append-only sequence of charted values. `NaN` marks slots with no signal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    values: Vec<f64>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: f64) {
        self.values.push(value);
    }

    pub fn extend<I: IntoIterator<Item = f64>>(&mut self, span: I) {
        self.values.extend(span);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// The newest `width` values, oldest first.
    ///
    /// Always exactly `width` long: slots before the first recorded value are `NaN`,
    /// so a chart always has a full-width frame to draw, data or not.
    pub fn window(&self, width: usize) -> Vec<f64> {
        let available = self.values.len().min(width);
        let mut window = Vec::with_capacity(width);
        window.resize(width - available, f64::NAN);
        window.extend_from_slice(&self.values[self.values.len() - available..]);
        window
    }
}

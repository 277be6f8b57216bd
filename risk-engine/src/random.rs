//! Random sources for score and confidence jitter

use rand::{Rng, RngCore};

/// Source of uniform draws in `[0, 1)`
pub trait UniformSource {
    /// Next draw in `[0, 1)`
    fn next_uniform(&mut self) -> f64;
}

impl<R: RngCore + ?Sized> UniformSource for R {
    fn next_uniform(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Replays a fixed list of draws, cycling when exhausted
#[derive(Debug, Clone)]
pub struct SequenceSource {
    values: Vec<f64>,
    position: usize,
}

impl SequenceSource {
    /// Create from draws; values are clamped into `[0, 1)`
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        let values: Vec<f64> = values.into_iter().map(clamp_unit).collect();
        Self {
            values: if values.is_empty() { vec![0.0] } else { values },
            position: 0,
        }
    }

    /// Source that always draws `value`
    pub fn constant(value: f64) -> Self {
        Self::new([value])
    }

    /// Source that always draws `0`
    pub fn zeros() -> Self {
        Self::constant(0.0)
    }
}

impl UniformSource for SequenceSource {
    fn next_uniform(&mut self) -> f64 {
        let value = self.values[self.position % self.values.len()];
        self.position += 1;
        value
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        return 0.0;
    }
    // largest f64 below 1.0
    v.clamp(0.0, 1.0 - f64::EPSILON / 2.0)
}

//! Injected randomness for the kernel.
//!
//! The kernel never reaches for a global generator. Callers hand it a
//! [`NoiseSource`], which lets tests pin exact output sequences.

use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform deviates on `[0, 1)`.
pub trait NoiseSource {
    fn next(&mut self) -> f64;
}

impl<N: NoiseSource + ?Sized> NoiseSource for &mut N {
    fn next(&mut self) -> f64 {
        (**self).next()
    }
}

impl<N: NoiseSource + ?Sized> NoiseSource for Box<N> {
    fn next(&mut self) -> f64 {
        (**self).next()
    }
}

pub struct SeededNoise {
    rng: StdRng,
}

impl SeededNoise {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl NoiseSource for SeededNoise {
    fn next(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays a fixed list of deviates, cycling when it runs out.
#[derive(Clone, Debug)]
pub struct ScriptedNoise {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedNoise {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        let mut values: Vec<f64> = values.into();
        if values.is_empty() {
            values.push(0.5);
        }
        for v in &mut values {
            *v = if v.is_nan() { 0.5 } else { v.clamp(0.0, 1.0 - f64::EPSILON) };
        }
        Self { values, cursor: 0 }
    }

    /// Every draw returns `value`.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl NoiseSource for ScriptedNoise {
    fn next(&mut self) -> f64 {
        let v = self.values[self.cursor];
        self.cursor = (self.cursor + 1) % self.values.len();
        v
    }
}

/// Standard normal deviate via Box-Muller. Consumes two uniforms.
pub fn gaussian(noise: &mut impl NoiseSource) -> f64 {
    let u1 = 1.0 - noise.next();
    let u2 = noise.next();
    (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
}

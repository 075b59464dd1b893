use std::f64::consts::TAU;

use tracing::trace;

use crate::error::Result;
use crate::noise::{gaussian, NoiseSource};
use crate::types::{ExperimentMode, PhysicsParams, Sample};

/// Poissonian (random) reference for mode A.
pub const RANDOM_RATIO: f64 = 1.0;
/// Superradiant (coherent) ceiling for mode A. Drawn by the chart, never computed.
pub const COHERENT_RATIO: f64 = 2.0;
pub const RATIO_DISPLAY_MIN: f64 = 0.8;
pub const RATIO_DISPLAY_MAX: f64 = 2.2;
pub const REFERENCE_TEMPERATURE_K: f64 = 310.0;
const TEMPERATURE_WIDTH_K: f64 = 8.0;
const RATIO_OSCILLATION_AMPLITUDE: f64 = 0.05;
const RATIO_OSCILLATION_HZ: f64 = 0.5;
const RATIO_JITTER: f64 = 0.03;

/// Libet window, in milliseconds.
pub const COHERENCE_WINDOW_MS: f64 = 500.0;
const GRAVITY_FLOOR: f64 = 0.05;
const RELAXATION_DEPTH: f64 = 0.2;
const RELAXATION_TIME_S: f64 = 1.5;
const DECAY_NOISE_MS: f64 = 120.0;

pub const SCHUMANN_HZ: f64 = 7.83;
pub const RESONANCE_WIDTH_HZ: f64 = 1.5;
pub const HRV_COHERENCE_THRESHOLD: f64 = 80.0;
const HRV_BASELINE: f64 = 20.0;
const HRV_RESONANCE_GAIN: f64 = 70.0;
const HRV_CARDIAC_AMPLITUDE: f64 = 4.0;
const HRV_CARDIAC_HZ: f64 = 1.2;
const HRV_INTRINSIC_NOISE: f64 = 2.0;
const HRV_NOISE_FLOOR_GAIN: f64 = 10.0;

/// The signal generator. Owns only its noise source; every tick is
/// otherwise a function of its arguments.
pub struct PhysicsKernel<N> {
    noise: N,
}

impl<N: NoiseSource> PhysicsKernel<N> {
    pub fn new(noise: N) -> Self {
        Self { noise }
    }

    /// Produces one sample `elapsed_ms` after the run epoch.
    pub fn tick(
        &mut self,
        elapsed_ms: f64,
        mode: ExperimentMode,
        params: &PhysicsParams,
    ) -> Sample {
        let params = params.clamped();
        let t = elapsed_ms.max(0.0) / 1000.0;

        let (value, noise, threshold) = match mode {
            ExperimentMode::A => coherence_ratio(t, &params, &mut self.noise),
            ExperimentMode::B => coherence_time(t, &params, &mut self.noise),
            ExperimentMode::C => entrainment(t, &params, &mut self.noise),
        };

        trace!(%mode, elapsed_ms, value, noise, "tick");

        Sample {
            time: elapsed_ms,
            value,
            noise,
            threshold,
        }
    }

    /// Same as [`tick`](Self::tick) for a mode given as text.
    pub fn tick_named(
        &mut self,
        elapsed_ms: f64,
        mode: &str,
        params: &PhysicsParams,
    ) -> Result<Sample> {
        let mode = mode.parse::<ExperimentMode>()?;
        Ok(self.tick(elapsed_ms, mode, params))
    }

    pub fn into_noise(self) -> N {
        self.noise
    }
}

/// Shared reference value overlaid against mode output.
pub fn threshold_for(mode: ExperimentMode) -> f64 {
    match mode {
        ExperimentMode::A => RANDOM_RATIO,
        ExperimentMode::B => COHERENCE_WINDOW_MS,
        ExperimentMode::C => HRV_COHERENCE_THRESHOLD,
    }
}

/// Fraction of superradiant order surviving at `temperature` (1 at 310 K).
pub fn thermal_coherence(temperature: f64) -> f64 {
    let deviation = (temperature - REFERENCE_TEMPERATURE_K) / TEMPERATURE_WIDTH_K;
    (-deviation * deviation).exp()
}

/// Normalized Gaussian response peaked at the Schumann frequency.
pub fn resonance(frequency: f64) -> f64 {
    let offset = frequency - SCHUMANN_HZ;
    (-(offset * offset) / (2.0 * RESONANCE_WIDTH_HZ * RESONANCE_WIDTH_HZ)).exp()
}

/// Noise-free mode B coherence time before relaxation, in milliseconds.
pub fn coherence_time_base(gravity: f64, isolation: f64) -> f64 {
    let shielding = 0.5 + 0.5 * isolation / 100.0;
    COHERENCE_WINDOW_MS * shielding / gravity.max(GRAVITY_FLOOR)
}

fn coherence_ratio(
    t: f64,
    params: &PhysicsParams,
    noise: &mut impl NoiseSource,
) -> (f64, f64, f64) {
    let target = COHERENT_RATIO - (params.propofol / 100.0) * (COHERENT_RATIO - RANDOM_RATIO);
    let coherence = thermal_coherence(params.temperature);

    let oscillation =
        RATIO_OSCILLATION_AMPLITUDE * coherence * (TAU * RATIO_OSCILLATION_HZ * t).sin();
    let jitter = RATIO_JITTER * gaussian(noise);
    // Decoherence only ever drags the ratio down toward the random floor.
    let excursion = -(1.0 - coherence) * (target - RATIO_DISPLAY_MIN) * noise.next();
    let perturbation = jitter + excursion;

    let value = (target + oscillation + perturbation).clamp(RATIO_DISPLAY_MIN, RATIO_DISPLAY_MAX);
    (value, perturbation, RANDOM_RATIO)
}

fn coherence_time(t: f64, params: &PhysicsParams, noise: &mut impl NoiseSource) -> (f64, f64, f64) {
    let base = coherence_time_base(params.gravity, params.isolation);
    let relaxed = base * (1.0 - RELAXATION_DEPTH * (-t / RELAXATION_TIME_S).exp());

    let exposure = (100.0 - params.isolation) / 100.0;
    let perturbation = DECAY_NOISE_MS * exposure * gaussian(noise);

    let value = (relaxed + perturbation).max(0.0);
    (value, perturbation, COHERENCE_WINDOW_MS)
}

fn entrainment(t: f64, params: &PhysicsParams, noise: &mut impl NoiseSource) -> (f64, f64, f64) {
    let base = HRV_BASELINE + HRV_RESONANCE_GAIN * resonance(params.frequency);
    let cardiac = HRV_CARDIAC_AMPLITUDE * (TAU * HRV_CARDIAC_HZ * t).sin();

    let spread = HRV_INTRINSIC_NOISE + HRV_NOISE_FLOOR_GAIN * params.noise_floor;
    let perturbation = spread * gaussian(noise);

    let value = (base + cardiac + perturbation).clamp(0.0, 100.0);
    (value, perturbation, HRV_COHERENCE_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::noise::{ScriptedNoise, SeededNoise};

    fn run(mode: ExperimentMode, params: PhysicsParams, seed: u64, frames: usize) -> Vec<Sample> {
        let mut kernel = PhysicsKernel::new(SeededNoise::new(seed));
        (0..frames)
            .map(|i| kernel.tick(i as f64 * 16.0, mode, &params))
            .collect()
    }

    fn mean_value(samples: &[Sample]) -> f64 {
        samples.iter().map(|s| s.value).sum::<f64>() / samples.len() as f64
    }

    #[test]
    fn identical_noise_identical_samples() {
        for mode in ExperimentMode::ALL {
            let a = run(mode, PhysicsParams::default(), 99, 200);
            let b = run(mode, PhysicsParams::default(), 99, 200);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn thresholds_are_fixed_per_mode() {
        let mut kernel = PhysicsKernel::new(SeededNoise::new(0));
        let params = PhysicsParams::default();
        assert_eq!(kernel.tick(0.0, ExperimentMode::A, &params).threshold, 1.0);
        assert_eq!(kernel.tick(0.0, ExperimentMode::B, &params).threshold, 500.0);
        assert_eq!(kernel.tick(0.0, ExperimentMode::C, &params).threshold, 80.0);
    }

    #[test]
    fn sample_time_is_elapsed_ms() {
        let mut kernel = PhysicsKernel::new(SeededNoise::new(0));
        let sample = kernel.tick(1234.5, ExperimentMode::C, &PhysicsParams::default());
        assert_eq!(sample.time, 1234.5);
    }

    #[test]
    fn ratio_stays_in_display_band() {
        for propofol in [0.0, 35.0, 100.0] {
            for temperature in [280.0, 300.0, 310.0, 320.0] {
                let params = PhysicsParams {
                    propofol,
                    temperature,
                    ..PhysicsParams::default()
                };
                for s in run(ExperimentMode::A, params, 3, 300) {
                    assert!((0.8..=2.2).contains(&s.value), "{s:?}");
                }
            }
        }
    }

    #[test]
    fn heat_drags_ratio_toward_random() {
        let warm = PhysicsParams {
            temperature: 310.0,
            ..PhysicsParams::default()
        };
        let hot = PhysicsParams {
            temperature: 280.0,
            ..PhysicsParams::default()
        };
        let warm_mean = mean_value(&run(ExperimentMode::A, warm, 5, 600));
        let hot_mean = mean_value(&run(ExperimentMode::A, hot, 5, 600));
        assert!(hot_mean < warm_mean - 0.3, "{hot_mean} vs {warm_mean}");
    }

    #[test]
    fn ratio_noise_is_exact_with_scripted_draws() {
        // Draws: u1 = 0 (gaussian -> 0), u2 ignored, excursion draw ignored at 310 K.
        let mut kernel = PhysicsKernel::new(ScriptedNoise::new(vec![0.0, 0.25, 0.9]));
        let sample = kernel.tick(0.0, ExperimentMode::A, &PhysicsParams::default());
        assert_eq!(sample.noise, 0.0);
        assert_eq!(sample.value, 2.0);
    }

    #[test]
    fn coherence_time_at_epoch_with_silent_noise() {
        // 500 ms * 0.75 shielding = 375, relaxed by 0.8 at t = 0.
        let mut kernel = PhysicsKernel::new(ScriptedNoise::constant(0.0));
        let sample = kernel.tick(0.0, ExperimentMode::B, &PhysicsParams::default());
        assert_abs_diff_eq!(sample.value, 300.0, epsilon = 1e-9);
        assert_eq!(sample.noise, 0.0);
    }

    #[test]
    fn coherence_time_with_one_sigma_draw() {
        // u1 = 0.5, u2 = 0 gives g = sqrt(2 ln 2); half exposure scales it by 60 ms.
        let g = (2.0 * std::f64::consts::LN_2).sqrt();
        let mut kernel = PhysicsKernel::new(ScriptedNoise::new(vec![0.5, 0.0]));
        let sample = kernel.tick(0.0, ExperimentMode::B, &PhysicsParams::default());
        assert_abs_diff_eq!(sample.noise, 60.0 * g, epsilon = 1e-9);
        assert_abs_diff_eq!(sample.value, 370.6446013509285, epsilon = 1e-9);
    }

    #[test]
    fn entrainment_peak_at_epoch_with_silent_noise() {
        let params = PhysicsParams {
            frequency: SCHUMANN_HZ,
            ..PhysicsParams::default()
        };
        let mut kernel = PhysicsKernel::new(ScriptedNoise::constant(0.0));
        let sample = kernel.tick(0.0, ExperimentMode::C, &params);
        assert_abs_diff_eq!(sample.value, 90.0, epsilon = 1e-12);
        assert_eq!(sample.noise, 0.0);
    }

    #[test]
    fn entrainment_with_one_sigma_draw() {
        // Default noise floor 0.2 widens the spread to 2 + 10 * 0.2 = 4.
        let params = PhysicsParams {
            frequency: SCHUMANN_HZ,
            ..PhysicsParams::default()
        };
        let mut kernel = PhysicsKernel::new(ScriptedNoise::new(vec![0.5, 0.0]));
        let sample = kernel.tick(0.0, ExperimentMode::C, &params);
        assert_abs_diff_eq!(sample.noise, 4.709640090061899, epsilon = 1e-9);
        assert_abs_diff_eq!(sample.value, 94.7096400900619, epsilon = 1e-9);
    }

    #[test]
    fn coherence_time_never_negative() {
        let params = PhysicsParams {
            gravity: 2.0,
            isolation: 0.0,
            ..PhysicsParams::default()
        };
        for s in run(ExperimentMode::B, params, 11, 1_000) {
            assert!(s.value >= 0.0);
        }
    }

    #[test]
    fn gravity_shortens_coherence_time() {
        let mut last = f64::INFINITY;
        for gravity in [0.1, 0.5, 1.0, 1.5, 2.0] {
            let base = coherence_time_base(gravity, 50.0);
            assert!(base < last);
            last = base;
        }
    }

    #[test]
    fn isolation_extends_coherence_time_linearly() {
        let lo = coherence_time_base(1.0, 0.0);
        let mid = coherence_time_base(1.0, 50.0);
        let hi = coherence_time_base(1.0, 100.0);
        assert_abs_diff_eq!(mid - lo, hi - mid, epsilon = 1e-9);
        assert!(hi > lo);
    }

    #[test]
    fn zero_gravity_stays_finite() {
        let params = PhysicsParams {
            gravity: 0.0,
            ..PhysicsParams::default()
        };
        for s in run(ExperimentMode::B, params, 2, 50) {
            assert!(s.value.is_finite());
        }
    }

    #[test]
    fn resonance_peaks_at_schumann() {
        assert_abs_diff_eq!(resonance(SCHUMANN_HZ), 1.0);
        let mut prev = resonance(SCHUMANN_HZ);
        for step in 1..=40 {
            let f = SCHUMANN_HZ + step as f64 * 0.3;
            assert!(resonance(f) < prev);
            prev = resonance(f);
        }
        prev = resonance(SCHUMANN_HZ);
        for step in 1..=26 {
            let f = SCHUMANN_HZ - step as f64 * 0.3;
            assert!(resonance(f) < prev);
            prev = resonance(f);
        }
    }

    #[test]
    fn entrainment_stays_in_percent_band() {
        let params = PhysicsParams {
            frequency: SCHUMANN_HZ,
            noise_floor: 1.0,
            ..PhysicsParams::default()
        };
        for s in run(ExperimentMode::C, params, 8, 1_000) {
            assert!((0.0..=100.0).contains(&s.value));
        }
    }

    #[test]
    fn named_mode_rejects_unknown_letter() {
        let mut kernel = PhysicsKernel::new(SeededNoise::new(0));
        let params = PhysicsParams::default();
        assert!(kernel.tick_named(0.0, "B", &params).is_ok());
        assert!(kernel.tick_named(0.0, "Z", &params).is_err());
    }

    #[test]
    fn nan_params_keep_generator_live() {
        let params = PhysicsParams {
            propofol: f64::NAN,
            temperature: f64::NAN,
            gravity: f64::NAN,
            isolation: f64::NAN,
            frequency: f64::NAN,
            noise_floor: f64::NAN,
        };
        let mut kernel = PhysicsKernel::new(SeededNoise::new(4));
        for mode in ExperimentMode::ALL {
            let s = kernel.tick(16.0, mode, &params);
            assert!(s.value.is_finite() && s.noise.is_finite());
        }
    }
}

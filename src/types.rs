use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LabError;

pub const PROPOFOL_RANGE: RangeInclusive<f64> = 0.0..=100.0;
pub const TEMPERATURE_RANGE: RangeInclusive<f64> = 280.0..=320.0;
pub const GRAVITY_RANGE: RangeInclusive<f64> = 0.0..=2.0;
pub const ISOLATION_RANGE: RangeInclusive<f64> = 0.0..=100.0;
pub const FREQUENCY_RANGE: RangeInclusive<f64> = 0.0..=20.0;
pub const NOISE_FLOOR_RANGE: RangeInclusive<f64> = 0.0..=1.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExperimentMode {
    /// Anesthetic inhibition of superradiance.
    #[default]
    A,
    /// Gravitational decoherence.
    B,
    /// Bio-magnetic entrainment.
    C,
}

impl ExperimentMode {
    pub const ALL: [ExperimentMode; 3] = [ExperimentMode::A, ExperimentMode::B, ExperimentMode::C];

    pub fn letter(self) -> char {
        match self {
            ExperimentMode::A => 'A',
            ExperimentMode::B => 'B',
            ExperimentMode::C => 'C',
        }
    }
}

impl fmt::Display for ExperimentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for ExperimentMode {
    type Err = LabError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "A" | "a" => Ok(ExperimentMode::A),
            "B" | "b" => Ok(ExperimentMode::B),
            "C" | "c" => Ok(ExperimentMode::C),
            other => Err(LabError::InvalidMode(other.to_owned())),
        }
    }
}

/// Every slider for every mode. Only the active mode's pair is read per tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhysicsParams {
    pub propofol: f64,
    pub temperature: f64,
    pub gravity: f64,
    pub isolation: f64,
    pub frequency: f64,
    pub noise_floor: f64,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            propofol: 0.0,
            temperature: 310.0,
            gravity: 1.0,
            isolation: 50.0,
            frequency: 1.0,
            noise_floor: 0.2,
        }
    }
}

impl PhysicsParams {
    /// Pulls every field into its documented domain. NaN falls back to the default.
    pub fn clamped(&self) -> Self {
        let defaults = Self::default();
        Self {
            propofol: clamp_or(self.propofol, PROPOFOL_RANGE, defaults.propofol),
            temperature: clamp_or(self.temperature, TEMPERATURE_RANGE, defaults.temperature),
            gravity: clamp_or(self.gravity, GRAVITY_RANGE, defaults.gravity),
            isolation: clamp_or(self.isolation, ISOLATION_RANGE, defaults.isolation),
            frequency: clamp_or(self.frequency, FREQUENCY_RANGE, defaults.frequency),
            noise_floor: clamp_or(self.noise_floor, NOISE_FLOOR_RANGE, defaults.noise_floor),
        }
    }
}

fn clamp_or(value: f64, range: RangeInclusive<f64>, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(*range.start(), *range.end())
    }
}

/// One kernel output. Never mutated after creation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: f64,
    pub value: f64,
    pub noise: f64,
    pub threshold: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mode_letters() {
        assert_eq!("A".parse::<ExperimentMode>().unwrap(), ExperimentMode::A);
        assert_eq!(" b ".parse::<ExperimentMode>().unwrap(), ExperimentMode::B);
        assert_eq!("c".parse::<ExperimentMode>().unwrap(), ExperimentMode::C);
    }

    #[test]
    fn rejects_unknown_mode() {
        let err = "D".parse::<ExperimentMode>().unwrap_err();
        assert!(matches!(err, LabError::InvalidMode(ref raw) if raw == "D"));
    }

    #[test]
    fn clamps_out_of_range_fields() {
        let wild = PhysicsParams {
            propofol: 250.0,
            temperature: 100.0,
            gravity: -3.0,
            isolation: f64::NAN,
            frequency: f64::INFINITY,
            noise_floor: -0.5,
        };
        let tame = wild.clamped();
        assert_eq!(tame.propofol, 100.0);
        assert_eq!(tame.temperature, 280.0);
        assert_eq!(tame.gravity, 0.0);
        assert_eq!(tame.isolation, 50.0);
        assert_eq!(tame.frequency, 20.0);
        assert_eq!(tame.noise_floor, 0.0);
    }

    #[test]
    fn in_range_params_pass_through() {
        let params = PhysicsParams::default();
        assert_eq!(params.clamped(), params);
    }

    #[test]
    fn params_use_camel_case_keys() {
        let json = serde_json::to_string(&PhysicsParams::default()).unwrap();
        assert!(json.contains("\"noiseFloor\":0.2"));
    }
}

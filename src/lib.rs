//! Coherence lab: a seedable real-time signal kernel for three coherence
//! experiments, plus the host-side pieces a dashboard needs to drive it.

pub mod config;
pub mod error;
pub mod kernel;
pub mod noise;
pub mod params_cell;
pub mod session;
pub mod theory;
pub mod types;
pub mod window;

pub use error::{LabError, Result};
pub use kernel::PhysicsKernel;
pub use noise::{NoiseSource, ScriptedNoise, SeededNoise};
pub use params_cell::ParamsCell;
pub use session::LabSession;
pub use types::{ExperimentMode, PhysicsParams, Sample};
pub use window::SampleWindow;

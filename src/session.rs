use tracing::{debug, info};

use crate::kernel::PhysicsKernel;
use crate::noise::NoiseSource;
use crate::params_cell::ParamsCell;
use crate::types::{ExperimentMode, Sample};
use crate::window::SampleWindow;

/// Smallest gap forced between two sample times when the clock stalls.
const MIN_TIME_STEP_MS: f64 = 1.0e-3;

/// Host-side loop state: which mode is active, whether it is running, and
/// the rolling window the chart reads from.
pub struct LabSession<N> {
    kernel: PhysicsKernel<N>,
    params: ParamsCell,
    mode: ExperimentMode,
    running: bool,
    epoch_ms: Option<f64>,
    last_time: Option<f64>,
    window: SampleWindow,
}

impl<N: NoiseSource> LabSession<N> {
    pub fn new(noise: N, params: ParamsCell, mode: ExperimentMode) -> Self {
        Self {
            kernel: PhysicsKernel::new(noise),
            params,
            mode,
            running: false,
            epoch_ms: None,
            last_time: None,
            window: SampleWindow::default(),
        }
    }

    pub fn mode(&self) -> ExperimentMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn window(&self) -> &SampleWindow {
        &self.window
    }

    pub fn params(&self) -> &ParamsCell {
        &self.params
    }

    pub fn start(&mut self) {
        if !self.running {
            info!(mode = %self.mode, "simulation started");
        }
        self.running = true;
    }

    pub fn pause(&mut self) {
        if self.running {
            info!(mode = %self.mode, samples = self.window.len(), "simulation paused");
        }
        self.running = false;
    }

    pub fn toggle(&mut self) {
        if self.running {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Switches experiment. History from the previous mode is discarded and
    /// the run stops.
    pub fn set_mode(&mut self, mode: ExperimentMode) {
        info!(from = %self.mode, to = %mode, "mode switched");
        self.mode = mode;
        self.running = false;
        self.reset();
    }

    /// Drops history and starts a fresh time base on the next frame.
    pub fn reset(&mut self) {
        self.window.clear();
        self.epoch_ms = None;
        self.last_time = None;
    }

    /// One animation frame at wall-clock `timestamp_ms`. Ticks the kernel
    /// exactly once while running.
    pub fn frame(&mut self, timestamp_ms: f64) -> Option<Sample> {
        if !self.running {
            return None;
        }

        // A non-finite clock reading never becomes the epoch.
        if self.epoch_ms.is_none() && timestamp_ms.is_finite() {
            self.epoch_ms = Some(timestamp_ms);
        }
        let elapsed = match self.epoch_ms {
            Some(epoch) => timestamp_ms - epoch,
            None => f64::NAN,
        };
        let elapsed = match self.last_time {
            Some(last) if !elapsed.is_finite() || elapsed <= last => {
                debug!(elapsed, last, "clock did not advance, nudging sample time");
                last + MIN_TIME_STEP_MS
            }
            None if !elapsed.is_finite() => 0.0,
            _ => elapsed,
        };

        let params = self.params.load();
        let sample = self.kernel.tick(elapsed, self.mode, &params);
        self.window.push(sample);
        self.last_time = Some(sample.time);
        Some(sample)
    }
}

//! World construction parameters.

use nalgebra::Vector3;

use crate::WorldError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters fixed at world construction.
///
/// The defaults reproduce the usual game setup: gravity of ten meters per
/// second squared pointing down, seven solver sub-steps per update, and
/// sleep thresholds tuned for meter-scale objects.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WorldConfig {
    /// Gravitational acceleration applied to every dynamic body, in m/s².
    pub gravity: Vector3<f64>,
    /// Number of fixed-size sub-steps taken per update call.
    pub substeps: u32,
    /// Linear speed below which a dynamic body starts accumulating sleep
    /// time, in m/s.
    pub sleep_linear_threshold: f64,
    /// Continuous time below the speed threshold before a body sleeps, in
    /// seconds.
    pub sleep_time_threshold: f64,
    /// Extra margin added around shapes during broad-phase expansion, in
    /// meters.
    pub contact_margin: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vector3::new(0.0, -10.0, 0.0),
            substeps: 7,
            sleep_linear_threshold: 0.05,
            sleep_time_threshold: 0.5,
            contact_margin: 0.04,
        }
    }
}

impl WorldConfig {
    /// Set the gravity vector.
    #[must_use]
    pub fn with_gravity(mut self, gravity: Vector3<f64>) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the number of sub-steps per update.
    #[must_use]
    pub fn with_substeps(mut self, substeps: u32) -> Self {
        self.substeps = substeps;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        if self.substeps == 0 {
            return Err(WorldError::invalid_config("substeps must be at least 1"));
        }
        if !self.gravity.iter().all(|g| g.is_finite()) {
            return Err(WorldError::invalid_config("gravity must be finite"));
        }
        if !(self.sleep_linear_threshold >= 0.0) || !self.sleep_linear_threshold.is_finite() {
            return Err(WorldError::invalid_config(
                "sleep_linear_threshold must be non-negative and finite",
            ));
        }
        if !(self.sleep_time_threshold >= 0.0) || !self.sleep_time_threshold.is_finite() {
            return Err(WorldError::invalid_config(
                "sleep_time_threshold must be non-negative and finite",
            ));
        }
        if !(self.contact_margin >= 0.0) || !self.contact_margin.is_finite() {
            return Err(WorldError::invalid_config(
                "contact_margin must be non-negative and finite",
            ));
        }
        Ok(())
    }
}

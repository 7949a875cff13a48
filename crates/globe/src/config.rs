use scene::{InteractionConfig, PickOptions, Projector, Viewport};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

/// Tuning constants for the globe. Missing JSON fields take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    /// Fraction of the remaining rotation covered per tick, in `(0, 1]`.
    pub damping_factor: f64,
    /// Radians of yaw added per idle tick.
    pub auto_rotate_step: f64,
    pub drag_sensitivity_x: f64,
    pub drag_sensitivity_y: f64,
    pub click_threshold_ms: f64,
    pub pick_radius_px: f64,
    /// Globe radii.
    pub camera_distance: f64,
    pub fov_y_deg: f64,
    /// Marker lift above the surface, in globe radii.
    pub point_altitude: f64,
    /// Surface size until the first resize arrives.
    pub viewport: ViewportSize,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.1,
            auto_rotate_step: 0.001,
            drag_sensitivity_x: 0.005,
            drag_sensitivity_y: 0.005,
            click_threshold_ms: 200.0,
            pick_radius_px: 14.0,
            camera_distance: 3.0,
            fov_y_deg: 45.0,
            point_altitude: 0.01,
            viewport: ViewportSize {
                width: 800.0,
                height: 600.0,
            },
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn positive(field: &'static str, v: f64) -> Result<(), ConfigError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be a positive number, got {v}")))
    }
}

impl GlobeConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.damping_factor > 0.0 && self.damping_factor <= 1.0) {
            return Err(invalid("damping_factor", "must be in (0, 1]"));
        }
        if !self.auto_rotate_step.is_finite() {
            return Err(invalid("auto_rotate_step", "must be finite"));
        }
        positive("drag_sensitivity_x", self.drag_sensitivity_x)?;
        positive("drag_sensitivity_y", self.drag_sensitivity_y)?;
        positive("click_threshold_ms", self.click_threshold_ms)?;
        positive("pick_radius_px", self.pick_radius_px)?;
        if !(self.camera_distance.is_finite() && self.camera_distance > 1.0) {
            return Err(invalid("camera_distance", "camera must sit outside the globe"));
        }
        if !(self.fov_y_deg > 0.0 && self.fov_y_deg < 180.0) {
            return Err(invalid("fov_y_deg", "must be in (0, 180)"));
        }
        if !(self.point_altitude.is_finite() && self.point_altitude >= 0.0) {
            return Err(invalid("point_altitude", "must be >= 0"));
        }
        positive("viewport.width", self.viewport.width)?;
        positive("viewport.height", self.viewport.height)?;
        Ok(())
    }

    pub fn interaction(&self) -> InteractionConfig {
        InteractionConfig {
            drag_sensitivity_x: self.drag_sensitivity_x,
            drag_sensitivity_y: self.drag_sensitivity_y,
            click_threshold_ms: self.click_threshold_ms,
            pick: PickOptions {
                radius_px: self.pick_radius_px,
                altitude: self.point_altitude,
            },
        }
    }

    pub fn initial_viewport(&self) -> Viewport {
        Viewport::new(self.viewport.width, self.viewport.height)
    }

    pub fn projector(&self, viewport: Viewport) -> Projector {
        Projector::new(viewport, self.camera_distance, self.fov_y_deg.to_radians())
    }
}

use std::f64::consts::FRAC_PI_2;

use foundation::math::{LatLng, Vec3, sphere_to_lat_lng};

/// Globe rotation in radians: `x` is pitch, `y` is yaw.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Rotation {
    pub x: f64,
    pub y: f64,
}

impl Rotation {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Yaw/pitch that brings `pos` to the centre of the view.
    pub fn facing(pos: LatLng) -> Self {
        Self::new(pos.lat_deg.to_radians(), -pos.lng_deg.to_radians())
    }

    /// Applies yaw then pitch to a globe-space point.
    pub fn apply(self, p: Vec3) -> Vec3 {
        p.rotate_y(self.y).rotate_x(self.x)
    }
}

/// Pitch is kept within the poles so dragging never flips the globe.
pub fn clamp_pitch(x: f64) -> f64 {
    x.clamp(-FRAC_PI_2, FRAC_PI_2)
}

/// Camera orientation shared by the interaction controller and the render loop.
///
/// `target` is written only by [`crate::InteractionController`]; `current` only
/// by [`CameraState::damp`], which the render loop calls once per tick.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraState {
    target: Rotation,
    current: Rotation,
    distance: f64,
}

impl CameraState {
    pub fn new(distance: f64) -> Self {
        Self {
            target: Rotation::default(),
            current: Rotation::default(),
            distance,
        }
    }

    pub fn target(&self) -> Rotation {
        self.target
    }

    pub fn current(&self) -> Rotation {
        self.current
    }

    /// Camera distance from the globe centre, in globe radii.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub(crate) fn target_mut(&mut self) -> &mut Rotation {
        &mut self.target
    }

    /// Moves `current` a fixed fraction of the remaining way towards `target`.
    pub fn damp(&mut self, factor: f64) {
        let k = factor.clamp(0.0, 1.0);
        self.current.x += (self.target.x - self.current.x) * k;
        self.current.y += (self.target.y - self.current.y) * k;
    }

    /// Geographic point currently at the centre of the view.
    pub fn facing(&self) -> LatLng {
        let front = Vec3::new(0.0, 0.0, 1.0)
            .rotate_x(-self.current.x)
            .rotate_y(-self.current.y);
        sphere_to_lat_lng(front)
    }
}

use foundation::math::{LatLng, Vec2, Vec3, lat_lng_to_sphere};

use crate::camera::Rotation;

/// Drawing surface size in CSS pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }
}

/// Perspective camera on `+Z` looking at a unit globe at the origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projector {
    pub viewport: Viewport,
    /// Camera distance from the globe centre, in globe radii.
    pub distance: f64,
    pub fov_y_rad: f64,
}

/// A globe-space point as seen on screen.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScreenPoint {
    pub pos: Vec2,
    /// Distance from the camera along the view axis.
    pub depth: f64,
}

impl Projector {
    pub fn new(viewport: Viewport, distance: f64, fov_y_rad: f64) -> Self {
        Self {
            viewport,
            distance,
            fov_y_rad,
        }
    }

    /// Projects a globe-space point after applying `rotation`.
    ///
    /// Returns `None` for points behind the camera or on the far side of the globe.
    pub fn project(&self, rotation: Rotation, p: Vec3) -> Option<ScreenPoint> {
        let world = rotation.apply(p);
        // Facing test against the sphere normal at the point.
        let to_camera = Vec3::new(-world.x, -world.y, self.distance - world.z);
        if world.dot(to_camera) <= 0.0 {
            return None;
        }

        let depth = self.distance - world.z;
        if depth <= 0.0 {
            return None;
        }

        let f = 1.0 / (0.5 * self.fov_y_rad).tan();
        let ndc_x = world.x / depth * f / self.viewport.aspect();
        let ndc_y = world.y / depth * f;
        Some(ScreenPoint {
            pos: Vec2::new(
                (ndc_x + 1.0) * 0.5 * self.viewport.width,
                (1.0 - ndc_y) * 0.5 * self.viewport.height,
            ),
            depth,
        })
    }

    pub fn project_lat_lng(&self, rotation: Rotation, pos: LatLng, radius: f64) -> Option<ScreenPoint> {
        self.project(rotation, lat_lng_to_sphere(pos, radius))
    }
}

#[cfg(test)]
mod tests {
    use super::{Projector, Viewport};
    use crate::camera::Rotation;
    use foundation::math::{LatLng, Vec2};

    fn projector() -> Projector {
        Projector::new(Viewport::new(800.0, 600.0), 3.0, 45f64.to_radians())
    }

    #[test]
    fn front_point_lands_on_screen_centre() {
        let p = projector()
            .project_lat_lng(Rotation::default(), LatLng::new(0.0, 0.0), 1.0)
            .unwrap();
        assert!((p.pos - Vec2::new(400.0, 300.0)).length_squared() < 1e-12);
        assert!((p.depth - 2.0).abs() < 1e-12);
    }

    #[test]
    fn far_side_is_hidden() {
        let proj = projector();
        assert!(proj.project_lat_lng(Rotation::default(), LatLng::new(0.0, 180.0), 1.0).is_none());
        // Rotating half a turn brings it round.
        let half = Rotation::new(0.0, std::f64::consts::PI);
        assert!(proj.project_lat_lng(half, LatLng::new(0.0, 180.0), 1.0).is_some());
    }

    #[test]
    fn east_is_right_north_is_up() {
        let proj = projector();
        let east = proj.project_lat_lng(Rotation::default(), LatLng::new(0.0, 20.0), 1.0).unwrap();
        let north = proj.project_lat_lng(Rotation::default(), LatLng::new(20.0, 0.0), 1.0).unwrap();
        assert!(east.pos.x > 400.0);
        assert!(north.pos.y < 300.0);
    }

    #[test]
    fn viewport_never_degenerate() {
        let v = Viewport::new(0.0, -5.0);
        assert_eq!((v.width, v.height), (1.0, 1.0));
        assert_eq!(v.center(), Vec2::new(0.5, 0.5));
    }
}

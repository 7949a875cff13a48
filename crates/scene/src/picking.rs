use emissions::{CountryCode, RenderPoint};
use foundation::math::{LatLng, Vec2, stable_total_cmp_f64};

use crate::camera::Rotation;
use crate::projection::Projector;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickOptions {
    /// Maximum screen distance between pointer and marker centre.
    pub radius_px: f64,
    /// Marker height above the globe surface, in globe radii.
    pub altitude: f64,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            radius_px: 14.0,
            altitude: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PickHit {
    pub country: CountryCode,
    pub distance_px: f64,
    pub screen: Vec2,
}

/// Screen-space picking against the current render points.
///
/// Ordering contract:
/// - Markers on the far hemisphere are never hit.
/// - The marker closest to the pointer (within `radius_px`) wins.
/// - Ties break on country code, so results do not depend on point order.
pub fn pick_screen(
    points: &[RenderPoint],
    rotation: Rotation,
    projector: &Projector,
    pointer: Vec2,
    opts: PickOptions,
) -> Option<PickHit> {
    let radius = 1.0 + opts.altitude;
    let mut best: Option<PickHit> = None;

    for point in points {
        let Some(screen) = projector.project_lat_lng(rotation, LatLng::new(point.lat, point.lng), radius)
        else {
            continue;
        };
        let d = screen.pos.distance(pointer);
        if d > opts.radius_px {
            continue;
        }

        let better = match &best {
            None => true,
            Some(b) => stable_total_cmp_f64(d, b.distance_px)
                .then_with(|| point.country.cmp(&b.country))
                .is_lt(),
        };
        if better {
            best = Some(PickHit {
                country: point.country.clone(),
                distance_px: d,
                screen: screen.pos,
            });
        }
    }

    best
}

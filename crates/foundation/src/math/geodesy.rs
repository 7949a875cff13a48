use super::Vec3;

/// Geographic coordinates in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct LatLng {
    pub lat_deg: f64,
    pub lng_deg: f64,
}

impl LatLng {
    pub fn new(lat_deg: f64, lng_deg: f64) -> Self {
        Self { lat_deg, lng_deg }
    }

    pub fn origin() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat_deg) && (-180.0..=180.0).contains(&self.lng_deg)
    }
}

/// Position on a sphere of radius `radius` centred at the origin.
///
/// Convention: `(lat 0, lng 0)` lies on `+Z`, `lng 90` on `+X`, the north pole on `+Y`.
/// A yaw of `-lng` followed by a pitch of `+lat` brings the point back onto `+Z`.
pub fn lat_lng_to_sphere(pos: LatLng, radius: f64) -> Vec3 {
    let lat = pos.lat_deg.to_radians();
    let lng = pos.lng_deg.to_radians();
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lng, cos_lng) = lng.sin_cos();
    Vec3::new(
        radius * cos_lat * sin_lng,
        radius * sin_lat,
        radius * cos_lat * cos_lng,
    )
}

pub fn sphere_to_lat_lng(p: Vec3) -> LatLng {
    let r = p.length();
    if r <= 0.0 {
        return LatLng::origin();
    }
    let lat = (p.y / r).clamp(-1.0, 1.0).asin();
    let lng = p.x.atan2(p.z);
    LatLng::new(lat.to_degrees(), lng.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::{LatLng, lat_lng_to_sphere, sphere_to_lat_lng};
    use crate::math::Vec3;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn equator_prime_meridian_faces_plus_z() {
        let p = lat_lng_to_sphere(LatLng::new(0.0, 0.0), 1.0);
        assert_close(p.x, 0.0, 1e-12);
        assert_close(p.y, 0.0, 1e-12);
        assert_close(p.z, 1.0, 1e-12);
    }

    #[test]
    fn focus_rotation_brings_point_to_front() {
        let pos = LatLng::new(35.0, 139.0);
        let p = lat_lng_to_sphere(pos, 1.0)
            .rotate_y(-pos.lng_deg.to_radians())
            .rotate_x(pos.lat_deg.to_radians());
        assert_close(p.x, 0.0, 1e-12);
        assert_close(p.y, 0.0, 1e-12);
        assert_close(p.z, 1.0, 1e-12);
    }

    #[test]
    fn round_trip_lat_lng() {
        let pos = LatLng::new(-33.5, -70.25);
        let back = sphere_to_lat_lng(lat_lng_to_sphere(pos, 2.0));
        assert_close(back.lat_deg, pos.lat_deg, 1e-9);
        assert_close(back.lng_deg, pos.lng_deg, 1e-9);
        assert_eq!(sphere_to_lat_lng(Vec3::default()), LatLng::origin());
    }

    #[test]
    fn validity_bounds() {
        assert!(LatLng::new(90.0, -180.0).is_valid());
        assert!(!LatLng::new(90.5, 0.0).is_valid());
        assert!(!LatLng::new(0.0, 181.0).is_valid());
    }
}

use glam::Vec3;

/// Polar clamp; large enough that the pole offset survives f32 rounding
const EPS: f32 = 0.001;

/// Spherical coordinates with Y up.
/// `theta` is the azimuth around Y measured from +Z, `phi` the polar angle from +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Spherical {
    pub const fn new(radius: f32, phi: f32, theta: f32) -> Self {
        Self { radius, phi, theta }
    }

    pub fn from_vec3(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self::new(0.0, 0.0, 0.0);
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_vec3(&self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }

    /// Keep phi away from the poles so the look-at basis never degenerates
    pub fn make_safe(&mut self) {
        self.phi = self.phi.clamp(EPS, std::f32::consts::PI - EPS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_from_positive_z() {
        let s = Spherical::from_vec3(Vec3::new(0.0, 0.0, 3.0));
        assert!((s.radius - 3.0).abs() < 1e-6);
        assert!((s.phi - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!(s.theta.abs() < 1e-6);
    }

    #[test]
    fn test_zero_vector() {
        let s = Spherical::from_vec3(Vec3::ZERO);
        assert_eq!(s, Spherical::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_vector_survives_conversion() {
        for v in [
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(-4.0, 0.5, 0.1),
            Vec3::new(0.0, -2.0, -1.0),
        ] {
            assert!(approx(Spherical::from_vec3(v).to_vec3(), v));
        }
    }

    #[test]
    fn test_make_safe_clamps_poles() {
        let mut s = Spherical::new(1.0, 0.0, 0.0);
        s.make_safe();
        assert!(s.phi > 0.0);

        let mut s = Spherical::new(1.0, 4.0, 0.0);
        s.make_safe();
        assert!(s.phi < std::f32::consts::PI);
    }

    #[test]
    fn test_clamped_pole_is_visible_in_cartesian() {
        let mut s = Spherical::new(3.0, 0.0, 0.0);
        s.make_safe();
        let v = s.to_vec3();
        assert!(v.y < 3.0);
        assert!(v.z > 0.0);
        assert!(Spherical::from_vec3(v).phi > 0.0);
    }
}

use nalgebra::{Point3, Vector3};

/// Represents a point light in the scene
///
/// # Fields
/// * `position` - The 3D position of the light in world space
/// * `energy` - Radiant power in watts, spread evenly over the sphere
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Point3<f32>,
    pub energy: f32,
}

impl PointLight {
    pub fn new(position: Point3<f32>, energy: f32) -> Self {
        PointLight { position, energy }
    }

    /// Irradiance arriving at `point` from the light, with inverse-square
    /// falloff, and the unit direction toward the light.
    pub fn irradiance_at(&self, point: &Point3<f32>) -> (f32, Vector3<f32>) {
        let to_light = self.position - point;
        let distance_squared = to_light.norm_squared().max(1e-6);
        let irradiance = self.energy / (4.0 * std::f32::consts::PI * distance_squared);
        (irradiance, to_light / distance_squared.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_inverse_square_falloff() {
        let light = PointLight::new(Point3::origin(), 600.0);
        let (near, _) = light.irradiance_at(&Point3::new(1.0, 0.0, 0.0));
        let (far, dir) = light.irradiance_at(&Point3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(near / far, 4.0, epsilon = 1e-4);
        assert_relative_eq!(dir, Vector3::new(-1.0, 0.0, 0.0));
    }
}

use nalgebra::{Point3, Vector3};
use serde::Deserialize;

use crate::raytracer::shape::Ray;

/// Horizontal field of view of a 50 mm lens on a 36 mm sensor, in degrees.
pub const DEFAULT_FOV: f32 = 39.597_755;
/// Width of the orthographic view volume in world units.
pub const DEFAULT_ORTHO_SCALE: f32 = 6.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum Projection {
    #[serde(rename = "ORTHO")]
    Orthographic,
    #[serde(rename = "PERSP")]
    Perspective,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub look_at: Point3<f32>,
    pub up: Vector3<f32>,
    pub projection: Projection,
    /// Field of view across the larger image dimension, in degrees.
    pub fov: f32,
    pub ortho_scale: f32,
}

impl Camera {
    /// Camera at the origin looking down +X with +Z up.
    pub fn forward_x(projection: Projection) -> Self {
        Camera {
            position: Point3::origin(),
            look_at: Point3::new(1.0, 0.0, 0.0),
            up: Vector3::z(),
            projection,
            fov: DEFAULT_FOV,
            ortho_scale: DEFAULT_ORTHO_SCALE,
        }
    }

    pub fn direction(&self) -> Vector3<f32> {
        self.look_at - self.position
    }

    /// Builds the per-frame basis used to map pixels to rays.
    pub fn frame(&self, width: u32, height: u32) -> CameraFrame {
        let forward = self.direction().normalize();
        let right = forward.cross(&self.up).normalize();
        let up = right.cross(&forward).normalize();
        let larger = width.max(height) as f32;
        let half_extent = match self.projection {
            Projection::Perspective => (self.fov.to_radians() / 2.0).tan(),
            Projection::Orthographic => self.ortho_scale / 2.0,
        };
        CameraFrame {
            origin: self.position,
            forward,
            right,
            up,
            projection: self.projection,
            half_width: half_extent * width as f32 / larger,
            half_height: half_extent * height as f32 / larger,
            width: width as f32,
            height: height as f32,
        }
    }
}

pub struct CameraFrame {
    origin: Point3<f32>,
    forward: Vector3<f32>,
    right: Vector3<f32>,
    up: Vector3<f32>,
    projection: Projection,
    half_width: f32,
    half_height: f32,
    width: f32,
    height: f32,
}

impl CameraFrame {
    /// Primary ray through the center of pixel (`x`, `y`), row 0 at the top.
    pub fn ray(&self, x: u32, y: u32) -> Ray {
        let a = self.half_width * (2.0 * (x as f32 + 0.5) / self.width - 1.0);
        let b = self.half_height * (1.0 - 2.0 * (y as f32 + 0.5) / self.height);
        match self.projection {
            Projection::Perspective => Ray {
                origin: self.origin,
                direction: (self.right * a + self.up * b + self.forward).normalize(),
            },
            Projection::Orthographic => Ray {
                origin: self.origin + self.right * a + self.up * b,
                direction: self.forward,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_corner_ray_leans_left_and_up() {
        let frame = Camera::forward_x(Projection::Perspective).frame(2, 2);
        let ray = frame.ray(0, 0);
        // top-left pixel leans toward -right (which is -Y) and +Z
        assert!(ray.direction.x > 0.9);
        assert!(ray.direction.y > 0.0);
        assert!(ray.direction.z > 0.0);
    }

    #[test]
    fn test_perspective_rays_share_origin() {
        let frame = Camera::forward_x(Projection::Perspective).frame(28, 28);
        let a = frame.ray(0, 0);
        let b = frame.ray(27, 27);
        assert_eq!(a.origin, b.origin);
        assert_relative_eq!(a.direction.norm(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_orthographic_rays_are_parallel() {
        let frame = Camera::forward_x(Projection::Orthographic).frame(28, 28);
        let a = frame.ray(0, 0);
        let b = frame.ray(27, 13);
        assert_eq!(a.direction, b.direction);
        assert_ne!(a.origin, b.origin);
        assert_relative_eq!(a.origin.x, 0.0);
    }

    #[test]
    fn test_orthographic_extent_matches_scale() {
        let frame = Camera::forward_x(Projection::Orthographic).frame(100, 50);
        let left = frame.ray(0, 25).origin;
        let right = frame.ray(99, 25).origin;
        // pixel centers span (scale - one pixel) along the larger axis
        assert_relative_eq!((left - right).norm(), 6.0 * 99.0 / 100.0, epsilon = 1e-4);
    }

    #[test]
    fn test_projection_names_deserialize() {
        #[derive(Deserialize)]
        struct Wrapper {
            projection: Projection,
        }
        let w: Wrapper = toml::from_str("projection = \"ORTHO\"").unwrap();
        assert_eq!(w.projection, Projection::Orthographic);
        let w: Wrapper = toml::from_str("projection = \"PERSP\"").unwrap();
        assert_eq!(w.projection, Projection::Perspective);
    }
}

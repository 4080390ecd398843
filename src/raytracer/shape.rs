use nalgebra::{Point3, Vector3};

use crate::raytracer::mesh::TriangleMesh;

/// Hits closer than this are treated as self-intersections.
pub const EPSILON: f32 = 1e-4;

#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Point3<f32>,
    /// Assumed to be normalized.
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Intersection {
    pub distance: f32,
    /// Unit normal facing against the incoming ray.
    pub normal: Vector3<f32>,
    pub point: Point3<f32>,
}

/// World-space geometry the ray tracer can hit.
#[derive(Debug)]
pub enum Shape {
    Sphere { center: Point3<f32>, radius: f32 },
    Mesh(TriangleMesh),
}

impl Shape {
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        match self {
            Shape::Sphere { center, radius } => intersect_sphere(ray, center, *radius),
            Shape::Mesh(mesh) => mesh.intersect(ray),
        }
    }
}

fn intersect_sphere(ray: &Ray, center: &Point3<f32>, radius: f32) -> Option<Intersection> {
    let oc = ray.origin - center;
    // Normalized direction, so a = 1 and the half-b form applies
    let half_b = oc.dot(&ray.direction);
    let c = oc.dot(&oc) - radius * radius;
    let discriminant = half_b * half_b - c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    let t = [-half_b - root, -half_b + root]
        .into_iter()
        .find(|t| *t > EPSILON)?;

    let point = ray.at(t);
    let mut normal = (point - center).normalize();
    if normal.dot(&ray.direction) > 0.0 {
        normal = -normal;
    }
    Some(Intersection {
        distance: t,
        normal,
        point,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_sphere_at(x: f32) -> Shape {
        Shape::Sphere {
            center: Point3::new(x, 0.0, 0.0),
            radius: 1.0,
        }
    }

    #[test]
    fn test_sphere_hit_in_front() {
        let ray = Ray {
            origin: Point3::origin(),
            direction: Vector3::x(),
        };
        let hit = unit_sphere_at(7.0).intersect(&ray).unwrap();
        assert_relative_eq!(hit.distance, 6.0, epsilon = 1e-5);
        assert_relative_eq!(hit.normal, -Vector3::x(), epsilon = 1e-5);
    }

    #[test]
    fn test_sphere_behind_is_missed() {
        let ray = Ray {
            origin: Point3::origin(),
            direction: -Vector3::x(),
        };
        assert!(unit_sphere_at(7.0).intersect(&ray).is_none());
    }

    #[test]
    fn test_sphere_off_axis_is_missed() {
        let ray = Ray {
            origin: Point3::new(0.0, 2.0, 0.0),
            direction: Vector3::x(),
        };
        assert!(unit_sphere_at(7.0).intersect(&ray).is_none());
    }
}

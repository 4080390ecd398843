//! Triangle meshes and the procedural primitives built from them.
//!
//! Meshes are authored in local space as [`MeshData`] (shared vertices plus
//! triangle indices), then placed in the world with an isometry. World-space
//! triangles are indexed by a BVH so primary and shadow rays only test the
//! triangles whose bounds they cross.

mod obj;
pub mod primitives;

use bvh::aabb::{Aabb, Bounded};
use bvh::bounding_hierarchy::BHShape;
use bvh::bvh::Bvh;
use nalgebra::{Isometry3, Point3, Vector3};
use thiserror::Error;

use crate::raytracer::shape::{Intersection, Ray, EPSILON};

pub use obj::load_obj;

/// Padding applied to triangle bounds so axis-aligned faces get a non-flat box.
const AABB_PADDING: f32 = 1e-4;

#[derive(Error, Debug)]
pub enum MeshError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Face references vertex {index} but only {count} vertices exist")]
    IndexOutOfRange { index: usize, count: usize },
    #[error("Mesh has no faces")]
    Empty,
}

/// Local-space indexed triangle list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Point3<f32>>,
    pub faces: Vec<[usize; 3]>,
}

impl MeshData {
    /// Appends a convex polygon as a triangle fan.
    pub fn push_polygon(&mut self, indices: &[usize]) {
        for pair in indices[1..].windows(2) {
            self.faces.push([indices[0], pair[0], pair[1]]);
        }
    }

    pub fn push_quad(&mut self, a: usize, b: usize, c: usize, d: usize) {
        self.push_polygon(&[a, b, c, d]);
    }

    /// Appends another mesh, offsetting its indices.
    pub fn merge(&mut self, other: MeshData) {
        let offset = self.vertices.len();
        self.vertices.extend(other.vertices);
        self.faces.extend(
            other
                .faces
                .into_iter()
                .map(|[a, b, c]| [a + offset, b + offset, c + offset]),
        );
    }

    /// Uniformly scales so the largest bounding-box extent equals `size`,
    /// centered on the origin.
    pub fn normalized(mut self, size: f32) -> Self {
        let Some(first) = self.vertices.first().copied() else {
            return self;
        };
        let (min, max) = self
            .vertices
            .iter()
            .fold((first, first), |(lo, hi), v| (lo.inf(v), hi.sup(v)));
        let center = nalgebra::center(&min, &max);
        let extent = (max - min).max();
        let scale = if extent > 0.0 { size / extent } else { 1.0 };
        for v in &mut self.vertices {
            *v = Point3::from((*v - center) * scale);
        }
        self
    }

    pub fn validate(&self) -> Result<(), MeshError> {
        if self.faces.is_empty() {
            return Err(MeshError::Empty);
        }
        let count = self.vertices.len();
        match self.faces.iter().flatten().find(|i| **i >= count) {
            Some(index) => Err(MeshError::IndexOutOfRange {
                index: *index,
                count,
            }),
            None => Ok(()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Triangle {
    a: Point3<f32>,
    b: Point3<f32>,
    c: Point3<f32>,
    normal: Vector3<f32>,
    node_index: usize,
}

impl Triangle {
    pub fn new(a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) -> Self {
        let normal = (b - a).cross(&(c - a));
        let normal = normal.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::z);
        Triangle {
            a,
            b,
            c,
            normal,
            node_index: 0,
        }
    }

    /// Möller–Trumbore, two-sided.
    fn intersect(&self, ray: &Ray) -> Option<f32> {
        let edge1 = self.b - self.a;
        let edge2 = self.c - self.a;
        let p = ray.direction.cross(&edge2);
        let det = edge1.dot(&p);
        if det.abs() < 1e-8 {
            return None;
        }
        let inv_det = 1.0 / det;
        let s = ray.origin - self.a;
        let u = s.dot(&p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(&edge1);
        let v = ray.direction.dot(&q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = edge2.dot(&q) * inv_det;
        (t > EPSILON).then_some(t)
    }
}

impl Bounded<f32, 3> for Triangle {
    fn aabb(&self) -> Aabb<f32, 3> {
        let pad = Vector3::repeat(AABB_PADDING);
        let min = self.a.inf(&self.b).inf(&self.c) - pad;
        let max = self.a.sup(&self.b).sup(&self.c) + pad;
        Aabb::with_bounds(min, max)
    }
}

impl BHShape<f32, 3> for Triangle {
    fn set_bh_node_index(&mut self, index: usize) {
        self.node_index = index;
    }

    fn bh_node_index(&self) -> usize {
        self.node_index
    }
}

/// World-space triangles with their acceleration structure.
pub struct TriangleMesh {
    triangles: Vec<Triangle>,
    bvh: Bvh<f32, 3>,
}

impl std::fmt::Debug for TriangleMesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriangleMesh")
            .field("triangles", &self.triangles.len())
            .finish()
    }
}

impl TriangleMesh {
    /// Places `data` in the world with `transform` and builds the BVH.
    pub fn build(data: &MeshData, transform: &Isometry3<f32>) -> Result<Self, MeshError> {
        data.validate()?;
        let world: Vec<Point3<f32>> = data
            .vertices
            .iter()
            .map(|v| transform.transform_point(v))
            .collect();
        let mut triangles: Vec<Triangle> = data
            .faces
            .iter()
            .map(|[a, b, c]| Triangle::new(world[*a], world[*b], world[*c]))
            .collect();
        let bvh = Bvh::build(&mut triangles);
        Ok(TriangleMesh { triangles, bvh })
    }

    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        let query = bvh::ray::Ray::new(ray.origin, ray.direction);
        let (distance, triangle) = self
            .bvh
            .traverse(&query, &self.triangles)
            .into_iter()
            .filter_map(|tri| tri.intersect(ray).map(|t| (t, tri)))
            .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))?;
        let normal = if triangle.normal.dot(&ray.direction) > 0.0 {
            -triangle.normal
        } else {
            triangle.normal
        };
        Some(Intersection {
            distance,
            normal,
            point: ray.at(distance),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn single_triangle() -> MeshData {
        MeshData {
            vertices: vec![
                Point3::new(0.0, -1.0, -1.0),
                Point3::new(0.0, 1.0, -1.0),
                Point3::new(0.0, 0.0, 1.0),
            ],
            faces: vec![[0, 1, 2]],
        }
    }

    #[test]
    fn test_triangle_hit_after_translation() {
        let transform = Isometry3::translation(5.0, 0.0, 0.0);
        let mesh = TriangleMesh::build(&single_triangle(), &transform).unwrap();
        let ray = Ray {
            origin: Point3::origin(),
            direction: Vector3::x(),
        };
        let hit = mesh.intersect(&ray).unwrap();
        assert_relative_eq!(hit.distance, 5.0, epsilon = 1e-5);
        assert_relative_eq!(hit.normal, -Vector3::x(), epsilon = 1e-5);
    }

    #[test]
    fn test_triangle_miss_outside_edges() {
        let transform = Isometry3::translation(5.0, 0.0, 0.0);
        let mesh = TriangleMesh::build(&single_triangle(), &transform).unwrap();
        let ray = Ray {
            origin: Point3::new(0.0, 0.0, 2.0),
            direction: Vector3::x(),
        };
        assert!(mesh.intersect(&ray).is_none());
    }

    #[test]
    fn test_validate_rejects_bad_index() {
        let mut data = single_triangle();
        data.faces.push([0, 1, 7]);
        assert!(matches!(
            data.validate(),
            Err(MeshError::IndexOutOfRange { index: 7, count: 3 })
        ));
        assert!(matches!(MeshData::default().validate(), Err(MeshError::Empty)));
    }

    #[test]
    fn test_polygon_fan() {
        let mut data = MeshData::default();
        data.push_polygon(&[0, 1, 2, 3, 4]);
        assert_eq!(data.faces, vec![[0, 1, 2], [0, 2, 3], [0, 3, 4]]);
    }

    #[test]
    fn test_normalized_fits_size() {
        let data = single_triangle().normalized(4.0);
        let max_z = data.vertices.iter().map(|v| v.z).fold(f32::MIN, f32::max);
        let min_z = data.vertices.iter().map(|v| v.z).fold(f32::MAX, f32::min);
        assert_relative_eq!(max_z - min_z, 4.0, epsilon = 1e-5);
        assert_relative_eq!(max_z, 2.0, epsilon = 1e-5);
    }
}

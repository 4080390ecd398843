//! Local-space tessellation of the dataset primitives.
//!
//! All primitives are centered on the origin. Cones and cylinders run along
//! the local Z axis, the torus lies in the XY plane.

use std::f32::consts::TAU;

use nalgebra::{Point3, Vector3};

use super::MeshData;

pub fn cube(size: f32) -> MeshData {
    let h = size / 2.0;
    let mut data = MeshData::default();
    for z in [-h, h] {
        for y in [-h, h] {
            for x in [-h, h] {
                data.vertices.push(Point3::new(x, y, z));
            }
        }
    }
    // vertex index bits: x = 1, y = 2, z = 4
    data.push_quad(0, 2, 3, 1);
    data.push_quad(4, 5, 7, 6);
    data.push_quad(0, 1, 5, 4);
    data.push_quad(2, 6, 7, 3);
    data.push_quad(0, 4, 6, 2);
    data.push_quad(1, 3, 7, 5);
    data
}

/// Truncated cone; `radius2 == 0` closes it to an apex.
pub fn cone(radius1: f32, radius2: f32, depth: f32, vertices: usize) -> MeshData {
    let vertices = vertices.max(3);
    let h = depth / 2.0;
    let mut data = MeshData::default();
    push_ring(&mut data, radius1, -h, vertices);
    let bottom: Vec<usize> = (0..vertices).collect();

    if radius2 > 0.0 {
        push_ring(&mut data, radius2, h, vertices);
        for i in 0..vertices {
            let j = (i + 1) % vertices;
            data.push_quad(i, j, vertices + j, vertices + i);
        }
        let top: Vec<usize> = (vertices..2 * vertices).collect();
        data.push_polygon(&top);
    } else {
        let apex = data.vertices.len();
        data.vertices.push(Point3::new(0.0, 0.0, h));
        for i in 0..vertices {
            data.faces.push([i, (i + 1) % vertices, apex]);
        }
    }
    if radius1 > 0.0 {
        let reversed: Vec<usize> = bottom.into_iter().rev().collect();
        data.push_polygon(&reversed);
    }
    data
}

pub fn cylinder(radius: f32, depth: f32, vertices: usize) -> MeshData {
    cone(radius, radius, depth, vertices)
}

pub fn torus(
    major_radius: f32,
    minor_radius: f32,
    major_segments: usize,
    minor_segments: usize,
) -> MeshData {
    let major_segments = major_segments.max(3);
    let minor_segments = minor_segments.max(3);
    let mut data = MeshData::default();
    for i in 0..major_segments {
        let u = TAU * i as f32 / major_segments as f32;
        let (su, cu) = u.sin_cos();
        for j in 0..minor_segments {
            let v = TAU * j as f32 / minor_segments as f32;
            let (sv, cv) = v.sin_cos();
            let r = major_radius + minor_radius * cv;
            data.vertices
                .push(Point3::new(r * cu, r * su, minor_radius * sv));
        }
    }
    let index = |i: usize, j: usize| (i % major_segments) * minor_segments + j % minor_segments;
    for i in 0..major_segments {
        for j in 0..minor_segments {
            data.push_quad(index(i, j), index(i + 1, j), index(i + 1, j + 1), index(i, j + 1));
        }
    }
    data
}

/// Latitude/longitude sphere scaled per axis into an ellipsoid.
pub fn ellipsoid(center: Point3<f32>, radii: Vector3<f32>, segments: usize, rings: usize) -> MeshData {
    let segments = segments.max(3);
    let rings = rings.max(2);
    let mut data = MeshData::default();
    data.vertices.push(center + Vector3::new(0.0, 0.0, -radii.z));
    for ring in 1..rings {
        let polar = std::f32::consts::PI * ring as f32 / rings as f32;
        let (sp, cp) = polar.sin_cos();
        for s in 0..segments {
            let azimuth = TAU * s as f32 / segments as f32;
            let (sa, ca) = azimuth.sin_cos();
            data.vertices.push(
                center + Vector3::new(radii.x * sp * ca, radii.y * sp * sa, -radii.z * cp),
            );
        }
    }
    let top = data.vertices.len();
    data.vertices.push(center + Vector3::new(0.0, 0.0, radii.z));

    let ring_start = |ring: usize| 1 + (ring - 1) * segments;
    for s in 0..segments {
        let next = (s + 1) % segments;
        data.faces.push([0, ring_start(1) + next, ring_start(1) + s]);
        let last = ring_start(rings - 1);
        data.faces.push([last + s, last + next, top]);
    }
    for ring in 1..rings - 1 {
        let lower = ring_start(ring);
        let upper = ring_start(ring + 1);
        for s in 0..segments {
            let next = (s + 1) % segments;
            data.push_quad(lower + s, lower + next, upper + next, upper + s);
        }
    }
    data
}

/// Fixed reference head mesh: skull, brow, muzzle and two ears, facing -Y.
///
/// Scaled so its widest extent equals `extent`.
pub fn monkey(extent: f32) -> MeshData {
    let parts = [
        (Point3::new(0.0, 0.0, 0.0), Vector3::new(0.9, 0.8, 0.85)),
        (Point3::new(0.0, -0.55, 0.25), Vector3::new(0.7, 0.3, 0.22)),
        (Point3::new(0.0, -0.6, -0.35), Vector3::new(0.55, 0.35, 0.3)),
        (Point3::new(-1.15, 0.1, 0.2), Vector3::new(0.45, 0.12, 0.35)),
        (Point3::new(1.15, 0.1, 0.2), Vector3::new(0.45, 0.12, 0.35)),
    ];
    let mut data = MeshData::default();
    for (center, radii) in parts {
        data.merge(ellipsoid(center, radii, 24, 12));
    }
    data.normalized(extent)
}

fn push_ring(data: &mut MeshData, radius: f32, z: f32, vertices: usize) {
    for i in 0..vertices {
        let angle = TAU * i as f32 / vertices as f32;
        data.vertices
            .push(Point3::new(radius * angle.cos(), radius * angle.sin(), z));
    }
}

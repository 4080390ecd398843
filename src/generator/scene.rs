//! The scene context each generation step works on, and the renderer seam.
//!
//! The scene holds at most one camera, one light and one shape. The camera
//! persists for the whole run; the light and shape are created per frame and
//! removed again by [`Scene::clear`].

use std::path::{Path, PathBuf};

use nalgebra::{Isometry3, Point3, Rotation3, Translation3, UnitQuaternion};
use thiserror::Error;

use crate::generator::config::{GeometryTable, ShapeKind};
use crate::imageio::ImageError;
use crate::raytracer::camera::{Camera, Projection};
use crate::raytracer::light::PointLight;
use crate::raytracer::mesh::{self, primitives, MeshData, MeshError, TriangleMesh};
use crate::raytracer::shape::Shape;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Scene already holds a light")]
    LightPresent,
    #[error("Scene already holds a shape")]
    ShapePresent,
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Scene has no camera")]
    MissingCamera,
    #[error(transparent)]
    Image(#[from] ImageError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Grayscale,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputSettings {
    pub width: u32,
    pub height: u32,
    pub color_mode: ColorMode,
    pub resolution_percentage: u32,
}

impl OutputSettings {
    pub fn grayscale(width: u32, height: u32) -> Self {
        OutputSettings {
            width,
            height,
            color_mode: ColorMode::Grayscale,
            resolution_percentage: 100,
        }
    }

    /// Pixel dimensions after applying the resolution percentage.
    pub fn pixel_size(&self) -> (u32, u32) {
        let scale = |v: u32| (v * self.resolution_percentage / 100).max(1);
        (scale(self.width), scale(self.height))
    }
}

/// Placement of a primitive; `rotation` is `None` for rotation-free kinds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Point3<f32>,
    pub rotation: Option<Rotation3<f32>>,
}

impl Pose {
    fn isometry(&self) -> Isometry3<f32> {
        let rotation = self
            .rotation
            .map(|r| UnitQuaternion::from_rotation_matrix(&r))
            .unwrap_or_else(UnitQuaternion::identity);
        Isometry3::from_parts(Translation3::from(self.position.coords), rotation)
    }
}

/// Geometry of one shape kind with every fixed parameter applied, ready to
/// be placed at a pose.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Sphere { radius: f32 },
    Mesh(MeshData),
}

impl Primitive {
    /// Looks up the geometry record for `kind` and tessellates it once.
    pub fn from_table(kind: ShapeKind, table: &GeometryTable) -> Result<Self, MeshError> {
        let data = match kind {
            ShapeKind::Sphere => {
                return Ok(Primitive::Sphere {
                    radius: table.sphere.radius,
                })
            }
            ShapeKind::Cube => primitives::cube(table.cube.size),
            ShapeKind::Cone => {
                let g = &table.cone;
                primitives::cone(g.radius1, g.radius2, g.depth, g.vertices)
            }
            ShapeKind::Cylinder => {
                let g = &table.cylinder;
                primitives::cylinder(g.radius, g.depth, g.vertices)
            }
            ShapeKind::Torus => {
                let g = &table.torus;
                primitives::torus(
                    g.major_radius,
                    g.minor_radius,
                    g.major_segments,
                    g.minor_segments,
                )
            }
            ShapeKind::Monkey => match &table.monkey.obj {
                Some(path) => mesh::load_obj(path)?.normalized(table.monkey.extent),
                None => primitives::monkey(table.monkey.extent),
            },
        };
        data.validate()?;
        Ok(Primitive::Mesh(data))
    }

    fn place(&self, pose: &Pose) -> Result<Shape, MeshError> {
        match self {
            Primitive::Sphere { radius } => Ok(Shape::Sphere {
                center: pose.position,
                radius: *radius,
            }),
            Primitive::Mesh(data) => Ok(Shape::Mesh(TriangleMesh::build(data, &pose.isometry())?)),
        }
    }
}

#[derive(Debug)]
pub struct PlacedShape {
    pub kind: ShapeKind,
    pub pose: Pose,
    pub geometry: Shape,
}

#[derive(Debug)]
pub struct Scene {
    camera: Option<Camera>,
    output: OutputSettings,
    light: Option<PointLight>,
    shape: Option<PlacedShape>,
}

impl Default for Scene {
    fn default() -> Self {
        Scene {
            camera: None,
            output: OutputSettings::grayscale(28, 28),
            light: None,
            shape: None,
        }
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears everything, then installs the persistent camera and the
    /// output settings for the run.
    pub fn setup(&mut self, projection: Projection, output: OutputSettings) {
        self.reset();
        self.create_camera(Camera::forward_x(projection));
        self.output = output;
    }

    /// Removes every object, camera included.
    pub fn reset(&mut self) {
        self.camera = None;
        self.light = None;
        self.shape = None;
    }

    pub fn create_camera(&mut self, camera: Camera) {
        self.camera = Some(camera);
    }

    pub fn create_light(&mut self, light: PointLight) -> Result<(), SceneError> {
        if self.light.is_some() {
            return Err(SceneError::LightPresent);
        }
        self.light = Some(light);
        Ok(())
    }

    pub fn create_primitive(
        &mut self,
        kind: ShapeKind,
        primitive: &Primitive,
        pose: Pose,
    ) -> Result<(), SceneError> {
        if self.shape.is_some() {
            return Err(SceneError::ShapePresent);
        }
        let geometry = primitive.place(&pose)?;
        self.shape = Some(PlacedShape {
            kind,
            pose,
            geometry,
        });
        Ok(())
    }

    /// Teardown: drops the per-frame light and shape, keeps the camera.
    pub fn clear(&mut self) {
        self.light = None;
        self.shape = None;
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    pub fn light(&self) -> Option<&PointLight> {
        self.light.as_ref()
    }

    pub fn shape(&self) -> Option<&PlacedShape> {
        self.shape.as_ref()
    }

    pub fn output(&self) -> &OutputSettings {
        &self.output
    }

    /// (cameras, lights, shapes) currently in the scene.
    #[cfg(test)]
    pub fn object_counts(&self) -> (usize, usize, usize) {
        (
            self.camera.iter().count(),
            self.light.iter().count(),
            self.shape.iter().count(),
        )
    }
}

/// What a renderer reports about a frame it wrote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameResult {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Turns the current scene into an image file at `path`, overwriting it.
pub trait Renderer {
    fn render(&self, scene: &Scene, path: &Path) -> Result<FrameResult, RenderError>;
}

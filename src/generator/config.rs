//! Dataset configuration: what to render, how many, and where.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::raytracer::camera::Projection;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Value outside its allowed range
    #[error("Invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Type not recognized: '{0}'")]
pub struct UnrecognizedKind(pub String);

/// The closed set of primitives the generator knows how to build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Cube,
    Sphere,
    Cone,
    Torus,
    Cylinder,
    Monkey,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 6] = [
        ShapeKind::Cube,
        ShapeKind::Sphere,
        ShapeKind::Cone,
        ShapeKind::Torus,
        ShapeKind::Cylinder,
        ShapeKind::Monkey,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Cube => "Cube",
            ShapeKind::Sphere => "Sphere",
            ShapeKind::Cone => "Cone",
            ShapeKind::Torus => "Torus",
            ShapeKind::Cylinder => "Cylinder",
            ShapeKind::Monkey => "Monkey",
        }
    }

    /// Spheres are rotation-symmetric and are placed without a rotation.
    pub fn takes_rotation(self) -> bool {
        !matches!(self, ShapeKind::Sphere)
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeKind {
    type Err = UnrecognizedKind;

    /// Exact, case-sensitive match against the kind names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShapeKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnrecognizedKind(s.to_string()))
    }
}

/// Ranges the pose sampler rescales its uniform draws into.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SamplerConfig {
    /// Width of the angular jitter window centered on zero, in radians.
    pub angular_span: f64,
    pub distance_min: f64,
    pub distance_span: f64,
    pub light_x: f64,
    /// Half-open `[min, max)` range for the light's Y coordinate.
    pub light_y: [f64; 2],
    pub light_z: [f64; 2],
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig {
            angular_span: 1.0 / 3.0,
            distance_min: 6.0,
            distance_span: 3.0,
            light_x: -0.5,
            light_y: [-7.0, 7.0],
            light_z: [-4.0, 4.0],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LightingConfig {
    /// Point light power in watts.
    pub energy: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        LightingConfig { energy: 600.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CubeGeometry {
    pub size: f32,
}

impl Default for CubeGeometry {
    fn default() -> Self {
        CubeGeometry { size: 2.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SphereGeometry {
    pub radius: f32,
}

impl Default for SphereGeometry {
    fn default() -> Self {
        SphereGeometry { radius: 1.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConeGeometry {
    pub radius1: f32,
    pub radius2: f32,
    pub depth: f32,
    pub vertices: usize,
}

impl Default for ConeGeometry {
    fn default() -> Self {
        ConeGeometry {
            radius1: 1.0,
            radius2: 0.0,
            depth: 2.0,
            vertices: 32,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CylinderGeometry {
    pub radius: f32,
    pub depth: f32,
    pub vertices: usize,
}

impl Default for CylinderGeometry {
    fn default() -> Self {
        CylinderGeometry {
            radius: 1.0,
            depth: 2.0,
            vertices: 32,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TorusGeometry {
    pub major_radius: f32,
    pub minor_radius: f32,
    pub major_segments: usize,
    pub minor_segments: usize,
}

impl Default for TorusGeometry {
    fn default() -> Self {
        TorusGeometry {
            major_radius: 1.0,
            minor_radius: 0.25,
            major_segments: 48,
            minor_segments: 12,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonkeyGeometry {
    /// Widest extent of the head, ears included.
    pub extent: f32,
    /// Replaces the built-in reference head when set.
    pub obj: Option<PathBuf>,
}

impl Default for MonkeyGeometry {
    fn default() -> Self {
        MonkeyGeometry {
            extent: 2.73,
            obj: None,
        }
    }
}

/// Fixed per-kind geometry parameters; only the pose varies per frame.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeometryTable {
    pub cube: CubeGeometry,
    pub sphere: SphereGeometry,
    pub cone: ConeGeometry,
    pub cylinder: CylinderGeometry,
    pub torus: TorusGeometry,
    pub monkey: MonkeyGeometry,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatasetConfig {
    pub count: u32,
    /// Resolved to a [`ShapeKind`] when generation starts.
    pub kind: String,
    pub image_size: [u32; 2],
    pub projection: Projection,
    pub output_dir: PathBuf,
    pub seed: Option<u64>,
    pub sampler: SamplerConfig,
    pub lighting: LightingConfig,
    pub geometry: GeometryTable,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        DatasetConfig {
            count: 50,
            kind: ShapeKind::Cube.name().to_string(),
            image_size: [28, 28],
            projection: Projection::Perspective,
            output_dir: PathBuf::from("dataset"),
            seed: None,
            sampler: SamplerConfig::default(),
            lighting: LightingConfig::default(),
            geometry: GeometryTable::default(),
        }
    }
}

impl DatasetConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: DatasetConfig =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Range checks. The shape kind is resolved by the generator when it
    /// starts, not here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.count == 0 {
            return Err(invalid("count", "must be a positive integer"));
        }
        if self.image_size.contains(&0) {
            return Err(invalid("image_size", "width and height must be greater than zero"));
        }

        let s = &self.sampler;
        finite("sampler.angular_span", s.angular_span)?;
        finite("sampler.distance_min", s.distance_min)?;
        finite("sampler.distance_span", s.distance_span)?;
        finite("sampler.light_x", s.light_x)?;
        for v in s.light_y {
            finite("sampler.light_y", v)?;
        }
        for v in s.light_z {
            finite("sampler.light_z", v)?;
        }
        if s.angular_span < 0.0 || s.distance_span < 0.0 {
            return Err(invalid("sampler", "spans must not be negative"));
        }
        if s.distance_min <= 0.0 {
            return Err(invalid("sampler.distance_min", "must be greater than zero"));
        }
        if s.light_y[0] > s.light_y[1] || s.light_z[0] > s.light_z[1] {
            return Err(invalid("sampler", "light ranges must be ordered [min, max]"));
        }

        finite("lighting.energy", self.lighting.energy.into())?;
        if self.lighting.energy < 0.0 {
            return Err(invalid("lighting.energy", "must not be negative"));
        }
        self.geometry.validate()
    }

    pub fn width(&self) -> u32 {
        self.image_size[0]
    }

    pub fn height(&self) -> u32 {
        self.image_size[1]
    }
}

impl GeometryTable {
    /// Every size, radius and depth must be a positive finite number. A cone
    /// may close one end with a zero radius, not both.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("geometry.cube.size", self.cube.size)?;
        positive("geometry.sphere.radius", self.sphere.radius)?;

        let cone = &self.cone;
        non_negative("geometry.cone.radius1", cone.radius1)?;
        non_negative("geometry.cone.radius2", cone.radius2)?;
        if cone.radius1 == 0.0 && cone.radius2 == 0.0 {
            return Err(invalid("geometry.cone", "radius1 and radius2 cannot both be zero"));
        }
        positive("geometry.cone.depth", cone.depth)?;

        positive("geometry.cylinder.radius", self.cylinder.radius)?;
        positive("geometry.cylinder.depth", self.cylinder.depth)?;
        positive("geometry.torus.major_radius", self.torus.major_radius)?;
        positive("geometry.torus.minor_radius", self.torus.minor_radius)?;
        positive("geometry.monkey.extent", self.monkey.extent)
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, &format!("must be a finite number, got {value}")))
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value.into())?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, &format!("must be greater than zero, got {value}")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value.into())?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, &format!("must not be negative, got {value}")))
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

//! The generation loop: setup once, then sample, build, render and tear
//! down for every frame.

use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info};
use thiserror::Error;

use crate::generator::config::{DatasetConfig, ShapeKind, UnrecognizedKind};
use crate::generator::sampler::{FrameSeeds, PoseSampler};
use crate::generator::scene::{
    FrameResult, OutputSettings, Pose, Primitive, RenderError, Renderer, Scene, SceneError,
};
use crate::raytracer::light::PointLight;
use crate::raytracer::mesh::MeshError;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error(transparent)]
    UnrecognizedKind(#[from] UnrecognizedKind),
    #[error("Failed to prepare geometry: {0}")]
    Geometry(#[from] MeshError),
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
    #[error("Render of {path} failed: {source}")]
    Render { path: PathBuf, source: RenderError },
    #[error("Failed to report progress: {0}")]
    Progress(#[from] std::io::Error),
}

#[derive(Debug, PartialEq, Eq)]
pub struct GenerationSummary {
    pub kind: ShapeKind,
    pub frames: Vec<FrameResult>,
}

/// `{output_dir}/{kind}/{kind}{index}.png`
pub fn frame_path(output_dir: &Path, kind: ShapeKind, index: u32) -> PathBuf {
    output_dir
        .join(kind.name())
        .join(format!("{}{}.png", kind.name(), index))
}

pub struct DatasetGenerator<'a, R: Renderer> {
    config: &'a DatasetConfig,
    renderer: &'a R,
}

impl<'a, R: Renderer> DatasetGenerator<'a, R> {
    pub fn new(config: &'a DatasetConfig, renderer: &'a R) -> Self {
        DatasetGenerator { config, renderer }
    }

    /// Renders `config.count` frames, writing one progress line per frame
    /// to `progress`.
    ///
    /// An unrecognized kind stops the run before any frame is rendered. Any
    /// other failure stops it at the failing frame; frames already written
    /// stay on disk.
    pub fn run<W: Write>(&self, scene: &mut Scene, progress: &mut W) -> Result<GenerationSummary, DatasetError> {
        let config = self.config;
        let kind: ShapeKind = config.kind.parse()?;
        let primitive = Primitive::from_table(kind, &config.geometry)?;

        scene.setup(
            config.projection,
            OutputSettings::grayscale(config.width(), config.height()),
        );
        info!(
            "generating {} {} images at {}x{} ({:?}) into {}",
            config.count,
            kind,
            config.width(),
            config.height(),
            config.projection,
            config.output_dir.display()
        );

        let mut seeds = FrameSeeds::new(config.seed);
        let mut frames = Vec::with_capacity(config.count as usize);
        for index in 0..config.count {
            let mut sampler = PoseSampler::new(seeds.next_rng(), config.sampler.clone());
            let sample = sampler.sample();
            debug!("frame {index}: {sample:?}");

            scene.create_light(PointLight::new(sample.light_position(), config.lighting.energy))?;
            let pose = Pose {
                position: sample.position(),
                rotation: kind.takes_rotation().then(|| sample.rotation()),
            };
            scene.create_primitive(kind, &primitive, pose)?;

            let path = frame_path(&config.output_dir, kind, index);
            let frame = self
                .renderer
                .render(scene, &path)
                .map_err(|source| DatasetError::Render {
                    path: path.clone(),
                    source,
                })?;
            scene.clear();

            writeln!(progress, "Image {} of {} is rendered", index + 1, config.count)?;
            frames.push(frame);
        }
        info!("finished {} frames", frames.len());
        Ok(GenerationSummary { kind, frames })
    }
}

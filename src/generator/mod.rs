mod config;
mod dataset;
mod sampler;
mod scene;

pub use config::DatasetConfig;
pub use dataset::{DatasetError, DatasetGenerator, GenerationSummary};
pub use scene::{FrameResult, RenderError, Renderer, Scene};

#[cfg(test)]
pub use config::{GeometryTable, ShapeKind};
#[cfg(test)]
pub use scene::{OutputSettings, Pose, Primitive};

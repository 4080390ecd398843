mod generator;
mod imageio;
mod raytracer;

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use log::info;

use generator::{DatasetConfig, DatasetError, DatasetGenerator, GenerationSummary, Scene};
use raytracer::{RayTracer, Shading};

const DEFAULT_CONFIG: &str = "dataset.toml";

fn load_config() -> anyhow::Result<DatasetConfig> {
    match std::env::args().nth(1) {
        Some(path) => DatasetConfig::load_from_file(&path)
            .with_context(|| format!("failed to load configuration from {path}")),
        None if Path::new(DEFAULT_CONFIG).exists() => DatasetConfig::load_from_file(DEFAULT_CONFIG)
            .with_context(|| format!("failed to load configuration from {DEFAULT_CONFIG}")),
        None => {
            info!("no {DEFAULT_CONFIG} found, using built-in settings");
            Ok(DatasetConfig::default())
        }
    }
}

/// Turns the run's outcome into an exit status. An unrecognized kind is the
/// one failure reported as a bare diagnostic line on `diagnostics`.
fn finish<W: Write>(
    result: Result<GenerationSummary, DatasetError>,
    diagnostics: &mut W,
) -> anyhow::Result<i32> {
    match result {
        Ok(summary) => {
            info!("{} {} images written", summary.frames.len(), summary.kind);
            Ok(0)
        }
        Err(DatasetError::UnrecognizedKind(e)) => {
            writeln!(diagnostics, "{e}")?;
            Ok(2)
        }
        Err(e) => Err(e).context("dataset generation stopped"),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    let ray_tracer = RayTracer::new(Shading::default());
    let mut scene = Scene::new();
    let stdout = std::io::stdout();
    let result = DatasetGenerator::new(&config, &ray_tracer).run(&mut scene, &mut stdout.lock());
    let status = finish(result, &mut std::io::stderr().lock())?;
    if status != 0 {
        std::process::exit(status);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{FrameResult, RenderError, Renderer};

    struct NullRenderer;

    impl Renderer for NullRenderer {
        fn render(&self, _scene: &Scene, path: &Path) -> Result<FrameResult, RenderError> {
            Ok(FrameResult {
                path: path.to_path_buf(),
                width: 28,
                height: 28,
            })
        }
    }

    fn run_kind(kind: &str) -> (anyhow::Result<i32>, String, String) {
        let config = DatasetConfig {
            count: 2,
            kind: kind.to_string(),
            seed: Some(1),
            ..DatasetConfig::default()
        };
        let mut progress = Vec::new();
        let mut diagnostics = Vec::new();
        let result = DatasetGenerator::new(&config, &NullRenderer).run(&mut Scene::new(), &mut progress);
        let status = finish(result, &mut diagnostics);
        (
            status,
            String::from_utf8(progress).unwrap(),
            String::from_utf8(diagnostics).unwrap(),
        )
    }

    #[test]
    fn test_unrecognized_kind_prints_one_diagnostic() {
        let (status, progress, diagnostics) = run_kind("Pyramid");
        assert_eq!(status.unwrap(), 2);
        assert!(progress.is_empty());
        assert_eq!(diagnostics, "Type not recognized: 'Pyramid'\n");
    }

    #[test]
    fn test_success_prints_no_diagnostic() {
        let (status, progress, diagnostics) = run_kind("Sphere");
        assert_eq!(status.unwrap(), 0);
        assert_eq!(progress.lines().count(), 2);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_other_failures_become_errors() {
        let failed = Err(DatasetError::Render {
            path: "out/Cube/Cube0.png".into(),
            source: RenderError::MissingCamera,
        });
        let mut diagnostics = Vec::new();
        assert!(finish(failed, &mut diagnostics).is_err());
        assert!(diagnostics.is_empty());
    }
}

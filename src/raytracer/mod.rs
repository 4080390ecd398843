pub mod camera;
pub mod light;
pub mod mesh;
mod raytracer;
pub mod shape;

pub use raytracer::{RayTracer, Shading};

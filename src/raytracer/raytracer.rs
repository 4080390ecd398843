use std::path::Path;

use log::debug;
use nalgebra::Point3;
use rayon::prelude::*;

use crate::generator::{FrameResult, RenderError, Renderer, Scene};
use crate::imageio::{save_image, Image};
use crate::raytracer::shape::{Intersection, Ray, EPSILON};

/// Surface and world shading constants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shading {
    /// Diffuse reflectance of every shape.
    pub albedo: f32,
    /// Radiance of rays that miss, also used as uniform ambient light.
    pub background: f32,
    /// Display gamma applied before quantizing to 8 bits.
    pub gamma: f32,
    pub shadows: bool,
}

impl Default for Shading {
    fn default() -> Self {
        Shading {
            albedo: 0.8,
            background: 0.05,
            gamma: 2.2,
            shadows: true,
        }
    }
}

/// CPU ray tracer for the generator's single-shape scenes.
#[derive(Default)]
pub struct RayTracer {
    shading: Shading,
}

impl RayTracer {
    pub fn new(shading: Shading) -> Self {
        RayTracer { shading }
    }

    pub fn render_image(&self, scene: &Scene) -> Result<Image, RenderError> {
        let camera = scene.camera().ok_or(RenderError::MissingCamera)?;
        let (width, height) = scene.output().pixel_size();
        let frame = camera.frame(width, height);

        let mut image_data = vec![0u8; (width * height) as usize];
        image_data
            .par_chunks_mut(width as usize)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, pixel) in row.iter_mut().enumerate() {
                    let ray = frame.ray(x as u32, y as u32);
                    *pixel = self.quantize(self.find_radiance(scene, &ray));
                }
            });
        Ok(Image::new(width, height, image_data))
    }

    fn find_radiance(&self, scene: &Scene, ray: &Ray) -> f32 {
        let Some(hit) = self.closest_hit(scene, ray) else {
            return self.shading.background;
        };
        let mut radiance = self.shading.background * self.shading.albedo;
        if let Some(light) = scene.light() {
            let (irradiance, to_light) = light.irradiance_at(&hit.point);
            let lambertian = hit.normal.dot(&to_light).max(0.0);
            if lambertian > 0.0 && !self.occluded(scene, &hit, &light.position) {
                radiance += self.shading.albedo * irradiance * lambertian;
            }
        }
        radiance
    }

    fn closest_hit(&self, scene: &Scene, ray: &Ray) -> Option<Intersection> {
        scene.shape().and_then(|shape| shape.geometry.intersect(ray))
    }

    fn occluded(&self, scene: &Scene, hit: &Intersection, light: &Point3<f32>) -> bool {
        if !self.shading.shadows {
            return false;
        }
        let to_light = light - hit.point;
        let distance = to_light.norm();
        let shadow_ray = Ray {
            origin: hit.point + hit.normal * (EPSILON * 10.0),
            direction: to_light / distance,
        };
        self.closest_hit(scene, &shadow_ray)
            .is_some_and(|blocker| blocker.distance < distance)
    }

    fn quantize(&self, radiance: f32) -> u8 {
        let display = radiance.clamp(0.0, 1.0).powf(1.0 / self.shading.gamma);
        (display * 255.0).round() as u8
    }
}

impl Renderer for RayTracer {
    fn render(&self, scene: &Scene, path: &Path) -> Result<FrameResult, RenderError> {
        let image = self.render_image(scene)?;
        save_image(&image, path)?;
        if let Some(shape) = scene.shape() {
            debug!(
                "wrote {} at {:?} to {}",
                shape.kind,
                shape.pose.position,
                path.display()
            );
        }
        Ok(FrameResult {
            path: path.to_path_buf(),
            width: image.width,
            height: image.height,
        })
    }
}

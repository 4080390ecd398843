//! Random pose sampling for the shape and the light.

use std::f64::consts::TAU;

use nalgebra::{Point3, Rotation3};
use rand::{Rng, RngCore, SeedableRng};
use rand_xoshiro::{SplitMix64, Xoshiro256PlusPlus};

use crate::generator::config::SamplerConfig;

/// One frame's worth of random draws.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoseSample {
    pub light: Point3<f64>,
    pub theta: f64,
    pub phi: f64,
    pub distance: f64,
    /// Euler angles about X, Y and Z.
    pub rotation: [f64; 3],
}

impl PoseSample {
    /// Shape position: near the +X axis, jittered by θ and φ.
    pub fn position(&self) -> Point3<f32> {
        Point3::new(
            self.distance * self.theta.cos(),
            self.distance * self.theta.sin(),
            self.distance * self.phi.sin(),
        )
        .cast()
    }

    /// XYZ Euler rotation, `Rz * Ry * Rx`.
    pub fn rotation(&self) -> Rotation3<f32> {
        let [x, y, z] = self.rotation;
        Rotation3::from_euler_angles(x as f32, y as f32, z as f32)
    }

    pub fn light_position(&self) -> Point3<f32> {
        self.light.cast()
    }
}

pub struct PoseSampler<R: Rng> {
    rng: R,
    config: SamplerConfig,
}

impl<R: Rng> PoseSampler<R> {
    pub fn new(rng: R, config: SamplerConfig) -> Self {
        PoseSampler { rng, config }
    }

    /// Draws, in order: light y, light z, θ, φ, distance, then the three
    /// rotation angles.
    pub fn sample(&mut self) -> PoseSample {
        let c = &self.config;
        let light_y = lerp(c.light_y, self.rng.random());
        let light_z = lerp(c.light_z, self.rng.random());
        let theta = (self.rng.random::<f64>() - 0.5) * c.angular_span;
        let phi = (self.rng.random::<f64>() - 0.5) * c.angular_span;
        let distance = self.rng.random::<f64>() * c.distance_span + c.distance_min;
        let rotation = [
            self.rng.random::<f64>() * TAU,
            self.rng.random::<f64>() * TAU,
            self.rng.random::<f64>() * TAU,
        ];
        PoseSample {
            light: Point3::new(c.light_x, light_y, light_z),
            theta,
            phi,
            distance,
            rotation,
        }
    }
}

fn lerp([min, max]: [f64; 2], u: f64) -> f64 {
    min + (max - min) * u
}

/// Hands out one independent generator per frame.
///
/// With a base seed every frame's generator is derived from it through
/// SplitMix64, so frame `i` is reproducible on its own.
pub enum FrameSeeds {
    Seeded(SplitMix64),
    Entropy,
}

impl FrameSeeds {
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => FrameSeeds::Seeded(SplitMix64::seed_from_u64(seed)),
            None => FrameSeeds::Entropy,
        }
    }

    pub fn next_rng(&mut self) -> Xoshiro256PlusPlus {
        match self {
            FrameSeeds::Seeded(splitmix) => Xoshiro256PlusPlus::seed_from_u64(splitmix.next_u64()),
            FrameSeeds::Entropy => Xoshiro256PlusPlus::from_rng(&mut rand::rng()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DRAWS: usize = 2_000;

    fn sampler(seed: u64) -> PoseSampler<Xoshiro256PlusPlus> {
        PoseSampler::new(
            Xoshiro256PlusPlus::seed_from_u64(seed),
            SamplerConfig::default(),
        )
    }

    #[test]
    fn test_distance_within_shell() {
        let mut s = sampler(1);
        for _ in 0..DRAWS {
            let d = s.sample().distance;
            assert!((6.0..9.0).contains(&d), "distance {d}");
        }
    }

    #[test]
    fn test_angular_jitter_within_sixth_radian() {
        let mut s = sampler(2);
        for _ in 0..DRAWS {
            let p = s.sample();
            assert!((-1.0 / 6.0..1.0 / 6.0).contains(&p.theta), "theta {}", p.theta);
            assert!((-1.0 / 6.0..1.0 / 6.0).contains(&p.phi), "phi {}", p.phi);
        }
    }

    #[test]
    fn test_rotation_within_full_turn() {
        let mut s = sampler(3);
        for _ in 0..DRAWS {
            for angle in s.sample().rotation {
                assert!((0.0..TAU).contains(&angle), "angle {angle}");
            }
        }
    }

    #[test]
    fn test_light_inside_box() {
        let mut s = sampler(4);
        for _ in 0..DRAWS {
            let light = s.sample().light;
            assert_eq!(light.x, -0.5);
            assert!((-7.0..7.0).contains(&light.y));
            assert!((-4.0..4.0).contains(&light.z));
        }
    }

    #[test]
    fn test_position_follows_polar_model() {
        let sample = PoseSample {
            light: Point3::origin(),
            theta: 0.1,
            phi: -0.05,
            distance: 7.5,
            rotation: [0.0; 3],
        };
        let p = sample.position();
        assert_relative_eq!(p.x, (7.5 * 0.1f64.cos()) as f32, epsilon = 1e-5);
        assert_relative_eq!(p.y, (7.5 * 0.1f64.sin()) as f32, epsilon = 1e-5);
        assert_relative_eq!(p.z, (7.5 * (-0.05f64).sin()) as f32, epsilon = 1e-5);
        // the shape sits in front of the camera
        assert!(p.x > 6.0 * (1.0f32 / 6.0).cos() - 1e-4);
    }

    #[test]
    fn test_rotation_order_is_xyz() {
        let sample = PoseSample {
            light: Point3::origin(),
            theta: 0.0,
            phi: 0.0,
            distance: 6.0,
            rotation: [std::f64::consts::FRAC_PI_2, 0.0, std::f64::consts::FRAC_PI_2],
        };
        // X first sends +Y to +Z, Z then leaves +Z alone
        let v = sample.rotation() * nalgebra::Vector3::y();
        assert_relative_eq!(v, nalgebra::Vector3::z(), epsilon = 1e-5);
    }

    #[test]
    fn test_seeded_frames_are_reproducible() {
        let mut a = FrameSeeds::new(Some(42));
        let mut b = FrameSeeds::new(Some(42));
        for _ in 0..5 {
            let sa = PoseSampler::new(a.next_rng(), SamplerConfig::default()).sample();
            let sb = PoseSampler::new(b.next_rng(), SamplerConfig::default()).sample();
            assert_eq!(sa, sb);
        }
    }

    #[test]
    fn test_seeded_frames_differ_from_each_other() {
        let mut seeds = FrameSeeds::new(Some(42));
        let first = PoseSampler::new(seeds.next_rng(), SamplerConfig::default()).sample();
        let second = PoseSampler::new(seeds.next_rng(), SamplerConfig::default()).sample();
        assert_ne!(first, second);
    }
}

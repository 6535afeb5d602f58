//! One-shot spiral intro for the petal tunnel.
//!
//! Every petal is a pure function of the shared `progress` value, which climbs from
//! 0 to 1 over `duration` seconds and then stays at 1, so the petals come to rest
//! instead of looping.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use super::{ParticleInstance, jitter};

#[derive(Clone, Debug, PartialEq)]
pub struct SpiralParams {
    pub count: usize,
    pub duration: f32,
    pub radius_range: (f32, f32),
    pub height: f32,
    pub start_depth: f32,
    pub end_depth: f32,
    /// Full turns made over the whole animation.
    pub spin: f32,
    pub size_range: (f32, f32),
    pub colors: Vec<[f32; 4]>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpiralPetal {
    pub base_angle: f32,
    pub base_radius: f32,
    pub base_height: f32,
    pub size: f32,
    pub color: [f32; 4],
}

pub struct PetalSpiral {
    params: SpiralParams,
    petals: Vec<SpiralPetal>,
    elapsed: f32,
    progress: f32,
}

impl PetalSpiral {
    pub fn new<R: Rng + ?Sized>(params: SpiralParams, rng: &mut R) -> Self {
        let petals = (0..params.count)
            .map(|_| {
                let color = if params.colors.is_empty() {
                    [1.0; 4]
                } else {
                    params.colors[rng.gen_range(0..params.colors.len())]
                };
                SpiralPetal {
                    base_angle: jitter(rng, 0.0, TAU),
                    base_radius: jitter(rng, params.radius_range.0, params.radius_range.1),
                    base_height: jitter(rng, -params.height * 0.5, params.height * 0.5),
                    size: jitter(rng, params.size_range.0, params.size_range.1),
                    color,
                }
            })
            .collect();

        Self {
            params,
            petals,
            elapsed: 0.0,
            progress: 0.0,
        }
    }

    /// Moves the animation clock forward; `progress` never decreases.
    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt.max(0.0);
        self.progress = if self.params.duration > 0.0 {
            (self.elapsed / self.params.duration).min(1.0)
        } else {
            1.0
        };
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn petals(&self) -> &[SpiralPetal] {
        &self.petals
    }

    pub fn position(&self, petal: &SpiralPetal) -> Vec3 {
        let t = self.progress;
        let p = &self.params;

        let angle = petal.base_angle + t * p.spin * TAU;
        let radius = petal.base_radius * (0.2 + 0.8 * t);
        let z = p.start_depth + (p.end_depth - p.start_depth) * t;

        Vec3::new(
            angle.cos() * radius,
            angle.sin() * radius + petal.base_height * t,
            z,
        )
    }

    pub fn write_instances(&self, out: &mut Vec<ParticleInstance>) {
        out.extend(self.petals.iter().map(|petal| ParticleInstance {
            position: self.position(petal).to_array(),
            size: petal.size,
            color: petal.color,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn spiral(duration: f32) -> PetalSpiral {
        PetalSpiral::new(
            SpiralParams {
                count: 20,
                duration,
                radius_range: (6.0, 8.0),
                height: 6.0,
                start_depth: -15.0,
                end_depth: 2.0,
                spin: 1.5,
                size_range: (0.2, 0.4),
                colors: vec![[1.0, 0.4, 0.7, 1.0]],
            },
            &mut StdRng::seed_from_u64(21),
        )
    }

    #[test]
    fn test_progress_is_monotonic_and_clamped() {
        let mut s = spiral(4.0);
        let mut last = s.progress();
        for _ in 0..300 {
            s.advance(1.0 / 60.0);
            assert!(s.progress() >= last);
            assert!(s.progress() <= 1.0);
            last = s.progress();
        }
        assert_eq!(s.progress(), 1.0);
        assert_eq!(s.progress(), 1.0);
    }

    #[test]
    fn test_negative_delta_does_not_rewind() {
        let mut s = spiral(4.0);
        s.advance(2.0);
        s.advance(-1.0);
        assert_eq!(s.progress(), 0.5);
    }

    #[test]
    fn test_petals_freeze_once_finished() {
        let mut s = spiral(1.0);
        s.advance(1.0);
        let frozen: Vec<Vec3> = s.petals().iter().map(|p| s.position(p)).collect();

        for _ in 0..100 {
            s.advance(0.5);
        }
        let later: Vec<Vec3> = s.petals().iter().map(|p| s.position(p)).collect();
        assert_eq!(frozen, later);
    }

    #[test]
    fn test_petals_travel_from_start_to_end_depth() {
        let mut s = spiral(2.0);
        for petal in s.petals() {
            assert_eq!(s.position(petal).z, -15.0);
        }
        s.advance(2.0);
        for petal in s.petals() {
            assert_eq!(s.position(petal).z, 2.0);
        }
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let mut s = spiral(0.0);
        s.advance(0.0);
        assert_eq!(s.progress(), 1.0);
    }
}

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use super::{ParticleInstance, hex_color, jitter};
use crate::scene::FrameClock;

/// Angle advanced per unit of particle speed on every step.
pub const ORBIT_STEP: f32 = 0.01;

const SPEED_JITTER: f32 = 0.25;
const BOB_AMPLITUDE: f32 = 0.5;
const BOB_FREQUENCY: f32 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitParams {
    pub radius: f32,
    pub height: f32,
    pub particle_count: usize,
    pub speed: f32,
    pub color: [f32; 4],
    pub ellipse_factor: f32,
    pub size_range: (f32, f32),
}

impl OrbitParams {
    pub const fn new(
        radius: f32,
        height: f32,
        particle_count: usize,
        speed: f32,
        color: u32,
    ) -> Self {
        Self {
            radius,
            height,
            particle_count,
            speed,
            color: hex_color(color, 0.8),
            ellipse_factor: 0.6,
            size_range: (0.1, 0.4),
        }
    }

}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitParticle {
    pub angle: f32,
    pub radius_offset: f32,
    pub height_offset: f32,
    pub speed: f32,
    pub size: f32,
}

/// A ring of particles circling the vertical axis on a flattened, bobbing path.
pub struct OrbitGroup {
    params: OrbitParams,
    particles: Vec<OrbitParticle>,
    positions: Vec<Vec3>,
    clock: FrameClock,
}

impl OrbitGroup {
    pub fn new<R: Rng + ?Sized>(params: OrbitParams, rng: &mut R) -> Self {
        let count = params.particle_count;
        let half_height = params.height * 0.5;
        let (size_min, size_max) = params.size_range;

        let particles: Vec<OrbitParticle> = (0..count)
            .map(|i| OrbitParticle {
                angle: i as f32 / count as f32 * TAU,
                radius_offset: jitter(rng, -1.0, 1.0),
                height_offset: jitter(rng, -half_height, half_height),
                speed: params.speed + jitter(rng, -SPEED_JITTER, SPEED_JITTER),
                size: jitter(rng, size_min, size_max),
            })
            .collect();

        let positions = particles
            .iter()
            .map(|p| orbit_position(&params, p))
            .collect();

        Self {
            params,
            particles,
            positions,
            clock: FrameClock::new(),
        }
    }

    /// Runs as many fixed steps as `dt` seconds cover and returns that count.
    pub fn update(&mut self, dt: f32) -> u32 {
        let steps = self.clock.advance(dt);
        for _ in 0..steps {
            self.step();
        }
        steps
    }

    /// Advances every particle by one fixed step.
    pub fn step(&mut self) {
        for (particle, position) in self.particles.iter_mut().zip(&mut self.positions) {
            particle.angle += particle.speed * ORBIT_STEP;
            *position = orbit_position(&self.params, particle);
        }
    }

    pub fn write_instances(&self, out: &mut Vec<ParticleInstance>) {
        out.extend(
            self.particles
                .iter()
                .zip(&self.positions)
                .map(|(p, pos)| ParticleInstance {
                    position: pos.to_array(),
                    size: p.size,
                    color: self.params.color,
                }),
        );
    }
}

pub fn orbit_position(params: &OrbitParams, particle: &OrbitParticle) -> Vec3 {
    let r = params.radius + particle.radius_offset;
    Vec3::new(
        r * particle.angle.cos(),
        particle.height_offset + (particle.angle * BOB_FREQUENCY).sin() * BOB_AMPLITUDE,
        r * particle.angle.sin() * params.ellipse_factor,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn group(params: OrbitParams, seed: u64) -> OrbitGroup {
        OrbitGroup::new(params, &mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_particle_count_is_fixed() {
        let mut g = group(OrbitParams::new(6.0, 2.0, 150, 1.0, 0xff69b4), 1);
        for _ in 0..500 {
            g.step();
        }
        assert_eq!(g.particles.len(), 150);
        assert_eq!(g.positions.len(), 150);
    }

    #[test]
    fn test_initial_offsets_are_bounded() {
        let params = OrbitParams::new(8.0, 3.0, 500, 1.0, 0xff1493);
        let g = group(params, 2);

        for p in &g.particles {
            assert!((-1.0..=1.0).contains(&p.radius_offset));
            assert!((-1.5..=1.5).contains(&p.height_offset));
            assert!((0.75..=1.25).contains(&p.speed));
            assert!((0.1..=0.4).contains(&p.size));
        }
    }

    #[test]
    fn test_initial_angles_are_evenly_spaced() {
        let g = group(OrbitParams::new(8.0, 3.0, 4, 1.0, 0xff69b4), 3);
        let angles: Vec<f32> = g.particles.iter().map(|p| p.angle).collect();
        assert_eq!(angles, vec![0.0, TAU / 4.0, TAU / 2.0, TAU * 3.0 / 4.0]);
    }

    #[test]
    fn test_angle_increases_for_positive_speed() {
        let mut g = group(OrbitParams::new(6.0, 2.0, 32, 1.0, 0xff69b4), 4);
        for _ in 0..50 {
            let before: Vec<f32> = g.particles.iter().map(|p| p.angle).collect();
            g.step();
            for (b, p) in before.iter().zip(&g.particles) {
                assert!(p.angle > *b);
            }
        }
    }

    #[test]
    fn test_angle_decreases_for_negative_speed() {
        let mut g = group(OrbitParams::new(7.0, 2.5, 32, -0.7, 0xffb6c1), 5);
        for _ in 0..50 {
            let before: Vec<f32> = g.particles.iter().map(|p| p.angle).collect();
            g.step();
            for (b, p) in before.iter().zip(&g.particles) {
                assert!(p.angle < *b);
            }
        }
    }

    #[test]
    fn test_orbit_stays_inside_ellipse() {
        let radius = 8.0;
        let mut g = group(OrbitParams::new(radius, 3.0, 4, 1.0, 0xff69b4), 6);
        for _ in 0..100 {
            g.step();
        }

        let outer = radius + 1.0;
        for pos in &g.positions {
            let e = ((pos.x / outer).powi(2) + (pos.z / (outer * 0.6)).powi(2)).sqrt();
            assert!(e <= 1.05, "{pos} lies outside the ellipse ({e})");
        }
    }

    #[test]
    fn test_position_formula() {
        let mut params = OrbitParams::new(10.0, 4.0, 1, 0.6, 0xff69b4);
        params.ellipse_factor = 0.8;
        let particle = OrbitParticle {
            angle: TAU / 4.0,
            radius_offset: 0.5,
            height_offset: 1.0,
            speed: 0.6,
            size: 0.2,
        };
        let p = orbit_position(&params, &particle);
        assert!(p.x.abs() < 1e-5);
        assert!((p.z - 10.5 * 0.8).abs() < 1e-5);
        // sin(3 * pi/2) = -1
        assert!((p.y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_update_matches_fixed_steps() {
        let params = OrbitParams::new(9.0, 3.5, 60, -0.5, 0xff69b4);
        let mut stepped = group(params, 9);
        let mut timed = group(params, 9);

        let mut steps = 0;
        for _ in 0..30 {
            steps += timed.update(1.0 / 30.0);
        }
        for _ in 0..steps {
            stepped.step();
        }
        assert!(steps >= 59);
        assert_eq!(stepped.particles, timed.particles);
    }

    #[test]
    fn test_write_instances_uses_group_color() {
        let params = OrbitParams::new(6.0, 2.0, 10, 1.0, 0xff69b4);
        let g = group(params, 8);
        let mut out = Vec::new();
        g.write_instances(&mut out);
        assert_eq!(out.len(), 10);
        assert!(out.iter().all(|i| i.color == params.color));
    }
}

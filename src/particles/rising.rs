use glam::Vec3;
use rand::Rng;

use super::{ParticleInstance, hex_color, jitter};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RisingParams {
    pub count: usize,
    pub bottom: f32,
    pub top: f32,
    pub increment: f32,
    /// Half extent of the horizontal placement square.
    pub spread: f32,
    pub size: f32,
    pub color: [f32; 4],
}

impl Default for RisingParams {
    fn default() -> Self {
        Self {
            count: 200,
            bottom: -10.0,
            top: 10.0,
            increment: 0.03,
            spread: 10.0,
            size: 0.08,
            color: hex_color(0xffffff, 0.5),
        }
    }
}

/// Sparkles that climb at a constant rate and reappear at the bottom.
pub struct RisingField {
    params: RisingParams,
    particles: Vec<Vec3>,
}

impl RisingField {
    pub fn new<R: Rng + ?Sized>(params: RisingParams, rng: &mut R) -> Self {
        let particles = (0..params.count)
            .map(|_| {
                Vec3::new(
                    jitter(rng, -params.spread, params.spread),
                    jitter(rng, params.bottom, params.top),
                    jitter(rng, -params.spread, params.spread),
                )
            })
            .collect();

        Self { params, particles }
    }

    /// Particles already above `top` wrap to `bottom` with a fresh horizontal
    /// placement; the rest climb by one increment.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let p = &self.params;
        for particle in &mut self.particles {
            if particle.y > p.top {
                particle.y = p.bottom;
                particle.x = jitter(rng, -p.spread, p.spread);
                particle.z = jitter(rng, -p.spread, p.spread);
            } else {
                particle.y += p.increment;
            }
        }
    }

    pub fn write_instances(&self, out: &mut Vec<ParticleInstance>) {
        out.extend(self.particles.iter().map(|pos| ParticleInstance {
            position: pos.to_array(),
            size: self.params.size,
            color: self.params.color,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_wraps_after_crossing_top() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut field = RisingField::new(
            RisingParams {
                count: 1,
                ..Default::default()
            },
            &mut rng,
        );
        field.particles[0] = Vec3::new(3.0, 9.99, -4.0);

        field.step(&mut rng);
        assert!((field.particles[0].y - 10.02).abs() < 1e-5);
        assert_eq!(field.particles[0].x, 3.0);
        assert_eq!(field.particles[0].z, -4.0);

        field.step(&mut rng);
        let p = field.particles[0];
        assert_eq!(p.y, -10.0);
        assert!((-10.0..10.0).contains(&p.x));
        assert!((-10.0..10.0).contains(&p.z));
        assert!(p.x != 3.0 || p.z != -4.0);
    }

    #[test]
    fn test_positions_stay_within_wrap_bounds() {
        let params = RisingParams::default();
        let mut rng = StdRng::seed_from_u64(12);
        let mut field = RisingField::new(params, &mut rng);

        for _ in 0..2000 {
            field.step(&mut rng);
            for p in &field.particles {
                assert!(p.y >= params.bottom);
                assert!(p.y <= params.top + params.increment + 1e-4);
            }
        }
        assert_eq!(field.particles.len(), params.count);
    }
}

use glam::Vec3;
use rand::Rng;

use super::{ParticleInstance, hex_color, jitter};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DustParams {
    pub count: usize,
    pub half_extent: Vec3,
    pub max_speed: f32,
    pub scale_range: (f32, f32),
    pub color: [f32; 4],
}

impl Default for DustParams {
    fn default() -> Self {
        Self {
            count: 200,
            half_extent: Vec3::new(50.0, 25.0, 50.0),
            max_speed: 0.0025,
            scale_range: (0.05, 0.25),
            color: hex_color(0xff69b4, 0.4),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DustMote {
    pub position: Vec3,
    pub velocity: Vec3,
    pub scale: f32,
}

/// Slow motes bouncing around inside an axis-aligned box.
pub struct BackgroundDust {
    params: DustParams,
    motes: Vec<DustMote>,
}

impl BackgroundDust {
    pub fn new<R: Rng + ?Sized>(params: DustParams, rng: &mut R) -> Self {
        let h = params.half_extent;
        let s = params.max_speed;
        let motes = (0..params.count)
            .map(|_| DustMote {
                position: Vec3::new(jitter(rng, -h.x, h.x), jitter(rng, -h.y, h.y), jitter(rng, -h.z, h.z)),
                velocity: Vec3::new(jitter(rng, -s, s), jitter(rng, -s, s), jitter(rng, -s, s)),
                scale: jitter(rng, params.scale_range.0, params.scale_range.1),
            })
            .collect();

        Self { params, motes }
    }

    pub fn step(&mut self) {
        let h = self.params.half_extent;
        for mote in &mut self.motes {
            mote.position += mote.velocity;

            if mote.position.x.abs() > h.x {
                mote.velocity.x = -mote.velocity.x;
            }
            if mote.position.y.abs() > h.y {
                mote.velocity.y = -mote.velocity.y;
            }
            if mote.position.z.abs() > h.z {
                mote.velocity.z = -mote.velocity.z;
            }
        }
    }

    pub fn write_instances(&self, out: &mut Vec<ParticleInstance>) {
        out.extend(self.motes.iter().map(|m| ParticleInstance {
            position: m.position.to_array(),
            size: m.scale,
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
    fn test_motes_stay_inside_box() {
        let params = DustParams {
            count: 50,
            max_speed: 0.5,
            ..Default::default()
        };
        let mut dust = BackgroundDust::new(params, &mut StdRng::seed_from_u64(41));
        let slack = Vec3::splat(params.max_speed * 2.0);

        for _ in 0..10_000 {
            dust.step();
        }
        for m in &dust.motes {
            assert!(m.position.abs().cmple(params.half_extent + slack).all(), "{}", m.position);
        }
    }

    #[test]
    fn test_velocity_flips_at_wall() {
        let mut dust = BackgroundDust::new(
            DustParams {
                count: 1,
                ..Default::default()
            },
            &mut StdRng::seed_from_u64(42),
        );
        dust.motes[0].position = Vec3::new(49.999, 0.0, 0.0);
        dust.motes[0].velocity = Vec3::new(0.002, 0.0, 0.0);

        dust.step();
        assert!(dust.motes[0].velocity.x < 0.0);
    }
}

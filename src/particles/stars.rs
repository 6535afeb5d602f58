use glam::Vec3;
use rand::Rng;

use super::{ParticleInstance, hex_color, jitter};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarParams {
    pub count: usize,
    pub radius: f32,
    pub depth: f32,
    pub size: f32,
}

impl Default for StarParams {
    fn default() -> Self {
        Self {
            count: 5000,
            radius: 100.0,
            depth: 50.0,
            size: 0.35,
        }
    }
}

/// Static backdrop of stars scattered through a spherical shell.
pub struct StarShell {
    instances: Vec<ParticleInstance>,
}

impl StarShell {
    pub fn new<R: Rng + ?Sized>(params: StarParams, rng: &mut R) -> Self {
        let instances = (0..params.count)
            .map(|_| {
                let direction = loop {
                    let v = Vec3::new(
                        jitter(rng, -1.0, 1.0),
                        jitter(rng, -1.0, 1.0),
                        jitter(rng, -1.0, 1.0),
                    );
                    let len = v.length_squared();
                    if len > 1e-4 && len <= 1.0 {
                        break v.normalize();
                    }
                };
                let r = jitter(rng, params.radius, params.radius + params.depth);
                let brightness = jitter(rng, 0.4, 1.0);

                ParticleInstance {
                    position: (direction * r).to_array(),
                    size: params.size * jitter(rng, 0.5, 1.5),
                    color: hex_color(0xffffff, brightness),
                }
            })
            .collect();

        Self { instances }
    }

    pub fn write_instances(&self, out: &mut Vec<ParticleInstance>) {
        out.extend_from_slice(&self.instances);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_stars_lie_in_shell() {
        let params = StarParams {
            count: 300,
            ..Default::default()
        };
        let shell = StarShell::new(params, &mut StdRng::seed_from_u64(51));
        assert_eq!(shell.instances.len(), 300);

        let mut out = Vec::new();
        shell.write_instances(&mut out);
        for star in out {
            let r = Vec3::from_array(star.position).length();
            assert!(r >= 100.0 - 1e-3 && r <= 150.0 + 1e-3, "{r}");
        }
    }
}

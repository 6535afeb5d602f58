use std::f32::consts::TAU;

use glam::{EulerRot, Mat4, Quat, Vec3};
use rand::Rng;

use super::jitter;

#[derive(Clone, Debug, PartialEq)]
pub struct DriftParams {
    pub per_model: usize,
    pub scale_range: (f32, f32),
    pub radius_range: (f32, f32),
    pub height: f32,
    pub depth: f32,
    pub horizontal: f32,
    pub vertical: f32,
    /// Speed toward the camera along +z.
    pub forward: f32,
    pub rotation: f32,
    /// Petals past this depth respawn at `-depth`.
    pub respawn_z: f32,
    pub colors: Vec<[f32; 4]>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriftPetal {
    pub model: usize,
    pub position: Vec3,
    pub velocity: Vec3,
    pub rotation: Vec3,
    pub angular_velocity: Vec3,
    pub scale: f32,
    pub color: [f32; 4],
}

impl DriftPetal {
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            Quat::from_euler(
                EulerRot::XYZ,
                self.rotation.x,
                self.rotation.y,
                self.rotation.z,
            ),
            self.position,
        )
    }
}

/// Petals streaming through the tunnel toward the viewer, recycled at the back.
pub struct PetalDrift {
    params: DriftParams,
    petals: Vec<DriftPetal>,
}

impl PetalDrift {
    pub fn new(params: DriftParams) -> Self {
        Self {
            params,
            petals: Vec::new(),
        }
    }

    /// Adds `per_model` petals that render with loaded model `model`.
    pub fn spawn_for_model<R: Rng + ?Sized>(&mut self, model: usize, rng: &mut R) {
        let p = &self.params;
        for _ in 0..p.per_model {
            let (x, y) = ring_point(p, rng);
            let color = if p.colors.is_empty() {
                [1.0; 4]
            } else {
                p.colors[rng.gen_range(0..p.colors.len())]
            };

            self.petals.push(DriftPetal {
                model,
                position: Vec3::new(x, y, -jitter(rng, 0.0, p.depth)),
                velocity: Vec3::new(
                    jitter(rng, -p.horizontal * 0.5, p.horizontal * 0.5),
                    jitter(rng, -p.vertical * 0.5, p.vertical * 0.5),
                    p.forward,
                ),
                rotation: Vec3::ZERO,
                angular_velocity: Vec3::new(
                    jitter(rng, 0.0, p.rotation),
                    jitter(rng, 0.0, p.rotation),
                    jitter(rng, 0.0, p.rotation),
                ),
                scale: jitter(rng, p.scale_range.0, p.scale_range.1),
                color,
            });
        }
    }

    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let p = &self.params;
        for petal in &mut self.petals {
            petal.position += petal.velocity;
            petal.rotation += petal.angular_velocity;

            if petal.position.z > p.respawn_z {
                let (x, y) = ring_point(p, rng);
                petal.position = Vec3::new(x, y, -p.depth);
            }
        }
    }

    pub fn petals(&self) -> &[DriftPetal] {
        &self.petals
    }
}

fn ring_point<R: Rng + ?Sized>(params: &DriftParams, rng: &mut R) -> (f32, f32) {
    let angle = jitter(rng, 0.0, TAU);
    let radius = jitter(rng, params.radius_range.0, params.radius_range.1);
    (
        angle.cos() * radius,
        jitter(rng, -params.height * 0.5, params.height * 0.5),
    )
}

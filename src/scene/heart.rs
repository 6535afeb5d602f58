//! The procedural heart scene and the motion shared by both heart scenes.

use glam::{EulerRot, Mat4, Quat, Vec3};
use rand::Rng;

use crate::math::{HeartParams, generate_heart, generate_torus};
use crate::particles::{BackgroundDust, DustParams, OrbitGroup, StarParams, StarShell};
use crate::scene::FrameClock;
use crate::scene::draw::{DrawList, MeshId, MeshLibrary};
use crate::scene::presets::{HALO_MATERIAL, HEART_MATERIAL, HEART_ORBIT_LAYERS};

const PULSE_RATE: f32 = 1.5;
const PULSE_AMPLITUDE: f32 = 0.08;
const SPIN_RATE: f32 = 0.3;
const TILT_RATE: f32 = 0.2;
const TILT_AMPLITUDE: f32 = 0.1;

/// Vertical bob of a floating object.
pub fn float_offset(t: f32, speed: f32, intensity: f32) -> f32 {
    (t * speed).sin() * intensity
}

/// Pulse, spin and bob of the main heart at time `t`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeartMotion {
    pub pulse: f32,
    pub rotation: Vec3,
    pub lift: f32,
}

impl HeartMotion {
    pub fn at(t: f32) -> Self {
        Self {
            pulse: (t * PULSE_RATE).sin() * PULSE_AMPLITUDE + 1.0,
            rotation: Vec3::new((t * TILT_RATE).sin() * TILT_AMPLITUDE, t * SPIN_RATE, 0.0),
            lift: float_offset(t, 0.5, 0.2),
        }
    }

    /// Model matrix with an extra uniform `scale` under the pulse.
    pub fn transform(&self, scale: f32) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.pulse * scale),
            Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z),
            Vec3::new(0.0, self.lift, 0.0),
        )
    }
}

pub struct HeartScene {
    library: MeshLibrary,
    heart: MeshId,
    halo: MeshId,
    orbits: Vec<OrbitGroup>,
    dust: BackgroundDust,
    stars: StarShell,
    clock: FrameClock,
}

impl HeartScene {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut library = MeshLibrary::default();
        let heart = library.add(generate_heart(&HeartParams::default()));
        let halo = library.add(generate_torus(12.0, 0.1, 8, 64));

        let orbits = HEART_ORBIT_LAYERS
            .iter()
            .map(|&layer| OrbitGroup::new(layer, rng))
            .collect();

        log::info!(
            "heart scene: {} vertices, {} orbit layers",
            library.get(heart).map_or(0, |m| m.vertex_count()),
            HEART_ORBIT_LAYERS.len()
        );

        Self {
            library,
            heart,
            halo,
            orbits,
            dust: BackgroundDust::new(DustParams::default(), rng),
            stars: StarShell::new(StarParams::default(), rng),
            clock: FrameClock::new(),
        }
    }

    pub fn update(&mut self, dt: f32) {
        for orbit in &mut self.orbits {
            orbit.update(dt);
        }
        for _ in 0..self.clock.advance(dt) {
            self.dust.step();
        }
    }

    pub fn draw(&self, list: &mut DrawList) {
        let t = self.clock.elapsed();

        list.push_mesh(self.heart, HeartMotion::at(t).transform(1.0), &HEART_MATERIAL);
        list.push_mesh(
            self.halo,
            Mat4::from_translation(Vec3::new(0.0, float_offset(t, 0.3, 0.1), 0.0)),
            &HALO_MATERIAL,
        );

        self.stars.write_instances(&mut list.particles);
        self.dust.write_instances(&mut list.particles);
        for orbit in &self.orbits {
            orbit.write_instances(&mut list.particles);
        }
    }

    pub fn library(&self) -> &MeshLibrary {
        &self.library
    }
}

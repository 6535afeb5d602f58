use std::path::Path;
use std::sync::Arc;

use glam::{Mat4, Quat};
use rand::Rng;

use crate::assets::{ModelBatch, ModelLoader};
use crate::particles::{OrbitGroup, RisingField, RisingParams, StarParams, StarShell};
use crate::scene::FrameClock;
use crate::scene::draw::{DrawList, MeshId, MeshLibrary};
use crate::scene::heart::HeartMotion;
use crate::scene::presets::{HEART_MODEL, TRAIL_HEART_MATERIAL, TRAIL_ORBIT_LAYERS};
use crate::scene::LoadStatus;

/// Bounding radius the loaded heart model is normalized to.
const HEART_RADIUS: f32 = 3.0;

/// Heart scene built around a loaded model, with sparkles rising through it.
pub struct HeartTrail {
    library: MeshLibrary,
    heart: Option<MeshId>,
    batch: Option<ModelBatch>,
    status: LoadStatus,
    orbits: Vec<OrbitGroup>,
    sparkles: RisingField,
    stars: StarShell,
    clock: FrameClock,
}

impl HeartTrail {
    pub fn new<R: Rng + ?Sized>(assets: &Path, loader: Arc<dyn ModelLoader>, rng: &mut R) -> Self {
        let batch = ModelBatch::spawn(vec![assets.join(HEART_MODEL)], loader);

        Self {
            library: MeshLibrary::default(),
            heart: None,
            status: LoadStatus::loading(batch.progress()),
            batch: Some(batch),
            orbits: TRAIL_ORBIT_LAYERS
                .iter()
                .map(|&layer| OrbitGroup::new(layer, rng))
                .collect(),
            sparkles: RisingField::new(RisingParams::default(), rng),
            stars: StarShell::new(StarParams::default(), rng),
            clock: FrameClock::new(),
        }
    }

    fn poll_model(&mut self) {
        let Some(batch) = &mut self.batch else {
            return;
        };

        let Some(models) = batch.poll() else {
            self.status.progress = batch.progress();
            return;
        };

        self.status = LoadStatus::finished(batch);
        for model in models {
            let mut mesh = model.mesh;
            mesh.normalize_to(HEART_RADIUS);
            self.heart = Some(self.library.add(mesh));
        }
        self.batch = None;
    }

    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        self.poll_model();

        for orbit in &mut self.orbits {
            orbit.update(dt);
        }
        for _ in 0..self.clock.advance(dt) {
            self.sparkles.step(rng);
        }
    }

    pub fn draw(&self, list: &mut DrawList) {
        if let Some(heart) = self.heart {
            let motion = HeartMotion::at(self.clock.elapsed());
            // the model faces +x; turn it toward the camera
            let facing = Mat4::from_quat(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
            list.push_mesh(heart, motion.transform(1.0) * facing, &TRAIL_HEART_MATERIAL);
        }

        self.stars.write_instances(&mut list.particles);
        self.sparkles.write_instances(&mut list.particles);
        for orbit in &self.orbits {
            orbit.write_instances(&mut list.particles);
        }
    }

    pub fn library(&self) -> &MeshLibrary {
        &self.library
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }
}

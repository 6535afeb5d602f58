use std::path::Path;
use std::sync::Arc;

use rand::Rng;

use crate::assets::{ModelBatch, ModelLoader};
use crate::particles::{DriftParams, PetalDrift, PetalSpiral, SpiralParams};
use crate::scene::FrameClock;
use crate::scene::LoadStatus;
use crate::scene::draw::{DrawList, MeshId, MeshLibrary};
use crate::scene::presets::{PETAL_MATERIAL, PETAL_MODELS, petal_palette};

/// Largest extent of a petal model before the per-petal scale is applied.
const PETAL_RADIUS: f32 = 0.5;

pub fn tunnel_drift_params() -> DriftParams {
    DriftParams {
        per_model: 15,
        scale_range: (1.5, 2.5),
        radius_range: (6.0, 8.0),
        height: 6.0,
        depth: 15.0,
        horizontal: 0.02,
        vertical: 0.02,
        forward: 0.08,
        rotation: 0.008,
        respawn_z: 5.0,
        colors: petal_palette(1.0),
    }
}

pub fn tunnel_spiral_params() -> SpiralParams {
    SpiralParams {
        count: 240,
        duration: 6.0,
        radius_range: (3.0, 8.0),
        height: 4.0,
        start_depth: -40.0,
        end_depth: -8.0,
        spin: 1.25,
        size_range: (0.15, 0.45),
        colors: petal_palette(0.85),
    }
}

/// Petals stream out of the tunnel while a spiral of sparks opens up ahead of them.
///
/// Petal models load in parallel. Petals only appear once every load has resolved,
/// and a model that failed simply contributes no petals.
pub struct PetalTunnel {
    library: MeshLibrary,
    models: Vec<MeshId>,
    batch: Option<ModelBatch>,
    status: LoadStatus,
    drift: PetalDrift,
    spiral: PetalSpiral,
    clock: FrameClock,
}

impl PetalTunnel {
    pub fn new<R: Rng + ?Sized>(assets: &Path, loader: Arc<dyn ModelLoader>, rng: &mut R) -> Self {
        let paths = PETAL_MODELS.iter().map(|name| assets.join(name)).collect();
        let batch = ModelBatch::spawn(paths, loader);

        Self {
            library: MeshLibrary::default(),
            models: Vec::new(),
            status: LoadStatus::loading(batch.progress()),
            batch: Some(batch),
            drift: PetalDrift::new(tunnel_drift_params()),
            spiral: PetalSpiral::new(tunnel_spiral_params(), rng),
            clock: FrameClock::new(),
        }
    }

    fn poll_models<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let Some(batch) = &mut self.batch else {
            return;
        };

        let Some(loaded) = batch.poll() else {
            self.status.progress = batch.progress();
            return;
        };

        self.status = LoadStatus::finished(batch);
        for model in loaded {
            let mut mesh = model.mesh;
            mesh.normalize_to(PETAL_RADIUS);
            self.models.push(self.library.add(mesh));
            self.drift.spawn_for_model(self.models.len() - 1, rng);
        }
        log::info!(
            "petal tunnel ready: {} of {} models, {} petals",
            self.models.len(),
            PETAL_MODELS.len(),
            self.drift.petals().len()
        );
        self.batch = None;
    }

    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        self.poll_models(rng);

        self.spiral.advance(dt);
        for _ in 0..self.clock.advance(dt) {
            self.drift.step(rng);
        }
    }

    pub fn draw(&self, list: &mut DrawList) {
        for petal in self.drift.petals() {
            let Some(&mesh) = self.models.get(petal.model) else {
                continue;
            };
            let material = PETAL_MATERIAL.with_color(petal.color);
            list.push_mesh(mesh, petal.transform(), &material);
        }

        self.spiral.write_instances(&mut list.particles);
    }

    pub fn library(&self) -> &MeshLibrary {
        &self.library
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetError, AssetResult, parse_obj};
    use crate::math::TriangleMesh;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::{Duration, Instant};

    /// Fails every path that mentions `flower2`.
    struct OneBroken;

    impl ModelLoader for OneBroken {
        fn load(&self, path: &Path) -> AssetResult<TriangleMesh> {
            if path.to_string_lossy().contains("flower2") {
                return Err(AssetError::UnsupportedFormat("test".into()));
            }
            parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n")
        }
    }

    #[test]
    fn test_petals_spawn_for_every_model_that_loaded() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut tunnel = PetalTunnel::new(Path::new("assets/models"), Arc::new(OneBroken), &mut rng);

        let deadline = Instant::now() + Duration::from_secs(5);
        while tunnel.status().is_loading() {
            assert!(Instant::now() < deadline);
            tunnel.update(1.0 / 60.0, &mut rng);
            std::thread::sleep(Duration::from_millis(1));
        }

        assert_eq!(tunnel.library().len(), 3);
        assert_eq!(tunnel.status().errors.len(), 1);

        let mut list = DrawList::default();
        tunnel.draw(&mut list);
        assert_eq!(list.meshes.len(), 45);
        assert_eq!(list.particles.len(), 240);
    }

    #[test]
    fn test_spiral_runs_while_models_load() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut tunnel = PetalTunnel::new(Path::new("assets/models"), Arc::new(OneBroken), &mut rng);
        for _ in 0..600 {
            tunnel.update(1.0 / 60.0, &mut rng);
        }
        assert_eq!(tunnel.spiral.progress(), 1.0);
    }
}

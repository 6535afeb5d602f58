pub mod clock;
pub mod draw;
pub mod heart;
pub mod presets;
pub mod trail;
pub mod tunnel;
pub mod viewer;

use std::path::PathBuf;
use std::sync::Arc;

use rand::Rng;

use crate::assets::{ModelBatch, ModelLoader};

pub use clock::{FIXED_STEP, FrameClock};
pub use draw::{DrawList, MeshDraw, MeshId, MeshInstance, MeshLibrary};
pub use heart::{HeartMotion, HeartScene};
pub use presets::{Background, CameraPreset, Lighting};
pub use trail::HeartTrail;
pub use tunnel::PetalTunnel;
pub use viewer::ModelViewer;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum SceneKind {
    Heart,
    HeartTrail,
    PetalTunnel,
    Viewer,
}

impl SceneKind {
    pub const ALL: [SceneKind; 4] = [
        SceneKind::Heart,
        SceneKind::HeartTrail,
        SceneKind::PetalTunnel,
        SceneKind::Viewer,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SceneKind::Heart => "Heart Orbits",
            SceneKind::HeartTrail => "Heart Trail",
            SceneKind::PetalTunnel => "Petal Tunnel",
            SceneKind::Viewer => "Model Viewer",
        }
    }

    pub fn camera(self) -> CameraPreset {
        match self {
            SceneKind::Heart | SceneKind::HeartTrail => presets::HEART_CAMERA,
            SceneKind::PetalTunnel => presets::TUNNEL_CAMERA,
            SceneKind::Viewer => presets::VIEWER_CAMERA,
        }
    }

    pub fn lighting(self) -> Lighting {
        match self {
            SceneKind::Heart | SceneKind::HeartTrail => presets::HEART_LIGHTING,
            SceneKind::PetalTunnel => presets::TUNNEL_LIGHTING,
            SceneKind::Viewer => presets::VIEWER_LIGHTING,
        }
    }

    /// Heart scenes follow the selected theme; the others have a fixed backdrop.
    pub fn background(self, theme: usize) -> Background {
        match self {
            SceneKind::Heart | SceneKind::HeartTrail => presets::background_preset(theme),
            SceneKind::PetalTunnel => presets::TUNNEL_BACKGROUND,
            SceneKind::Viewer => presets::VIEWER_BACKGROUND,
        }
    }
}

/// Progress of a scene's model loads and the failures they produced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadStatus {
    pub progress: (usize, usize),
    pub errors: Vec<String>,
    loading: bool,
}

impl LoadStatus {
    pub fn loading(progress: (usize, usize)) -> Self {
        Self {
            progress,
            errors: Vec::new(),
            loading: true,
        }
    }

    pub fn finished(batch: &ModelBatch) -> Self {
        Self {
            progress: batch.progress(),
            errors: batch
                .failures()
                .iter()
                .map(|(path, error)| format!("{}: {error}", path.display()))
                .collect(),
            loading: false,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

/// Inputs a scene needs beyond randomness.
#[derive(Clone)]
pub struct SceneContext {
    pub assets: PathBuf,
    pub viewer_model: PathBuf,
    pub loader: Arc<dyn ModelLoader>,
}

pub enum Scene {
    Heart(HeartScene),
    HeartTrail(HeartTrail),
    PetalTunnel(PetalTunnel),
    Viewer(ModelViewer),
}

impl Scene {
    pub fn build<R: Rng + ?Sized>(kind: SceneKind, ctx: &SceneContext, rng: &mut R) -> Self {
        log::info!("building scene: {}", kind.label());
        match kind {
            SceneKind::Heart => Scene::Heart(HeartScene::new(rng)),
            SceneKind::HeartTrail => {
                Scene::HeartTrail(HeartTrail::new(&ctx.assets, Arc::clone(&ctx.loader), rng))
            }
            SceneKind::PetalTunnel => {
                Scene::PetalTunnel(PetalTunnel::new(&ctx.assets, Arc::clone(&ctx.loader), rng))
            }
            SceneKind::Viewer => Scene::Viewer(ModelViewer::new(
                ctx.viewer_model.clone(),
                Arc::clone(&ctx.loader),
            )),
        }
    }

    pub fn kind(&self) -> SceneKind {
        match self {
            Scene::Heart(_) => SceneKind::Heart,
            Scene::HeartTrail(_) => SceneKind::HeartTrail,
            Scene::PetalTunnel(_) => SceneKind::PetalTunnel,
            Scene::Viewer(_) => SceneKind::Viewer,
        }
    }

    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        match self {
            Scene::Heart(s) => s.update(dt),
            Scene::HeartTrail(s) => s.update(dt, rng),
            Scene::PetalTunnel(s) => s.update(dt, rng),
            Scene::Viewer(s) => s.update(),
        }
    }

    pub fn draw(&self, list: &mut DrawList) {
        list.clear();
        match self {
            Scene::Heart(s) => s.draw(list),
            Scene::HeartTrail(s) => s.draw(list),
            Scene::PetalTunnel(s) => s.draw(list),
            Scene::Viewer(s) => s.draw(list),
        }
        list.sort_meshes();
    }

    pub fn library(&self) -> &MeshLibrary {
        match self {
            Scene::Heart(s) => s.library(),
            Scene::HeartTrail(s) => s.library(),
            Scene::PetalTunnel(s) => s.library(),
            Scene::Viewer(s) => s.library(),
        }
    }

    pub fn status(&self) -> Option<&LoadStatus> {
        match self {
            Scene::Heart(_) => None,
            Scene::HeartTrail(s) => Some(s.status()),
            Scene::PetalTunnel(s) => Some(s.status()),
            Scene::Viewer(s) => Some(s.status()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::FileModelLoader;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn ctx() -> SceneContext {
        SceneContext {
            assets: PathBuf::from("no-such-assets"),
            viewer_model: PathBuf::from("no-such-assets/model.obj"),
            loader: Arc::new(FileModelLoader),
        }
    }

    #[test]
    fn test_build_every_kind() {
        let mut rng = StdRng::seed_from_u64(12);
        for kind in SceneKind::ALL {
            let mut scene = Scene::build(kind, &ctx(), &mut rng);
            assert_eq!(scene.kind(), kind);
            scene.update(1.0 / 60.0, &mut rng);

            let mut list = DrawList::default();
            scene.draw(&mut list);
        }
    }

    #[test]
    fn test_heart_scenes_follow_theme() {
        assert_eq!(
            SceneKind::Heart.background(2),
            presets::BACKGROUND_PRESETS[2]
        );
        assert_eq!(
            SceneKind::PetalTunnel.background(2),
            presets::TUNNEL_BACKGROUND
        );
    }

    #[test]
    fn test_missing_assets_surface_as_errors() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut scene = Scene::build(SceneKind::PetalTunnel, &ctx(), &mut rng);

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while scene.status().is_some_and(LoadStatus::is_loading) {
            assert!(std::time::Instant::now() < deadline);
            scene.update(1.0 / 60.0, &mut rng);
            std::thread::sleep(std::time::Duration::from_millis(1));
        }

        let status = scene.status().cloned().unwrap_or_default();
        assert_eq!(status.errors.len(), 4);
        assert!(scene.library().as_slice().is_empty());
    }
}

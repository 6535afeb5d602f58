use std::path::PathBuf;
use std::sync::Arc;

use glam::Mat4;

use crate::assets::{ModelBatch, ModelLoader};
use crate::scene::LoadStatus;
use crate::scene::draw::{DrawList, MeshId, MeshLibrary};
use crate::scene::presets::VIEWER_MATERIAL;

const VIEW_RADIUS: f32 = 2.0;

/// Shows a single model file, centered and scaled to fit the view.
pub struct ModelViewer {
    library: MeshLibrary,
    model: Option<MeshId>,
    batch: Option<ModelBatch>,
    status: LoadStatus,
}

impl ModelViewer {
    pub fn new(path: PathBuf, loader: Arc<dyn ModelLoader>) -> Self {
        let batch = ModelBatch::spawn(vec![path], loader);
        Self {
            library: MeshLibrary::default(),
            model: None,
            status: LoadStatus::loading(batch.progress()),
            batch: Some(batch),
        }
    }

    pub fn update(&mut self) {
        let Some(batch) = &mut self.batch else {
            return;
        };
        let Some(models) = batch.poll() else {
            return;
        };

        self.status = LoadStatus::finished(batch);
        if let Some(model) = models.into_iter().next() {
            let mut mesh = model.mesh;
            mesh.normalize_to(VIEW_RADIUS);
            self.model = Some(self.library.add(mesh));
        }
        self.batch = None;
    }

    pub fn draw(&self, list: &mut DrawList) {
        if let Some(model) = self.model {
            list.push_mesh(model, Mat4::IDENTITY, &VIEWER_MATERIAL);
        }
    }

    pub fn library(&self) -> &MeshLibrary {
        &self.library
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }
}

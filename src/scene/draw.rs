use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::math::TriangleMesh;
use crate::particles::ParticleInstance;
use crate::scene::presets::Material;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub usize);

/// Per-instance record for the mesh pipeline.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshInstance {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// rgb, intensity
    pub emissive: [f32; 4],
    /// shininess, specular strength, unused, unused
    pub shading: [f32; 4],
}

impl MeshInstance {
    pub fn new(model: Mat4, material: &Material) -> Self {
        let [r, g, b] = material.emissive;
        Self {
            model: model.to_cols_array_2d(),
            color: material.color,
            emissive: [r, g, b, material.emissive_intensity],
            shading: [material.shininess, material.specular, 0.0, 0.0],
        }
    }
}

/// Meshes a scene has produced so far. Append-only, so the renderer only has to
/// upload what it has not seen yet.
#[derive(Default)]
pub struct MeshLibrary {
    meshes: Vec<TriangleMesh>,
}

impl MeshLibrary {
    pub fn add(&mut self, mesh: TriangleMesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    pub fn get(&self, id: MeshId) -> Option<&TriangleMesh> {
        self.meshes.get(id.0)
    }

    pub fn as_slice(&self) -> &[TriangleMesh] {
        &self.meshes
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshDraw {
    pub mesh: MeshId,
    pub instance: MeshInstance,
}

/// Everything a scene wants drawn this frame.
#[derive(Default)]
pub struct DrawList {
    pub meshes: Vec<MeshDraw>,
    pub particles: Vec<ParticleInstance>,
}

impl DrawList {
    pub fn clear(&mut self) {
        self.meshes.clear();
        self.particles.clear();
    }

    pub fn push_mesh(&mut self, mesh: MeshId, model: Mat4, material: &Material) {
        self.meshes.push(MeshDraw {
            mesh,
            instance: MeshInstance::new(model, material),
        });
    }

    /// Groups mesh draws so each mesh is bound once. Stable within a mesh.
    pub fn sort_meshes(&mut self) {
        self.meshes.sort_by_key(|d| d.mesh);
    }
}

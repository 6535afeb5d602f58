use std::f32::consts::TAU;

use glam::Vec3;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum MeshError {
    #[error("index {index} at slot {slot} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        slot: usize,
        index: u32,
        vertex_count: usize,
    },
    #[error("{attribute} has {len} floats, expected {expected}")]
    AttributeMismatch {
        attribute: &'static str,
        len: usize,
        expected: usize,
    },
    #[error("index count {0} is not a multiple of 3")]
    PartialTriangle(usize),
}

/// Flat, GPU-ready triangle mesh: xyz positions, xyz normals, uv texcoords and
/// `u32` triangle indices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriangleMesh {
    pub vertices: Vec<f32>,
    pub normals: Vec<f32>,
    pub uvs: Vec<f32>,
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn position(&self, index: usize) -> Vec3 {
        Vec3::from_slice(&self.vertices[index * 3..index * 3 + 3])
    }

    /// Checks attribute lengths agree and every index references a vertex.
    pub fn validate(&self) -> Result<(), MeshError> {
        let count = self.vertex_count();

        if self.vertices.len() % 3 != 0 {
            return Err(MeshError::AttributeMismatch {
                attribute: "vertices",
                len: self.vertices.len(),
                expected: count * 3,
            });
        }
        if self.normals.len() != count * 3 {
            return Err(MeshError::AttributeMismatch {
                attribute: "normals",
                len: self.normals.len(),
                expected: count * 3,
            });
        }
        if self.uvs.len() != count * 2 {
            return Err(MeshError::AttributeMismatch {
                attribute: "uvs",
                len: self.uvs.len(),
                expected: count * 2,
            });
        }
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::PartialTriangle(self.indices.len()));
        }

        for (slot, &index) in self.indices.iter().enumerate() {
            if index as usize >= count {
                return Err(MeshError::IndexOutOfRange {
                    slot,
                    index,
                    vertex_count: count,
                });
            }
        }

        Ok(())
    }

    pub fn bounds(&self) -> (Vec3, Vec3) {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);

        for chunk in self.vertices.chunks_exact(3) {
            let p = Vec3::new(chunk[0], chunk[1], chunk[2]);
            min = min.min(p);
            max = max.max(p);
        }

        if self.vertices.is_empty() {
            (Vec3::ZERO, Vec3::ZERO)
        } else {
            (min, max)
        }
    }

    /// Replaces the normals with area-weighted averages of the adjacent face normals.
    pub fn compute_normals(&mut self) {
        let mut accum = vec![Vec3::ZERO; self.vertex_count()];

        for tri in self.indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let pa = self.position(a);
            let face = (self.position(b) - pa).cross(self.position(c) - pa);
            accum[a] += face;
            accum[b] += face;
            accum[c] += face;
        }

        self.normals = accum
            .into_iter()
            .flat_map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
            .collect();
    }

    /// Recenters the mesh on the origin and scales it to fit a sphere of `radius`.
    pub fn normalize_to(&mut self, radius: f32) {
        let (min, max) = self.bounds();
        let center = (min + max) * 0.5;
        let extent = ((max - min) * 0.5).length().max(0.0001);
        let scale = radius / extent;

        for chunk in self.vertices.chunks_exact_mut(3) {
            chunk[0] = (chunk[0] - center.x) * scale;
            chunk[1] = (chunk[1] - center.y) * scale;
            chunk[2] = (chunk[2] - center.z) * scale;
        }
    }
}

/// Torus lying in the XZ plane, `radial_segments` around the tube and
/// `tubular_segments` around the ring.
pub fn generate_torus(
    radius: f32,
    tube: f32,
    radial_segments: u32,
    tubular_segments: u32,
) -> TriangleMesh {
    let mut vertices = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut indices = Vec::new();

    for j in 0..=radial_segments {
        let v = j as f32 / radial_segments as f32 * TAU;

        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * TAU;

            let center = Vec3::new(radius * u.cos(), 0.0, radius * u.sin());
            let position = Vec3::new(
                (radius + tube * v.cos()) * u.cos(),
                tube * v.sin(),
                (radius + tube * v.cos()) * u.sin(),
            );
            let normal = (position - center).normalize_or_zero();

            vertices.extend_from_slice(&position.to_array());
            normals.extend_from_slice(&normal.to_array());
            uvs.push(i as f32 / tubular_segments as f32);
            uvs.push(j as f32 / radial_segments as f32);
        }
    }

    for j in 1..=radial_segments {
        for i in 1..=tubular_segments {
            let a = (tubular_segments + 1) * j + i - 1;
            let b = (tubular_segments + 1) * (j - 1) + i - 1;
            let c = (tubular_segments + 1) * (j - 1) + i;
            let d = (tubular_segments + 1) * j + i;

            indices.extend_from_slice(&[a, b, d]);
            indices.extend_from_slice(&[b, c, d]);
        }
    }

    TriangleMesh {
        vertices,
        normals,
        uvs,
        indices,
    }
}

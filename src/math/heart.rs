//! Parametric heart surface.
//!
//! The outline is the classic heart curve swept over `theta`:
//!
//! ```text
//! x = 16 sin³θ
//! y = 13 cosθ - 5 cos2θ - 2 cos3θ
//! ```
//!
//! A second parameter `phi` extrudes the outline into a volume whose depth decays
//! with distance from the origin, so the lobes stay thinner than the center.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::math::mesh::TriangleMesh;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeartParams {
    pub u_segments: u32,
    pub v_segments: u32,
    pub scale: f32,
    pub depth: f32,
}

impl Default for HeartParams {
    fn default() -> Self {
        Self {
            u_segments: 64,
            v_segments: 32,
            scale: 0.15,
            depth: 4.0,
        }
    }
}

/// Evaluates the unscaled surface point for `theta, phi` in radians.
pub fn heart_point(theta: f32, phi: f32, depth: f32) -> Vec3 {
    let x = 16.0 * theta.sin().powi(3);
    let y = 13.0 * theta.cos() - 5.0 * (2.0 * theta).cos() - 2.0 * (3.0 * theta).cos();

    let r = (x * x + y * y).sqrt();
    let taper = 1.0 - (theta - PI).abs() / PI;
    let z = depth * (phi.sin() * taper + (phi * 2.0).cos() * 0.5) * (-r / 20.0).exp();

    Vec3::new(x, y, z)
}

/// Builds the heart mesh on a `(v_segments+1) x (u_segments+1)` grid.
///
/// Normals are the normalized unscaled position, which is close enough to the true
/// normal for a surface that is star-shaped about the origin. The seam columns at
/// `j = 0` and `j = u_segments` coincide but are kept as separate vertices.
pub fn generate_heart(params: &HeartParams) -> TriangleMesh {
    let HeartParams {
        u_segments,
        v_segments,
        scale,
        depth,
    } = *params;

    let vertex_count = ((u_segments + 1) * (v_segments + 1)) as usize;
    let mut vertices = Vec::with_capacity(vertex_count * 3);
    let mut normals = Vec::with_capacity(vertex_count * 3);
    let mut uvs = Vec::with_capacity(vertex_count * 2);
    let mut indices = Vec::with_capacity((u_segments * v_segments * 6) as usize);

    for i in 0..=v_segments {
        let v = i as f32 / v_segments as f32;
        let phi = v * TAU;

        for j in 0..=u_segments {
            let u = j as f32 / u_segments as f32;
            let theta = u * TAU;

            let p = heart_point(theta, phi, depth);
            let normal = p.try_normalize().unwrap_or(Vec3::Z);

            vertices.extend_from_slice(&(p * scale).to_array());
            normals.extend_from_slice(&normal.to_array());
            uvs.push(u);
            uvs.push(v);
        }
    }

    for i in 0..v_segments {
        for j in 0..u_segments {
            let a = i * (u_segments + 1) + j;
            let b = a + u_segments + 1;
            let c = a + 1;
            let d = b + 1;

            indices.extend_from_slice(&[a, b, c]);
            indices.extend_from_slice(&[b, d, c]);
        }
    }

    TriangleMesh {
        vertices,
        normals,
        uvs,
        indices,
    }
}

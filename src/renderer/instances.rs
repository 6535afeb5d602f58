use std::ops::Range;

use crate::particles::ParticleInstance;
use crate::scene::{MeshDraw, MeshId, MeshInstance};

pub const MAX_PARTICLES: usize = 65_536;
pub const MAX_MESH_INSTANCES: usize = 4_096;

/// Per-frame instance data for both instanced pipelines.
pub struct InstanceBuffers {
    particle_buffer: wgpu::Buffer,
    particle_count: usize,
    mesh_buffer: wgpu::Buffer,
}

impl InstanceBuffers {
    pub fn new(device: &wgpu::Device) -> Self {
        let particle_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Instance Buffer"),
            size: (MAX_PARTICLES * std::mem::size_of::<ParticleInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mesh_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Mesh Instance Buffer"),
            size: (MAX_MESH_INSTANCES * std::mem::size_of::<MeshInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            particle_buffer,
            particle_count: 0,
            mesh_buffer,
        }
    }

    pub fn upload_particles(&mut self, queue: &wgpu::Queue, particles: &[ParticleInstance]) {
        let count = particles.len().min(MAX_PARTICLES);
        if count < particles.len() {
            log::warn!("dropping {} particles over the buffer limit", particles.len() - count);
        }
        if count > 0 {
            queue.write_buffer(&self.particle_buffer, 0, bytemuck::cast_slice(&particles[..count]));
        }
        self.particle_count = count;
    }

    /// Uploads the instances of `draws` in order; returns how many were kept.
    pub fn upload_meshes(&mut self, queue: &wgpu::Queue, draws: &[MeshDraw]) -> usize {
        let count = draws.len().min(MAX_MESH_INSTANCES);
        if count > 0 {
            let instances: Vec<MeshInstance> = draws[..count].iter().map(|d| d.instance).collect();
            queue.write_buffer(&self.mesh_buffer, 0, bytemuck::cast_slice(&instances));
        }
        count
    }

    pub fn particle_buffer(&self) -> &wgpu::Buffer {
        &self.particle_buffer
    }

    pub fn mesh_buffer(&self) -> &wgpu::Buffer {
        &self.mesh_buffer
    }

    pub fn particle_count(&self) -> u32 {
        self.particle_count as u32
    }
}

/// Splits mesh draws into runs that share a mesh, as instance ranges.
pub fn batch_ranges(draws: &[MeshDraw]) -> Vec<(MeshId, Range<u32>)> {
    let mut batches: Vec<(MeshId, Range<u32>)> = Vec::new();

    for (i, draw) in draws.iter().enumerate() {
        let i = i as u32;
        match batches.last_mut() {
            Some((mesh, range)) if *mesh == draw.mesh && range.end == i => range.end = i + 1,
            _ => batches.push((draw.mesh, i..i + 1)),
        }
    }

    batches
}

pub fn position_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: 12,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        }],
    }
}

pub fn normal_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: 12,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x3,
        }],
    }
}

const MESH_INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 7] = wgpu::vertex_attr_array![
    2 => Float32x4,
    3 => Float32x4,
    4 => Float32x4,
    5 => Float32x4,
    6 => Float32x4,
    7 => Float32x4,
    8 => Float32x4,
];

pub fn mesh_instance_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<MeshInstance>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &MESH_INSTANCE_ATTRIBUTES,
    }
}

pub fn particle_instance_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<ParticleInstance>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32,
            },
            wgpu::VertexAttribute {
                offset: 16,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x4,
            },
        ],
    }
}

//! GPU-side data layouts and the CPU helpers that fill them.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use kitsune_engine::config::ToneMapping;
use kitsune_engine::scene::{Geometry, ImageData, Material};

// ── vertex ────────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(super) struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3, // normal
        2 => Float32x2  // uv
    ];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Interleaves the geometry streams. Missing uvs read as zero.
pub(super) fn interleave(geometry: &Geometry) -> Vec<Vertex> {
    geometry
        .positions
        .iter()
        .enumerate()
        .map(|(i, &position)| Vertex {
            position,
            normal: geometry.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            uv: geometry.uvs.get(i).copied().unwrap_or([0.0, 0.0]),
        })
        .collect()
}

// ── uniforms ──────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct FrameUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub sun_dir: [f32; 4],
    pub sun_color: [f32; 4],
    pub ambient: [f32; 4],
    pub output: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct MaterialUniform {
    pub color: [f32; 4],
    pub params: [f32; 4],
    pub uv: [f32; 4],
}

impl MaterialUniform {
    /// `uv_repeat` comes from the base-color map settings, if any.
    pub(super) fn new(material: &Material, has_map: bool, uv_repeat: [f32; 2]) -> Self {
        let env = if material.env_map.is_some() {
            material.env_map_intensity
        } else {
            0.0
        };
        let [r, g, b] = material.color;
        Self {
            color: [r, g, b, if has_map { 1.0 } else { 0.0 }],
            params: [
                material.roughness,
                material.metalness,
                env,
                if material.is_env_mappable() { 1.0 } else { 0.0 },
            ],
            uv: [uv_repeat[0], uv_repeat[1], 0.0, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct ModelUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
}

impl ModelUniform {
    pub(super) fn new(world: Mat4) -> Self {
        Self {
            model: world.to_cols_array_2d(),
            normal: world.inverse().transpose().to_cols_array_2d(),
        }
    }
}

/// Rounds `size` up to the device's dynamic-offset alignment.
pub(super) fn aligned_stride(size: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}

// ── color ─────────────────────────────────────────────────────────────────

pub(super) fn tone_mapping_mode(mapping: ToneMapping) -> f32 {
    match mapping {
        ToneMapping::None => 0.0,
        ToneMapping::Linear => 1.0,
        ToneMapping::Reinhard => 2.0,
        ToneMapping::AcesFilmic => 3.0,
    }
}

pub(super) fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Mean linear color over every face, used as the ambient term of an environment map.
pub(super) fn average_color(faces: &[ImageData]) -> [f32; 3] {
    let mut sum = [0.0f64; 3];
    let mut count = 0u64;
    for face in faces {
        for px in face.rgba.chunks_exact(4) {
            for (acc, &c) in sum.iter_mut().zip(px) {
                *acc += f64::from(srgb_to_linear(f32::from(c) / 255.0));
            }
            count += 1;
        }
    }
    if count == 0 {
        return [0.0; 3];
    }
    sum.map(|s| (s / count as f64) as f32)
}

use std::collections::{HashMap, HashSet};
use std::num::NonZeroU64;

use wgpu::util::DeviceExt;

use kitsune_engine::camera::PerspectiveCamera;
use kitsune_engine::config::RendererConfig;
use kitsune_engine::scene::{
    ColorSpace, GeometryId, ImageData, MaterialId, MeshInstance, ReleasedResource, Scene, TextureId,
    TextureSettings, TextureSource, Wrapping,
};

use super::ctx::{RenderCtx, RenderTarget};
use super::uniforms::{
    aligned_stride, average_color, interleave, srgb_to_linear, tone_mapping_mode, FrameUniform,
    MaterialUniform, ModelUniform, Vertex,
};

pub(super) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

struct GpuGeometry {
    vbo: wgpu::Buffer,
    ibo: wgpu::Buffer,
    index_count: u32,
}

struct GpuTexture {
    // Kept alive for the view.
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    repeat: [f32; 2],
}

struct GpuMaterial {
    _ubo: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Draws every visible mesh of the scene in one depth-tested pass.
///
/// GPU copies of geometries, textures and materials are created on first use and
/// dropped when the scene reports the resource released.
pub struct MeshRenderer {
    pipeline: wgpu::RenderPipeline,
    material_bgl: wgpu::BindGroupLayout,
    model_bgl: wgpu::BindGroupLayout,

    frame_ubo: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,

    model_ubo: Option<wgpu::Buffer>,
    model_bind_group: Option<wgpu::BindGroup>,
    model_capacity: usize,
    model_stride: u64,

    white: GpuTexture,
    geometries: HashMap<GeometryId, GpuGeometry>,
    textures: HashMap<TextureId, GpuTexture>,
    ambients: HashMap<TextureId, [f32; 3]>,
    materials: HashMap<MaterialId, GpuMaterial>,

    exposure: f32,
    tone_mapping: f32,
}

impl MeshRenderer {
    pub fn new(ctx: &RenderCtx<'_>, settings: &RendererConfig) -> Self {
        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("kitsune mesh shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        let frame_bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("kitsune frame bgl"),
            entries: &[uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX_FRAGMENT,
                false,
                size_of_uniform::<FrameUniform>(),
            )],
        });

        let material_bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("kitsune material bgl"),
            entries: &[
                uniform_entry(
                    0,
                    wgpu::ShaderStages::VERTEX_FRAGMENT,
                    false,
                    size_of_uniform::<MaterialUniform>(),
                ),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let model_bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("kitsune model bgl"),
            entries: &[uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX,
                true,
                size_of_uniform::<ModelUniform>(),
            )],
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("kitsune mesh pipeline layout"),
            bind_group_layouts: &[&frame_bgl, &material_bgl, &model_bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("kitsune mesh pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Imported models do not agree on winding.
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: ctx.sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview_mask: None,
            cache: None,
        });

        let frame_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("kitsune frame ubo"),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("kitsune frame bind group"),
            layout: &frame_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_ubo.as_entire_binding(),
            }],
        });

        let white = upload_image(
            ctx,
            &ImageData::solid(1, 1, [255, 255, 255, 255]),
            &TextureSettings::default(),
            "kitsune white texture",
        );

        let alignment = u64::from(ctx.device.limits().min_uniform_buffer_offset_alignment);

        Self {
            pipeline,
            material_bgl,
            model_bgl,
            frame_ubo,
            frame_bind_group,
            model_ubo: None,
            model_bind_group: None,
            model_capacity: 0,
            model_stride: aligned_stride(std::mem::size_of::<ModelUniform>() as u64, alignment),
            white,
            geometries: HashMap::new(),
            textures: HashMap::new(),
            ambients: HashMap::new(),
            materials: HashMap::new(),
            exposure: settings.tone_mapping_exposure,
            tone_mapping: tone_mapping_mode(settings.tone_mapping),
        }
    }

    /// Uploads whatever the frame needs, then records the pass into `target`.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        scene: &mut Scene,
        camera: &PerspectiveCamera,
    ) {
        let meshes: Vec<MeshInstance> = scene
            .visible_meshes()
            .into_iter()
            .filter(|m| scene.resources.geometry(m.geometry).is_some())
            .filter(|m| scene.resources.material(m.material).is_some())
            .collect();

        let refreshed = self.sync_textures(ctx, scene, &meshes);
        self.sync_materials(ctx, scene, &meshes, &refreshed);
        self.sync_geometries(ctx, scene, &meshes);
        self.write_frame_uniform(ctx, scene, camera);
        self.write_model_uniforms(ctx, &meshes);

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("kitsune mesh pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: target.resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(target.clear),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let Some(model_bind_group) = self.model_bind_group.as_ref() else {
            return;
        };

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.frame_bind_group, &[]);

        for (i, mesh) in meshes.iter().enumerate() {
            let (Some(geometry), Some(material)) =
                (self.geometries.get(&mesh.geometry), self.materials.get(&mesh.material))
            else {
                continue;
            };
            if geometry.index_count == 0 {
                continue;
            }
            let offset = (i as u64 * self.model_stride) as u32;
            rpass.set_bind_group(1, &material.bind_group, &[]);
            rpass.set_bind_group(2, model_bind_group, &[offset]);
            rpass.set_vertex_buffer(0, geometry.vbo.slice(..));
            rpass.set_index_buffer(geometry.ibo.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..geometry.index_count, 0, 0..1);
        }
    }

    /// Drops every GPU copy.
    pub fn clear(&mut self) {
        self.geometries.clear();
        self.textures.clear();
        self.ambients.clear();
        self.materials.clear();
        self.model_ubo = None;
        self.model_bind_group = None;
        self.model_capacity = 0;
    }

    /// Drops the GPU copies of everything the scene disposed since the last call.
    /// Returns how many released resources were drained.
    pub fn release_disposed(&mut self, scene: &mut Scene) -> usize {
        let released = scene.resources.take_released();
        let count = released.len();
        for resource in released {
            match resource {
                ReleasedResource::Geometry(id) => {
                    self.geometries.remove(&id);
                }
                ReleasedResource::Material(id) => {
                    self.materials.remove(&id);
                }
                ReleasedResource::Texture(id) => {
                    self.textures.remove(&id);
                    self.ambients.remove(&id);
                }
            }
        }
        count
    }

    // ── uploads ───────────────────────────────────────────────────────────

    /// Uploads missing or changed base-color maps and environment cubes. Returns the
    /// textures uploaded this frame.
    fn sync_textures(
        &mut self,
        ctx: &RenderCtx<'_>,
        scene: &mut Scene,
        meshes: &[MeshInstance],
    ) -> HashSet<TextureId> {
        let mut wanted: Vec<TextureId> = meshes
            .iter()
            .filter_map(|m| scene.resources.material(m.material).and_then(|mat| mat.map))
            .collect();
        wanted.extend(scene.environment());
        wanted.sort();
        wanted.dedup();

        let mut refreshed = HashSet::new();
        for id in wanted {
            let Some(texture) = scene.resources.texture_mut(id) else {
                continue;
            };
            let cached = self.textures.contains_key(&id) || self.ambients.contains_key(&id);
            if cached && !texture.needs_update {
                continue;
            }
            texture.needs_update = false;

            match &texture.source {
                TextureSource::Image(image) if image.is_consistent() => {
                    let gpu = upload_image(ctx, image, &texture.settings, &texture.name);
                    self.textures.insert(id, gpu);
                }
                TextureSource::Image(_) => {
                    log::warn!("texture '{}' has inconsistent pixel data; drawing it white", texture.name);
                    let blank = ImageData::solid(1, 1, [255, 255, 255, 255]);
                    let gpu = upload_image(ctx, &blank, &texture.settings, &texture.name);
                    self.textures.insert(id, gpu);
                }
                TextureSource::Cube(faces) => {
                    self.ambients.insert(id, average_color(faces));
                }
            }
            refreshed.insert(id);
        }
        refreshed
    }

    fn sync_materials(
        &mut self,
        ctx: &RenderCtx<'_>,
        scene: &mut Scene,
        meshes: &[MeshInstance],
        refreshed: &HashSet<TextureId>,
    ) {
        for mesh in meshes {
            let Some(material) = scene.resources.material_mut(mesh.material) else {
                continue;
            };
            let stale = material.map.is_some_and(|t| refreshed.contains(&t));
            if self.materials.contains_key(&mesh.material) && !material.needs_update && !stale {
                continue;
            }
            material.needs_update = false;

            let map = material.map.and_then(|t| self.textures.get(&t));
            let texture = map.unwrap_or(&self.white);
            let uniform = MaterialUniform::new(material, map.is_some(), texture.repeat);

            let ubo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("kitsune material ubo"),
                contents: bytemuck::bytes_of(&uniform),
                usage: wgpu::BufferUsages::UNIFORM,
            });
            let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("kitsune material bind group"),
                layout: &self.material_bgl,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: ubo.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&texture.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(&texture.sampler),
                    },
                ],
            });
            self.materials.insert(mesh.material, GpuMaterial { _ubo: ubo, bind_group });
        }
    }

    fn sync_geometries(&mut self, ctx: &RenderCtx<'_>, scene: &Scene, meshes: &[MeshInstance]) {
        for mesh in meshes {
            if self.geometries.contains_key(&mesh.geometry) {
                continue;
            }
            let Some(geometry) = scene.resources.geometry(mesh.geometry) else {
                continue;
            };
            let vertices = interleave(geometry);
            let vbo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("kitsune mesh vbo"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let ibo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("kitsune mesh ibo"),
                contents: bytemuck::cast_slice(&geometry.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            self.geometries.insert(
                mesh.geometry,
                GpuGeometry {
                    vbo,
                    ibo,
                    index_count: geometry.indices.len() as u32,
                },
            );
        }
    }

    // ── uniforms ──────────────────────────────────────────────────────────

    fn write_frame_uniform(&self, ctx: &RenderCtx<'_>, scene: &Scene, camera: &PerspectiveCamera) {
        let (sun_dir, sun_color) = match scene.lights().first() {
            Some(light) => {
                let [r, g, b] = light.color;
                let i = light.intensity;
                (light.direction.extend(0.0).to_array(), [r * i, g * i, b * i, 1.0])
            }
            None => ([0.0, -1.0, 0.0, 0.0], [0.0; 4]),
        };
        let [ar, ag, ab] = scene
            .environment()
            .and_then(|id| self.ambients.get(&id))
            .copied()
            .unwrap_or([0.0; 3]);

        let uniform = FrameUniform {
            view_proj: camera.view_projection().to_cols_array_2d(),
            camera_pos: camera.position.extend(1.0).to_array(),
            sun_dir,
            sun_color,
            ambient: [ar, ag, ab, 1.0],
            output: [self.exposure, self.tone_mapping, 0.0, 0.0],
        };
        ctx.queue.write_buffer(&self.frame_ubo, 0, bytemuck::bytes_of(&uniform));
    }

    fn write_model_uniforms(&mut self, ctx: &RenderCtx<'_>, meshes: &[MeshInstance]) {
        self.ensure_model_capacity(ctx, meshes.len().max(1));
        let Some(ubo) = self.model_ubo.as_ref() else {
            return;
        };

        let stride = self.model_stride as usize;
        let mut bytes = vec![0u8; stride * meshes.len()];
        for (i, mesh) in meshes.iter().enumerate() {
            let uniform = ModelUniform::new(mesh.world);
            let raw = bytemuck::bytes_of(&uniform);
            bytes[i * stride..i * stride + raw.len()].copy_from_slice(raw);
        }
        if !bytes.is_empty() {
            ctx.queue.write_buffer(ubo, 0, &bytes);
        }
    }

    fn ensure_model_capacity(&mut self, ctx: &RenderCtx<'_>, required: usize) {
        if required <= self.model_capacity && self.model_ubo.is_some() {
            return;
        }
        let capacity = required.next_power_of_two().max(16);

        let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("kitsune model ubo"),
            size: capacity as u64 * self.model_stride,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("kitsune model bind group"),
            layout: &self.model_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &ubo,
                    offset: 0,
                    size: size_of_uniform::<ModelUniform>(),
                }),
            }],
        });

        self.model_ubo = Some(ubo);
        self.model_bind_group = Some(bind_group);
        self.model_capacity = capacity;
    }
}

fn size_of_uniform<T>() -> Option<NonZeroU64> {
    NonZeroU64::new(std::mem::size_of::<T>() as u64)
}

fn uniform_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    dynamic: bool,
    min_binding_size: Option<NonZeroU64>,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: dynamic,
            min_binding_size,
        },
        count: None,
    }
}

fn address_mode(wrapping: Wrapping) -> wgpu::AddressMode {
    match wrapping {
        Wrapping::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        Wrapping::Repeat => wgpu::AddressMode::Repeat,
        Wrapping::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
    }
}

fn upload_image(
    ctx: &RenderCtx<'_>,
    image: &ImageData,
    settings: &TextureSettings,
    label: &str,
) -> GpuTexture {
    let format = match settings.color_space {
        ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
        ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
    };
    let texture = ctx.device.create_texture_with_data(
        ctx.queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: image.width.max(1),
                height: image.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &image.rgba,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: address_mode(settings.wrap_s),
        address_mode_v: address_mode(settings.wrap_t),
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    });

    GpuTexture {
        _texture: texture,
        view,
        sampler,
        repeat: settings.repeat.to_array(),
    }
}

/// Clear color as the linear value the sRGB surface expects.
pub(super) fn clear_color(settings: &RendererConfig) -> wgpu::Color {
    let [r, g, b] = settings.clear_rgb().unwrap_or_else(|err| {
        log::warn!("{err}; clearing to black");
        [0.0; 3]
    });
    wgpu::Color {
        r: f64::from(srgb_to_linear(r)),
        g: f64::from(srgb_to_linear(g)),
        b: f64::from(srgb_to_linear(b)),
        a: 1.0,
    }
}

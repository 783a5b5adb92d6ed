/// Renderer-facing context: device, queue and the target formats.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    pub sample_count: u32,
}

/// Where one frame is drawn.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    /// Multisampled attachment when antialiasing, the surface view otherwise.
    pub color_view: &'a wgpu::TextureView,
    pub resolve_target: Option<&'a wgpu::TextureView>,
    pub depth_view: &'a wgpu::TextureView,
    pub clear: wgpu::Color,
}

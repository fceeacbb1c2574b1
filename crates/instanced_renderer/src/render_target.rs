// gestión de la textura de salida

use crate::pipeline::DEPTH_FORMAT;

/// Off-screen color + depth attachments.  Used when rendering headless and
/// as the depth source when drawing into an external view.
pub struct RenderTarget {
    /// Single-sample color texture.  `COPY_SRC` so frames can be read back.
    pub color_texture: wgpu::Texture,
    pub color_view: wgpu::TextureView,
    pub depth_texture: wgpu::Texture,
    pub depth_view: wgpu::TextureView,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
}

fn create_color(
    device: &wgpu::Device,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("RenderTarget Color"),
        size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

fn create_depth(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("RenderTarget Depth"),
        size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

impl RenderTarget {
    /// Zero dimensions are bumped to 1; wgpu rejects empty textures.
    pub fn new(device: &wgpu::Device, width: u32, height: u32, format: wgpu::TextureFormat) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let (color_texture, color_view) = create_color(device, width, height, format);
        let (depth_texture, depth_view) = create_depth(device, width, height);
        Self { color_texture, color_view, depth_texture, depth_view, width, height, format }
    }

    /// Reconstruye las texturas cuando cambian las dimensiones.
    pub fn resize(&mut self, device: &wgpu::Device, new_width: u32, new_height: u32) {
        let (new_width, new_height) = (new_width.max(1), new_height.max(1));
        if new_width == self.width && new_height == self.height {
            return;
        }
        self.width = new_width;
        self.height = new_height;

        (self.color_texture, self.color_view) = create_color(device, new_width, new_height, self.format);
        (self.depth_texture, self.depth_view) = create_depth(device, new_width, new_height);
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

use anyhow::Context as _;
use instanced_core::EngineContext;
use instanced_renderer::Renderer;

use crate::config::AppConfig;

/// Color format of the headless target.
pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

pub struct GraphicsState {
    pub renderer: Renderer,
}

impl GraphicsState {
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let context = EngineContext::new().await.context("creating GPU context")?;
        let mut renderer = Renderer::new(
            context,
            config.width,
            config.height,
            TARGET_FORMAT,
            config.renderer_settings(),
        )
        .context("creating renderer")?;
        config.camera.apply(&mut renderer.camera);

        Ok(Self { renderer })
    }
}

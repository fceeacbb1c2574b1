use instanced_renderer::CullMode;

use crate::config::AppConfig;
use crate::runner::RunSummary;
use crate::traits::InstancedApp;

/// El punto de entrada principal. Usa el patrón Builder para configurar la app.
pub struct App<A: InstancedApp> {
    config: AppConfig,
    app_state: A,
}

impl<A: InstancedApp> App<A> {
    pub fn new(app_state: A) -> Self {
        Self { config: AppConfig::default(), app_state }
    }

    /// Replaces the whole configuration, e.g. one loaded from TOML.
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    pub fn with_frames(mut self, frames: u64) -> Self {
        self.config.frames = frames;
        self
    }

    pub fn with_cull_mode(mut self, mode: CullMode) -> Self {
        self.config.cull_mode = mode.into();
        self
    }

    pub fn with_instance_count(mut self, count: usize) -> Self {
        self.config.instance_count = count;
        self
    }

    /// `0` switches to the wall clock.
    pub fn with_fixed_dt(mut self, dt: f32) -> Self {
        self.config.fixed_dt = dt;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Ejecuta el bucle principal de la aplicación.
    pub fn run(self) -> anyhow::Result<RunSummary> {
        self.config.validate()?;
        crate::runner::run_internal(self.config, self.app_state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CullModeSetting;

    struct Nothing;
    impl InstancedApp for Nothing {}

    #[test]
    fn builder_overrides_config() {
        let app = App::new(Nothing)
            .with_size(320, 200)
            .with_frames(7)
            .with_cull_mode(CullMode::Off)
            .with_instance_count(42)
            .with_fixed_dt(0.0)
            .with_seed(9);
        let cfg = app.config();
        assert_eq!((cfg.width, cfg.height), (320, 200));
        assert_eq!(cfg.frames, 7);
        assert_eq!(cfg.cull_mode, CullModeSetting::Off);
        assert_eq!(cfg.instance_count, 42);
        assert_eq!(cfg.fixed_dt, 0.0);
        assert_eq!(cfg.seed, 9);
    }

    #[test]
    fn invalid_config_fails_before_touching_the_gpu() {
        let err = App::new(Nothing).with_size(0, 10).run().unwrap_err();
        assert!(err.to_string().contains("non-zero"));
    }
}

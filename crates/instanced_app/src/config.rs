//! Run configuration, read from an optional TOML file.
//!
//! Every field has a default, so an empty file (or none at all) is a valid
//! configuration:
//!
//! ```toml
//! frames = 600
//! cull_mode = "cpu"
//! instance_count = 100
//!
//! [camera]
//! r = 8.0
//! ```
use std::fs;
use std::path::Path;

use instanced_core::Camera;
use instanced_renderer::{CullMode, RendererSettings, DEFAULT_MAX_STALLED_FRAMES};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file error: {0}")]
    File(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(String),
    #[error("config validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Serde mirror of [`CullMode`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CullModeSetting {
    Off,
    Cpu,
    #[default]
    Gpu,
}

impl From<CullModeSetting> for CullMode {
    fn from(s: CullModeSetting) -> Self {
        match s {
            CullModeSetting::Off => CullMode::Off,
            CullModeSetting::Cpu => CullMode::Cpu,
            CullModeSetting::Gpu => CullMode::Gpu,
        }
    }
}

impl From<CullMode> for CullModeSetting {
    fn from(m: CullMode) -> Self {
        match m {
            CullMode::Off => CullModeSetting::Off,
            CullMode::Cpu => CullModeSetting::Cpu,
            CullMode::Gpu => CullModeSetting::Gpu,
        }
    }
}

/// Orbit camera placement.  Angles in radians.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub poi: [f32; 3],
    pub r: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let cam = Camera::default();
        Self { poi: cam.poi.to_array(), r: cam.r, phi: cam.phi, theta: cam.theta }
    }
}

impl CameraConfig {
    pub fn apply(&self, camera: &mut Camera) {
        camera.poi = self.poi.into();
        camera.r = self.r;
        camera.phi = self.phi;
        camera.theta = self.theta;
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub width: u32,
    pub height: u32,
    /// Frames to render before exiting.
    pub frames: u64,
    /// Seconds per frame; `0` runs on the wall clock.
    pub fixed_dt: f32,
    pub instance_count: usize,
    pub cull_mode: CullModeSetting,
    pub animate: bool,
    pub seed: u64,
    /// `error`, `warn`, `info`, `debug` or `trace`.
    pub log_level: String,
    pub max_stalled_frames: u32,
    pub max_frames_in_flight: usize,
    pub camera: CameraConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let renderer = RendererSettings::default();
        Self {
            width: 1280,
            height: 720,
            frames: 300,
            fixed_dt: 1.0 / 60.0,
            instance_count: renderer.instance_count,
            cull_mode: renderer.cull_mode.into(),
            animate: renderer.animate,
            seed: renderer.seed,
            log_level: "info".to_string(),
            max_stalled_frames: DEFAULT_MAX_STALLED_FRAMES,
            max_frames_in_flight: renderer.max_frames_in_flight,
            camera: CameraConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Validation(format!(
                "window size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.fixed_dt < 0.0 || !self.fixed_dt.is_finite() {
            return Err(ConfigError::Validation(format!("fixed_dt must be >= 0, got {}", self.fixed_dt)));
        }
        if self.log_level.parse::<log::LevelFilter>().is_err() {
            return Err(ConfigError::Validation(format!("unknown log level `{}`", self.log_level)));
        }
        Ok(())
    }

    /// Renderer-side subset.  Instance counts above capacity are clamped by
    /// the renderer, not rejected here.
    pub fn renderer_settings(&self) -> RendererSettings {
        RendererSettings {
            instance_count: self.instance_count,
            cull_mode: self.cull_mode.into(),
            animate: self.animate,
            seed: self.seed,
            max_stalled_frames: self.max_stalled_frames,
            max_frames_in_flight: self.max_frames_in_flight,
            ..RendererSettings::default()
        }
    }

    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_default() {
        assert_eq!(AppConfig::from_toml_str("").unwrap(), AppConfig::default());
    }

    #[test]
    fn partial_file_overrides_only_named_keys() {
        let cfg = AppConfig::from_toml_str(
            r#"
            frames = 10
            cull_mode = "cpu"
            instance_count = 250

            [camera]
            r = 8.0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.frames, 10);
        assert_eq!(cfg.cull_mode, CullModeSetting::Cpu);
        assert_eq!(cfg.camera.r, 8.0);
        assert_eq!(cfg.camera.phi, CameraConfig::default().phi);
        assert_eq!(cfg.width, 1280);

        let settings = cfg.renderer_settings();
        assert_eq!(settings.cull_mode, CullMode::Cpu);
        // clamping happens in the store
        assert_eq!(settings.instance_count, 250);
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(AppConfig::from_toml_str("cull_mode = \"maybe\""), Err(ConfigError::Parse(_))));
        assert!(matches!(AppConfig::from_toml_str("width = 0"), Err(ConfigError::Validation(_))));
        assert!(matches!(AppConfig::from_toml_str("log_level = \"loud\""), Err(ConfigError::Validation(_))));
        assert!(matches!(AppConfig::from_toml_str("fixed_dt = -1.0"), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn camera_config_applies_to_camera() {
        let mut cam = Camera::default();
        CameraConfig { poi: [1.0, 2.0, 3.0], r: 4.0, phi: 0.5, theta: 0.25 }.apply(&mut cam);
        assert_eq!(cam.poi, glam_vec(1.0, 2.0, 3.0));
        assert_eq!(cam.r, 4.0);
        assert_eq!(cam.theta, 0.25);
    }

    fn glam_vec(x: f32, y: f32, z: f32) -> instanced_core::glam::Vec3 {
        instanced_core::glam::Vec3::new(x, y, z)
    }
}

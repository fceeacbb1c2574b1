//! Headless host for `instanced_renderer`: TOML configuration, logging and a
//! fixed-length frame loop.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use instanced_app::{App, AppContext, InstancedApp};
//!
//! struct Orbit;
//!
//! impl InstancedApp for Orbit {
//!     fn update(&mut self, ctx: &mut AppContext) {
//!         ctx.renderer.camera.orbit(0.2 * ctx.time.delta, 0.0);
//!     }
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     App::new(Orbit).with_frames(600).run()?;
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod config;
pub mod context;
mod graphics;
pub mod logging;
mod runner;
pub mod traits;

pub use builder::App;
pub use config::{AppConfig, CameraConfig, ConfigError, CullModeSetting};
pub use context::AppContext;
pub use runner::RunSummary;
pub use traits::InstancedApp;

// Users can do `use instanced_app::{CullMode, Time};` without adding the
// other crates as direct dependencies.
pub use instanced_core::{Time, TimeClock};
pub use instanced_renderer::{CullMode, FrameReport, Renderer};

use anyhow::Context as _;
use instanced_app::{App, AppConfig, AppContext, FrameReport, InstancedApp};

/// Slowly circles the camera around the scene, logging the visible count.
struct Showcase {
    orbit_speed: f32,
}

impl InstancedApp for Showcase {
    fn setup(&mut self, ctx: &mut AppContext) {
        log::info!(
            "{} instances, cull mode {}",
            ctx.renderer.store().len(),
            ctx.renderer.cull_mode()
        );
    }

    fn update(&mut self, ctx: &mut AppContext) {
        ctx.renderer.camera.orbit(self.orbit_speed * ctx.time.delta, 0.0);
    }

    fn on_frame(&mut self, report: &FrameReport, ctx: &mut AppContext) {
        if report.frame > 0 && report.frame % 120 == 0 {
            log::info!(
                "frame {}: {} of {} visible",
                report.frame,
                ctx.renderer.visible_instance_count(),
                report.submitted
            );
        }
    }
}

fn main() -> anyhow::Result<()> {
    // optional first argument: path to a TOML config
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::from_toml_file(&path).with_context(|| format!("loading config {path}"))?,
        None => AppConfig::default(),
    };
    instanced_app::logging::init(config.level_filter())?;

    App::new(Showcase { orbit_speed: 0.2 }).with_config(config).run()?;
    Ok(())
}

use anyhow::Context as _;
use instanced_core::TimeClock;
use instanced_renderer::{FrameReport, FrameToken};

use crate::config::AppConfig;
use crate::context::AppContext;
use crate::graphics::GraphicsState;
use crate::traits::InstancedApp;

/// Outcome of a finished run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Frames rendered.
    pub frames: u64,
    pub last_report: Option<FrameReport>,
    /// Visible count after the final readbacks resolved.
    pub visible: u32,
    pub token: FrameToken,
    pub elapsed: f64,
}

struct Runner<A: InstancedApp> {
    app: A,
    graphics: GraphicsState,
    clock: TimeClock,
    frames: u64,
}

impl<A: InstancedApp> Runner<A> {
    fn run(mut self) -> anyhow::Result<RunSummary> {
        let renderer = &mut self.graphics.renderer;

        {
            let mut ctx = AppContext::new(Default::default(), renderer);
            self.app.setup(&mut ctx);
            if ctx.exit_requested {
                return Ok(summary(renderer, 0, None, 0.0));
            }
        }

        let mut rendered = 0;
        let mut last_report = None;
        let mut elapsed = 0.0;

        while rendered < self.frames {
            let time = self.clock.tick();
            elapsed = time.elapsed;

            // ── 1. UPDATE ────────────────────────────────────────────────────
            let exit = {
                let mut ctx = AppContext::new(time, renderer);
                self.app.update(&mut ctx);
                ctx.exit_requested
            };
            if exit {
                break;
            }
            renderer
                .update(time.delta)
                .with_context(|| format!("updating frame {}", time.frame_count))?;

            // ── 2. RENDER ────────────────────────────────────────────────────
            let report = renderer
                .render()
                .with_context(|| format!("rendering frame {}", time.frame_count))?;
            rendered += 1;
            last_report = Some(report);

            if report.frame % 60 == 0 {
                log::debug!(
                    "frame {} [{}]: {} submitted, visible {}",
                    report.frame,
                    report.mode,
                    report.submitted,
                    renderer.visible_instance_count()
                );
            }

            let mut ctx = AppContext::new(time, renderer);
            self.app.on_frame(&report, &mut ctx);
            if ctx.exit_requested {
                break;
            }
        }

        renderer.wait_idle().context("draining in-flight frames")?;
        let result = summary(renderer, rendered, last_report, elapsed);
        log::info!(
            "rendered {} frames in {:.2}s, visible {} of {} ({} mode)",
            result.frames,
            result.elapsed,
            result.visible,
            renderer.store().len(),
            renderer.cull_mode()
        );
        Ok(result)
    }
}

fn summary(
    renderer: &instanced_renderer::Renderer,
    frames: u64,
    last_report: Option<FrameReport>,
    elapsed: f64,
) -> RunSummary {
    RunSummary {
        frames,
        last_report,
        visible: renderer.visible_instance_count(),
        token: renderer.frame_token(),
        elapsed,
    }
}

pub(crate) fn run_internal<A: InstancedApp>(config: AppConfig, app: A) -> anyhow::Result<RunSummary> {
    let graphics = pollster::block_on(GraphicsState::new(&config))?;
    let clock = TimeClock::from_fixed_dt(config.fixed_dt);
    log::info!(
        "running {} frames ({})",
        config.frames,
        if clock.is_fixed() { "fixed step" } else { "wall clock" }
    );

    Runner { app, graphics, clock, frames: config.frames }.run()
}

use instanced_renderer::FrameReport;

use crate::context::AppContext;

/// Hooks the frame loop calls into.
///
/// All methods have empty default implementations so you only override what
/// you need; a unit struct implementing nothing renders the configured scene
/// for the configured number of frames.
///
/// ```rust,ignore
/// struct Spin;
///
/// impl InstancedApp for Spin {
///     fn update(&mut self, ctx: &mut AppContext) {
///         ctx.renderer.camera.orbit(0.5 * ctx.time.delta, 0.0);
///     }
/// }
/// ```
#[allow(unused_variables)]
pub trait InstancedApp {
    /// Called once after the GPU and renderer are ready.
    fn setup(&mut self, ctx: &mut AppContext) {}

    /// Called every frame before the renderer animates and draws.
    fn update(&mut self, ctx: &mut AppContext) {}

    /// Called after each frame was submitted.
    fn on_frame(&mut self, report: &FrameReport, ctx: &mut AppContext) {}
}

impl<T: InstancedApp + ?Sized> InstancedApp for &mut T {
    fn setup(&mut self, ctx: &mut AppContext) {
        (**self).setup(ctx)
    }

    fn update(&mut self, ctx: &mut AppContext) {
        (**self).update(ctx)
    }

    fn on_frame(&mut self, report: &FrameReport, ctx: &mut AppContext) {
        (**self).on_frame(report, ctx)
    }
}

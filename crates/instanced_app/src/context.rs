use instanced_core::Time;
use instanced_renderer::Renderer;

/// Per-frame context passed to every [`crate::InstancedApp`] callback.
pub struct AppContext<'a> {
    /// Frame timing: delta, elapsed, frame count.
    pub time: Time,

    /// The renderer: camera, instance controls and cull mode.
    pub renderer: &'a mut Renderer,

    /// Set to `true` via [`AppContext::request_exit`] to stop after this
    /// frame.
    pub(crate) exit_requested: bool,
}

impl<'a> AppContext<'a> {
    pub(crate) fn new(time: Time, renderer: &'a mut Renderer) -> Self {
        Self { time, renderer, exit_requested: false }
    }

    /// Signal the frame loop to shut down after the current frame.
    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }
}

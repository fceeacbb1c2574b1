/// Failures reported by [`crate::Renderer::update`] and
/// [`crate::Renderer::render`].
///
/// There is no partial-failure state: any of these means the frame was not
/// produced and the host should stop submitting new ones.  A readback that
/// simply is not ready yet is never an error.
use instanced_core::ContextError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// Validation, out-of-memory or device-lost error raised by wgpu.
    #[error("device error: {0}")]
    Device(String),

    /// Mapping a readback staging buffer failed.
    #[error("readback map failed: {0}")]
    ReadbackMap(String),

    /// The readback ring stayed full for too long; the oldest query never
    /// completed.
    #[error("readback for frame {frame} still pending after {stalled_frames} stalled frames")]
    ReadbackStalled { frame: u64, stalled_frames: u32 },

    /// Settings that cannot be honoured (e.g. zero-sized target).
    #[error("invalid renderer configuration: {0}")]
    Config(String),
}

impl From<ContextError> for RenderError {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::Device(msg) => RenderError::Device(msg),
            other => RenderError::Device(other.to_string()),
        }
    }
}

pub type RenderResult<T> = Result<T, RenderError>;

/// A stage of the frame: the cull dispatch and the instanced draw both
/// implement `RenderPass`.
///
/// All passes are prepared before any of them records.  Uploads made with
/// `queue.write_buffer` in `prepare` (cull planes, host id lists) land ahead
/// of the frame's single command buffer, so a pass never observes a write
/// meant for a later frame.
use wgpu::{CommandEncoder, Device, Queue, TextureView};

use crate::graph::FramePacket;

pub trait RenderPass: Send + Sync + 'static {
    /// Debug label.
    fn name(&self) -> &str;

    /// Target size changed.  No-op unless the pass owns sized resources.
    #[allow(unused_variables)]
    fn on_resize(&mut self, device: &Device, queue: &Queue, width: u32, height: u32) {}

    /// Upload this frame's data.
    fn prepare(&mut self, device: &Device, queue: &Queue, packet: &FramePacket);

    /// Record into `encoder`.  Compute passes ignore the attachments;
    /// `depth_view` is `None` for draws without depth.
    fn execute(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        color_view: &TextureView,
        depth_view: Option<&TextureView>,
        packet: &FramePacket,
    );
}

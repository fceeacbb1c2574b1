pub mod frame_packet;
pub mod pass_trait;

pub use frame_packet::{DrawList, FramePacket, Viewport};
pub use pass_trait::RenderPass;

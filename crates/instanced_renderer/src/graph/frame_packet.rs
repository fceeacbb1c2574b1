/// Data bundle assembled once per frame and passed immutably to every
/// `RenderPass`.
///
/// Culling decisions are made while building the packet: the host path
/// stores its compacted id list here, the device path only records that the
/// draw must come from the indirect buffer.
use instanced_core::Frustum;

use crate::culling::CullMode;

// ── Draw source ───────────────────────────────────────────────────────────────

/// Where the instanced draw takes its instance list from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawList {
    /// Ids computed on the host (all active slots, or the CPU-culled subset),
    /// uploaded before the draw.
    Host(Vec<u32>),
    /// Ids and count produced by the cull compute pass; drawn indirectly.
    Device,
}

impl DrawList {
    /// Instance count known on the host, if any.
    pub fn host_count(&self) -> Option<u32> {
        match self {
            DrawList::Host(ids) => Some(ids.len() as u32),
            DrawList::Device => None,
        }
    }
}

// ── Viewport ──────────────────────────────────────────────────────────────────

/// Rectangular region within the render target used for 3-D content.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

// ── Frame packet ──────────────────────────────────────────────────────────────

/// All data a `RenderPass` may need for one frame.
///
/// The camera itself is not carried: the scene uniform is synced before the
/// packet is built, so passes only see the frustum derived from it.
pub struct FramePacket {
    pub viewport: Option<Viewport>,
    pub frustum: Frustum,
    pub mode: CullMode,
    /// Active instances before culling.
    pub instance_count: u32,
    pub draw: DrawList,
}

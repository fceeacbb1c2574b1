/// `instanced_renderer`: instanced cube rendering with CPU or compute-shader
/// frustum culling and frame-pipelined readback of the visible count.
///
/// # Module layout
///
/// | Module          | Responsibility                                           |
/// |-----------------|----------------------------------------------------------|
/// | `context`       | Re-exports `EngineContext`                               |
/// | `resources`     | Buffer helpers, instance + bounds storage buffers        |
/// | `geometry`      | `Vertex`, `Mesh`, cube primitive                         |
/// | `camera`        | Scene uniform (camera + point light)                     |
/// | `instances`     | Instance records, slot factory, fixed-capacity store     |
/// | `culling`       | `CullMode`, host culling, `GpuCuller`                    |
/// | `indirect`      | Indirect draw args, template and visible-id buffers      |
/// | `readback`      | Query ring for the lagged GPU visible count              |
/// | `pipeline`      | Bind-group layouts, draw and cull pipelines              |
/// | `render_target` | Off-screen color + depth targets                         |
/// | `graph`         | `RenderPass` trait + `FramePacket`                       |
/// | `passes`        | Built-in passes: `CullPass`, `InstancedPass`             |
pub mod camera;
pub mod context;
pub mod culling;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod indirect;
pub mod instances;
pub mod passes;
pub mod pipeline;
pub mod readback;
pub mod render_target;
pub mod resources;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use glam;
pub use instanced_core::{Aabb, Frustum, Plane};

pub use camera::{Camera, Lighting, Projection};
pub use context::EngineContext;
pub use culling::CullMode;
pub use error::{RenderError, RenderResult};
pub use geometry::{Mesh, Vertex};
pub use graph::{FramePacket, RenderPass, Viewport};
pub use indirect::{DrawIndexedIndirectArgs, IndirectArgs};
pub use instances::{Instance, InstanceStore, Material, MAX_INSTANCES};
pub use readback::{FrameToken, DEFAULT_MAX_STALLED_FRAMES, READBACK_RING_DEPTH};
pub use render_target::RenderTarget;

// ── Internal imports ──────────────────────────────────────────────────────────

use std::collections::VecDeque;
use std::sync::Arc;

use camera::GpuScene;
use culling::GpuCuller;
use graph::DrawList;
use instances::InstanceFactory;
use passes::{CullPass, InstancedPass};
use pipeline::{InstancedPipeline, PipelineLayouts};
use readback::{CountReadback, QueryRing};
use resources::InstanceBuffer;

// ── Settings ──────────────────────────────────────────────────────────────────

/// Construction-time knobs for [`Renderer`].
#[derive(Clone, Debug)]
pub struct RendererSettings {
    /// Initially active instances; clamped to `MAX_INSTANCES`.
    pub instance_count: usize,
    pub cull_mode: CullMode,
    pub animate: bool,
    /// Seed for the randomly generated slots.
    pub seed: u64,
    /// Consecutive full-ring frames before the readback is declared lost.
    pub max_stalled_frames: u32,
    /// Submissions allowed in flight before `render` waits for the oldest.
    /// Must be in `1..=READBACK_RING_DEPTH`.
    pub max_frames_in_flight: usize,
    pub lighting: Lighting,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            instance_count: 10,
            cull_mode: CullMode::default(),
            animate: true,
            seed: 0,
            max_stalled_frames: DEFAULT_MAX_STALLED_FRAMES,
            max_frames_in_flight: 3,
            lighting: Lighting::default(),
        }
    }
}

// ── FrameReport ───────────────────────────────────────────────────────────────

/// What a single `render` call did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FrameReport {
    pub frame: u64,
    pub mode: CullMode,
    /// Active instances handed to culling.
    pub submitted: u32,
    /// Visible count known on the host this frame: immediate for `Off` and
    /// `Cpu`, `None` for `Gpu` (see [`Renderer::visible_instance_count`]).
    pub visible: Option<u32>,
    /// Whether this frame's GPU count was queued for readback.
    pub readback_reserved: bool,
}

// ── RenderDest ────────────────────────────────────────────────────────────────

/// Where a render call should write its output.
enum RenderDest<'a> {
    /// Internal off-screen [`RenderTarget`].
    Target,
    /// An external `TextureView` supplied by the caller (e.g. swapchain surface).
    View(&'a wgpu::TextureView),
}

// ── Renderer ──────────────────────────────────────────────────────────────────

/// Top-level renderer.
///
/// Owns the instance store, every GPU resource derived from it and the two
/// built-in passes, executed each frame with the **prepare → execute**
/// pattern.  One frame is exactly one queue submission:
///
/// ```text
///   Gpu:  reset args → cull dispatch → copy count → indirect draw
///   Cpu:  host cull → upload ids → instanced draw
///   Off:  upload 0..n → instanced draw
/// ```
pub struct Renderer {
    pub context: EngineContext,
    pub render_target: RenderTarget,
    pub camera: Camera,
    pub viewport: Viewport,
    lighting: Lighting,
    gpu_scene: GpuScene,

    // ── Instances ─────────────────────────────────────────────────────────
    store: InstanceStore,
    instance_buffer: InstanceBuffer,
    /// Store changed since the last upload.
    dirty: bool,
    animate: bool,

    // ── Culling / draw ────────────────────────────────────────────────────
    mode: CullMode,
    indirect: Arc<IndirectArgs>,
    cull_pass: CullPass,
    instanced_pass: InstancedPass,
    host_visible: Vec<u32>,

    // ── Frame pipelining ──────────────────────────────────────────────────
    readback: QueryRing<CountReadback>,
    in_flight: VecDeque<wgpu::SubmissionIndex>,
    max_frames_in_flight: usize,
    frame: u64,
}

impl Renderer {
    /// Builds every GPU resource for a `width × height` target of `format`.
    pub fn new(
        context: EngineContext,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        settings: RendererSettings,
    ) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::Config(format!("render target must not be empty ({width}x{height})")));
        }
        if settings.max_frames_in_flight == 0 || settings.max_frames_in_flight > READBACK_RING_DEPTH {
            return Err(RenderError::Config(format!(
                "max_frames_in_flight must be in 1..={READBACK_RING_DEPTH}, got {}",
                settings.max_frames_in_flight
            )));
        }

        let device = &context.device;
        let render_target = RenderTarget::new(device, width, height, format);

        let layouts = PipelineLayouts::new(device);
        let pipeline = InstancedPipeline::new(device, format, layouts.clone());
        let mesh = Mesh::cube(device);

        let mut camera = Camera::default();
        camera.set_aspect(width as f32 / height as f32);
        let gpu_scene = GpuScene::new(device, &camera, &settings.lighting, &layouts.scene);

        let store = InstanceStore::new(
            InstanceFactory::new(settings.seed),
            mesh.local_bounds,
            settings.instance_count,
        );
        let mut instance_buffer = InstanceBuffer::new(device);
        instance_buffer.upload(&context.queue, &store);

        let indirect = Arc::new(IndirectArgs::new(device, &mesh));
        let culler = GpuCuller::new(device, &layouts, &instance_buffer, &indirect);
        let cull_pass = CullPass::new(culler, Arc::clone(&indirect));
        let instanced_pass = InstancedPass::new(
            device,
            pipeline,
            Arc::clone(&gpu_scene.bind_group),
            &instance_buffer,
            Arc::clone(&indirect),
            mesh,
        );

        let readback = QueryRing::with_depth(READBACK_RING_DEPTH, settings.max_stalled_frames, |i| {
            CountReadback::new(device, i)
        });

        log::info!(
            "renderer ready: {width}x{height} {format:?}, {} instances, cull mode {}",
            store.len(),
            settings.cull_mode
        );

        Ok(Self {
            context,
            render_target,
            camera,
            viewport: Viewport { x: 0, y: 0, width, height },
            lighting: settings.lighting,
            gpu_scene,
            store,
            instance_buffer,
            dirty: false,
            animate: settings.animate,
            mode: settings.cull_mode,
            indirect,
            cull_pass,
            instanced_pass,
            host_visible: Vec::with_capacity(MAX_INSTANCES),
            readback,
            in_flight: VecDeque::with_capacity(settings.max_frames_in_flight),
            max_frames_in_flight: settings.max_frames_in_flight,
            frame: 0,
        })
    }

    // ── Frame API ─────────────────────────────────────────────────────────────

    /// Advances the animation by `dt` seconds and re-uploads the instance and
    /// bounds buffers when anything changed.
    pub fn update(&mut self, dt: f32) -> RenderResult<()> {
        self.check_device()?;
        if self.animate && dt > 0.0 && self.store.animate(dt) > 0 {
            self.dirty = true;
        }
        self.sync_instances();
        Ok(())
    }

    /// Renders into the internal off-screen [`RenderTarget`].
    pub fn render(&mut self) -> RenderResult<FrameReport> {
        self.do_render(RenderDest::Target)
    }

    /// Renders directly into an external `TextureView` (e.g. a swapchain
    /// frame).  The view must match the render target's size and format;
    /// the target's depth buffer is reused.
    pub fn render_to_view(&mut self, view: &wgpu::TextureView) -> RenderResult<FrameReport> {
        self.do_render(RenderDest::View(view))
    }

    /// Visible instances.  In [`CullMode::Gpu`] this is the newest value read
    /// back from the device, typically a few frames old, and `0` before the
    /// first readback resolves.  Otherwise it is evaluated on the host now.
    pub fn visible_instance_count(&self) -> u32 {
        match self.mode {
            CullMode::Gpu => self.readback.latest().unwrap_or(0),
            CullMode::Cpu => culling::cull(&self.frustum(), self.store.bounds()).len() as u32,
            CullMode::Off => self.store.len() as u32,
        }
    }

    /// Non-blocking: lets map callbacks fire and resolves finished readbacks.
    pub fn poll_readback(&mut self) -> RenderResult<usize> {
        let _ = self.context.device.poll(wgpu::Maintain::Poll);
        self.readback.poll()
    }

    /// Blocks until every submitted frame finished and its readback resolved.
    pub fn wait_idle(&mut self) -> RenderResult<()> {
        let _ = self.context.device.poll(wgpu::Maintain::Wait);
        self.in_flight.clear();
        self.readback.poll()?;
        self.check_device()
    }

    pub fn frame_token(&self) -> FrameToken {
        self.readback.token()
    }

    // ── Culling / instances ───────────────────────────────────────────────────

    pub fn cull_mode(&self) -> CullMode {
        self.mode
    }

    pub fn set_cull_mode(&mut self, mode: CullMode) {
        if mode != self.mode {
            log::info!("cull mode {} -> {}", self.mode, mode);
            self.mode = mode;
        }
    }

    /// Sets the active instance count, clamped to `MAX_INSTANCES`.  Returns
    /// the count applied.
    pub fn set_instance_count(&mut self, count: usize) -> usize {
        let applied = self.store.set_active_count(count);
        if applied != count {
            log::warn!("instance count {count} clamped to {applied}");
        }
        log::info!("active instances: {applied}");
        self.dirty = true;
        applied
    }

    /// One more active instance; `false` at capacity.
    pub fn grow(&mut self) -> bool {
        let grown = self.store.grow();
        self.dirty |= grown;
        grown
    }

    /// One fewer active instance; `false` when empty.
    pub fn shrink(&mut self) -> bool {
        let shrunk = self.store.shrink();
        self.dirty |= shrunk;
        shrunk
    }

    pub fn set_animate(&mut self, animate: bool) {
        self.animate = animate;
    }

    pub fn is_animating(&self) -> bool {
        self.animate
    }

    /// Active instances, in slot order.
    pub fn instances(&self) -> &[Instance] {
        self.store.instances()
    }

    pub fn store(&self) -> &InstanceStore {
        &self.store
    }

    /// Edits one active instance; the change is uploaded with the next
    /// `update` or `render`.
    pub fn modify_instance(&mut self, slot: usize, f: impl FnOnce(&mut Instance)) -> bool {
        let changed = self.store.modify(slot, f);
        self.dirty |= changed;
        changed
    }

    /// Device-side culling output, for diagnostics.
    pub fn indirect(&self) -> &IndirectArgs {
        &self.indirect
    }

    /// World-space frustum of the current camera.
    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_proj(&self.camera.build_view_projection_matrix())
    }

    // ── Lighting / viewport ───────────────────────────────────────────────────

    pub fn lighting(&self) -> &Lighting {
        &self.lighting
    }

    pub fn set_lighting(&mut self, lighting: Lighting) {
        self.lighting = lighting;
    }

    pub fn set_clear_color(&mut self, color: wgpu::Color) {
        self.instanced_pass.clear_color = color;
    }

    /// Recreates the render target when the output changes size.
    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        let (old_width, old_height) = self.render_target.size();
        self.render_target.resize(&self.context.device, new_width, new_height);
        let (width, height) = self.render_target.size();
        if (width, height) == (old_width, old_height) {
            return;
        }

        // Stretch the viewport if it covered the whole target before.
        if self.viewport.width == old_width && self.viewport.height == old_height {
            self.viewport = Viewport { x: 0, y: 0, width, height };
            self.camera.set_aspect(width as f32 / height as f32);
        }

        let (device, queue) = (&self.context.device, &self.context.queue);
        self.cull_pass.on_resize(device, queue, width, height);
        self.instanced_pass.on_resize(device, queue, width, height);
    }

    /// Explicitly sets the 3-D viewport rectangle and updates camera aspect.
    pub fn set_viewport(&mut self, vp: Viewport) {
        self.viewport = vp;
        if vp.height > 0 {
            self.camera.set_aspect(vp.width as f32 / vp.height as f32);
        }
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn do_render(&mut self, dest: RenderDest<'_>) -> RenderResult<FrameReport> {
        self.check_device()?;
        self.throttle();

        // 1. Bring GPU copies of the scene up to date
        self.sync_instances();
        self.gpu_scene.sync(&self.context.queue, &self.camera, &self.lighting);

        // 2. Cull (host paths) or reserve a readback slot (device path)
        let frustum = self.frustum();
        let submitted = self.store.len() as u32;
        let (draw, slot) = match self.mode {
            CullMode::Off => (DrawList::Host((0..submitted).collect()), None),
            CullMode::Cpu => {
                culling::cull_into(&frustum, self.store.bounds(), &mut self.host_visible);
                (DrawList::Host(self.host_visible.clone()), None)
            }
            CullMode::Gpu => {
                let slot = self.readback.reserve().inspect_err(|err| log::error!("{err}"))?;
                if slot.is_none() {
                    log::warn!(
                        "readback ring full at frame {}, count not queued",
                        self.readback.token().current
                    );
                }
                (DrawList::Device, slot)
            }
        };
        let visible = draw.host_count();

        // 3. Assemble the frame packet (pure CPU data)
        let packet = FramePacket {
            viewport: Some(self.viewport),
            frustum,
            mode: self.mode,
            instance_count: submitted,
            draw,
        };

        // 4. Record: prepare every pass, then execute in order
        let device = &self.context.device;
        let queue = &self.context.queue;
        let color_view = match dest {
            RenderDest::Target => &self.render_target.color_view,
            RenderDest::View(v) => v,
        };
        let depth_view = Some(&self.render_target.depth_view);

        self.cull_pass.prepare(device, queue, &packet);
        self.instanced_pass.prepare(device, queue, &packet);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });
        self.cull_pass.execute(device, queue, &mut encoder, color_view, depth_view, &packet);
        if let Some(slot) = &slot {
            self.readback.query_mut(slot).record_copy(&mut encoder, &self.indirect.args);
        }
        self.instanced_pass.execute(device, queue, &mut encoder, color_view, depth_view, &packet);

        // 5. Submit, then arm the readback behind it
        let index = queue.submit(Some(encoder.finish()));
        self.in_flight.push_back(index);
        let readback_reserved = slot.is_some();
        if let Some(slot) = slot {
            self.readback.commit(slot);
        }

        // 6. Pick up whatever finished, without waiting
        let _ = device.poll(wgpu::Maintain::Poll);
        let resolved = self.readback.poll().inspect_err(|err| log::error!("{err}"))?;
        if resolved > 0 {
            log::debug!(
                "frame {}: visible count {:?} (watermark {})",
                self.frame,
                self.readback.latest(),
                self.readback.token().last_completed
            );
        }
        self.check_device()?;

        let report = FrameReport { frame: self.frame, mode: self.mode, submitted, visible, readback_reserved };
        self.frame += 1;
        Ok(report)
    }

    /// Waits for the oldest submission once `max_frames_in_flight` are queued.
    fn throttle(&mut self) {
        while self.in_flight.len() >= self.max_frames_in_flight {
            let Some(oldest) = self.in_flight.pop_front() else { break };
            let _ = self.context.device.poll(wgpu::Maintain::WaitForSubmissionIndex(oldest));
        }
    }

    fn sync_instances(&mut self) {
        if self.dirty {
            self.instance_buffer.upload(&self.context.queue, &self.store);
            self.dirty = false;
        }
    }

    fn check_device(&self) -> RenderResult<()> {
        self.context.check_device().map_err(|err| {
            log::error!("{err}");
            RenderError::from(err)
        })
    }
}

/// Indirect draw arguments and the device buffers that carry culling output.
///
/// Three buffers live here:
///
/// * `args`: one [`DrawIndexedIndirectArgs`] consumed by
///   `draw_indexed_indirect`; the cull shader bumps `instance_count` with an
///   atomic add.
/// * `template`: the same record with `instance_count = 0`, copied over
///   `args` at the start of every GPU-culled frame.
/// * `visible_ids`: compacted slot indices, one `u32` per visible instance,
///   sized for `MAX_INSTANCES` so the atomic counter can never index past it.
use std::sync::Arc;

use crate::error::{RenderError, RenderResult};
use crate::geometry::Mesh;
use crate::instances::MAX_INSTANCES;
use crate::resources::buffer;

/// `DrawIndexedIndirect` record, byte-compatible with what wgpu reads.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawIndexedIndirectArgs {
    /// Indices per instance.
    pub index_count: u32,
    /// Number of instances to draw (filled by the cull pass).
    pub instance_count: u32,
    pub first_index: u32,
    pub base_vertex: i32,
    pub first_instance: u32,
}

impl DrawIndexedIndirectArgs {
    /// Byte offset of `instance_count`, the only field that changes per frame.
    pub const INSTANCE_COUNT_OFFSET: wgpu::BufferAddress = 4;
    pub const SIZE: wgpu::BufferAddress = std::mem::size_of::<Self>() as wgpu::BufferAddress;

    /// Template for `mesh` with no instances.
    pub fn template(mesh: &Mesh) -> Self {
        Self { index_count: mesh.index_count, ..Self::default() }
    }

    pub fn with_instances(self, instance_count: u32) -> Self {
        Self { instance_count, ..self }
    }
}

pub struct IndirectArgs {
    pub args: Arc<wgpu::Buffer>,
    pub template: Arc<wgpu::Buffer>,
    pub visible_ids: Arc<wgpu::Buffer>,
    template_args: DrawIndexedIndirectArgs,
}

impl IndirectArgs {
    pub fn new(device: &wgpu::Device, mesh: &Mesh) -> Self {
        let template_args = DrawIndexedIndirectArgs::template(mesh);
        let args = buffer::create_storage(
            device,
            "Indirect Args",
            &[template_args],
            wgpu::BufferUsages::INDIRECT | wgpu::BufferUsages::COPY_SRC,
        );
        let template = buffer::create_storage(
            device,
            "Indirect Args Template",
            &[template_args],
            wgpu::BufferUsages::COPY_SRC,
        );
        let visible_ids = buffer::create_storage_zeroed(
            device,
            "Visible Instance Ids",
            (MAX_INSTANCES * std::mem::size_of::<u32>()) as wgpu::BufferAddress,
            wgpu::BufferUsages::COPY_SRC,
        );

        Self { args, template, visible_ids, template_args }
    }

    pub fn template_args(&self) -> DrawIndexedIndirectArgs {
        self.template_args
    }

    /// Records the per-frame reset: `args` ← `template` (count back to zero).
    pub fn record_reset(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.copy_buffer_to_buffer(&self.template, 0, &self.args, 0, DrawIndexedIndirectArgs::SIZE);
    }

    /// Host path: uploads a compacted id list and the matching argument
    /// record.  `ids` longer than `MAX_INSTANCES` are truncated.
    pub fn write_host(&self, queue: &wgpu::Queue, ids: &[u32]) -> u32 {
        let ids = &ids[..ids.len().min(MAX_INSTANCES)];
        buffer::update_slice(queue, &self.visible_ids, 0, ids);
        let count = ids.len() as u32;
        queue.write_buffer(&self.args, 0, bytemuck::bytes_of(&self.template_args.with_instances(count)));
        count
    }

    /// Copies `args` and the used part of `visible_ids` back to the host and
    /// waits for the result.  Blocks on the device: meant for diagnostics
    /// and tests, never for the frame loop.
    pub fn read_back_blocking(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> RenderResult<(DrawIndexedIndirectArgs, Vec<u32>)> {
        let ids_size = self.visible_ids.size();
        // args occupy the first 20 bytes, ids follow (20 is copy-aligned)
        let ids_offset = DrawIndexedIndirectArgs::SIZE;
        let staging = buffer::create_readback(device, "Indirect Snapshot", ids_offset + ids_size);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Indirect Snapshot Encoder"),
        });
        encoder.copy_buffer_to_buffer(&self.args, 0, &staging, 0, DrawIndexedIndirectArgs::SIZE);
        encoder.copy_buffer_to_buffer(&self.visible_ids, 0, &staging, ids_offset, ids_size);
        queue.submit(Some(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = device.poll(wgpu::Maintain::Wait);

        match rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(RenderError::ReadbackMap(e.to_string())),
            Err(_) => return Err(RenderError::ReadbackMap("map callback dropped".into())),
        }

        let (args, ids) = {
            let data = slice.get_mapped_range();
            let args: DrawIndexedIndirectArgs =
                bytemuck::pod_read_unaligned(&data[..DrawIndexedIndirectArgs::SIZE as usize]);
            let count = (args.instance_count as usize).min(MAX_INSTANCES);
            let start = ids_offset as usize;
            let ids: Vec<u32> = data[start..start + count * 4]
                .chunks_exact(4)
                .map(bytemuck::pod_read_unaligned::<u32>)
                .collect();
            (args, ids)
        };
        staging.unmap();
        Ok((args, ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_matches_wgpu_indirect_layout() {
        assert_eq!(DrawIndexedIndirectArgs::SIZE, 20);
        let args = DrawIndexedIndirectArgs {
            index_count: 36,
            instance_count: 7,
            first_index: 0,
            base_vertex: 0,
            first_instance: 0,
        };
        let bytes = bytemuck::bytes_of(&args);
        let off = DrawIndexedIndirectArgs::INSTANCE_COUNT_OFFSET as usize;
        assert_eq!(u32::from_ne_bytes(bytes[off..off + 4].try_into().unwrap()), 7);
    }

    #[test]
    fn template_only_changes_instance_count() {
        let t = DrawIndexedIndirectArgs { index_count: 36, ..Default::default() };
        let filled = t.with_instances(12);
        assert_eq!(filled.index_count, 36);
        assert_eq!(filled.instance_count, 12);
        assert_eq!(t.instance_count, 0);
    }
}

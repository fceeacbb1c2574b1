/// Frame-pipelined readback of the GPU visible-instance count.
///
/// Reading the count back in the frame that produced it would force the host
/// to wait for the device.  Instead every GPU-culled frame copies the counter
/// into its own staging slot of a fixed ring and the host picks results up a
/// few frames later with non-blocking polls.
///
/// ```text
///   reserve() ──► record copy ──► submit ──► commit() ──► poll() … poll()
///     Idle                                   Submitted     Completed
/// ```
///
/// The ring is generic over [`ReadbackQuery`] so the bookkeeping can be
/// exercised without a device; [`CountReadback`] is the wgpu implementation.
use std::sync::mpsc::{self, Receiver, TryRecvError};

use crate::error::{RenderError, RenderResult};
use crate::indirect::DrawIndexedIndirectArgs;
use crate::resources::buffer;

/// Number of frames that may be awaiting readback at once.
pub const READBACK_RING_DEPTH: usize = 10;

/// Consecutive full-ring frames tolerated before the oldest query is
/// declared lost.
pub const DEFAULT_MAX_STALLED_FRAMES: u32 = 120;

// ── Query capability ─────────────────────────────────────────────────────────

/// A single asynchronous readback.
pub trait ReadbackQuery {
    /// Arms the query.  Called once, after the commands it reads from have
    /// been submitted.
    fn begin(&mut self);

    /// Non-blocking check.  `Ok(None)` means "not yet"; the query stays armed
    /// and is asked again on a later frame.
    fn try_resolve(&mut self) -> RenderResult<Option<u32>>;
}

// ── Ring state ───────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SlotState {
    Idle,
    Submitted,
    Completed,
}

/// Frame watermarks.  `current` is the next frame to enter the ring,
/// `last_completed` the number of frames whose readback has resolved, in
/// order.  Always `last_completed <= current <= last_completed + depth`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameToken {
    pub current: u64,
    pub last_completed: u64,
}

impl FrameToken {
    /// Frames submitted but not yet resolved.
    #[inline]
    pub fn in_flight(&self) -> u64 {
        self.current - self.last_completed
    }
}

/// Slot handed out by [`QueryRing::reserve`]; consumed by `commit`.
#[derive(Debug, PartialEq, Eq)]
pub struct ReservedSlot {
    index: usize,
    frame: u64,
}

impl ReservedSlot {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}

struct Slot<Q> {
    frame: u64,
    query: Q,
    state: SlotState,
}

pub struct QueryRing<Q> {
    slots: Vec<Slot<Q>>,
    token: FrameToken,
    latest: Option<u32>,
    stalled_frames: u32,
    max_stalled_frames: u32,
}

impl<Q: ReadbackQuery> QueryRing<Q> {
    /// Ring with one slot per query.  An empty `queries` gets a ring that is
    /// always full, so every frame skips its readback.
    pub fn new(queries: Vec<Q>, max_stalled_frames: u32) -> Self {
        let slots = queries
            .into_iter()
            .map(|query| Slot { frame: 0, query, state: SlotState::Idle })
            .collect();
        Self {
            slots,
            token: FrameToken::default(),
            latest: None,
            stalled_frames: 0,
            max_stalled_frames: max_stalled_frames.max(1),
        }
    }

    /// Ring of `depth` queries built by `make(slot_index)`.
    pub fn with_depth(depth: usize, max_stalled_frames: u32, make: impl FnMut(usize) -> Q) -> Self {
        Self::new((0..depth).map(make).collect(), max_stalled_frames)
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn token(&self) -> FrameToken {
        self.token
    }

    /// Most recent resolved value; retained while newer queries are pending.
    #[inline]
    pub fn latest(&self) -> Option<u32> {
        self.latest
    }

    pub fn state(&self, index: usize) -> Option<SlotState> {
        self.slots.get(index).map(|s| s.state)
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.token.in_flight() >= self.depth() as u64
    }

    /// Claims the slot for frame `current`.  `Ok(None)` when every slot is
    /// still in flight: the caller renders without a readback this frame.
    /// Fails with [`RenderError::ReadbackStalled`] once that has happened
    /// for `max_stalled_frames` consecutive frames.
    pub fn reserve(&mut self) -> RenderResult<Option<ReservedSlot>> {
        if self.is_full() {
            self.stalled_frames += 1;
            if self.stalled_frames >= self.max_stalled_frames {
                return Err(RenderError::ReadbackStalled {
                    frame: self.token.last_completed,
                    stalled_frames: self.stalled_frames,
                });
            }
            return Ok(None);
        }
        self.stalled_frames = 0;

        let frame = self.token.current;
        let index = (frame % self.depth() as u64) as usize;
        debug_assert_ne!(self.slots[index].state, SlotState::Submitted);
        Ok(Some(ReservedSlot { index, frame }))
    }

    /// Query behind a reserved slot, e.g. to record its copy command.
    pub fn query_mut(&mut self, slot: &ReservedSlot) -> &mut Q {
        &mut self.slots[slot.index].query
    }

    /// Marks the slot submitted and arms its query.  Must follow the
    /// `queue.submit` that carries the slot's copy.
    pub fn commit(&mut self, slot: ReservedSlot) {
        debug_assert_eq!(slot.frame, self.token.current, "slots must be committed in order");
        let entry = &mut self.slots[slot.index];
        entry.frame = slot.frame;
        entry.state = SlotState::Submitted;
        entry.query.begin();
        self.token.current += 1;
    }

    /// Resolves ready queries oldest-first without blocking and stops at
    /// the first one that is not ready.  Returns how many resolved.
    pub fn poll(&mut self) -> RenderResult<usize> {
        let depth = self.depth() as u64;
        let mut resolved = 0;
        while self.token.last_completed < self.token.current {
            let index = (self.token.last_completed % depth) as usize;
            let entry = &mut self.slots[index];
            debug_assert_eq!(entry.frame, self.token.last_completed);

            match entry.query.try_resolve()? {
                Some(value) => {
                    entry.state = SlotState::Completed;
                    self.latest = Some(value);
                    self.token.last_completed += 1;
                    resolved += 1;
                }
                None => break,
            }
        }
        if resolved > 0 {
            log::trace!(
                "readback resolved {resolved} frame(s), watermark {}",
                self.token.last_completed
            );
        }
        Ok(resolved)
    }
}

// ── wgpu implementation ──────────────────────────────────────────────────────

/// Reads the `instance_count` field of the indirect args buffer through a
/// 4-byte `MAP_READ` staging buffer.
pub struct CountReadback {
    staging: wgpu::Buffer,
    pending: Option<Receiver<Result<(), wgpu::BufferAsyncError>>>,
}

impl CountReadback {
    pub fn new(device: &wgpu::Device, index: usize) -> Self {
        let label = format!("Visible Count Readback {index}");
        Self { staging: buffer::create_readback(device, &label, 4), pending: None }
    }

    /// Records the copy of the live counter into this slot's staging buffer.
    pub fn record_copy(&self, encoder: &mut wgpu::CommandEncoder, args: &wgpu::Buffer) {
        encoder.copy_buffer_to_buffer(
            args,
            DrawIndexedIndirectArgs::INSTANCE_COUNT_OFFSET,
            &self.staging,
            0,
            4,
        );
    }
}

impl ReadbackQuery for CountReadback {
    fn begin(&mut self) {
        let (tx, rx) = mpsc::channel();
        self.staging.slice(..).map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.pending = Some(rx);
    }

    /// The owner is expected to have called `device.poll(Maintain::Poll)`
    /// this frame so map callbacks can fire.
    fn try_resolve(&mut self) -> RenderResult<Option<u32>> {
        let Some(rx) = &self.pending else {
            return Ok(None);
        };
        match rx.try_recv() {
            Ok(Ok(())) => {
                let value = {
                    let data = self.staging.slice(..).get_mapped_range();
                    bytemuck::pod_read_unaligned::<u32>(&data[..4])
                };
                self.staging.unmap();
                self.pending = None;
                Ok(Some(value))
            }
            Ok(Err(e)) => {
                self.pending = None;
                Err(RenderError::ReadbackMap(e.to_string()))
            }
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                self.pending = None;
                Err(RenderError::ReadbackMap("map callback dropped".into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    /// Fake query that becomes ready when the test says so.
    #[derive(Default)]
    struct ScriptedQuery {
        armed: bool,
        ready: Rc<RefCell<VecDeque<u32>>>,
    }

    impl ReadbackQuery for ScriptedQuery {
        fn begin(&mut self) {
            self.armed = true;
        }

        fn try_resolve(&mut self) -> RenderResult<Option<u32>> {
            if !self.armed {
                return Ok(None);
            }
            match self.ready.borrow_mut().pop_front() {
                Some(v) => {
                    self.armed = false;
                    Ok(Some(v))
                }
                None => Ok(None),
            }
        }
    }

    /// Ring whose queries resolve in submission order from a shared queue
    /// of results the test pushes into.
    fn ring(depth: usize, max_stalled: u32) -> (QueryRing<ScriptedQuery>, Rc<RefCell<VecDeque<u32>>>) {
        let results = Rc::new(RefCell::new(VecDeque::new()));
        let shared = Rc::clone(&results);
        let ring = QueryRing::with_depth(depth, max_stalled, move |_| ScriptedQuery {
            armed: false,
            ready: Rc::clone(&shared),
        });
        (ring, results)
    }

    fn submit(ring: &mut QueryRing<ScriptedQuery>) -> bool {
        match ring.reserve().expect("reserve") {
            Some(slot) => {
                ring.commit(slot);
                true
            }
            None => false,
        }
    }

    #[test]
    fn value_is_retained_until_next_completion() {
        let (mut ring, results) = ring(READBACK_RING_DEPTH, DEFAULT_MAX_STALLED_FRAMES);
        assert_eq!(ring.latest(), None);

        submit(&mut ring);
        assert_eq!(ring.poll().unwrap(), 0);
        assert_eq!(ring.latest(), None);

        results.borrow_mut().push_back(7);
        assert_eq!(ring.poll().unwrap(), 1);
        assert_eq!(ring.latest(), Some(7));

        submit(&mut ring);
        assert_eq!(ring.poll().unwrap(), 0);
        assert_eq!(ring.latest(), Some(7));
        assert_eq!(ring.state(0), Some(SlotState::Completed));
        assert_eq!(ring.state(1), Some(SlotState::Submitted));
    }

    #[test]
    fn watermark_is_monotonic_and_bounded() {
        let (mut ring, results) = ring(4, 1000);
        let mut last = ring.token();
        for frame in 0..200u32 {
            submit(&mut ring);
            if frame % 3 == 0 {
                results.borrow_mut().push_back(frame);
            }
            ring.poll().unwrap();

            let t = ring.token();
            assert!(t.last_completed >= last.last_completed);
            assert!(t.current >= last.current);
            assert!(t.last_completed <= t.current);
            assert!(t.current <= t.last_completed + ring.depth() as u64);
            last = t;
        }
    }

    #[test]
    fn full_ring_skips_readback_without_error() {
        let (mut ring, results) = ring(3, 50);
        assert!(submit(&mut ring));
        assert!(submit(&mut ring));
        assert!(submit(&mut ring));
        assert!(ring.is_full());
        assert!(!submit(&mut ring));
        assert_eq!(ring.token().current, 3);

        results.borrow_mut().push_back(5);
        ring.poll().unwrap();
        assert_eq!(ring.token().last_completed, 1);
        assert!(submit(&mut ring));
        assert_eq!(ring.token().current, 4);
    }

    #[test]
    fn poll_stops_at_first_pending_query() {
        let (mut ring, results) = ring(5, 50);
        for _ in 0..3 {
            submit(&mut ring);
        }
        results.borrow_mut().extend([1, 2]);
        assert_eq!(ring.poll().unwrap(), 2);
        assert_eq!(ring.latest(), Some(2));
        assert_eq!(ring.token().last_completed, 2);
        assert_eq!(ring.state(2), Some(SlotState::Submitted));
    }

    #[test]
    fn never_completing_query_becomes_fatal() {
        let (mut ring, _results) = ring(2, 5);
        submit(&mut ring);
        submit(&mut ring);
        for _ in 0..4 {
            assert!(ring.reserve().unwrap().is_none());
        }
        match ring.reserve() {
            Err(RenderError::ReadbackStalled { frame, stalled_frames }) => {
                assert_eq!(frame, 0);
                assert_eq!(stalled_frames, 5);
            }
            other => panic!("expected stall, got {other:?}"),
        }
    }

    #[test]
    fn slots_cycle_modulo_depth() {
        let (mut ring, results) = ring(3, 50);
        for frame in 0..7u64 {
            let slot = ring.reserve().unwrap().expect("slot");
            assert_eq!(slot.frame(), frame);
            assert_eq!(slot.index(), (frame % 3) as usize);
            ring.commit(slot);
            results.borrow_mut().push_back(frame as u32);
            ring.poll().unwrap();
        }
        assert_eq!(ring.latest(), Some(6));
    }

    #[test]
    fn failing_query_propagates() {
        struct Broken;
        impl ReadbackQuery for Broken {
            fn begin(&mut self) {}
            fn try_resolve(&mut self) -> RenderResult<Option<u32>> {
                Err(RenderError::ReadbackMap("lost".into()))
            }
        }
        let mut ring = QueryRing::with_depth(2, 10, |_| Broken);
        let slot = ring.reserve().unwrap().unwrap();
        ring.commit(slot);
        assert!(matches!(ring.poll(), Err(RenderError::ReadbackMap(_))));
        assert_eq!(ring.token().last_completed, 0);
    }
}

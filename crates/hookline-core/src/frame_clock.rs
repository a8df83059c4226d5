//! Paint step of a frame.
//!
//! [`Runtime::run_frame`] flushes layout effects, hands a [`PaintFrame`] to
//! every paint callback registered before the frame started, then runs the
//! passive effects that were due. Hosts draw from those callbacks.
//!
//! [`Runtime::run_frame`]: crate::Runtime::run_frame

use crate::runtime::RuntimeHandle;
use crate::PaintCallbackId;

/// What a paint callback learns about the frame it runs in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PaintFrame {
    /// Timestamp passed to `run_frame`.
    pub time_nanos: u64,
    /// 1 for the first frame the runtime runs.
    pub number: u64,
    /// Layout effects flushed at the start of this frame.
    pub layout_effects_run: usize,
    /// Passive effects that run once painting is done.
    pub passive_effects_due: usize,
}

impl PaintFrame {
    pub fn time_millis(&self) -> u64 {
        self.time_nanos / 1_000_000
    }
}

#[derive(Clone)]
pub struct FrameClock {
    runtime: RuntimeHandle,
}

impl FrameClock {
    pub(crate) fn new(runtime: RuntimeHandle) -> Self {
        Self { runtime }
    }

    /// Frames the runtime has run so far.
    pub fn frames_run(&self) -> u64 {
        self.runtime.frames_run()
    }

    /// Runs `callback` in the paint step of the next frame and requests that frame.
    ///
    /// A callback registered while painting waits for the following frame.
    pub fn on_next_paint(&self, callback: impl FnOnce(&PaintFrame) + 'static) -> PaintRequest {
        PaintRequest {
            id: self.runtime.register_paint_callback(callback),
            runtime: self.runtime.clone(),
        }
    }
}

/// Paint callback waiting for its frame. Dropping or cancelling it unregisters the callback.
#[must_use = "dropping a PaintRequest cancels its callback"]
pub struct PaintRequest {
    runtime: RuntimeHandle,
    id: Option<PaintCallbackId>,
}

impl PaintRequest {
    /// Whether the callback is still waiting; false once it ran or was cancelled.
    pub fn is_pending(&self) -> bool {
        self.id.is_some_and(|id| self.runtime.is_paint_pending(id))
    }

    pub fn cancel(self) {}
}

impl Drop for PaintRequest {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.runtime.cancel_paint_callback(id);
        }
    }
}

//! Platform abstraction traits for the hook runtime.
//!
//! The core never owns component instances or paint timing. A host hands the
//! render context a [`ComponentHandle`] for the instance being rendered and a
//! [`PhaseScheduler`] that decides when effect callbacks run.

use crate::InstanceId;

/// Schedules work for the runtime.
///
/// Implementations are responsible for triggering frame processing on behalf
/// of the runtime. They must be safe to use from multiple threads.
pub trait RuntimeScheduler: Send + Sync {
    /// Request that the host schedule a new frame.
    fn schedule_frame(&self);
}

/// Point of the render/paint cycle at which a scheduled callback runs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FlushPhase {
    /// After the view has been updated for a render, before the next paint.
    PrePaint,
    /// After the next paint.
    PostPaint,
}

/// Host primitive that runs a callback at a chosen phase.
///
/// Callbacks scheduled for the same phase must run in the order they were
/// scheduled, and every `PrePaint` callback must complete before any
/// `PostPaint` callback of the same frame starts.
pub trait PhaseScheduler {
    fn schedule_at_phase(&self, phase: FlushPhase, callback: Box<dyn FnOnce() + 'static>);
}

/// Host view of a component instance.
///
/// Handles end up inside bound dispatchers, which live in the component's own
/// hook list, so implementations should hold the instance weakly.
pub trait ComponentHandle {
    /// Stable identity of the instance.
    fn id(&self) -> InstanceId;

    /// Re-render the instance. Called once per dispatch.
    fn update(&self);
}

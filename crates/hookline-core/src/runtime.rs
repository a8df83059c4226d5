use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use crate::collections::map::HashMap;
use crate::component::ComponentInner;
use crate::frame_clock::{FrameClock, PaintFrame};
use crate::platform::{FlushPhase, PhaseScheduler, RuntimeScheduler};
use crate::{InstanceId, PaintCallbackId};

type PhaseTask = Box<dyn FnOnce() + 'static>;
type PaintTask = Box<dyn FnOnce(&PaintFrame) + 'static>;

/// Tunables of the reference host runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Upper bound on back-to-back renders of one component caused by state
    /// changes made while it was rendering.
    pub max_rerender_passes: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_rerender_passes: 25,
        }
    }
}

struct RuntimeInner {
    scheduler: Arc<dyn RuntimeScheduler>,
    config: RuntimeConfig,
    needs_frame: RefCell<bool>,
    pre_paint: RefCell<VecDeque<PhaseTask>>,
    post_paint: RefCell<VecDeque<PhaseTask>>,
    paint_callbacks: RefCell<Vec<PaintCallback>>,
    next_paint_callback_id: Cell<PaintCallbackId>,
    frames_run: Cell<u64>,
    components: RefCell<HashMap<InstanceId, Weak<ComponentInner>>>,
}

impl RuntimeInner {
    fn new(scheduler: Arc<dyn RuntimeScheduler>, config: RuntimeConfig) -> Self {
        Self {
            scheduler,
            config,
            needs_frame: RefCell::new(false),
            pre_paint: RefCell::new(VecDeque::new()),
            post_paint: RefCell::new(VecDeque::new()),
            paint_callbacks: RefCell::new(Vec::new()),
            next_paint_callback_id: Cell::new(1),
            frames_run: Cell::new(0),
            components: RefCell::new(HashMap::default()),
        }
    }

    fn schedule(&self) {
        *self.needs_frame.borrow_mut() = true;
        self.scheduler.schedule_frame();
    }

    fn queue(&self, phase: FlushPhase) -> &RefCell<VecDeque<PhaseTask>> {
        match phase {
            FlushPhase::PrePaint => &self.pre_paint,
            FlushPhase::PostPaint => &self.post_paint,
        }
    }

    fn enqueue(&self, phase: FlushPhase, task: PhaseTask) {
        self.queue(phase).borrow_mut().push_back(task);
        self.schedule();
    }

    /// Runs queued tasks of `phase` in FIFO order. Returns how many ran.
    ///
    /// Pre-paint tasks queued while flushing run in the same flush. Post-paint
    /// tasks queued while flushing wait for the next frame's paint.
    fn flush_phase(&self, phase: FlushPhase) -> usize {
        let budget = match phase {
            FlushPhase::PrePaint => usize::MAX,
            FlushPhase::PostPaint => self.post_paint.borrow().len(),
        };
        let mut executed = 0;
        while executed < budget {
            let task = self.queue(phase).borrow_mut().pop_front();
            match task {
                Some(task) => {
                    task();
                    executed += 1;
                }
                None => break,
            }
        }
        if executed > 0 {
            log::debug!("flushed {executed} {phase:?} task(s)");
        }
        executed
    }

    fn has_pending(&self, phase: FlushPhase) -> bool {
        !self.queue(phase).borrow().is_empty()
    }

    fn has_paint_callbacks(&self) -> bool {
        !self.paint_callbacks.borrow().is_empty()
    }

    fn is_idle(&self) -> bool {
        !self.has_pending(FlushPhase::PrePaint)
            && !self.has_pending(FlushPhase::PostPaint)
            && !self.has_paint_callbacks()
    }

    fn register_paint_callback(&self, callback: PaintTask) -> PaintCallbackId {
        let id = self.next_paint_callback_id.get();
        self.next_paint_callback_id.set(id + 1);
        self.paint_callbacks
            .borrow_mut()
            .push(PaintCallback { id, callback });
        self.schedule();
        id
    }

    fn is_paint_pending(&self, id: PaintCallbackId) -> bool {
        self.paint_callbacks
            .borrow()
            .iter()
            .any(|entry| entry.id == id)
    }

    fn cancel_paint_callback(&self, id: PaintCallbackId) {
        self.paint_callbacks
            .borrow_mut()
            .retain(|entry| entry.id != id);
        if self.is_idle() {
            *self.needs_frame.borrow_mut() = false;
        }
    }

    /// Runs the callbacks registered before this paint; later ones wait for the next frame.
    fn paint(&self, frame: &PaintFrame) {
        let callbacks = std::mem::take(&mut *self.paint_callbacks.borrow_mut());
        log::trace!("frame {}: painting with {} callback(s)", frame.number, callbacks.len());
        for entry in callbacks {
            (entry.callback)(frame);
        }
    }

    fn run_frame(&self, time_nanos: u64) -> PaintFrame {
        *self.needs_frame.borrow_mut() = false;
        let number = self.frames_run.get() + 1;
        self.frames_run.set(number);
        let layout_effects_run = self.flush_phase(FlushPhase::PrePaint);
        let frame = PaintFrame {
            time_nanos,
            number,
            layout_effects_run,
            passive_effects_due: self.post_paint.borrow().len(),
        };
        self.paint(&frame);
        self.flush_phase(FlushPhase::PostPaint);
        if !self.is_idle() {
            self.schedule();
        }
        frame
    }
}

/// Reference host runtime.
///
/// Owns the pre-paint and post-paint effect queues, the paint callbacks and
/// the registry of mounted components. A frame runs the pre-paint queue, then
/// the paint callbacks, then the post-paint queue.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self::with_config(scheduler, RuntimeConfig::default())
    }

    pub fn with_config(scheduler: Arc<dyn RuntimeScheduler>, config: RuntimeConfig) -> Self {
        Self {
            inner: Rc::new(RuntimeInner::new(scheduler, config)),
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle(Rc::downgrade(&self.inner))
    }

    pub fn config(&self) -> RuntimeConfig {
        self.inner.config
    }

    pub fn needs_frame(&self) -> bool {
        *self.inner.needs_frame.borrow()
    }

    pub fn set_needs_frame(&self, value: bool) {
        *self.inner.needs_frame.borrow_mut() = value;
    }

    pub fn frame_clock(&self) -> FrameClock {
        FrameClock::new(self.handle())
    }

    /// Runs one frame: layout effects, paint callbacks, then passive effects.
    pub fn run_frame(&self, time_nanos: u64) -> PaintFrame {
        log::trace!("running frame at {time_nanos}ns");
        self.inner.run_frame(time_nanos)
    }

    pub fn frames_run(&self) -> u64 {
        self.inner.frames_run.get()
    }

    pub fn has_pending_effects(&self) -> bool {
        self.inner.has_pending(FlushPhase::PrePaint) || self.inner.has_pending(FlushPhase::PostPaint)
    }

    pub fn mounted_components(&self) -> usize {
        self.inner
            .components
            .borrow()
            .values()
            .filter(|component| component.strong_count() > 0)
            .count()
    }
}

#[derive(Default)]
pub struct DefaultScheduler;

impl RuntimeScheduler for DefaultScheduler {
    fn schedule_frame(&self) {}
}

#[cfg(test)]
#[derive(Default)]
pub struct TestScheduler {
    requests: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl TestScheduler {
    pub fn frame_requests(&self) -> usize {
        self.requests.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl RuntimeScheduler for TestScheduler {
    fn schedule_frame(&self) {
        self.requests
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
pub struct TestRuntime {
    scheduler: Arc<TestScheduler>,
    runtime: Runtime,
}

#[cfg(test)]
impl TestRuntime {
    pub fn new() -> Self {
        let scheduler = Arc::new(TestScheduler::default());
        Self {
            runtime: Runtime::new(scheduler.clone()),
            scheduler,
        }
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    pub fn frame_requests(&self) -> usize {
        self.scheduler.frame_requests()
    }
}

/// Weak handle to a [`Runtime`]; inert once the runtime is dropped.
#[derive(Clone)]
pub struct RuntimeHandle(Weak<RuntimeInner>);

impl RuntimeHandle {
    pub fn schedule(&self) {
        if let Some(inner) = self.0.upgrade() {
            inner.schedule();
        }
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    pub fn config(&self) -> RuntimeConfig {
        self.0
            .upgrade()
            .map(|inner| inner.config)
            .unwrap_or_default()
    }

    /// Runs the queue of `phase` now. Returns how many tasks ran.
    pub fn flush_phase(&self, phase: FlushPhase) -> usize {
        self.0
            .upgrade()
            .map(|inner| inner.flush_phase(phase))
            .unwrap_or(0)
    }

    pub fn has_pending(&self, phase: FlushPhase) -> bool {
        self.0
            .upgrade()
            .map(|inner| inner.has_pending(phase))
            .unwrap_or(false)
    }

    pub fn has_paint_callbacks(&self) -> bool {
        self.0
            .upgrade()
            .is_some_and(|inner| inner.has_paint_callbacks())
    }

    /// Runs one frame; `None` once the runtime is dropped.
    pub fn run_frame(&self, time_nanos: u64) -> Option<PaintFrame> {
        self.0.upgrade().map(|inner| inner.run_frame(time_nanos))
    }

    pub fn frames_run(&self) -> u64 {
        self.0.upgrade().map_or(0, |inner| inner.frames_run.get())
    }

    pub fn frame_clock(&self) -> FrameClock {
        FrameClock::new(self.clone())
    }

    pub(crate) fn register_paint_callback(
        &self,
        callback: impl FnOnce(&PaintFrame) + 'static,
    ) -> Option<PaintCallbackId> {
        self.0
            .upgrade()
            .map(|inner| inner.register_paint_callback(Box::new(callback)))
    }

    pub(crate) fn is_paint_pending(&self, id: PaintCallbackId) -> bool {
        self.0
            .upgrade()
            .is_some_and(|inner| inner.is_paint_pending(id))
    }

    pub(crate) fn cancel_paint_callback(&self, id: PaintCallbackId) {
        if let Some(inner) = self.0.upgrade() {
            inner.cancel_paint_callback(id);
        }
    }

    pub(crate) fn register_component(&self, id: InstanceId, component: Weak<ComponentInner>) {
        if let Some(inner) = self.0.upgrade() {
            inner.components.borrow_mut().insert(id, component);
        }
    }

    pub(crate) fn unregister_component(&self, id: InstanceId) {
        if let Some(inner) = self.0.upgrade() {
            inner.components.borrow_mut().remove(&id);
        }
    }

    pub(crate) fn component(&self, id: InstanceId) -> Option<Rc<ComponentInner>> {
        let inner = self.0.upgrade()?;
        let components = inner.components.borrow();
        components.get(&id).and_then(Weak::upgrade)
    }
}

/// Queues callbacks on the runtime.
///
/// Once the runtime is dropped there is no frame left to wait for: callbacks of
/// either phase run immediately, inside the render that scheduled them. A
/// passive effect scheduled that way does not run after a paint.
impl PhaseScheduler for RuntimeHandle {
    fn schedule_at_phase(&self, phase: FlushPhase, callback: Box<dyn FnOnce() + 'static>) {
        match self.0.upgrade() {
            Some(inner) => inner.enqueue(phase, callback),
            None => {
                log::debug!("runtime dropped; running {phase:?} callback immediately");
                callback();
            }
        }
    }
}

struct PaintCallback {
    id: PaintCallbackId,
    callback: PaintTask,
}

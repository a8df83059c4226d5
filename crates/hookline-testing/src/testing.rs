use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use hookline_core::{Component, Runtime, RuntimeConfig, RuntimeError, RuntimeHandle, RuntimeScheduler};

/// Frame interval used when the tester advances frames on its own.
pub const FRAME_INTERVAL_NANOS: u64 = 16_666_667;

const MAX_PUMPED_FRAMES: usize = 100;

/// Scheduler that only counts frame requests.
#[derive(Debug, Default)]
pub struct RecordingScheduler {
    requests: AtomicUsize,
}

impl RecordingScheduler {
    pub fn frame_requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl RuntimeScheduler for RecordingScheduler {
    fn schedule_frame(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

/// Headless harness for exercising a single component in tests.
///
/// `ComponentTester` owns a runtime driven by a [`RecordingScheduler`] and at
/// most one mounted component. Frames are run explicitly, so tests decide
/// exactly when passive effects flush.
pub struct ComponentTester {
    scheduler: Arc<RecordingScheduler>,
    runtime: Runtime,
    component: Option<Component>,
    frame_time_nanos: u64,
}

impl ComponentTester {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        let scheduler = Arc::new(RecordingScheduler::default());
        Self {
            runtime: Runtime::with_config(scheduler.clone(), config),
            scheduler,
            component: None,
            frame_time_nanos: 0,
        }
    }

    /// Mount `content`, replacing (and destroying) any component mounted before.
    pub fn set_content(&mut self, content: impl FnMut() + 'static) -> Result<(), RuntimeError> {
        self.component = None;
        self.component = Some(Component::mount(&self.runtime, content)?);
        Ok(())
    }

    /// Re-render the mounted component without a state change.
    pub fn rerender(&mut self) -> Result<(), RuntimeError> {
        match self.component.as_ref() {
            Some(component) => component.rerender(),
            None => Ok(()),
        }
    }

    /// Run one frame at the supplied timestamp.
    pub fn advance_frame(&mut self, frame_time_nanos: u64) {
        self.frame_time_nanos = frame_time_nanos;
        self.runtime.run_frame(frame_time_nanos);
    }

    /// Run frames one interval apart until the runtime stops requesting them.
    /// Returns how many frames ran.
    ///
    /// # Panics
    /// Panics if the runtime is still busy after a hundred frames.
    pub fn pump_until_idle(&mut self) -> usize {
        let mut frames = 0;
        while self.runtime.needs_frame() {
            frames += 1;
            if frames > MAX_PUMPED_FRAMES {
                panic!("pump_until_idle: runtime still requesting frames after {MAX_PUMPED_FRAMES}");
            }
            let next = self.frame_time_nanos + FRAME_INTERVAL_NANOS;
            self.advance_frame(next);
        }
        frames
    }

    /// Destroy the mounted component, if any.
    pub fn unmount(&mut self) {
        self.component = None;
    }

    pub fn has_content(&self) -> bool {
        self.component.is_some()
    }

    pub fn component(&self) -> Option<&Component> {
        self.component.as_ref()
    }

    /// Committed renders of the mounted component, zero when nothing is mounted.
    pub fn render_count(&self) -> u64 {
        self.component
            .as_ref()
            .map_or(0, |component| component.render_count())
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    pub fn frame_requests(&self) -> usize {
        self.scheduler.frame_requests()
    }

    pub fn frame_time_nanos(&self) -> u64 {
        self.frame_time_nanos
    }
}

impl Default for ComponentTester {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for tests that only need temporary access to a
/// `ComponentTester`.
pub fn run_test_component<R>(f: impl FnOnce(&mut ComponentTester) -> R) -> R {
    let mut tester = ComponentTester::new();
    f(&mut tester)
}

/// Shared, append-only record of calls made from component bodies and effects.
#[derive(Clone, Debug, Default)]
pub struct CallLog {
    entries: Rc<RefCell<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.entries.borrow_mut().push(entry.into());
    }

    /// Callback that records `entry` each time it is called.
    pub fn recorder(&self, entry: impl Into<String>) -> impl Fn() + 'static {
        let log = self.clone();
        let entry = entry.into();
        move || log.record(entry.clone())
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }

    /// Returns the recorded entries and clears the log.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.entries.borrow_mut())
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|recorded| recorded.as_str() == entry)
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

#[cfg(test)]
#[path = "tests/testing_tests.rs"]
mod tests;

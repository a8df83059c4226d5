//! Event-loop side of a Hookline application on `std`.
//!
//! [`FrameSignal`] is the [`RuntimeScheduler`] handed to the core runtime. It
//! counts frame requests and lets another thread block until one arrives.
//! [`StdRuntime`] owns the core [`Runtime`] and turns those requests into
//! frames stamped with the time since it was created, either one at a time
//! ([`StdRuntime::pump`]) or paced at a fixed interval
//! ([`StdRuntime::run_paced`]).

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use hookline_core::{FrameClock, PaintFrame, Runtime, RuntimeConfig, RuntimeHandle, RuntimeScheduler};

/// Pacing used by [`StdRuntime::run_paced`] unless overridden.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

type FrameWaker = Arc<dyn Fn() + Send + Sync + 'static>;

#[derive(Default)]
struct SignalState {
    pending: bool,
    requests: u64,
    waker: Option<FrameWaker>,
}

/// Frame request latch shared between the runtime and the event loop.
#[derive(Default)]
pub struct FrameSignal {
    state: Mutex<SignalState>,
    raised: Condvar,
}

impl FrameSignal {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SignalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Frame requests received since creation, coalesced or not.
    pub fn requests(&self) -> u64 {
        self.lock().requests
    }

    pub fn is_raised(&self) -> bool {
        self.lock().pending
    }

    /// Clears the latch. Returns whether a frame had been requested.
    pub fn take(&self) -> bool {
        std::mem::take(&mut self.lock().pending)
    }

    /// Blocks until a frame is requested or `timeout` passes, leaving the
    /// latch raised for the next [`take`](Self::take).
    pub fn wait(&self, timeout: Duration) -> bool {
        let guard = self.lock();
        let (guard, _) = self
            .raised
            .wait_timeout_while(guard, timeout, |state| !state.pending)
            .unwrap_or_else(PoisonError::into_inner);
        guard.pending
    }

    /// Called after every request, outside the latch lock.
    pub fn set_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        self.lock().waker = Some(Arc::new(waker));
    }

    pub fn clear_waker(&self) {
        self.lock().waker = None;
    }
}

impl fmt::Debug for FrameSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("FrameSignal")
            .field("pending", &state.pending)
            .field("requests", &state.requests)
            .field("has_waker", &state.waker.is_some())
            .finish()
    }
}

impl RuntimeScheduler for FrameSignal {
    fn schedule_frame(&self) {
        let waker = {
            let mut state = self.lock();
            state.pending = true;
            state.requests += 1;
            state.waker.clone()
        };
        self.raised.notify_all();
        if let Some(waker) = waker {
            waker();
        }
    }
}

/// Core runtime driven by a [`FrameSignal`] and the wall clock.
#[derive(Clone)]
pub struct StdRuntime {
    runtime: Runtime,
    signal: Arc<FrameSignal>,
    started: Instant,
    frame_interval: Duration,
}

impl StdRuntime {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        let signal = Arc::new(FrameSignal::new());
        Self {
            runtime: Runtime::with_config(signal.clone(), config),
            signal,
            started: Instant::now(),
            frame_interval: DEFAULT_FRAME_INTERVAL,
        }
    }

    pub fn with_frame_interval(mut self, frame_interval: Duration) -> Self {
        self.frame_interval = frame_interval;
        self
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    pub fn frame_clock(&self) -> FrameClock {
        self.runtime.frame_clock()
    }

    pub fn signal(&self) -> Arc<FrameSignal> {
        Arc::clone(&self.signal)
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Frame timestamp for "now": nanoseconds since this runtime was created.
    pub fn now_nanos(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }

    /// Runs one frame if the signal is raised or the runtime still has work.
    pub fn pump(&self) -> Option<PaintFrame> {
        let signalled = self.signal.take();
        if !signalled && !self.runtime.needs_frame() {
            return None;
        }
        let frame = self.runtime.run_frame(self.now_nanos());
        log::trace!(
            "frame {} at {}ms: {} layout effect(s), {} passive effect(s)",
            frame.number,
            frame.time_millis(),
            frame.layout_effects_run,
            frame.passive_effects_due
        );
        Some(frame)
    }

    /// Pumps back to back until idle or `max_frames` have run.
    pub fn pump_until_idle(&self, max_frames: usize) -> usize {
        let mut frames = 0;
        while frames < max_frames && self.pump().is_some() {
            frames += 1;
        }
        self.warn_if_busy(frames, max_frames);
        frames
    }

    /// Like [`pump_until_idle`](Self::pump_until_idle), but starts frames at
    /// least one frame interval apart, sleeping the current thread in between.
    pub fn run_paced(&self, max_frames: usize) -> usize {
        let mut frames = 0;
        let mut next_frame_at = Instant::now();
        while frames < max_frames && (self.signal.is_raised() || self.runtime.needs_frame()) {
            let now = Instant::now();
            if next_frame_at > now {
                thread::sleep(next_frame_at - now);
            }
            next_frame_at = Instant::now() + self.frame_interval;
            if self.pump().is_some() {
                frames += 1;
            }
        }
        self.warn_if_busy(frames, max_frames);
        frames
    }

    fn warn_if_busy(&self, frames: usize, max_frames: usize) {
        if frames == max_frames && self.runtime.needs_frame() {
            log::warn!("runtime still requesting frames after {max_frames}");
        }
    }
}

impl fmt::Debug for StdRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdRuntime")
            .field("signal", &self.signal)
            .field("frame_interval", &self.frame_interval)
            .field("frames_run", &self.runtime.frames_run())
            .finish()
    }
}

impl Default for StdRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/std_runtime_tests.rs"]
mod tests;

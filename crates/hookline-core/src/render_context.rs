use std::cell::RefCell;
use std::rc::Rc;

use crate::fiber::Fiber;
use crate::platform::{ComponentHandle, PhaseScheduler};
use crate::scheduler::EffectScheduler;

// Thread-local stack of the renders in progress; the top frame is the one hooks resolve against.
thread_local! {
    static RENDER_STACK: RefCell<Vec<Rc<RenderFrame>>> = const { RefCell::new(Vec::new()) };
}

/// Everything a hook call needs from the component currently rendering.
pub struct RenderFrame {
    fiber: Fiber,
    instance: Rc<dyn ComponentHandle>,
    effects: EffectScheduler,
}

impl RenderFrame {
    pub fn new(
        fiber: Fiber,
        instance: Rc<dyn ComponentHandle>,
        phases: Rc<dyn PhaseScheduler>,
    ) -> Self {
        Self {
            fiber,
            instance,
            effects: EffectScheduler::new(phases),
        }
    }

    pub fn fiber(&self) -> &Fiber {
        &self.fiber
    }

    pub fn instance(&self) -> Rc<dyn ComponentHandle> {
        Rc::clone(&self.instance)
    }

    pub fn effects(&self) -> &EffectScheduler {
        &self.effects
    }
}

/// Guard that pops the render stack on drop.
///
/// When dropped during a panic, the popped component's render is aborted so
/// that later renders of it start from the last committed list.
#[must_use = "RenderScopeGuard pops the render stack on drop"]
pub struct RenderScopeGuard;

impl Drop for RenderScopeGuard {
    fn drop(&mut self) {
        let popped = RENDER_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            let frame = stack.pop()?;
            let id = frame.instance.id();
            let nested = stack.iter().any(|outer| outer.instance.id() == id);
            Some((frame, nested))
        });
        // A render unwinding out of the component body never reaches commit.
        if let Some((frame, false)) = popped {
            if std::thread::panicking() && frame.fiber.is_rendering() {
                frame.fiber.abort_render();
            }
        }
    }
}

/// Makes `frame` the target of hook calls until the returned guard drops.
///
/// Unless the same instance is already on top of the stack, the fiber's
/// cursor is reset and its new list head cleared. The host commits the fiber
/// once the component body returns.
pub fn enter(frame: RenderFrame) -> RenderScopeGuard {
    RENDER_STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        let id = frame.instance.id();
        let already_rendering = stack.last().is_some_and(|top| top.instance.id() == id);
        if !already_rendering {
            frame.fiber.prepare_render();
        }
        stack.push(Rc::new(frame));
    });
    RenderScopeGuard
}

/// Access the frame of the component currently rendering.
///
/// # Panics
/// Panics if no render is active.
pub fn with_render_frame<R>(f: impl FnOnce(&RenderFrame) -> R) -> R {
    try_with_render_frame(f).expect("with_render_frame: no active render")
}

/// Access the frame of the component currently rendering.
/// Returns None if no render is active.
pub fn try_with_render_frame<R>(f: impl FnOnce(&RenderFrame) -> R) -> Option<R> {
    let frame = RENDER_STACK.with(|stack| stack.borrow().last().cloned())?;
    Some(f(&frame))
}

/// Handle of the component currently rendering.
pub fn current_instance() -> Option<Rc<dyn ComponentHandle>> {
    try_with_render_frame(|frame| frame.instance())
}

pub fn is_rendering() -> bool {
    RENDER_STACK.with(|stack| !stack.borrow().is_empty())
}

//! Per-component render state ("fiber").
//!
//! A fiber keeps two hook-list slots: `current`, the list committed by the
//! previous render, and `work_in_progress`, the list the render in progress
//! walks or builds. [`Fiber::commit`] promotes the work-in-progress list; the
//! next render reads it back through the walker.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::HookOrderError;
use crate::hook::{HookKind, HookList, HookRef};
use crate::walker::{HookCursor, HookSlot};
use crate::InstanceId;

struct FiberInner {
    id: InstanceId,
    current: RefCell<HookList>,
    work_in_progress: RefCell<HookList>,
    cursor: RefCell<HookCursor>,
    has_alternate: Cell<bool>,
    rendering: Cell<bool>,
    rerender_requested: Cell<bool>,
}

/// Hook state of one component instance.
#[derive(Clone)]
pub struct Fiber {
    inner: Rc<FiberInner>,
}

impl Fiber {
    pub fn new(id: InstanceId) -> Self {
        Self {
            inner: Rc::new(FiberInner {
                id,
                current: RefCell::new(HookList::default()),
                work_in_progress: RefCell::new(HookList::default()),
                cursor: RefCell::new(HookCursor::default()),
                has_alternate: Cell::new(false),
                rendering: Cell::new(false),
                rerender_requested: Cell::new(false),
            }),
        }
    }

    pub fn id(&self) -> InstanceId {
        self.inner.id
    }

    /// Whether a previous render has been committed.
    pub fn has_alternate(&self) -> bool {
        self.inner.has_alternate.get()
    }

    pub fn is_rendering(&self) -> bool {
        self.inner.rendering.get()
    }

    /// Number of hooks in the committed list.
    pub fn hook_count(&self) -> usize {
        self.inner.current.borrow().len()
    }

    /// Kinds of the committed hooks, in call order.
    pub fn hook_kinds(&self) -> Vec<Option<HookKind>> {
        self.inner
            .current
            .borrow()
            .iter()
            .map(|hook| hook.kind())
            .collect()
    }

    /// Prepares the fiber for a render: resets the cursor and clears the new list head.
    pub(crate) fn prepare_render(&self) {
        self.inner.cursor.borrow_mut().reset();
        self.inner.work_in_progress.borrow_mut().set_head(None);
        self.inner.rendering.set(true);
        log::trace!(
            "component {}: render started ({})",
            self.inner.id,
            if self.has_alternate() { "update" } else { "mount" }
        );
    }

    /// Abandons the render in progress without committing it.
    ///
    /// The committed list stays in place; records a mount render allocated are
    /// dropped, so the next render mounts again.
    pub(crate) fn abort_render(&self) {
        let inner = &self.inner;
        inner.cursor.borrow_mut().reset();
        drop(inner.work_in_progress.borrow_mut().take());
        inner.rendering.set(false);
        inner.rerender_requested.set(false);
        log::warn!("component {}: render aborted before commit", inner.id);
    }

    pub(crate) fn next_hook(&self) -> Result<HookSlot, HookOrderError> {
        let inner = &self.inner;
        if !inner.rendering.get() {
            return Err(HookOrderError::OutsideRender);
        }
        let current = inner.current.borrow();
        let mut work_in_progress = inner.work_in_progress.borrow_mut();
        let committed = inner.has_alternate.get().then_some(&*current);
        inner
            .cursor
            .borrow_mut()
            .advance(inner.id, committed, &mut work_in_progress)
    }

    /// Ends the render in progress and promotes its hook list to `current`.
    ///
    /// On update renders, records past the last hook called are detached. Returns
    /// the number of hooks the render called.
    pub fn commit(&self) -> usize {
        let inner = &self.inner;
        let mut cursor = inner.cursor.borrow_mut();
        let called = cursor.position();
        if inner.has_alternate.get() {
            let dropped = cursor.finish_update(&inner.current.borrow());
            if dropped > 0 {
                log::warn!(
                    "component {}: {} hook(s) not called this render; their state was discarded",
                    inner.id,
                    dropped
                );
            }
        }
        let promoted = inner.work_in_progress.borrow_mut().take();
        *inner.current.borrow_mut() = promoted;
        cursor.reset();
        inner.has_alternate.set(true);
        inner.rendering.set(false);
        log::debug!("component {}: committed {} hook(s)", inner.id, called);
        called
    }

    /// Snapshot taken when state changes outside of a render.
    ///
    /// Promotes any uncommitted list and resets the cursor so the next render
    /// walks the snapshot from its head.
    pub(crate) fn snapshot_alternate(&self) {
        let inner = &self.inner;
        let pending = inner.work_in_progress.borrow_mut().take();
        if !pending.is_empty() {
            *inner.current.borrow_mut() = pending;
        }
        inner.cursor.borrow_mut().reset();
        inner.has_alternate.set(true);
    }

    pub(crate) fn request_rerender(&self) {
        self.inner.rerender_requested.set(true);
    }

    /// Returns whether state changed during the last render and clears the flag.
    pub fn take_rerender_request(&self) -> bool {
        self.inner.rerender_requested.replace(false)
    }

    #[cfg(test)]
    pub(crate) fn hook_at(&self, position: usize) -> Option<HookRef> {
        self.inner.current.borrow().iter().nth(position)
    }

    pub(crate) fn downgrade(&self) -> WeakFiber {
        WeakFiber(Rc::downgrade(&self.inner))
    }
}

impl fmt::Debug for Fiber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fiber")
            .field("id", &self.inner.id)
            .field("hooks", &self.hook_count())
            .field("has_alternate", &self.has_alternate())
            .field("rendering", &self.is_rendering())
            .finish()
    }
}

#[derive(Clone)]
pub(crate) struct WeakFiber(Weak<FiberInner>);

impl WeakFiber {
    pub(crate) fn upgrade(&self) -> Option<Fiber> {
        self.0.upgrade().map(|inner| Fiber { inner })
    }
}

//! Reference component instance model.
//!
//! A [`Component`] owns a render body and its [`Fiber`]. Mounting renders it
//! once; every dispatch on one of its hooks renders it again through a
//! [`ComponentRef`]. Layout effects queued by a render are flushed as soon as
//! the outermost render commits; passive effects wait for the runtime's next
//! frame.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::fiber::Fiber;
use crate::platform::{ComponentHandle, FlushPhase, PhaseScheduler};
use crate::render_context::{self, RenderFrame};
use crate::runtime::{Runtime, RuntimeHandle};
use crate::{next_instance_id, InstanceId};

type RenderBody = Box<dyn FnMut() + 'static>;

pub(crate) struct ComponentInner {
    id: InstanceId,
    fiber: Fiber,
    runtime: RuntimeHandle,
    body: RefCell<RenderBody>,
    render_count: Cell<u64>,
}

impl ComponentInner {
    fn render(&self) -> Result<(), RuntimeError> {
        if self.fiber.is_rendering() {
            self.fiber.request_rerender();
            return Ok(());
        }
        let limit = self.runtime.config().max_rerender_passes.max(1);
        let mut passes = 0;
        loop {
            passes += 1;
            self.render_pass();
            if !self.fiber.take_rerender_request() {
                break;
            }
            if passes >= limit {
                return Err(RuntimeError::RerenderLimit {
                    id: self.id,
                    passes,
                });
            }
            log::debug!("component {}: re-rendering, state changed during render", self.id);
        }
        self.runtime.schedule();
        if !render_context::is_rendering() {
            self.runtime.flush_phase(FlushPhase::PrePaint);
        }
        Ok(())
    }

    fn render_pass(&self) {
        let instance: Rc<dyn ComponentHandle> = Rc::new(ComponentRef {
            id: self.id,
            runtime: self.runtime.clone(),
        });
        let phases: Rc<dyn PhaseScheduler> = Rc::new(self.runtime.clone());
        {
            let _guard = render_context::enter(RenderFrame::new(self.fiber.clone(), instance, phases));
            let mut body = self.body.borrow_mut();
            (*body)();
        }
        self.fiber.commit();
        self.render_count.set(self.render_count.get() + 1);
    }
}

/// Owner of a mounted component. Dropping it destroys the component.
pub struct Component {
    inner: Rc<ComponentInner>,
}

impl Component {
    /// Creates a component and performs its first render.
    pub fn mount(runtime: &Runtime, body: impl FnMut() + 'static) -> Result<Self, RuntimeError> {
        let id = next_instance_id();
        let handle = runtime.handle();
        let inner = Rc::new(ComponentInner {
            id,
            fiber: Fiber::new(id),
            runtime: handle.clone(),
            body: RefCell::new(Box::new(body)),
            render_count: Cell::new(0),
        });
        handle.register_component(id, Rc::downgrade(&inner));
        log::debug!("component {id}: mounting");
        let component = Self { inner };
        component.inner.render()?;
        Ok(component)
    }

    pub fn id(&self) -> InstanceId {
        self.inner.id
    }

    pub fn handle(&self) -> ComponentRef {
        ComponentRef {
            id: self.inner.id,
            runtime: self.inner.runtime.clone(),
        }
    }

    pub fn fiber(&self) -> &Fiber {
        &self.inner.fiber
    }

    /// Number of committed renders, mount included.
    pub fn render_count(&self) -> u64 {
        self.inner.render_count.get()
    }

    pub fn rerender(&self) -> Result<(), RuntimeError> {
        self.inner.render()
    }

    /// Unregisters the component and drops its hook list.
    ///
    /// Effects it already scheduled still run.
    pub fn destroy(self) {}
}

impl Drop for Component {
    fn drop(&mut self) {
        self.inner.runtime.unregister_component(self.inner.id);
        log::debug!("component {}: destroyed", self.inner.id);
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.inner.id)
            .field("fiber", &self.inner.fiber)
            .field("render_count", &self.render_count())
            .finish()
    }
}

/// Weak reference to a mounted component, resolved through the runtime registry.
#[derive(Clone)]
pub struct ComponentRef {
    id: InstanceId,
    runtime: RuntimeHandle,
}

impl ComponentRef {
    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn is_mounted(&self) -> bool {
        self.runtime.component(self.id).is_some()
    }

    pub fn rerender(&self) -> Result<(), RuntimeError> {
        if !self.runtime.is_alive() {
            return Err(RuntimeError::RuntimeDropped);
        }
        let inner = self
            .runtime
            .component(self.id)
            .ok_or(RuntimeError::NotMounted(self.id))?;
        inner.render()
    }
}

impl ComponentHandle for ComponentRef {
    fn id(&self) -> InstanceId {
        self.id
    }

    fn update(&self) {
        if let Err(err) = self.rerender() {
            log::warn!("component {}: update failed: {err}", self.id);
        }
    }
}

impl fmt::Debug for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRef").field("id", &self.id).finish()
    }
}

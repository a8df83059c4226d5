use std::rc::Rc;

use crate::fiber::WeakFiber;
use crate::platform::ComponentHandle;

/// Connects a state change to a re-render of the component that owns the state.
#[derive(Clone)]
pub(crate) struct UpdateTrigger {
    fiber: WeakFiber,
    instance: Rc<dyn ComponentHandle>,
}

impl UpdateTrigger {
    pub(crate) fn new(fiber: WeakFiber, instance: Rc<dyn ComponentHandle>) -> Self {
        Self { fiber, instance }
    }

    pub(crate) fn fire(&self) {
        let Some(fiber) = self.fiber.upgrade() else {
            log::warn!(
                "state changed on component {} after it was destroyed; ignoring",
                self.instance.id()
            );
            return;
        };
        if fiber.is_rendering() {
            // Picked up by the host once the render in progress commits.
            log::debug!("component {}: state changed during render", fiber.id());
            fiber.request_rerender();
            return;
        }
        fiber.snapshot_alternate();
        log::debug!("component {}: re-render requested", fiber.id());
        self.instance.update();
    }
}

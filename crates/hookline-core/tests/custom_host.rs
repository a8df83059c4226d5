//! Drives hooks from a host that does not use the bundled runtime.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use hookline_core::render_context;
use hookline_core::{
    deps, use_effect, use_layout_effect, use_reducer, use_state, ComponentHandle, Dispatch,
    EffectKind, Fiber, FlushPhase, HookKind, InstanceId, PhaseScheduler, RenderFrame,
};
use hookline_testing::CallLog;

type Task = Box<dyn FnOnce() + 'static>;

#[derive(Default)]
struct PhaseQueue {
    tasks: RefCell<Vec<(FlushPhase, Task)>>,
}

impl PhaseQueue {
    fn flush(&self, phase: FlushPhase) -> usize {
        let mut ran = 0;
        loop {
            let next = {
                let mut tasks = self.tasks.borrow_mut();
                tasks
                    .iter()
                    .position(|(queued, _)| *queued == phase)
                    .map(|index| tasks.remove(index).1)
            };
            match next {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }

    fn phases(&self) -> Vec<FlushPhase> {
        self.tasks.borrow().iter().map(|(phase, _)| *phase).collect()
    }
}

impl PhaseScheduler for PhaseQueue {
    fn schedule_at_phase(&self, phase: FlushPhase, callback: Task) {
        self.tasks.borrow_mut().push((phase, callback));
    }
}

struct HostComponent {
    fiber: Fiber,
    phases: Rc<PhaseQueue>,
    body: RefCell<Box<dyn FnMut()>>,
    renders: Cell<usize>,
}

struct HostHandle {
    id: InstanceId,
    host: Weak<HostComponent>,
}

impl ComponentHandle for HostHandle {
    fn id(&self) -> InstanceId {
        self.id
    }

    fn update(&self) {
        if let Some(host) = self.host.upgrade() {
            render(&host);
        }
    }
}

fn mount(id: InstanceId, body: impl FnMut() + 'static) -> Rc<HostComponent> {
    let host = Rc::new(HostComponent {
        fiber: Fiber::new(id),
        phases: Rc::new(PhaseQueue::default()),
        body: RefCell::new(Box::new(body)),
        renders: Cell::new(0),
    });
    render(&host);
    host
}

fn render(host: &Rc<HostComponent>) {
    let instance = Rc::new(HostHandle {
        id: host.fiber.id(),
        host: Rc::downgrade(host),
    });
    {
        let _guard = render_context::enter(RenderFrame::new(
            host.fiber.clone(),
            instance,
            host.phases.clone(),
        ));
        let mut body = host.body.borrow_mut();
        (*body)();
    }
    host.fiber.commit();
    host.renders.set(host.renders.get() + 1);
}

#[test]
fn host_rerenders_through_its_component_handle() {
    let dispatch: Rc<RefCell<Option<Dispatch<u32, bool>>>> = Rc::new(RefCell::new(None));
    let log = CallLog::new();
    let host = mount(900, {
        let dispatch = Rc::clone(&dispatch);
        let log = log.clone();
        move || {
            let (toggles, toggle) =
                use_reducer(|count: &u32, flip: bool| if flip { count + 1 } else { *count }, 0);
            log.record(format!("toggles {toggles}"));
            dispatch.borrow_mut().replace(toggle);
        }
    });

    let toggle = dispatch.borrow().clone().expect("dispatch captured");
    toggle.dispatch(true);
    toggle.dispatch(false);
    toggle.dispatch(true);

    assert_eq!(host.renders.get(), 4);
    assert_eq!(
        log.take(),
        vec!["toggles 0", "toggles 1", "toggles 1", "toggles 2"]
    );
    assert_eq!(host.fiber.hook_kinds(), vec![Some(HookKind::Reducer)]);
}

#[test]
fn effects_reach_the_host_at_their_phase() {
    let log = CallLog::new();
    let host = mount(901, {
        let log = log.clone();
        move || {
            use_effect(log.recorder("passive"), None);
            use_layout_effect(log.recorder("layout"), None);
        }
    });

    assert_eq!(
        host.phases.phases(),
        vec![EffectKind::Passive.phase(), EffectKind::Layout.phase()]
    );
    assert!(log.is_empty(), "the host decides when effects run");

    assert_eq!(host.phases.flush(FlushPhase::PrePaint), 1);
    assert_eq!(host.phases.flush(FlushPhase::PostPaint), 1);
    assert_eq!(log.take(), vec!["layout", "passive"]);
}

#[test]
fn dispatch_during_render_is_left_to_the_host() {
    let host = mount(902, || {
        let (seen, set_seen) = use_state(false);
        if !seen {
            set_seen.set(true);
        }
    });

    assert_eq!(host.renders.get(), 1);
    assert!(host.fiber.take_rerender_request());
    assert!(!host.fiber.take_rerender_request());

    render(&host);
    assert!(!host.fiber.take_rerender_request());
}

#[test]
fn unchanged_deps_skip_scheduling() {
    let value = Rc::new(Cell::new(1));
    let host = mount(903, {
        let value = Rc::clone(&value);
        move || use_effect(|| {}, deps![value.get()])
    });
    host.phases.flush(FlushPhase::PostPaint);

    render(&host);
    assert!(host.phases.phases().is_empty());

    value.set(2);
    render(&host);
    assert_eq!(host.phases.phases(), vec![FlushPhase::PostPaint]);
}

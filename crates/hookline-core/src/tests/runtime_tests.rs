use super::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Box<dyn FnOnce()>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let log_for_tasks = Rc::clone(&log);
    let task = move |name: &'static str| -> Box<dyn FnOnce()> {
        let log = Rc::clone(&log_for_tasks);
        Box::new(move || log.borrow_mut().push(name))
    };
    (log, task)
}

#[test]
fn frame_runs_pre_paint_then_paint_then_post_paint() {
    let rt = TestRuntime::new();
    let handle = rt.handle();
    let (log, task) = recorder();

    handle.schedule_at_phase(FlushPhase::PostPaint, task("post"));
    handle.schedule_at_phase(FlushPhase::PrePaint, task("pre"));
    let paint_log = Rc::clone(&log);
    let _paint = handle
        .frame_clock()
        .on_next_paint(move |_| paint_log.borrow_mut().push("paint"));

    rt.runtime().run_frame(0);

    assert_eq!(*log.borrow(), vec!["pre", "paint", "post"]);
    assert!(!rt.runtime().needs_frame());
}

#[test]
fn scheduling_work_requests_a_frame() {
    let rt = TestRuntime::new();
    assert_eq!(rt.frame_requests(), 0);
    assert!(!rt.runtime().needs_frame());

    rt.handle().schedule_at_phase(FlushPhase::PostPaint, Box::new(|| {}));

    assert!(rt.runtime().needs_frame());
    assert!(rt.frame_requests() >= 1);
}

#[test]
fn pre_paint_tasks_queued_while_flushing_run_in_the_same_flush() {
    let rt = TestRuntime::new();
    let handle = rt.handle();
    let (log, task) = recorder();
    let nested = task("nested");
    let outer_handle = handle.clone();
    let outer_log = Rc::clone(&log);
    handle.schedule_at_phase(
        FlushPhase::PrePaint,
        Box::new(move || {
            outer_log.borrow_mut().push("outer");
            outer_handle.schedule_at_phase(FlushPhase::PrePaint, nested);
        }),
    );

    assert_eq!(handle.flush_phase(FlushPhase::PrePaint), 2);
    assert_eq!(*log.borrow(), vec!["outer", "nested"]);
}

#[test]
fn post_paint_tasks_queued_while_flushing_wait_for_the_next_frame() {
    let rt = TestRuntime::new();
    let handle = rt.handle();
    let (log, task) = recorder();
    let later = task("later");
    let outer_handle = handle.clone();
    let outer_log = Rc::clone(&log);
    handle.schedule_at_phase(
        FlushPhase::PostPaint,
        Box::new(move || {
            outer_log.borrow_mut().push("first");
            outer_handle.schedule_at_phase(FlushPhase::PostPaint, later);
        }),
    );

    rt.runtime().run_frame(0);
    assert_eq!(*log.borrow(), vec!["first"]);
    assert!(rt.runtime().needs_frame());
    assert!(handle.has_pending(FlushPhase::PostPaint));

    rt.runtime().run_frame(16);
    assert_eq!(*log.borrow(), vec!["first", "later"]);
    assert!(!rt.runtime().has_pending_effects());
}

#[test]
fn cancelled_paint_callback_does_not_run() {
    let rt = TestRuntime::new();
    let clock = rt.runtime().frame_clock();
    let fired = Rc::new(Cell::new(false));
    let fired_in_callback = Rc::clone(&fired);

    let request = clock.on_next_paint(move |_| fired_in_callback.set(true));
    assert!(request.is_pending());
    assert!(rt.handle().has_paint_callbacks());
    request.cancel();

    assert!(!rt.handle().has_paint_callbacks());
    assert!(!rt.runtime().needs_frame());
    rt.runtime().run_frame(0);
    assert!(!fired.get());
}

#[test]
fn paint_request_is_settled_once_painted() {
    let rt = TestRuntime::new();
    let request = rt.runtime().frame_clock().on_next_paint(|_| {});

    rt.runtime().run_frame(0);

    assert!(!request.is_pending());
    assert_eq!(rt.runtime().frames_run(), 1);
}

#[test]
fn paint_sees_the_effects_of_its_frame() {
    let rt = TestRuntime::new();
    let handle = rt.handle();
    let (log, task) = recorder();
    handle.schedule_at_phase(FlushPhase::PrePaint, task("layout a"));
    handle.schedule_at_phase(FlushPhase::PrePaint, task("layout b"));
    handle.schedule_at_phase(FlushPhase::PostPaint, task("passive"));
    let seen = Rc::new(Cell::new(None));
    let seen_in_callback = Rc::clone(&seen);
    let _request = rt
        .runtime()
        .frame_clock()
        .on_next_paint(move |frame| seen_in_callback.set(Some(*frame)));

    let frame = rt.runtime().run_frame(48_500_000);

    assert_eq!(
        seen.get(),
        Some(PaintFrame {
            time_nanos: 48_500_000,
            number: 1,
            layout_effects_run: 2,
            passive_effects_due: 1,
        })
    );
    assert_eq!(seen.get(), Some(frame));
    assert_eq!(frame.time_millis(), 48);
    assert_eq!(log.borrow().len(), 3);
}

#[test]
fn paint_callback_registered_while_painting_waits_a_frame() {
    let rt = TestRuntime::new();
    let clock = rt.runtime().frame_clock();
    let frames = Rc::new(RefCell::new(Vec::new()));
    let held = Rc::new(RefCell::new(None));
    let (frames_outer, held_outer, clock_outer) =
        (Rc::clone(&frames), Rc::clone(&held), clock.clone());
    let _first = clock.on_next_paint(move |frame| {
        frames_outer.borrow_mut().push(frame.number);
        let frames_inner = Rc::clone(&frames_outer);
        let request =
            clock_outer.on_next_paint(move |frame| frames_inner.borrow_mut().push(frame.number));
        *held_outer.borrow_mut() = Some(request);
    });

    rt.runtime().run_frame(0);
    assert_eq!(*frames.borrow(), vec![1]);
    assert!(rt.runtime().needs_frame());

    rt.runtime().run_frame(16);
    assert_eq!(*frames.borrow(), vec![1, 2]);
}

#[test]
fn tasks_scheduled_after_runtime_drop_run_immediately() {
    let rt = TestRuntime::new();
    let handle = rt.handle();
    let (log, task) = recorder();
    drop(rt);

    assert!(!handle.is_alive());
    handle.schedule_at_phase(FlushPhase::PostPaint, task("orphan"));

    assert_eq!(*log.borrow(), vec!["orphan"]);
    assert!(!handle.frame_clock().on_next_paint(|_| {}).is_pending());
    assert_eq!(handle.run_frame(0), None);
}

#[test]
fn registry_tracks_mounted_components() {
    let rt = TestRuntime::new();
    let first = Component::mount(rt.runtime(), || {}).expect("mount");
    let second = Component::mount(rt.runtime(), || {
        let _ = use_state(0);
    })
    .expect("mount");
    assert_ne!(first.id(), second.id());
    assert_eq!(rt.runtime().mounted_components(), 2);

    let second_ref = second.handle();
    drop(second);

    assert_eq!(rt.runtime().mounted_components(), 1);
    assert_eq!(
        second_ref.rerender(),
        Err(RuntimeError::NotMounted(second_ref.id()))
    );
}

#[test]
fn component_ref_fails_once_runtime_is_gone() {
    let runtime = Runtime::new(Arc::new(DefaultScheduler));
    let component = Component::mount(&runtime, || {}).expect("mount");
    let component_ref = component.handle();
    drop(runtime);

    assert_eq!(component_ref.rerender(), Err(RuntimeError::RuntimeDropped));
}

#[test]
fn renders_request_a_frame() {
    let rt = TestRuntime::new();
    let _component = Component::mount(rt.runtime(), || {}).expect("mount");

    assert!(rt.runtime().needs_frame());
    assert!(rt.frame_requests() >= 1);
    rt.runtime().run_frame(0);
    assert!(!rt.runtime().needs_frame());
}

#[test]
fn default_config_bounds_rerender_passes() {
    let config = RuntimeConfig::default();
    assert_eq!(config.max_rerender_passes, 25);
    assert_eq!(TestRuntime::new().runtime().config(), config);
    assert_eq!(EffectKind::Layout.phase(), FlushPhase::PrePaint);
    assert_eq!(EffectKind::Passive.phase(), FlushPhase::PostPaint);
}

use super::*;
use hookline_core::{deps, use_effect, use_state, Component, Dispatch};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn mount_chain(runtime: &StdRuntime, last_step: u32) -> (Component, Rc<RefCell<Vec<u32>>>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let component = Component::mount(runtime.runtime(), {
        let seen = Rc::clone(&seen);
        move || {
            let (step, set_step) = use_state(0u32);
            let seen = Rc::clone(&seen);
            use_effect(
                move || {
                    seen.borrow_mut().push(step);
                    if step < last_step {
                        set_step.set(step + 1);
                    }
                },
                deps![step],
            );
        }
    })
    .expect("initial render");
    (component, seen)
}

#[test]
fn mount_and_dispatch_raise_the_signal() {
    let runtime = StdRuntime::new();
    let signal = runtime.signal();
    let dispatch: Rc<RefCell<Option<Dispatch<i32>>>> = Rc::new(RefCell::new(None));
    let component = Component::mount(runtime.runtime(), {
        let dispatch = Rc::clone(&dispatch);
        move || {
            let (_, set_value) = use_state(0);
            dispatch.borrow_mut().replace(set_value);
        }
    })
    .expect("initial render");
    assert!(signal.take(), "mounting should request a frame");
    assert!(!signal.is_raised());

    let before = signal.requests();
    let set_value = dispatch.borrow().clone().expect("dispatch captured during render");
    set_value.set(1);

    assert!(signal.take(), "dispatch should request a frame");
    assert!(signal.requests() > before);
    assert_eq!(component.render_count(), 2);
}

#[test]
fn pump_runs_passive_effects_and_reports_the_frame() {
    let runtime = StdRuntime::new();
    let effects = Rc::new(Cell::new(0));
    let _component = Component::mount(runtime.runtime(), {
        let effects = Rc::clone(&effects);
        move || {
            let effects = Rc::clone(&effects);
            use_effect(move || effects.set(effects.get() + 1), deps![]);
        }
    })
    .expect("initial render");
    assert_eq!(effects.get(), 0);

    let frame = runtime.pump().expect("a frame was requested");
    assert_eq!(effects.get(), 1);
    assert_eq!(frame.number, 1);
    assert_eq!(frame.passive_effects_due, 1);
    assert!(runtime.pump().is_none(), "nothing left to run");
}

#[test]
fn waker_fires_until_cleared() {
    let runtime = StdRuntime::new();
    let wakes = Arc::new(AtomicUsize::new(0));
    runtime.signal().set_waker({
        let wakes = Arc::clone(&wakes);
        move || {
            wakes.fetch_add(1, Ordering::SeqCst);
        }
    });

    runtime.handle().schedule();
    assert_eq!(wakes.load(Ordering::SeqCst), 1);

    runtime.signal().clear_waker();
    runtime.handle().schedule();
    assert_eq!(wakes.load(Ordering::SeqCst), 1);
    assert_eq!(runtime.signal().requests(), 2);
}

#[test]
fn wait_returns_once_another_thread_sees_a_request() {
    let runtime = StdRuntime::new();
    assert!(!runtime.signal().wait(Duration::from_millis(1)));

    let signal = runtime.signal();
    let waiter = thread::spawn(move || signal.wait(Duration::from_secs(10)));
    runtime.handle().schedule();

    assert!(waiter.join().expect("waiter thread"));
    assert!(runtime.signal().is_raised(), "waiting leaves the latch raised");
}

#[test]
fn pump_until_idle_follows_effect_chains() {
    let runtime = StdRuntime::new();
    let (_component, seen) = mount_chain(&runtime, 3);

    let frames = runtime.pump_until_idle(10);

    assert_eq!(*seen.borrow(), vec![0, 1, 2, 3]);
    assert_eq!(frames, 4);
    assert_eq!(runtime.runtime().frames_run(), 4);
}

#[test]
fn pump_until_idle_stops_at_the_frame_limit() {
    let runtime = StdRuntime::new();
    let (_component, seen) = mount_chain(&runtime, 10);

    assert_eq!(runtime.pump_until_idle(2), 2);
    assert_eq!(*seen.borrow(), vec![0, 1]);
    assert!(runtime.runtime().needs_frame());
}

#[test]
fn paced_frames_are_an_interval_apart() {
    let interval = Duration::from_millis(2);
    let runtime = StdRuntime::new().with_frame_interval(interval);
    let (_component, seen) = mount_chain(&runtime, 2);
    let stamps = Rc::new(RefCell::new(Vec::new()));
    let stamp_frame = {
        let stamps = Rc::clone(&stamps);
        move |frame: &PaintFrame| stamps.borrow_mut().push(frame.time_nanos)
    };
    let _first = runtime.frame_clock().on_next_paint(stamp_frame.clone());

    let frames = runtime.run_paced(10);

    assert_eq!(frames, 3);
    assert_eq!(*seen.borrow(), vec![0, 1, 2]);
    assert_eq!(stamps.borrow().len(), 1);

    let _next = runtime.frame_clock().on_next_paint(stamp_frame);
    assert_eq!(runtime.run_paced(10), 1);
    let stamps = stamps.borrow();
    assert!(stamps[1] - stamps[0] >= 2 * interval.as_nanos() as u64);
}

mod app;

use std::cell::RefCell;
use std::rc::Rc;

use app::{counter_app, CounterAction, CounterControls};
use hookline_core::Component;
use hookline_runtime_std::StdRuntime;

const MAX_FRAMES_PER_STEP: usize = 8;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    println!("=== Hookline Counter Example ===");
    println!("Dispatches a few actions and paints the result after each one.");
    println!("Set RUST_LOG=debug (or trace) to follow renders, commits and effect flushes.");
    println!();

    let runtime = StdRuntime::new();
    let controls = Rc::new(RefCell::new(CounterControls::default()));
    let screen = Rc::new(RefCell::new(String::new()));

    let component = match Component::mount(
        runtime.runtime(),
        counter_app(Rc::clone(&controls), Rc::clone(&screen)),
    ) {
        Ok(component) => component,
        Err(err) => {
            log::error!("failed to mount counter: {err}");
            return;
        }
    };
    paint(&runtime, &screen);

    let CounterControls { actions, label } = controls.borrow().clone();
    let (Some(actions), Some(label)) = (actions, label) else {
        log::error!("counter did not publish its dispatchers");
        return;
    };

    for action in [
        CounterAction::Increment,
        CounterAction::Increment,
        CounterAction::Decrement,
    ] {
        log::info!("dispatching {action:?}");
        actions.dispatch(action);
        paint(&runtime, &screen);
    }

    label.update(|current| current.to_uppercase());
    paint(&runtime, &screen);

    actions.dispatch(CounterAction::Reset);
    paint(&runtime, &screen);

    println!();
    println!("Rendered {} times.", component.render_count());
    component.destroy();

    // dispatchers outlive the component; dispatching now is a logged no-op
    actions.dispatch(CounterAction::Increment);
}

fn paint(runtime: &StdRuntime, screen: &Rc<RefCell<String>>) {
    let screen = Rc::clone(screen);
    let _paint = runtime.frame_clock().on_next_paint(move |frame| {
        println!("[{:>4}ms] #{} {}", frame.time_millis(), frame.number, screen.borrow())
    });
    let frames = runtime.run_paced(MAX_FRAMES_PER_STEP);
    log::debug!("pumped {frames} frame(s)");
}

use std::cell::RefCell;
use std::rc::Rc;

use hookline_core::{deps, use_effect, use_layout_effect, use_reducer, use_state, Dispatch};

#[derive(Clone, Copy, Debug)]
pub enum CounterAction {
    Increment,
    Decrement,
    Reset,
}

fn reduce(count: &i64, action: CounterAction) -> i64 {
    match action {
        CounterAction::Increment => count + 1,
        CounterAction::Decrement => count - 1,
        CounterAction::Reset => 0,
    }
}

/// Dispatchers the counter hands out on every render.
#[derive(Clone, Default)]
pub struct CounterControls {
    pub actions: Option<Dispatch<i64, CounterAction>>,
    pub label: Option<Dispatch<String>>,
}

/// What the counter last rendered, read by the paint step.
pub type Screen = Rc<RefCell<String>>;

/// Counter body: reducer state, a text label, a layout pass sizing the label
/// and a passive effect reporting each committed count.
pub fn counter_app(
    controls: Rc<RefCell<CounterControls>>,
    screen: Screen,
) -> impl FnMut() + 'static {
    move || {
        let (count, actions) = use_reducer(reduce, 0);
        let (label, set_label) = use_state(String::from("clicks"));
        let text = format!("{label}: {count}");

        let layout_deps = deps![text.clone()];
        let measured = text.clone();
        let target = Rc::clone(&screen);
        use_layout_effect(
            move || {
                log::info!("layout: {measured:?} is {} columns wide", measured.len());
                *target.borrow_mut() = measured.clone();
            },
            layout_deps,
        );

        let committed_deps = deps![count, label.clone()];
        use_effect(
            move || log::info!("committed {label:?} = {count}"),
            committed_deps,
        );

        let mut controls = controls.borrow_mut();
        controls.actions = Some(actions);
        controls.label = Some(set_label);
    }
}

use std::any::type_name;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::HookOrderError;
use crate::hook::{HookKind, HookRecord, HookState, StateSlot};
use crate::render_context::{self, RenderFrame};
use crate::update::UpdateTrigger;

enum Reducer<S, A> {
    /// The action is the next state.
    Replace(fn(A) -> S),
    Reduce(Rc<dyn Fn(&S, A) -> S>),
}

struct DispatchInner<S, A> {
    record: Weak<HookRecord>,
    reducer: Reducer<S, A>,
    trigger: UpdateTrigger,
}

/// Dispatcher bound to one state or reducer hook.
///
/// Created once when the hook mounts and returned unchanged by every later
/// render. Each call mutates the hook's value and re-renders the owning
/// component before returning; calls are never batched.
pub struct Dispatch<S, A = S> {
    inner: Rc<DispatchInner<S, A>>,
}

impl<S, A> Clone for Dispatch<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S, A> PartialEq for Dispatch<S, A> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<S, A> Eq for Dispatch<S, A> {}

impl<S, A> fmt::Debug for Dispatch<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch")
            .field("state", &type_name::<S>())
            .field("action", &type_name::<A>())
            .finish()
    }
}

impl<S: 'static, A: 'static> Dispatch<S, A> {
    fn new(record: Weak<HookRecord>, reducer: Reducer<S, A>, trigger: UpdateTrigger) -> Self {
        Self {
            inner: Rc::new(DispatchInner {
                record,
                reducer,
                trigger,
            }),
        }
    }

    pub fn dispatch(&self, action: A) {
        let Some(record) = self.inner.record.upgrade() else {
            log::warn!("dispatch on a hook whose component was destroyed; ignoring");
            return;
        };
        {
            let mut state = record.state_mut();
            let (HookState::State(slot) | HookState::Reducer(slot)) = &mut *state else {
                log::warn!("dispatch target is no longer a state hook; ignoring");
                return;
            };
            let Some(value) = slot.value.downcast_mut::<S>() else {
                log::warn!("dispatch target no longer holds a `{}`", type_name::<S>());
                return;
            };
            *value = match &self.inner.reducer {
                Reducer::Replace(into_state) => into_state(action),
                Reducer::Reduce(reduce) => reduce(value, action),
            };
        }
        self.inner.trigger.fire();
    }
}

impl<S: 'static> Dispatch<S, S> {
    pub fn set(&self, value: S) {
        self.dispatch(value);
    }
}

impl<S: Clone + 'static> Dispatch<S, S> {
    /// Dispatches the value computed from the hook's latest state.
    pub fn update(&self, f: impl FnOnce(&S) -> S) {
        let latest = self.inner.record.upgrade().and_then(|record| {
            let state = record.state();
            let latest = match &*state {
                HookState::State(slot) | HookState::Reducer(slot) => {
                    slot.value.downcast_ref::<S>().cloned()
                }
                _ => None,
            };
            latest
        });
        match latest {
            Some(latest) => self.dispatch(f(&latest)),
            None => log::warn!("update on a hook whose component was destroyed; ignoring"),
        }
    }
}

/// Returns the hook's state and its dispatcher; dispatching a value replaces the state.
pub fn use_state<S: Clone + 'static>(initial: S) -> (S, Dispatch<S>) {
    use_state_with(move || initial)
}

/// Like [`use_state`], with the initial value computed on mount only.
pub fn use_state_with<S: Clone + 'static>(init: impl FnOnce() -> S) -> (S, Dispatch<S>) {
    expect_hook(try_use_state_with(init))
}

/// Returns the hook's state and a dispatcher that folds actions through `reducer`.
pub fn use_reducer<S, A>(
    reducer: impl Fn(&S, A) -> S + 'static,
    initial: S,
) -> (S, Dispatch<S, A>)
where
    S: Clone + 'static,
    A: 'static,
{
    expect_hook(try_use_reducer(reducer, initial))
}

pub fn try_use_state_with<S: Clone + 'static>(
    init: impl FnOnce() -> S,
) -> Result<(S, Dispatch<S>), HookOrderError> {
    reducer_hook(HookKind::State, Reducer::Replace(std::convert::identity), init)
}

pub fn try_use_reducer<S, A>(
    reducer: impl Fn(&S, A) -> S + 'static,
    initial: S,
) -> Result<(S, Dispatch<S, A>), HookOrderError>
where
    S: Clone + 'static,
    A: 'static,
{
    reducer_hook(HookKind::Reducer, Reducer::Reduce(Rc::new(reducer)), move || initial)
}

fn reducer_hook<S, A>(
    kind: HookKind,
    reducer: Reducer<S, A>,
    init: impl FnOnce() -> S,
) -> Result<(S, Dispatch<S, A>), HookOrderError>
where
    S: Clone + 'static,
    A: 'static,
{
    render_context::try_with_render_frame(|frame| mount_or_read(frame, kind, reducer, init))
        .unwrap_or(Err(HookOrderError::OutsideRender))
}

fn mount_or_read<S, A>(
    frame: &RenderFrame,
    kind: HookKind,
    reducer: Reducer<S, A>,
    init: impl FnOnce() -> S,
) -> Result<(S, Dispatch<S, A>), HookOrderError>
where
    S: Clone + 'static,
    A: 'static,
{
    let fiber = frame.fiber();
    let slot = fiber.next_hook()?;
    let position = slot.position();
    let mounted = slot
        .current
        .as_ref()
        .is_some_and(|current| current.kind().is_some());

    if !mounted {
        let dispatch = Dispatch::new(
            Rc::downgrade(&slot.record),
            reducer,
            UpdateTrigger::new(fiber.downgrade(), frame.instance()),
        );
        let value = init();
        let stored = StateSlot {
            value: Box::new(value.clone()),
            dispatch: Box::new(dispatch.clone()),
        };
        *slot.record.state_mut() = match kind {
            HookKind::Reducer => HookState::Reducer(stored),
            _ => HookState::State(stored),
        };
        return Ok((value, dispatch));
    }

    let state = slot.record.state();
    let stored = match (&*state, kind) {
        (HookState::State(stored), HookKind::State)
        | (HookState::Reducer(stored), HookKind::Reducer) => stored,
        (other, _) => {
            return Err(HookOrderError::KindMismatch {
                instance: fiber.id(),
                position,
                expected: kind,
                found: other.kind().unwrap_or(kind),
            });
        }
    };
    let type_mismatch = || HookOrderError::TypeMismatch {
        instance: fiber.id(),
        position,
        expected: type_name::<S>(),
    };
    let value = stored
        .value
        .downcast_ref::<S>()
        .ok_or_else(type_mismatch)?
        .clone();
    let dispatch = stored
        .dispatch
        .downcast_ref::<Dispatch<S, A>>()
        .ok_or_else(type_mismatch)?
        .clone();
    Ok((value, dispatch))
}

pub(crate) fn expect_hook<T>(result: Result<T, HookOrderError>) -> T {
    result.unwrap_or_else(|err| panic!("{err}"))
}

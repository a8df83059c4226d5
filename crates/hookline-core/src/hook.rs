use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::effect::{EffectDescriptor, EffectKind};

pub(crate) type HookRef = Rc<HookRecord>;

/// What a hook record was created for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HookKind {
    State,
    Reducer,
    Effect(EffectKind),
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookKind::State => f.write_str("a state hook"),
            HookKind::Reducer => f.write_str("a reducer hook"),
            HookKind::Effect(EffectKind::Passive) => f.write_str("an effect hook"),
            HookKind::Effect(EffectKind::Layout) => f.write_str("a layout effect hook"),
        }
    }
}

/// Persisted value of a state or reducer hook together with its bound dispatcher.
pub(crate) struct StateSlot {
    pub(crate) value: Box<dyn Any>,
    pub(crate) dispatch: Box<dyn Any>,
}

pub(crate) enum HookState {
    /// Allocated by the walker, not yet written by its hook.
    Vacant,
    State(StateSlot),
    Reducer(StateSlot),
    Effect(EffectDescriptor),
}

impl HookState {
    pub(crate) fn kind(&self) -> Option<HookKind> {
        match self {
            HookState::Vacant => None,
            HookState::State(_) => Some(HookKind::State),
            HookState::Reducer(_) => Some(HookKind::Reducer),
            HookState::Effect(effect) => Some(HookKind::Effect(effect.kind)),
        }
    }
}

/// One node of a component's hook list.
///
/// Node identity is stable for the lifetime of the component; renders after
/// the first mutate `state` in place.
pub struct HookRecord {
    position: usize,
    state: RefCell<HookState>,
    next: RefCell<Option<HookRef>>,
}

impl HookRecord {
    pub(crate) fn new(position: usize) -> HookRef {
        Rc::new(Self {
            position,
            state: RefCell::new(HookState::Vacant),
            next: RefCell::new(None),
        })
    }

    pub(crate) fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn kind(&self) -> Option<HookKind> {
        self.state.borrow().kind()
    }

    pub(crate) fn state(&self) -> Ref<'_, HookState> {
        self.state.borrow()
    }

    pub(crate) fn state_mut(&self) -> RefMut<'_, HookState> {
        self.state.borrow_mut()
    }

    pub(crate) fn next(&self) -> Option<HookRef> {
        self.next.borrow().clone()
    }

    pub(crate) fn link(&self, next: HookRef) {
        *self.next.borrow_mut() = Some(next);
    }

    /// Detaches everything after this node and returns the detached head.
    pub(crate) fn unlink(&self) -> Option<HookRef> {
        self.next.borrow_mut().take()
    }
}

impl fmt::Debug for HookRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRecord")
            .field("position", &self.position)
            .field("kind", &self.kind())
            .finish()
    }
}

/// Singly-linked hook list owned through its head.
#[derive(Default)]
pub(crate) struct HookList {
    head: Option<HookRef>,
}

impl HookList {
    pub(crate) fn head(&self) -> Option<HookRef> {
        self.head.clone()
    }

    pub(crate) fn set_head(&mut self, head: Option<HookRef>) {
        self.head = head;
    }

    pub(crate) fn take(&mut self) -> HookList {
        HookList {
            head: self.head.take(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub(crate) fn iter(&self) -> HookIter {
        HookIter {
            next: self.head.clone(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.iter().count()
    }
}

impl Drop for HookList {
    fn drop(&mut self) {
        // Unlink iteratively so long lists do not recurse through `Rc` drops.
        let mut next = self.head.take();
        while let Some(node) = next {
            match Rc::try_unwrap(node) {
                Ok(record) => next = record.next.into_inner(),
                Err(_) => break,
            }
        }
    }
}

pub(crate) struct HookIter {
    next: Option<HookRef>,
}

impl Iterator for HookIter {
    type Item = HookRef;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.next();
        Some(current)
    }
}

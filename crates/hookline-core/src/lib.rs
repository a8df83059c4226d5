#![doc = r"Core runtime pieces for Hookline: per-component state and effects kept in a positional hook list."]

pub extern crate self as hookline_core;

mod collections;
pub mod component;
pub mod deps;
pub mod effect;
pub mod error;
pub mod fiber;
pub mod frame_clock;
mod hook;
pub mod platform;
pub mod render_context;
pub mod runtime;
mod scheduler;
mod state;
mod update;
mod walker;

pub use component::{Component, ComponentRef};
pub use deps::{Dep, Deps, Identity};
pub use effect::{try_use_effect, use_effect, use_layout_effect, EffectKind};
pub use error::{HookOrderError, RuntimeError};
pub use fiber::Fiber;
pub use frame_clock::{FrameClock, PaintFrame, PaintRequest};
pub use hook::HookKind;
pub use platform::{ComponentHandle, FlushPhase, PhaseScheduler, RuntimeScheduler};
pub use render_context::{current_instance, RenderFrame};
pub use runtime::{DefaultScheduler, Runtime, RuntimeConfig, RuntimeHandle};
pub use scheduler::EffectScheduler;
pub use state::{
    try_use_reducer, try_use_state_with, use_reducer, use_state, use_state_with, Dispatch,
};

#[cfg(test)]
pub use runtime::{TestRuntime, TestScheduler};

use std::sync::atomic::{AtomicUsize, Ordering};

/// Identity of a mounted component instance.
pub type InstanceId = usize;

pub(crate) type PaintCallbackId = u64;

static NEXT_INSTANCE_ID: AtomicUsize = AtomicUsize::new(1);

pub(crate) fn next_instance_id() -> InstanceId {
    NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed)
}

#[cfg(test)]
#[path = "tests/hook_list_tests.rs"]
mod hook_list_tests;

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod state_tests;

#[cfg(test)]
#[path = "tests/effect_tests.rs"]
mod effect_tests;

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod runtime_tests;

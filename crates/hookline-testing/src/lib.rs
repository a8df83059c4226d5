//! Testing utilities and harness for Hookline

pub mod testing;

// Re-export testing utilities
pub use testing::*;

pub mod prelude {
    pub use crate::testing::*;
    pub use hookline_core::{
        deps, use_effect, use_layout_effect, use_reducer, use_state, use_state_with, Dispatch,
    };
}

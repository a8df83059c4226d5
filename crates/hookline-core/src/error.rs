use thiserror::Error;

use crate::hook::HookKind;
use crate::InstanceId;

/// Detected violation of the hook calling protocol.
///
/// Hooks must be called unconditionally, in the same order, on every render
/// of a component, and only while that component is rendering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookOrderError {
    #[error("hook called outside of an active render")]
    OutsideRender,

    #[error(
        "component {instance} called more hooks than on its previous render \
         (hook #{position} has no record)"
    )]
    ListExhausted { instance: InstanceId, position: usize },

    #[error("component {instance} hook #{position} was recorded as {found}, now called as {expected}")]
    KindMismatch {
        instance: InstanceId,
        position: usize,
        expected: HookKind,
        found: HookKind,
    },

    #[error("component {instance} hook #{position} does not hold a `{expected}`")]
    TypeMismatch {
        instance: InstanceId,
        position: usize,
        expected: &'static str,
    },
}

/// Failures of the reference host runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("component {0} is not mounted")]
    NotMounted(InstanceId),

    #[error("runtime dropped")]
    RuntimeDropped,

    #[error("component {id} kept requesting re-renders during render after {passes} passes")]
    RerenderLimit { id: InstanceId, passes: usize },
}

use std::rc::Rc;

use crate::deps::Deps;
use crate::error::HookOrderError;
use crate::hook::{HookKind, HookState};
use crate::render_context::{self, RenderFrame};
use crate::state::expect_hook;

/// Flush timing of an effect.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Runs after the render is applied, before the next paint.
    Layout,
    /// Runs after the next paint.
    Passive,
}

pub(crate) type EffectCallback = Rc<dyn Fn() + 'static>;

pub(crate) struct EffectDescriptor {
    pub(crate) kind: EffectKind,
    pub(crate) callback: EffectCallback,
    pub(crate) deps: Option<Deps>,
}

/// Registers a passive effect, run after the next paint.
///
/// `deps` of `None` re-runs the effect after every render. With a list, the
/// effect runs on mount and afterwards only on renders where the list differs
/// from the one stored by the previous run. `deps![]` runs once.
///
/// The callback observes the values it captured during the render that
/// scheduled it. A scheduled run is never cancelled, even when the component
/// renders again before it fires.
pub fn use_effect(callback: impl Fn() + 'static, deps: impl Into<Option<Deps>>) {
    expect_hook(try_use_effect(EffectKind::Passive, callback, deps));
}

/// Registers a layout effect, run before the next paint.
pub fn use_layout_effect(callback: impl Fn() + 'static, deps: impl Into<Option<Deps>>) {
    expect_hook(try_use_effect(EffectKind::Layout, callback, deps));
}

pub fn try_use_effect(
    kind: EffectKind,
    callback: impl Fn() + 'static,
    deps: impl Into<Option<Deps>>,
) -> Result<(), HookOrderError> {
    let deps = deps.into();
    render_context::try_with_render_frame(|frame| update_effect(frame, kind, Rc::new(callback), deps))
        .unwrap_or(Err(HookOrderError::OutsideRender))
}

fn update_effect(
    frame: &RenderFrame,
    kind: EffectKind,
    callback: EffectCallback,
    deps: Option<Deps>,
) -> Result<(), HookOrderError> {
    let slot = frame.fiber().next_hook()?;
    if let Some(current) = slot.current.as_ref() {
        let previous = current.state();
        match &*previous {
            HookState::Vacant => {}
            HookState::Effect(effect) if effect.kind == kind => {
                if let (Some(next), Some(prev)) = (deps.as_ref(), effect.deps.as_ref()) {
                    if next.same_as(prev) {
                        log::trace!(
                            "component {}: effect #{} skipped, dependencies unchanged",
                            frame.fiber().id(),
                            slot.position()
                        );
                        return Ok(());
                    }
                }
            }
            other => {
                return Err(HookOrderError::KindMismatch {
                    instance: frame.fiber().id(),
                    position: slot.position(),
                    expected: HookKind::Effect(kind),
                    // `Vacant` is matched above.
                    found: other.kind().unwrap_or(HookKind::Effect(kind)),
                });
            }
        }
    }
    *slot.record.state_mut() = HookState::Effect(EffectDescriptor {
        kind,
        callback: Rc::clone(&callback),
        deps,
    });
    frame.effects().schedule(kind, callback);
    Ok(())
}

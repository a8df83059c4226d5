use std::rc::Rc;

use crate::effect::{EffectCallback, EffectKind};
use crate::platform::{FlushPhase, PhaseScheduler};

impl EffectKind {
    /// Phase of the render/paint cycle at which effects of this kind run.
    pub const fn phase(self) -> FlushPhase {
        match self {
            EffectKind::Layout => FlushPhase::PrePaint,
            EffectKind::Passive => FlushPhase::PostPaint,
        }
    }
}

/// Hands effect callbacks to the host at the phase their kind requires.
#[derive(Clone)]
pub struct EffectScheduler {
    phases: Rc<dyn PhaseScheduler>,
}

impl EffectScheduler {
    pub fn new(phases: Rc<dyn PhaseScheduler>) -> Self {
        Self { phases }
    }

    pub(crate) fn schedule(&self, kind: EffectKind, callback: EffectCallback) {
        let phase = kind.phase();
        log::trace!("scheduling {kind:?} effect at {phase:?}");
        self.phases
            .schedule_at_phase(phase, Box::new(move || callback()));
    }
}

//! Positional matching of hook calls to hook records.
//!
//! The n-th hook call of a render always resolves to the n-th record of the
//! component's list. On mount the list is built one call at a time; on later
//! renders the committed list is walked in lock-step with the calls.

use crate::error::HookOrderError;
use crate::hook::{HookList, HookRecord, HookRef};
use crate::InstanceId;

/// Record resolved for one hook call.
pub(crate) struct HookSlot {
    /// Node written by this call.
    pub(crate) record: HookRef,
    /// Same position in the committed list; `None` while mounting.
    pub(crate) current: Option<HookRef>,
}

impl HookSlot {
    pub(crate) fn position(&self) -> usize {
        self.record.position()
    }
}

/// Cursor into the lists of the render in progress.
#[derive(Default)]
pub(crate) struct HookCursor {
    work_in_progress: Option<HookRef>,
    current: Option<HookRef>,
    position: usize,
}

impl HookCursor {
    pub(crate) fn reset(&mut self) {
        self.work_in_progress = None;
        self.current = None;
        self.position = 0;
    }

    pub(crate) fn position(&self) -> usize {
        self.position
    }

    /// Resolves the record for the next hook call.
    ///
    /// `current` is the committed list of the previous render, or `None` when
    /// the component is mounting.
    pub(crate) fn advance(
        &mut self,
        instance: InstanceId,
        current: Option<&HookList>,
        work_in_progress: &mut HookList,
    ) -> Result<HookSlot, HookOrderError> {
        let position = self.position;
        let slot = match current {
            Some(current) => {
                let (record, current_hook) = match self.work_in_progress.as_ref() {
                    None => {
                        // head hook: read the committed list this render
                        let head = current.head();
                        work_in_progress.set_head(head.clone());
                        (head.clone(), head)
                    }
                    Some(previous) => (
                        previous.next(),
                        self.current.as_ref().and_then(|hook| hook.next()),
                    ),
                };
                let Some(record) = record else {
                    return Err(HookOrderError::ListExhausted { instance, position });
                };
                log::trace!("component {instance}: reusing hook #{position}");
                HookSlot {
                    record,
                    current: current_hook,
                }
            }
            None => {
                let record = HookRecord::new(position);
                match self.work_in_progress.as_ref() {
                    Some(tail) => tail.link(record.clone()),
                    None => work_in_progress.set_head(Some(record.clone())),
                }
                log::trace!("component {instance}: allocated hook #{position}");
                HookSlot {
                    record,
                    current: None,
                }
            }
        };
        self.work_in_progress = Some(slot.record.clone());
        self.current = slot.current.clone();
        self.position += 1;
        Ok(slot)
    }

    /// Closes the walk of an update render.
    ///
    /// Records the render never reached are detached from the list; returns how
    /// many were dropped.
    pub(crate) fn finish_update(&mut self, current: &HookList) -> usize {
        match self.work_in_progress.as_ref() {
            Some(last) => last
                .unlink()
                .map_or(0, |tail| HookList::from_head(tail).len()),
            None => current.len(),
        }
    }
}

impl HookList {
    pub(crate) fn from_head(head: HookRef) -> Self {
        let mut list = HookList::default();
        list.set_head(Some(head));
        list
    }
}

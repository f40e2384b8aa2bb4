//! Output sink trait, error types, and change gating.

use core::future::Future;
use heapless::Vec;
use stick_proto::{StickFieldUpdate, StickState, BUTTON_COUNT};

/// Most updates a single cycle can produce: two axes, every button, the hat.
pub const MAX_UPDATES: usize = 2 + BUTTON_COUNT + 1;

/// Updates produced by one cycle.
pub type UpdateBatch = Vec<StickFieldUpdate, MAX_UPDATES>;

/// Error type for output operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputError {
    /// USB/communication I/O error.
    Io,
    /// Device not ready (e.g., USB not enumerated).
    NotReady,
}

/// Async trait for the HID boundary.
///
/// The controller only calls [`send`](OutputSink::send) with fields that
/// changed since the last successful send.
pub trait OutputSink {
    /// Apply the updates and publish the resulting report.
    fn send(&mut self, updates: &[StickFieldUpdate]) -> impl Future<Output = Result<(), OutputError>>;

    /// Check if the output is ready to accept data.
    fn is_ready(&self) -> bool;
}

/// Last state handed to the output, used to suppress redundant updates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputCache {
    last: Option<StickState>,
}

impl OutputCache {
    #[must_use]
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Fields of `state` that differ from what was last emitted.
    ///
    /// Before anything has been emitted, every field counts as changed.
    #[must_use]
    pub fn changes(&self, state: &StickState) -> UpdateBatch {
        let mut updates = UpdateBatch::new();
        let last = self.last;

        // Capacity covers every field, pushes cannot fail.
        if last.map(|l| l.roll) != Some(state.roll) {
            let _ = updates.push(StickFieldUpdate::Roll(state.roll));
        }
        if last.map(|l| l.pitch) != Some(state.pitch) {
            let _ = updates.push(StickFieldUpdate::Pitch(state.pitch));
        }
        for index in 0..BUTTON_COUNT {
            let pressed = state.buttons.is_pressed(index);
            if last.map(|l| l.buttons.is_pressed(index)) != Some(pressed) {
                let _ = updates.push(StickFieldUpdate::Button { index, pressed });
            }
        }
        if last.map(|l| l.hat) != Some(state.hat) {
            let _ = updates.push(StickFieldUpdate::Hat(state.hat));
        }

        updates
    }

    /// Record `state` as emitted.
    pub fn commit(&mut self, state: &StickState) {
        self.last = Some(*state);
    }

    /// Last emitted state, if any.
    #[must_use]
    pub fn last(&self) -> Option<&StickState> {
        self.last.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stick_proto::{Buttons, Hat};

    #[test]
    fn test_first_emit_sends_everything() {
        let cache = OutputCache::new();
        let updates = cache.changes(&StickState::neutral());
        assert_eq!(updates.len(), MAX_UPDATES);
        assert_eq!(updates[0], StickFieldUpdate::Roll(0));
        assert_eq!(updates[MAX_UPDATES - 1], StickFieldUpdate::Hat(Hat::Centered));
    }

    #[test]
    fn test_unchanged_state_sends_nothing() {
        let mut cache = OutputCache::new();
        let state = StickState {
            roll: 100,
            pitch: -100,
            buttons: Buttons::WEAPON_RELEASE,
            hat: Hat::Left,
        };
        cache.commit(&state);
        assert!(cache.changes(&state).is_empty());
    }

    #[test]
    fn test_only_changed_fields() {
        let mut cache = OutputCache::new();
        let mut state = StickState::neutral();
        cache.commit(&state);

        state.pitch = 4000;
        state.buttons = Buttons::SENSOR_DEPRESS;
        let updates = cache.changes(&state);
        assert_eq!(
            updates.as_slice(),
            &[
                StickFieldUpdate::Pitch(4000),
                StickFieldUpdate::Button {
                    index: 9,
                    pressed: true
                },
            ]
        );
    }

    #[test]
    fn test_changes_do_not_update_cache() {
        let mut cache = OutputCache::new();
        cache.commit(&StickState::neutral());
        let state = StickState {
            hat: Hat::Up,
            ..StickState::neutral()
        };
        assert_eq!(cache.changes(&state).len(), 1);
        assert_eq!(cache.changes(&state).len(), 1);
        cache.commit(&state);
        assert!(cache.changes(&state).is_empty());
    }
}

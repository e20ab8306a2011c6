use std::fmt;

use serde::Serialize;
use tracing::debug;

/// Visibility of the media widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum PresentationState {
    /// Not shown; also the resting state after a collapse
    #[default]
    Hidden,
    /// Animating towards the expanded size
    Expanding,
    /// Fully shown
    Expanded,
    /// Animating towards zero size
    Collapsing,
}

impl PresentationState {
    /// Resting state after a collapse finished.
    pub const COLLAPSED: Self = Self::Hidden;
}

impl fmt::Display for PresentationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Hidden => "Hidden",
            Self::Expanding => "Expanding",
            Self::Expanded => "Expanded",
            Self::Collapsing => "Collapsing",
        };
        f.write_str(name)
    }
}

/// A transition the machine just started. The caller runs the animation and
/// reports completion with [`generation`](Self::generation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State entered
    pub state: PresentationState,
    /// Generation of the animation started for it
    pub generation: u64,
    /// Size the animation runs towards
    pub target_size: u32,
    /// Generation of the animation this transition cancelled, if one was in flight
    pub cancelled: Option<u64>,
}

/// Drives the widget visibility from the selection.
///
/// Every transition start bumps the generation and replaces the in-flight
/// animation, so at most one animation is live and completions reporting
/// any other generation are ignored.
#[derive(Debug, Default)]
pub struct PresentationStateMachine {
    state: PresentationState,
    generation: u64,
    in_flight: Option<u64>,
}

impl PresentationStateMachine {
    /// Machine in the `Hidden` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> PresentationState {
        self.state
    }

    /// Generation of the animation in flight, if any.
    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    /// Feed the current selection. `expand_size` is the size to expand to
    /// when a transition to `Expanding` starts.
    ///
    /// Returns the started transition, or `None` when the state is unchanged
    /// (content updates while expanded never change state).
    pub fn on_selection(&mut self, selected: bool, expand_size: u32) -> Option<Transition> {
        use PresentationState::*;

        match (self.state, selected) {
            (Hidden | Collapsing, true) => Some(self.begin(Expanding, expand_size)),
            (Expanding | Expanded, false) => Some(self.begin(Collapsing, 0)),
            _ => None,
        }
    }

    /// Report an animation as finished. Returns the new resting state, or
    /// `None` if `generation` is not the animation in flight.
    pub fn on_animation_complete(&mut self, generation: u64) -> Option<PresentationState> {
        if self.in_flight != Some(generation) {
            debug!(generation, in_flight = ?self.in_flight, "Ignoring stale animation completion");
            return None;
        }

        self.in_flight = None;
        self.state = match self.state {
            PresentationState::Expanding => PresentationState::Expanded,
            PresentationState::Collapsing => PresentationState::COLLAPSED,
            settled => return Some(settled),
        };

        debug!(generation, state = %self.state, "Animation complete");
        Some(self.state)
    }

    fn begin(&mut self, state: PresentationState, target_size: u32) -> Transition {
        let cancelled = self.in_flight.take();
        self.generation += 1;
        self.in_flight = Some(self.generation);
        self.state = state;

        debug!(generation = self.generation, %state, target_size, ?cancelled, "Transition started");
        Transition {
            state,
            generation: self.generation,
            target_size,
            cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use PresentationState::*;

    #[test]
    fn selection_expands_then_completes() {
        let mut machine = PresentationStateMachine::new();

        let transition = machine.on_selection(true, 240).unwrap();
        assert_eq!(transition.state, Expanding);
        assert_eq!(transition.target_size, 240);
        assert_eq!(transition.cancelled, None);

        assert_eq!(machine.on_selection(true, 260), None);
        assert_eq!(machine.on_animation_complete(transition.generation), Some(Expanded));
        assert_eq!(machine.in_flight(), None);
    }

    #[test]
    fn content_updates_while_expanded_keep_state() {
        let mut machine = PresentationStateMachine::new();
        let generation = machine.on_selection(true, 200).unwrap().generation;
        machine.on_animation_complete(generation);

        assert_eq!(machine.on_selection(true, 300), None);
        assert_eq!(machine.state(), Expanded);
    }

    #[test]
    fn stale_completion_after_cancel_is_ignored() {
        let mut machine = PresentationStateMachine::new();
        let expand = machine.on_selection(true, 200).unwrap();

        let collapse = machine.on_selection(false, 200).unwrap();
        assert_eq!(collapse.state, Collapsing);
        assert_eq!(collapse.target_size, 0);
        assert_eq!(collapse.cancelled, Some(expand.generation));

        assert_eq!(machine.on_animation_complete(expand.generation), None);
        assert_eq!(machine.state(), Collapsing);

        assert_eq!(machine.on_animation_complete(collapse.generation), Some(Hidden));
        assert_eq!(machine.state(), PresentationState::COLLAPSED);
    }

    #[test]
    fn reselection_while_collapsing_expands_again() {
        let mut machine = PresentationStateMachine::new();
        let expand = machine.on_selection(true, 200).unwrap();
        machine.on_animation_complete(expand.generation);

        let collapse = machine.on_selection(false, 0).unwrap();
        let again = machine.on_selection(true, 220).unwrap();
        assert_eq!(again.state, Expanding);
        assert_eq!(again.cancelled, Some(collapse.generation));
        assert!(again.generation > collapse.generation);

        assert_eq!(machine.on_animation_complete(collapse.generation), None);
        assert_eq!(machine.on_animation_complete(again.generation), Some(Expanded));
    }

    #[test]
    fn empty_selection_while_hidden_does_nothing() {
        let mut machine = PresentationStateMachine::new();
        assert_eq!(machine.on_selection(false, 200), None);
        assert_eq!(machine.on_animation_complete(0), None);
        assert_eq!(machine.state(), Hidden);
    }
}

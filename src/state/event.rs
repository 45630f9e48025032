use super::model::TransitionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEvent {
    /// A theme, auto-mode or effective theme change became visible.
    Begin,
    /// The transition timer fired.
    Elapsed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub from: Option<TransitionState>,
    pub event: TransitionEvent,
    pub to: TransitionState,
}

impl StateTransition {
    pub const fn new(
        from: Option<TransitionState>,
        event: TransitionEvent,
        to: TransitionState,
    ) -> Self {
        Self { from, event, to }
    }
}

use std::collections::VecDeque;

use super::error::{StateError, StateResult};
use super::{event::StateTransition, TransitionEvent, TransitionState};

const TRANSITION_HISTORY_LIMIT: usize = 32;

#[derive(Debug)]
pub struct TransitionMachine {
    state: TransitionState,
    transition_history: VecDeque<StateTransition>,
}

impl TransitionMachine {
    pub fn new() -> Self {
        Self {
            state: TransitionState::default(),
            transition_history: VecDeque::new(),
        }
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    pub fn can_transition(&self, event: TransitionEvent) -> bool {
        self.next_state(event).is_some()
    }

    pub fn next_state(&self, event: TransitionEvent) -> Option<TransitionState> {
        use TransitionEvent::*;
        match (self.state, event) {
            (TransitionState::Idle, Begin) => Some(TransitionState::Transitioning),
            (TransitionState::Transitioning, Begin) => Some(TransitionState::Transitioning),
            (TransitionState::Transitioning, Elapsed) => Some(TransitionState::Idle),
            _ => None,
        }
    }

    pub fn transition(&mut self, event: TransitionEvent) -> StateResult<TransitionState> {
        tracing::debug!(from = ?self.state, event = ?event, "request transition state change");
        let next = self.next_state(event).ok_or_else(|| {
            let from = self.state;
            tracing::warn!(from = ?from, event = ?event, "invalid transition state change requested");
            StateError::InvalidStateTransition { from, event }
        })?;

        let record = StateTransition::new(Some(self.state), event, next);
        self.state = next;
        if self.transition_history.len() == TRANSITION_HISTORY_LIMIT {
            self.transition_history.pop_front();
        }
        self.transition_history.push_back(record);

        Ok(self.state)
    }

    pub fn history(&self) -> impl Iterator<Item = &StateTransition> {
        self.transition_history.iter()
    }
}

impl Default for TransitionMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TransitionMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TransitionState::{:?}", self.state)
    }
}

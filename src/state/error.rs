use super::event::TransitionEvent;
use super::model::TransitionState;
use thiserror::Error;

pub type StateResult<T> = std::result::Result<T, StateError>;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("invalid state transition: from {from:?} using event {event:?}")]
    InvalidStateTransition {
        from: TransitionState,
        event: TransitionEvent,
    },
}

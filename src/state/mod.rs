pub mod coordinator;
pub mod error;
pub mod event;
pub mod machine;
pub mod model;

pub use coordinator::{TransitionCoordinator, TransitionTicket};
pub use error::{StateError, StateResult};
pub use event::{StateTransition, TransitionEvent};
pub use machine::TransitionMachine;
pub use model::TransitionState;

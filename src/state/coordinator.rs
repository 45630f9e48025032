use std::time::Duration;

use tokio::time::Instant;

use super::{TransitionEvent, TransitionMachine, TransitionState};

/// Handle for one scheduled return to idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionTicket {
    pub generation: u64,
    pub duration: Duration,
    pub deadline: Instant,
}

/// Brackets visible theme changes with a timed transitioning flag.
///
/// Every [`begin`](Self::begin) supersedes the previous ticket, so a stale
/// timer completing later is ignored.
#[derive(Debug)]
pub struct TransitionCoordinator {
    machine: TransitionMachine,
    nominal: Duration,
    generation: u64,
    pending: Option<TransitionTicket>,
}

impl TransitionCoordinator {
    pub fn new(nominal: Duration) -> Self {
        Self {
            machine: TransitionMachine::new(),
            nominal,
            generation: 0,
            pending: None,
        }
    }

    pub fn nominal_duration(&self) -> Duration {
        self.nominal
    }

    pub fn duration_for(&self, reduced_motion: bool) -> Duration {
        if reduced_motion {
            Duration::ZERO
        } else {
            self.nominal
        }
    }

    pub fn state(&self) -> TransitionState {
        self.machine.state()
    }

    pub fn is_transitioning(&self) -> bool {
        self.state() == TransitionState::Transitioning
    }

    pub fn pending(&self) -> Option<TransitionTicket> {
        self.pending
    }

    pub fn begin(&mut self, now: Instant, reduced_motion: bool) -> TransitionTicket {
        // Idle -> Transitioning and Transitioning -> Transitioning are both valid.
        let _ = self.machine.transition(TransitionEvent::Begin);
        self.generation += 1;
        let duration = self.duration_for(reduced_motion);
        let ticket = TransitionTicket {
            generation: self.generation,
            duration,
            deadline: now + duration,
        };
        if let Some(superseded) = self.pending.replace(ticket) {
            tracing::debug!(
                superseded = superseded.generation,
                generation = ticket.generation,
                "restarted theme transition timer"
            );
        }
        ticket
    }

    /// Completes the transition if `generation` is still current.
    pub fn complete(&mut self, generation: u64) -> bool {
        match self.pending {
            Some(ticket) if ticket.generation == generation => {
                self.pending = None;
                self.machine.transition(TransitionEvent::Elapsed).is_ok()
            }
            _ => {
                tracing::debug!(generation, "ignoring superseded transition timer");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOMINAL: Duration = Duration::from_millis(500);

    #[test]
    fn begin_enters_transitioning_with_nominal_duration() {
        let mut coordinator = TransitionCoordinator::new(NOMINAL);
        let now = Instant::now();
        assert!(!coordinator.is_transitioning());

        let ticket = coordinator.begin(now, false);
        assert!(coordinator.is_transitioning());
        assert_eq!(ticket.duration, NOMINAL);
        assert_eq!(ticket.deadline, now + NOMINAL);

        assert!(coordinator.complete(ticket.generation));
        assert_eq!(coordinator.state(), TransitionState::Idle);
        assert!(coordinator.pending().is_none());
    }

    #[test]
    fn reduced_motion_uses_zero_duration() {
        let mut coordinator = TransitionCoordinator::new(NOMINAL);
        let now = Instant::now();
        let ticket = coordinator.begin(now, true);
        assert_eq!(ticket.duration, Duration::ZERO);
        assert_eq!(ticket.deadline, now);
        assert!(coordinator.is_transitioning());
    }

    #[test]
    fn newer_begin_supersedes_older_timer() {
        let mut coordinator = TransitionCoordinator::new(NOMINAL);
        let start = Instant::now();
        let first = coordinator.begin(start, false);
        let second = coordinator.begin(start + Duration::from_millis(300), false);

        assert_eq!(second.deadline, start + Duration::from_millis(800));
        assert!(!coordinator.complete(first.generation));
        assert!(coordinator.is_transitioning());
        assert!(coordinator.complete(second.generation));
        assert!(!coordinator.is_transitioning());
    }

    #[test]
    fn completing_twice_is_a_no_op() {
        let mut coordinator = TransitionCoordinator::new(NOMINAL);
        let ticket = coordinator.begin(Instant::now(), false);
        assert!(coordinator.complete(ticket.generation));
        assert!(!coordinator.complete(ticket.generation));
    }
}

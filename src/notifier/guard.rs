//! Single-flight guard for refresh cycles.

/// Whether a refresh cycle is running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlightState {
    #[default]
    Idle,
    InFlight,
    /// A cycle is running and another one will follow it.
    FollowUpQueued,
}

/// What to do with a refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Nothing is running: start a cycle now.
    Start,
    /// A cycle is running: run one more after it.
    Queued,
    /// A follow-up is already queued: this request is served by it.
    Coalesced,
}

/// At most one cycle runs at a time and at most one waits behind it.
#[derive(Debug, Clone, Default)]
pub struct RefreshGuard {
    state: FlightState,
    coalesced: usize,
}

impl RefreshGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> FlightState {
        self.state
    }

    /// Number of requests folded into an already queued follow-up.
    #[must_use]
    pub fn coalesced(&self) -> usize {
        self.coalesced
    }

    /// Register a refresh request.
    pub fn request(&mut self) -> Admission {
        let admission = match self.state {
            FlightState::Idle => {
                self.state = FlightState::InFlight;
                Admission::Start
            }
            FlightState::InFlight => {
                self.state = FlightState::FollowUpQueued;
                Admission::Queued
            }
            FlightState::FollowUpQueued => {
                self.coalesced = self.coalesced.saturating_add(1);
                Admission::Coalesced
            }
        };
        tracing::trace!(?admission, state = ?self.state, "Refresh requested");
        admission
    }

    /// Mark the running cycle finished.
    ///
    /// Returns `true` when the queued follow-up must start now; the guard then
    /// stays in flight.
    pub fn finish(&mut self) -> bool {
        match self.state {
            FlightState::FollowUpQueued => {
                self.state = FlightState::InFlight;
                true
            }
            FlightState::InFlight | FlightState::Idle => {
                self.state = FlightState::Idle;
                false
            }
        }
    }
}

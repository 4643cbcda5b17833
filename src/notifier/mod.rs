//! Refresh scheduling, badge and event fan-out.

mod badge;
mod events;
mod guard;
mod refresh;
mod service;

pub use badge::{badge_text, Badge};
pub use events::Event;
pub use guard::{Admission, FlightState, RefreshGuard};
pub use refresh::{CycleOutcome, RefreshError, RefreshReport, Refresher};
pub use service::{NotifierError, NotifierHandle, NotifierService};

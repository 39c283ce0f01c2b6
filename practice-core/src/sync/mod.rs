//! External calendar import.

pub mod merge;
pub mod source;

pub use merge::{CalendarSync, ConfirmationGate, ConnectionState, SyncOutcome};
pub use source::{
    CalendarSource, Delay, ExternalEvent, NoDelay, SimulatedCalendarSource, SyncError, TokioDelay,
    is_eligible,
};

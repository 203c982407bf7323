//! Dashboard state.

mod app;
mod poll;

pub use app::{App, AppState, Command};
pub use poll::{PollGuard, PollState, PollTicket};

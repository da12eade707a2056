/// Session management module - Gateway

mod guard;
mod state;
mod transcript;

pub use guard::{InFlight, RequestGuard};
pub use state::{PendingExchange, Phase, Session};
pub use transcript::{Transcript, Turn, TurnRole};

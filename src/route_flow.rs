//! Travel-details retrieval state machine
//!
//! Pure state transitions for the locate-then-fetch flow behind the
//! destination details view: `Idle -> Locating -> Fetching -> Ready | Error`,
//! with an explicit user retry out of `Error`.

mod effect;
mod event;
mod state;
mod transition;

pub use effect::Effect;
pub use event::Event;
pub use state::{FlowErrorKind, RouteFlowContext, RouteFlowState};
pub use transition::{transition, TransitionError, TransitionResult};

//! Conversation state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions: the
//! runtime feeds events in, applies the returned session and executes the
//! returned effects.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{Flow, FlowContext, Session, Step, UserId};
pub use transition::{transition, TransitionError};

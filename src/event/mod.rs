//! Event stream — evaluated events and the listener protocol that consumes them.
//!
//! Every fired element becomes exactly one [`Event`], handed to listeners in
//! document order. Events are plain data and derive `Serialize` so tools can
//! dump them.

pub mod listener;
pub mod types;

pub use listener::{visit_note, EventLog, Listener, ListenerResult};
pub use types::*;

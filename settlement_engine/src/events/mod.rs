//! Stateless pub-sub plumbing for settlement events.
//!
//! The engine publishes an event whenever a settlement flow produces something other components care about: a
//! notification to deliver, or a completed settlement to audit. Handlers are registered as async closures via
//! [`EventHooks`]; they receive only the event payload and never the engine's internal state.

mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::{NotificationEvent, NotificationType, OrderSettledEvent};
pub use hooks::{EventHandlers, EventHooks, EventProducers};

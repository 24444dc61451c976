//! # Real-Time Event Fan-Out
//!
//! Domain events describing a change (`module` + `action`, optional payload)
//! are pushed to every live connection. Clients filter by module/action and
//! typically re-query the matching list.
//!
//! ## Guarantees
//!
//! - Best-effort, at-most-once delivery
//! - No persistence, no replay to late subscribers
//! - No ordering across subscribers
//! - Publishing never blocks on a slow subscriber

pub mod bus;
pub mod event;

pub use bus::{EventBus, EventReceiver, PublishReport, SubscriberId};
pub use event::Event;

//! Targeting and dispatch for the notifier.
//!
//! The scheduler decides, once per pass, which users of every tenant get a
//! notification and which trending content it advertises, then hands one
//! job per user to the dispatch queue. Workers drain that queue and push
//! the composed message to the delivery transport.

pub mod composer;
pub mod queue;
pub mod scheduler;
pub mod transport;
pub mod worker;

pub use composer::MessageComposer;
pub use queue::{JobQueue, JobSource, QueuedJob};
pub use scheduler::{RunReport, Scheduler};
pub use transport::{LogTransport, PushMessage, PushTransport};
pub use worker::Worker;

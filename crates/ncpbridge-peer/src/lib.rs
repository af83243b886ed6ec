//! The two roles of the NCP serial bridge.
//!
//! Both roles own a [`Bridge`]: the link, the frame reader and its staging
//! buffer, and the transmit ring. Each is driven by calling its `task`
//! method from a single-threaded loop; nothing blocks and nothing is shared
//! between instances.
//!
//! - [`Host`] sends typed requests, keeps one outstanding confirm handler
//!   per category and routes indications to application handlers. Handlers
//!   queue follow-up requests through the [`Requests`] handle they are given.
//! - [`Ncp`] decodes host requests, runs them on a [`NetworkStack`] and
//!   sends its confirms and indications back.

pub mod bridge;
pub mod config;
pub mod error;
pub mod host;
pub mod ncp;
pub mod registry;

pub use bridge::{Bridge, TaskReport};
pub use config::BridgeConfig;
pub use error::{BridgeError, Result};
pub use host::{Host, Requests};
pub use ncp::{Ncp, NetworkStack, Outbox};
pub use registry::{confirm_handler, ConfirmHandler, IndicationCallbacks, PendingConfirms};

//! Wait/notify coordination over the store
//!
//! - `wait`: block until a service reports the expected status
//! - `notify`: publish a service status
//! - `status`: read the current status once

pub mod notify;
pub mod status;
pub mod wait;

#[cfg(test)]
pub(crate) mod testing;

pub use notify::{NotifyPublisher, NotifyRequest};
pub use status::query_status;
pub use wait::{Observation, Ready, WaitCoordinator, WaitRequest};

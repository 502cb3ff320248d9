//! # syncpoint
//!
//! Startup ordering for independently launched processes through a shared,
//! consistent key-value store with watch semantics:
//! - `notify` writes a service's status under `service/{name}`
//! - `wait` blocks until that status appears, using the store's long-poll
//!   watch instead of polling
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐                     ┌──────────────┐
//! │ syncpoint    │                     │ syncpoint    │
//! │   notify db  │                     │   wait db    │
//! └──────┬───────┘                     └──────┬───────┘
//!        │ PUT service/db                     │ GET service/db
//!        │                                    │ GET ...?wait=true&waitIndex=N+1
//!   ┌────▼────────────────────────────────────▼────┐
//!   │        Store (v2 HTTP key API)               │
//!   │   watch fan-out releases parked waiters      │
//!   └──────────────────────────────────────────────┘
//! ```
//!
//! Publishers and waiters never talk to each other directly.
//!
//! ## Usage
//!
//! ```bash
//! # Block until the database reports "running" (give up after 60s)
//! syncpoint wait db -t 60
//!
//! # Announce readiness
//! syncpoint notify db
//!
//! # Announce a different state
//! syncpoint notify db -s preparing
//! ```
//!
//! Exit codes: 0 success, 1 timeout, 2 status mismatch, 10 store unreachable,
//! 11 usage error.

pub mod common;
pub mod coordination;
pub mod store;

// Re-export commonly used types
pub use common::{Error, ErrorKind, Result, Settings};
pub use coordination::{NotifyPublisher, NotifyRequest, WaitCoordinator, WaitRequest};
pub use store::{HttpStoreClient, StoreClient};

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

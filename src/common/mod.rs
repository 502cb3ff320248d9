//! Common utilities and types shared across syncpoint

pub mod config;
pub mod error;
pub mod utils;

pub use config::{Settings, DEFAULT_ENDPOINT};
pub use error::{Error, ErrorKind, Result};
pub use utils::{encode_segment, validate_service_name, ServiceKey, DEFAULT_STATUS};

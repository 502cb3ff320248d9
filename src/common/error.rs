//! Error types for syncpoint

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // === Usage Errors ===
    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // === Connectivity Errors ===
    #[error("Store unreachable: {0}")]
    Unreachable(String),

    #[error("Malformed store response: {0}")]
    MalformedResponse(String),

    #[error("Store error {code}: {message}")]
    Store { code: u64, message: String },

    // === Coordination Outcomes ===
    #[error("{}", timeout_message(.service, .seconds))]
    Timeout { service: String, seconds: u64 },

    #[error("Service '{service}' reported status '{observed}', expected '{expected}'")]
    StatusMismatch {
        service: String,
        expected: String,
        observed: String,
    },

    // === Publish Errors ===
    #[error("Publish failed: {0}")]
    Publish(String),
}

fn timeout_message(service: &str, seconds: &u64) -> String {
    if *seconds == 0 {
        format!("Watch on service '{}' ended without a change", service)
    } else {
        format!("Timed out after {}s waiting for service '{}'", seconds, service)
    }
}

/// Coarse classification callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Usage,
    Connectivity,
    Timeout,
    StatusMismatch,
    Publish,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Usage(_) | Error::InvalidConfig(_) => ErrorKind::Usage,
            Error::Unreachable(_) | Error::MalformedResponse(_) | Error::Store { .. } => {
                ErrorKind::Connectivity
            }
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::StatusMismatch { .. } => ErrorKind::StatusMismatch,
            Error::Publish(_) => ErrorKind::Publish,
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Timeout => 1,
            ErrorKind::StatusMismatch => 2,
            ErrorKind::Connectivity | ErrorKind::Publish => 10,
            ErrorKind::Usage => 11,
        }
    }

    /// Timeouts are an expected "not ready yet" outcome, not a fault.
    pub fn is_expected(&self) -> bool {
        matches!(self.kind(), ErrorKind::Timeout)
    }

    /// Emit the one diagnostic for a terminal outcome.
    pub fn log(&self) {
        if self.is_expected() {
            tracing::info!("{}", self);
        } else {
            tracing::error!("{}", self);
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::InvalidConfig(e.to_string())
    }
}

/// Run `f` under a subscriber that records formatted log lines.
#[cfg(test)]
pub(crate) fn capture_logs(f: impl FnOnce()) -> String {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();
    tracing::subscriber::with_default(subscriber, f);

    let bytes = captured.0.lock().unwrap().clone();
    String::from_utf8_lossy(&bytes).into_owned()
}

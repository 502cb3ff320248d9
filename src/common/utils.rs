//! Utility functions for syncpoint

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Namespace under which every service status lives
pub const SERVICE_NAMESPACE: &str = "service";

/// Status written and expected when none is given
pub const DEFAULT_STATUS: &str = "running";

/// Percent-encoding set for a single path segment (includes /, %, and control chars)
const SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b'/')
    .add(b'%')
    .add(b' ')
    .add(b'?')
    .add(b'#')
    .add(b'&')
    .add(b'+');

/// Encode a service name as one URL path segment
pub fn encode_segment(name: &str) -> String {
    utf8_percent_encode(name, SEGMENT_ENCODE_SET).to_string()
}

/// Store key of a validated service: `service/{name}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceKey {
    name: String,
}

impl ServiceKey {
    pub fn new(name: &str) -> crate::Result<Self> {
        validate_service_name(name)?;
        Ok(Self {
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key path relative to the key API root, name encoded as one segment
    pub fn url_path(&self) -> String {
        format!("{}/{}", SERVICE_NAMESPACE, encode_segment(&self.name))
    }
}

impl std::fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", SERVICE_NAMESPACE, self.name)
    }
}

/// Validate service name (must be non-empty, no control characters, not a dot segment)
pub fn validate_service_name(name: &str) -> crate::Result<()> {
    if name.is_empty() {
        return Err(crate::Error::Usage("service name cannot be empty".into()));
    }

    // URL parsing collapses these even when percent-encoded
    if name == "." || name == ".." {
        return Err(crate::Error::Usage(format!(
            "service name '{}' is not a valid key segment",
            name
        )));
    }

    if name.chars().any(|c| c.is_control()) {
        return Err(crate::Error::Usage(
            "service name contains invalid characters".into(),
        ));
    }

    Ok(())
}

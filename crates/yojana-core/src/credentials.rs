//! Credential presence checks.
//!
//! Backends are constructed without validating credentials; each run checks
//! them up front so a missing key surfaces as [`Error::Config`] before any
//! request leaves the process.

use crate::defaults::CREDENTIAL_PLACEHOLDER_PREFIX;
use crate::error::{Error, Result};

/// True when `value` is blank or still the `YOUR_...` template value.
pub fn is_placeholder(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed.starts_with(CREDENTIAL_PLACEHOLDER_PREFIX)
}

/// Return the credential or a configuration error naming the variable.
pub fn require_credential<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str> {
    match value {
        Some(v) if !is_placeholder(v) => Ok(v),
        Some(_) => Err(Error::Config(format!(
            "{} is still a placeholder value",
            name
        ))),
        None => Err(Error::Config(format!("{} is not set", name))),
    }
}

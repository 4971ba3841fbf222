//! Shared handler helpers.

use crate::error::{ApiError, ApiResult};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Format a timestamp for API responses.
pub(crate) fn rfc3339(timestamp: OffsetDateTime) -> ApiResult<String> {
    timestamp
        .format(&Rfc3339)
        .map_err(|e| ApiError::Internal(format!("failed to format timestamp: {e}")))
}

/// Reject blank required names with a 400.
pub(crate) fn require_name(name: &str, what: &str) -> ApiResult<()> {
    if name.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{what} name is required")));
    }
    Ok(())
}

/// Empty strings become NULL for nullable text columns.
pub(crate) fn none_if_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Percent-encode a query-string or path value.
pub(crate) fn urlencode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

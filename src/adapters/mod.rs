pub mod apify;
pub mod copygen;
pub mod email_finder;
pub mod search;
pub mod storage;

use crate::utils::error::{LeadError, Result};
use reqwest::StatusCode;
use std::time::Duration;

/// Request timeout applied by every adapter.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Maps provider HTTP status codes onto the error taxonomy: auth and
/// quota failures are batch-fatal, 429 and 5xx are transient.
pub(crate) fn check_status(service: &str, status: StatusCode) -> Result<()> {
    match status.as_u16() {
        200..=299 => Ok(()),
        401 | 403 => Err(LeadError::AuthFailed {
            service: service.to_string(),
        }),
        402 => Err(LeadError::QuotaExceeded {
            service: service.to_string(),
        }),
        429 => Err(LeadError::RateLimited {
            service: service.to_string(),
        }),
        500..=599 => Err(LeadError::Transient {
            service: service.to_string(),
            message: format!("HTTP {}", status),
        }),
        other => Err(LeadError::MalformedResponse {
            service: service.to_string(),
            message: format!("unexpected HTTP {}", other),
        }),
    }
}

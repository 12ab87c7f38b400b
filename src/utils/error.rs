use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeadError {
    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Zip operation failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },

    #[error("Configuration parsing failed ({field}): {message}")]
    ConfigParse { field: String, message: String },

    #[error("{service} rate limited the request")]
    RateLimited { service: String },

    #[error("{service} returned a transient error: {message}")]
    Transient { service: String, message: String },

    #[error("{service} quota exhausted")]
    QuotaExceeded { service: String },

    #[error("{service} rejected the API key")]
    AuthFailed { service: String },

    #[error("Unexpected response from {service}: {message}")]
    MalformedResponse { service: String, message: String },

    #[error("Processing error: {message}")]
    Processing { message: String },
}

/// Broad grouping used for logging and exit-code decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Provider,
    Config,
    Export,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Degraded result, run still usable.
    Low,
    /// Retryable condition that exhausted its retries.
    Medium,
    /// The batch could not complete.
    High,
    /// Misconfiguration; nothing was attempted.
    Critical,
}

impl LeadError {
    /// Transient errors are retried by the worker before being demoted
    /// to a not-found outcome.
    pub fn is_transient(&self) -> bool {
        match self {
            LeadError::RateLimited { .. } | LeadError::Transient { .. } => true,
            LeadError::MalformedResponse { .. } => true,
            LeadError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Fatal for the whole batch: further records would fail the same
    /// way, so the dispatcher stops handing out new work.
    pub fn is_batch_fatal(&self) -> bool {
        matches!(
            self,
            LeadError::QuotaExceeded { .. } | LeadError::AuthFailed { .. }
        )
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            LeadError::Http(_) | LeadError::RateLimited { .. } | LeadError::Transient { .. } => {
                ErrorCategory::Network
            }
            LeadError::QuotaExceeded { .. }
            | LeadError::AuthFailed { .. }
            | LeadError::MalformedResponse { .. } => ErrorCategory::Provider,
            LeadError::InvalidConfigValue { .. }
            | LeadError::MissingConfig { .. }
            | LeadError::ConfigParse { .. } => ErrorCategory::Config,
            LeadError::Io(_) | LeadError::Csv(_) | LeadError::Zip(_) => ErrorCategory::Export,
            LeadError::Serialization(_) | LeadError::Processing { .. } => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LeadError::RateLimited { .. } | LeadError::Transient { .. } => ErrorSeverity::Medium,
            LeadError::MalformedResponse { .. } => ErrorSeverity::Low,
            LeadError::InvalidConfigValue { .. }
            | LeadError::MissingConfig { .. }
            | LeadError::ConfigParse { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            LeadError::Http(_) => "Check network connectivity and the service endpoint".into(),
            LeadError::RateLimited { service } => {
                format!("Increase --min-delay-ms or lower concurrency for {service}")
            }
            LeadError::Transient { service, .. } => {
                format!("{service} may be degraded; rerun the batch later")
            }
            LeadError::QuotaExceeded { service } => {
                format!("The {service} plan is out of credits; top up or wait for quota reset")
            }
            LeadError::AuthFailed { service } => {
                format!("Verify the API key configured for {service}")
            }
            LeadError::InvalidConfigValue { field, .. } | LeadError::MissingConfig { field } => {
                format!("Fix the '{field}' setting and rerun")
            }
            LeadError::ConfigParse { .. } => "Check the campaign TOML file syntax".into(),
            LeadError::Io(_) | LeadError::Csv(_) | LeadError::Zip(_) => {
                "Check the output path exists and is writable".into()
            }
            _ => "Rerun with --verbose for details".into(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            LeadError::QuotaExceeded { service } => {
                format!("{service} quota exhausted; partial results were kept")
            }
            LeadError::AuthFailed { service } => format!("{service} rejected the API key"),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LeadError>;

//! Error types for emrcost
//!
//! There are two error types: `CostError` (main error enum) and `ConfigError`
//! (configuration-specific).
//!
//! ## Error Handling Philosophy
//!
//! Library code uses `crate::error::Result<T>` which returns `CostError`.
//! The binary uses `anyhow::Result<T>` for setup (config, logging) and maps
//! `CostError` onto an exit code at the end of a run.
//!
//! Every failure aborts the whole calculation. There is no partial or
//! best-effort total: a rate that cannot be resolved is never treated as zero,
//! and a service failure is never treated as "no more data".
//!
//! ## Retry Awareness
//!
//! Errors implement `IsRetryable`. Only the AWS adapters consult it (through
//! `RetryPolicy` in `src/retry.rs`); the aggregator itself never retries.
//!
//! ## When to Use Which Error
//!
//! - `MalformedTimestamp` / `InvalidInterval`: lifetime computation failures
//! - `InvalidRate` / `RateNotFound`: a group's hourly rate cannot be determined
//! - `Service`: anything coming back from the inventory or pricing service
//! - `Located`: wraps any of the above with cluster/group/instance context
//! - `Validation`: user input (cluster ids, regions) rejected before any call

use thiserror::Error;

/// Main error type for emrcost
#[derive(Error, Debug)]
pub enum CostError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Malformed timestamp: '{value}' matches no supported format")]
    MalformedTimestamp { value: String },

    #[error("Invalid interval: end {ended} precedes creation {created}")]
    InvalidInterval { created: String, ended: String },

    #[error("Invalid rate for group {group_id}: '{value}'")]
    InvalidRate { group_id: String, value: String },

    #[error("Rate not found: no price for {instance_type} in {region}")]
    RateNotFound {
        instance_type: String,
        region: String,
    },

    #[error("{service} {operation} failed: {message}")]
    Service {
        service: String,
        operation: String,
        message: String,
        retryable: bool,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Retries exhausted (attempt {attempt}/{max_attempts}): {reason}")]
    Retryable {
        attempt: u32,
        max_attempts: u32,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("cluster {cluster_id}, group {group_id}{}: {source}", instance_suffix(.instance_id))]
    Located {
        cluster_id: String,
        group_id: String,
        instance_id: Option<String>,
        #[source]
        source: Box<CostError>,
    },

    #[error("Validation error: {field} - {reason}")]
    Validation { field: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

fn instance_suffix(instance_id: &Option<String>) -> String {
    instance_id
        .as_ref()
        .map(|id| format!(", instance {}", id))
        .unwrap_or_default()
}

impl CostError {
    /// Attach cluster/group (and optionally instance) context to an error.
    pub fn located(
        self,
        cluster_id: &str,
        group_id: &str,
        instance_id: Option<&str>,
    ) -> CostError {
        CostError::Located {
            cluster_id: cluster_id.to_string(),
            group_id: group_id.to_string(),
            instance_id: instance_id.map(str::to_string),
            source: Box::new(self),
        }
    }

    /// The underlying error with all `Located` wrappers removed.
    pub fn root(&self) -> &CostError {
        match self {
            CostError::Located { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown pricing source: {0} (expected 'aws' or 'static')")]
    UnknownPricingSource(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Failed to parse config: {0}")]
    ParseError(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CostError>;

/// Trait for determining if an error is retryable
///
/// Used by `RetryPolicy` implementations to decide whether a failed
/// collaborator call should be attempted again.
pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for CostError {
    fn is_retryable(&self) -> bool {
        match self {
            CostError::Service { retryable, .. } => *retryable,
            CostError::Io(_) => true,
            _ => false,
        }
    }
}

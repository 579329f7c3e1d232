//! AWS adapters for the inventory and pricing seams
//!
//! - `emr`: `Inventory` over the EMR ListInstanceGroups/ListInstances APIs
//! - `pricing`: `PricingSource` over the AWS Price List API
//!
//! Both wrap each SDK call in the configured `RetryPolicy`. SDK failures are
//! turned into `CostError::Service` by `sdk_error`, which decides whether the
//! failure is worth retrying.

pub mod emr;
pub mod pricing;

pub use emr::EmrInventory;
pub use pricing::AwsPricingSource;

use crate::error::CostError;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_emr::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

/// Error codes that indicate a transient service-side condition.
const RETRYABLE_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "TooManyRequestsException",
    "RequestLimitExceeded",
    "InternalServerException",
    "InternalServerError",
    "InternalErrorException",
    "ServiceUnavailable",
    "ServiceUnavailableException",
];

/// Shared SDK configuration for the given region.
pub async fn load_sdk_config(region: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}

pub(crate) fn is_retryable_code(code: &str) -> bool {
    RETRYABLE_CODES.contains(&code)
}

/// Convert an SDK failure into a `CostError::Service`.
///
/// Timeouts, dispatch failures and unparseable responses are retryable;
/// service errors only when their code is in `RETRYABLE_CODES`.
pub(crate) fn sdk_error<E, R>(service: &str, operation: &str, err: SdkError<E, R>) -> CostError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let retryable = match &err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            true
        }
        _ => err.code().map(is_retryable_code).unwrap_or(false),
    };

    CostError::Service {
        service: service.to_string(),
        operation: operation.to_string(),
        message: DisplayErrorContext(&err).to_string(),
        retryable,
        source: Some(Box::new(err)),
    }
}

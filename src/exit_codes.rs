//! Exit code standardization for emrcost
//!
//! ## Exit Code Convention
//!
//! - `0` = Success
//! - `1` = User or data error (bad cluster id, unparseable timestamps, missing rates)
//! - `2` = System error (AWS API failure, network error, retries exhausted)
//! - `3` = Configuration error (config parse error, invalid config values)

use crate::error::CostError;

/// Standard exit codes for emrcost
pub mod codes {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// User or data error
    pub const USER_ERROR: i32 = 1;
    /// System error (AWS API failure, network error)
    pub const SYSTEM_ERROR: i32 = 2;
    /// Configuration error
    pub const CONFIG_ERROR: i32 = 3;
}

/// Map a CostError to an appropriate exit code
pub fn exit_code_for_error(error: &CostError) -> i32 {
    use CostError::*;
    match error.root() {
        Config(_) => codes::CONFIG_ERROR,

        Validation { .. } => codes::USER_ERROR,
        MalformedTimestamp { .. } => codes::USER_ERROR,
        InvalidInterval { .. } => codes::USER_ERROR,
        InvalidRate { .. } => codes::USER_ERROR,
        RateNotFound { .. } => codes::USER_ERROR,

        Service { .. } => codes::SYSTEM_ERROR,
        Retryable { .. } => codes::SYSTEM_ERROR,
        Io(_) => codes::SYSTEM_ERROR,
        Json(_) => codes::SYSTEM_ERROR,

        // root() never yields a Located
        Located { .. } => codes::SYSTEM_ERROR,
    }
}

//! Input validation utilities
//!
//! Rejects malformed identifiers before any AWS call is made.

use crate::error::{CostError, Result};

/// Validate EMR cluster ID format
///
/// Cluster IDs look like "j-" followed by upper-case alphanumerics
/// (e.g. j-2AXXXXXXGAPLF).
pub fn validate_cluster_id(cluster_id: &str) -> Result<()> {
    if !cluster_id.starts_with("j-") {
        return Err(CostError::Validation {
            field: "cluster_id".to_string(),
            reason: format!("Cluster ID must start with 'j-', got: {}", cluster_id),
        });
    }

    if cluster_id.len() < 4 || cluster_id.len() > 256 {
        return Err(CostError::Validation {
            field: "cluster_id".to_string(),
            reason: format!(
                "Cluster ID must be 4-256 characters, got: {} (len: {})",
                cluster_id,
                cluster_id.len()
            ),
        });
    }

    let id_part = &cluster_id[2..];
    if !id_part.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(CostError::Validation {
            field: "cluster_id".to_string(),
            reason: format!(
                "Cluster ID must contain only alphanumeric characters after 'j-', got: {}",
                cluster_id
            ),
        });
    }

    Ok(())
}

/// Validate AWS region name
///
/// Regions are lower-case words joined by hyphens ending in a digit
/// (us-east-1, ap-southeast-2, us-gov-west-1).
pub fn validate_region(region: &str) -> Result<()> {
    let parts: Vec<&str> = region.split('-').collect();
    let well_formed = parts.len() >= 3
        && parts
            .iter()
            .all(|p| {
                !p.is_empty() && p.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            })
        && parts
            .last()
            .map(|p| p.chars().all(|c| c.is_ascii_digit()))
            .unwrap_or(false);

    if !well_formed {
        return Err(CostError::Validation {
            field: "region".to_string(),
            reason: format!("Not a valid AWS region name: {}", region),
        });
    }
    Ok(())
}

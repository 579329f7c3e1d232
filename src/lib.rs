//! emrcost library
//!
//! Computes what an EMR cluster cost from each instance's billable lifetime
//! and its group's hourly rate. The `emrcost` binary wires these pieces to the
//! AWS SDK; the collaborator traits (`Inventory`, `PricingSource`) make the
//! calculation usable without AWS.

pub mod aggregator;
pub mod aws;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod inventory;
pub mod lifetime;
pub mod pricing;
pub mod progress;
pub mod retry;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use aggregator::{CostAggregator, CostObserver};
pub use error::{CostError, Result};
pub use types::{ClusterCostReport, GroupCost, Instance, InstanceGroup, InstancePage, Market};

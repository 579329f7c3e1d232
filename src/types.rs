//! Data model for cluster cost calculation
//!
//! Inventory types (`InstanceGroup`, `Instance`, `InstancePage`) are what the
//! inventory service hands back; report types (`CostLineItem`, `GroupCost`,
//! `ClusterCostReport`) are what the aggregator produces. Everything is fetched
//! fresh per run.

use serde::{Deserialize, Serialize};

/// Role of an instance group within the cluster
///
/// Serialized as its provider spelling (`"MASTER"`, `"CORE"`, `"TASK"` or the
/// raw role string), matching the text output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum GroupRole {
    Master,
    Core,
    Task,
    Other(String),
}

impl GroupRole {
    pub fn as_str(&self) -> &str {
        match self {
            GroupRole::Master => "MASTER",
            GroupRole::Core => "CORE",
            GroupRole::Task => "TASK",
            GroupRole::Other(s) => s,
        }
    }
}

impl std::fmt::Display for GroupRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<GroupRole> for String {
    fn from(role: GroupRole) -> Self {
        role.as_str().to_string()
    }
}

impl From<String> for GroupRole {
    fn from(role: String) -> Self {
        normalize_role(&role)
    }
}

/// Normalize a provider role string ("MASTER", "core", ...)
pub fn normalize_role(role: &str) -> GroupRole {
    match role.to_uppercase().as_str() {
        "MASTER" | "PRIMARY" => GroupRole::Master,
        "CORE" => GroupRole::Core,
        "TASK" => GroupRole::Task,
        _ => GroupRole::Other(role.to_string()),
    }
}

/// How a group's instances are billed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Market {
    /// Fixed published rate (on-demand or reserved)
    OnDemand,
    /// Market price bounded by the requester's bid
    Spot,
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Market::OnDemand => f.write_str("ON_DEMAND"),
            Market::Spot => f.write_str("SPOT"),
        }
    }
}

/// A role-based partition of cluster nodes sharing one instance type and market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceGroup {
    pub id: String,
    pub role: GroupRole,
    pub market: Market,
    pub instance_type: String,
    /// Bid per hour as returned by the service; only meaningful for `Market::Spot`
    pub bid_price: Option<String>,
}

/// A cluster node with its lifecycle timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    pub ec2_instance_id: Option<String>,
    /// `None` for an instance the provider has not started yet
    pub created: Option<String>,
    /// `None` until the instance reaches a terminal state
    pub ended: Option<String>,
}

/// One page of a paginated instance listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstancePage {
    pub instances: Vec<Instance>,
    pub next_token: Option<String>,
}

/// Per-hour prices returned by the pricing service
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourlyRates {
    /// Managed-service (EMR) surcharge
    pub managed: f64,
    /// Underlying compute (EC2) rate
    pub compute: f64,
}

impl HourlyRates {
    pub fn total(&self) -> f64 {
        self.managed + self.compute
    }
}

/// Cost of one terminated instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostLineItem {
    pub instance_id: String,
    pub ec2_instance_id: Option<String>,
    pub billable_hours: i64,
    pub hourly_rate: f64,
    /// billable_hours × hourly_rate, rounded to 3 decimals
    pub cost: f64,
}

/// Cost of one instance group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupCost {
    pub group_id: String,
    pub role: GroupRole,
    pub market: Market,
    pub instance_type: String,
    pub hourly_rate: f64,
    /// Managed and compute parts of `hourly_rate`; `None` for spot groups
    pub rate_breakdown: Option<HourlyRates>,
    pub instance_count: usize,
    /// Instances still running, excluded from the cost
    pub skipped_count: usize,
    pub line_items: Vec<CostLineItem>,
    /// Sum of line items, rounded to 3 decimals for display
    pub subtotal: f64,
}

/// Cost of a whole cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterCostReport {
    pub cluster_id: String,
    pub region: String,
    pub groups: Vec<GroupCost>,
    /// Full-precision sum of group subtotals, rounded once
    pub total: f64,
}

impl ClusterCostReport {
    pub fn instance_count(&self) -> usize {
        self.groups.iter().map(|g| g.instance_count).sum()
    }
}

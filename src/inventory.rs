//! Inventory service seam
//!
//! The aggregator only talks to this trait. `crate::aws::emr::EmrInventory`
//! is the production implementation; tests supply their own doubles.

use crate::error::Result;
use crate::types::{InstanceGroup, InstancePage};
use async_trait::async_trait;

#[async_trait]
pub trait Inventory: Send + Sync {
    /// All instance groups of the cluster, in service order.
    async fn list_instance_groups(&self, cluster_id: &str) -> Result<Vec<InstanceGroup>>;

    /// One page of a group's instances. `token` is `None` for the first page
    /// and the previous page's `next_token` afterwards.
    async fn list_instances(
        &self,
        cluster_id: &str,
        group_id: &str,
        token: Option<&str>,
    ) -> Result<InstancePage>;
}

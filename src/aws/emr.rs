//! EMR-backed inventory
//!
//! Instance groups are paged internally and returned as one ordered list.
//! Instances are returned one page at a time so the aggregator owns the
//! pagination loop. Lifecycle timestamps are rendered as RFC 3339 strings.

use super::sdk_error;
use crate::error::{CostError, Result};
use crate::inventory::Inventory;
use crate::retry::{ExponentialBackoffPolicy, RetryPolicy};
use crate::types::{normalize_role, Instance, InstanceGroup, InstancePage, Market};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_emr::primitives::{DateTime, DateTimeFormat};
use aws_sdk_emr::types::{
    Instance as EmrInstance, InstanceGroup as EmrInstanceGroup, MarketType,
};
use aws_sdk_emr::Client as EmrClient;
use tracing::debug;

pub struct EmrInventory {
    client: EmrClient,
    retry: ExponentialBackoffPolicy,
}

impl EmrInventory {
    pub fn new(sdk_config: &SdkConfig, retry: ExponentialBackoffPolicy) -> Self {
        Self {
            client: EmrClient::new(sdk_config),
            retry,
        }
    }
}

#[async_trait]
impl Inventory for EmrInventory {
    async fn list_instance_groups(&self, cluster_id: &str) -> Result<Vec<InstanceGroup>> {
        let mut groups = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let response = self
                .retry
                .execute_with_retry(|| {
                    let marker = marker.clone();
                    async move {
                        self.client
                            .list_instance_groups()
                            .cluster_id(cluster_id)
                            .set_marker(marker)
                            .send()
                            .await
                            .map_err(|e| sdk_error("emr", "ListInstanceGroups", e))
                    }
                })
                .await?;

            groups.extend(response.instance_groups().iter().map(convert_group));

            match response.marker() {
                Some(next) => marker = Some(next.to_string()),
                None => break,
            }
        }

        debug!("Cluster {}: {} instance groups", cluster_id, groups.len());
        Ok(groups)
    }

    async fn list_instances(
        &self,
        cluster_id: &str,
        group_id: &str,
        token: Option<&str>,
    ) -> Result<InstancePage> {
        let response = self
            .retry
            .execute_with_retry(|| async move {
                self.client
                    .list_instances()
                    .cluster_id(cluster_id)
                    .instance_group_id(group_id)
                    .set_marker(token.map(str::to_string))
                    .send()
                    .await
                    .map_err(|e| sdk_error("emr", "ListInstances", e))
            })
            .await?;

        let instances = response
            .instances()
            .iter()
            .map(convert_instance)
            .collect::<Result<Vec<_>>>()?;

        Ok(InstancePage {
            instances,
            next_token: response.marker().map(str::to_string),
        })
    }
}

pub(crate) fn convert_group(group: &EmrInstanceGroup) -> InstanceGroup {
    let market = match group.market() {
        Some(MarketType::Spot) => Market::Spot,
        _ => Market::OnDemand,
    };

    InstanceGroup {
        id: group.id().unwrap_or("unknown").to_string(),
        role: normalize_role(
            group
                .instance_group_type()
                .map(|t| t.as_str())
                .unwrap_or("UNKNOWN"),
        ),
        market,
        instance_type: group.instance_type().unwrap_or("unknown").to_string(),
        bid_price: group.bid_price().map(str::to_string),
    }
}

pub(crate) fn convert_instance(instance: &EmrInstance) -> Result<Instance> {
    let id = instance.id().unwrap_or("unknown").to_string();
    let timeline = instance.status().and_then(|s| s.timeline());

    let created = timeline
        .and_then(|t| t.creation_date_time())
        .map(render_timestamp)
        .transpose()?;
    let ended = timeline
        .and_then(|t| t.end_date_time())
        .map(render_timestamp)
        .transpose()?;

    Ok(Instance {
        id,
        ec2_instance_id: instance.ec2_instance_id().map(str::to_string),
        created,
        ended,
    })
}

fn render_timestamp(dt: &DateTime) -> Result<String> {
    dt.fmt(DateTimeFormat::DateTime)
        .map_err(|_| CostError::MalformedTimestamp {
            value: format!("{:?}", dt),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GroupRole;
    use aws_sdk_emr::types::{InstanceGroupType, InstanceStatus, InstanceTimeline};

    #[test]
    fn test_convert_spot_group() {
        let group = EmrInstanceGroup::builder()
            .id("ig-TASK")
            .instance_group_type(InstanceGroupType::Task)
            .market(MarketType::Spot)
            .instance_type("c5.2xlarge")
            .bid_price("0.10")
            .build();

        let converted = convert_group(&group);
        assert_eq!(converted.id, "ig-TASK");
        assert_eq!(converted.role, GroupRole::Task);
        assert_eq!(converted.market, Market::Spot);
        assert_eq!(converted.bid_price.as_deref(), Some("0.10"));
    }

    #[test]
    fn test_convert_on_demand_group() {
        let group = EmrInstanceGroup::builder()
            .id("ig-MASTER")
            .instance_group_type(InstanceGroupType::Master)
            .market(MarketType::OnDemand)
            .instance_type("m5.xlarge")
            .build();

        let converted = convert_group(&group);
        assert_eq!(converted.role, GroupRole::Master);
        assert_eq!(converted.market, Market::OnDemand);
        assert_eq!(converted.bid_price, None);
    }

    #[test]
    fn test_convert_terminated_instance() {
        let instance = EmrInstance::builder()
            .id("ci-1")
            .ec2_instance_id("i-0abc")
            .status(
                InstanceStatus::builder()
                    .timeline(
                        InstanceTimeline::builder()
                            .creation_date_time(DateTime::from_secs(1_709_287_200))
                            .end_date_time(DateTime::from_secs(1_709_294_400))
                            .build(),
                    )
                    .build(),
            )
            .build();

        let converted = convert_instance(&instance).unwrap();
        let created = converted.created.as_deref().unwrap();
        let ended = converted.ended.as_deref().unwrap();
        assert_eq!(created, "2024-03-01T10:00:00Z");
        assert_eq!(ended, "2024-03-01T12:00:00Z");
        assert_eq!(crate::lifetime::billable_hours(created, ended).unwrap(), 2);
    }

    #[test]
    fn test_convert_running_instance() {
        let instance = EmrInstance::builder()
            .id("ci-2")
            .status(
                InstanceStatus::builder()
                    .timeline(
                        InstanceTimeline::builder()
                            .creation_date_time(DateTime::from_secs(1_709_287_200))
                            .build(),
                    )
                    .build(),
            )
            .build();

        let converted = convert_instance(&instance).unwrap();
        assert_eq!(converted.ended, None);
        assert_eq!(converted.ec2_instance_id, None);
    }

    #[test]
    fn test_convert_instance_without_timeline_is_unterminated() {
        let instance = EmrInstance::builder().id("ci-3").build();
        let converted = convert_instance(&instance).unwrap();
        assert_eq!(converted.id, "ci-3");
        assert_eq!(converted.created, None);
        assert_eq!(converted.ended, None);
    }

    #[test]
    fn test_convert_instance_with_end_but_no_creation() {
        let instance = EmrInstance::builder()
            .id("ci-4")
            .status(
                InstanceStatus::builder()
                    .timeline(
                        InstanceTimeline::builder()
                            .end_date_time(DateTime::from_secs(1_709_294_400))
                            .build(),
                    )
                    .build(),
            )
            .build();

        let converted = convert_instance(&instance).unwrap();
        assert_eq!(converted.created, None);
        assert_eq!(converted.ended.as_deref(), Some("2024-03-01T12:00:00Z"));
    }
}

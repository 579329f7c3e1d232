//! Shared test doubles for the collaborator traits

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use emrcost::aggregator::CostObserver;
use emrcost::error::{CostError, Result};
use emrcost::inventory::Inventory;
use emrcost::pricing::PricingSource;
use emrcost::types::{
    ClusterCostReport, CostLineItem, GroupCost, GroupRole, HourlyRates, Instance, InstanceGroup,
    InstancePage, Market,
};
use mockall::mock;
use std::collections::HashMap;
use std::sync::Mutex;

mock! {
    pub Pricing {}
    #[async_trait]
    impl PricingSource for Pricing {
        async fn lookup_rates(&self, region: &str, instance_type: &str) -> Result<HourlyRates>;
    }
}

/// Inventory serving fixed pages, recording every request
#[derive(Default)]
pub struct PagedInventory {
    groups: Vec<InstanceGroup>,
    pages: HashMap<String, Vec<Vec<Instance>>>,
    failing_page: Option<(String, usize)>,
    pub requests: Mutex<Vec<(String, Option<String>)>>,
}

impl PagedInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, group: InstanceGroup, pages: Vec<Vec<Instance>>) -> Self {
        self.pages.insert(group.id.clone(), pages);
        self.groups.push(group);
        self
    }

    /// Make the request for `page` of `group_id` fail with a service error
    pub fn failing_at(mut self, group_id: &str, page: usize) -> Self {
        self.failing_page = Some((group_id.to_string(), page));
        self
    }

    pub fn requests(&self) -> Vec<(String, Option<String>)> {
        self.requests.lock().unwrap().clone()
    }
}

fn page_token(index: usize) -> String {
    format!("page-{}", index)
}

#[async_trait]
impl Inventory for PagedInventory {
    async fn list_instance_groups(&self, _cluster_id: &str) -> Result<Vec<InstanceGroup>> {
        Ok(self.groups.clone())
    }

    async fn list_instances(
        &self,
        _cluster_id: &str,
        group_id: &str,
        token: Option<&str>,
    ) -> Result<InstancePage> {
        self.requests
            .lock()
            .unwrap()
            .push((group_id.to_string(), token.map(str::to_string)));

        let index = match token {
            None => 0,
            Some(t) => t
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .expect("unexpected continuation token"),
        };

        if self.failing_page.as_ref() == Some(&(group_id.to_string(), index)) {
            return Err(CostError::Service {
                service: "emr".to_string(),
                operation: "ListInstances".to_string(),
                message: "Rate exceeded".to_string(),
                retryable: true,
                source: None,
            });
        }

        let pages = self.pages.get(group_id).cloned().unwrap_or_default();
        let instances = pages.get(index).cloned().unwrap_or_default();
        let next_token = (index + 1 < pages.len()).then(|| page_token(index + 1));

        Ok(InstancePage {
            instances,
            next_token,
        })
    }
}

/// Observer keeping a textual trace of every event
#[derive(Default)]
pub struct RecordingObserver {
    pub events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl CostObserver for RecordingObserver {
    fn cluster_started(&self, cluster_id: &str, region: &str) {
        self.push(format!("cluster {} {}", cluster_id, region));
    }

    fn group_started(&self, group: &InstanceGroup) {
        self.push(format!("group {}", group.id));
    }

    fn rate_resolved(
        &self,
        group: &InstanceGroup,
        hourly_rate: f64,
        breakdown: Option<&HourlyRates>,
    ) {
        match breakdown {
            Some(rates) => self.push(format!(
                "rate {} {} (managed {} compute {})",
                group.id, hourly_rate, rates.managed, rates.compute
            )),
            None => self.push(format!("rate {} {}", group.id, hourly_rate)),
        }
    }

    fn line_item(&self, _group: &InstanceGroup, item: &CostLineItem) {
        self.push(format!("item {} {}", item.instance_id, item.cost));
    }

    fn instance_skipped(&self, _group: &InstanceGroup, instance: &Instance) {
        self.push(format!("skip {}", instance.id));
    }

    fn group_finished(&self, group: &GroupCost) {
        self.push(format!("subtotal {} {}", group.group_id, group.subtotal));
    }

    fn cluster_finished(&self, report: &ClusterCostReport) {
        self.push(format!("total {}", report.total));
    }
}

pub fn group(id: &str, role: GroupRole, market: Market, instance_type: &str, bid: Option<&str>) -> InstanceGroup {
    InstanceGroup {
        id: id.to_string(),
        role,
        market,
        instance_type: instance_type.to_string(),
        bid_price: bid.map(str::to_string),
    }
}

/// Provider-style timestamp `offset_secs` after 2024-03-01 08:00:00 UTC
pub fn timestamp(offset_secs: i64) -> String {
    let base = NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|d| d.and_hms_opt(8, 0, 0))
        .unwrap();
    (base + Duration::seconds(offset_secs))
        .format("%Y-%m-%d %H:%M:%S+00:00")
        .to_string()
}

pub fn terminated(id: &str, running_secs: i64) -> Instance {
    Instance {
        id: id.to_string(),
        ec2_instance_id: Some(format!("i-{}", id)),
        created: Some(timestamp(0)),
        ended: Some(timestamp(running_secs)),
    }
}

pub fn running(id: &str) -> Instance {
    Instance {
        id: id.to_string(),
        ec2_instance_id: None,
        created: Some(timestamp(0)),
        ended: None,
    }
}

//! Cluster cost aggregation
//!
//! For each instance group, in the order the inventory returns them:
//!
//! 1. resolve the hourly rate (bid price for spot groups, managed + compute
//!    rate from the pricing source otherwise)
//! 2. page through the group's instances until a page carries no token
//! 3. cost every terminated instance with `Lifetime::compute`, skipping the
//!    ones that are still running
//!
//! Line items are rounded when computed. Group subtotals and the grand total
//! accumulate at full precision; the subtotal is rounded for display and the
//! total is rounded once at the end.
//!
//! Any error aborts the run and comes back wrapped in `CostError::Located`.
//! Progress is reported through a `CostObserver` as it happens, so callers can
//! stream output without waiting for the final report.

use crate::error::{CostError, Result};
use crate::inventory::Inventory;
use crate::lifetime::{round_cost, Lifetime};
use crate::pricing::PricingSource;
use crate::types::{
    ClusterCostReport, CostLineItem, GroupCost, HourlyRates, Instance, InstanceGroup, Market,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Receives progress events in processing order. All methods default to no-ops.
pub trait CostObserver: Send + Sync {
    fn cluster_started(&self, _cluster_id: &str, _region: &str) {}
    fn group_started(&self, _group: &InstanceGroup) {}
    fn rate_resolved(
        &self,
        _group: &InstanceGroup,
        _hourly_rate: f64,
        _breakdown: Option<&HourlyRates>,
    ) {
    }
    fn line_item(&self, _group: &InstanceGroup, _item: &CostLineItem) {}
    fn instance_skipped(&self, _group: &InstanceGroup, _instance: &Instance) {}
    fn group_finished(&self, _group: &GroupCost) {}
    fn cluster_finished(&self, _report: &ClusterCostReport) {}
}

/// Observer that discards every event
pub struct SilentObserver;

impl CostObserver for SilentObserver {}

pub struct CostAggregator {
    inventory: Arc<dyn Inventory>,
    pricing: Arc<dyn PricingSource>,
    region: String,
    observer: Arc<dyn CostObserver>,
}

impl CostAggregator {
    pub fn new(
        inventory: Arc<dyn Inventory>,
        pricing: Arc<dyn PricingSource>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            inventory,
            pricing,
            region: region.into(),
            observer: Arc::new(SilentObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn CostObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Hourly rate for a group, plus its managed/compute split when it came
    /// from the pricing source.
    ///
    /// Spot groups use their bid verbatim and never reach the pricing source;
    /// on-demand groups never look at the bid field.
    pub async fn resolve_rate(
        &self,
        group: &InstanceGroup,
    ) -> Result<(f64, Option<HourlyRates>)> {
        match group.market {
            Market::Spot => {
                let raw = group.bid_price.as_deref().unwrap_or_default();
                let invalid = || CostError::InvalidRate {
                    group_id: group.id.clone(),
                    value: raw.to_string(),
                };
                let bid: f64 = raw.trim().parse().map_err(|_| invalid())?;
                if !bid.is_finite() || bid < 0.0 {
                    return Err(invalid());
                }
                Ok((bid, None))
            }
            Market::OnDemand => {
                let rates = self
                    .pricing
                    .lookup_rates(&self.region, &group.instance_type)
                    .await?;
                debug!(
                    "{} in {}: managed ${}/hr + compute ${}/hr",
                    group.instance_type, self.region, rates.managed, rates.compute
                );
                Ok((rates.total(), Some(rates)))
            }
        }
    }

    /// Every instance of a group across all pages, in page order.
    pub async fn collect_instances(
        &self,
        cluster_id: &str,
        group_id: &str,
    ) -> Result<Vec<Instance>> {
        let mut instances = Vec::new();
        let mut token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .inventory
                .list_instances(cluster_id, group_id, token.as_deref())
                .await?;
            pages += 1;
            instances.extend(page.instances);

            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        debug!(
            "Group {}: {} instances over {} page(s)",
            group_id,
            instances.len(),
            pages
        );
        Ok(instances)
    }

    /// Cost of one group plus its full-precision subtotal.
    async fn cost_group(
        &self,
        cluster_id: &str,
        group: &InstanceGroup,
    ) -> Result<(GroupCost, f64)> {
        let located = |e: CostError| e.located(cluster_id, &group.id, None);

        self.observer.group_started(group);
        let (hourly_rate, rate_breakdown) = self.resolve_rate(group).await.map_err(located)?;
        self.observer.rate_resolved(group, hourly_rate, rate_breakdown.as_ref());

        let instances = self
            .collect_instances(cluster_id, &group.id)
            .await
            .map_err(located)?;

        let mut line_items = Vec::with_capacity(instances.len());
        let mut skipped_count = 0;
        let mut subtotal = 0.0;

        for instance in &instances {
            let Some(ended) = instance.ended.as_deref() else {
                warn!(
                    "Instance {} in group {} has not terminated, skipping",
                    instance.id, group.id
                );
                skipped_count += 1;
                self.observer.instance_skipped(group, instance);
                continue;
            };

            // an end time without a creation time is malformed, not unterminated
            let created = instance.created.as_deref().unwrap_or_default();
            let lifetime = Lifetime::compute(created, ended, hourly_rate)
                .map_err(|e| e.located(cluster_id, &group.id, Some(&instance.id)))?;

            let item = CostLineItem {
                instance_id: instance.id.clone(),
                ec2_instance_id: instance.ec2_instance_id.clone(),
                billable_hours: lifetime.hours,
                hourly_rate,
                cost: lifetime.cost,
            };
            debug!(
                "{} {}: {}h x ${}/hr = ${}",
                group.role, item.instance_id, item.billable_hours, hourly_rate, item.cost
            );
            self.observer.line_item(group, &item);

            subtotal += item.cost;
            line_items.push(item);
        }

        let cost = GroupCost {
            group_id: group.id.clone(),
            role: group.role.clone(),
            market: group.market,
            instance_type: group.instance_type.clone(),
            hourly_rate,
            rate_breakdown,
            instance_count: instances.len(),
            skipped_count,
            line_items,
            subtotal: round_cost(subtotal),
        };
        info!(
            "Group {} ({}): {} instances, ${}",
            cost.group_id, cost.role, cost.instance_count, cost.subtotal
        );
        self.observer.group_finished(&cost);

        Ok((cost, subtotal))
    }

    /// Full cost report for a cluster.
    pub async fn cluster_cost(&self, cluster_id: &str) -> Result<ClusterCostReport> {
        self.observer.cluster_started(cluster_id, &self.region);

        let groups = self
            .inventory
            .list_instance_groups(cluster_id)
            .await
            .map_err(|e| e.located(cluster_id, "*", None))?;

        let mut group_costs = Vec::with_capacity(groups.len());
        let mut total = 0.0;
        for group in &groups {
            let (cost, subtotal) = self.cost_group(cluster_id, group).await?;
            total += subtotal;
            group_costs.push(cost);
        }

        let report = ClusterCostReport {
            cluster_id: cluster_id.to_string(),
            region: self.region.clone(),
            groups: group_costs,
            total: round_cost(total),
        };
        info!("Cluster {} total: ${}", cluster_id, report.total);
        self.observer.cluster_finished(&report);

        Ok(report)
    }
}

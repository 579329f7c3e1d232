//! Console rendering of a cost run
//!
//! `ConsolePrinter` streams progress lines to stdout while the aggregator
//! works. Lines already printed stay visible when a later group fails.

use crate::aggregator::CostObserver;
use crate::lifetime::round_cost;
use crate::types::{ClusterCostReport, GroupCost, HourlyRates, InstanceGroup};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use console::style;

/// Prints one block per group and the final total
pub struct ConsolePrinter;

impl CostObserver for ConsolePrinter {
    fn cluster_started(&self, cluster_id: &str, region: &str) {
        println!("Cluster {} in region {}", cluster_id, region);
    }

    fn group_started(&self, group: &InstanceGroup) {
        println!("{}", style(format!("======={}=======", group.role)).bold());
    }

    fn rate_resolved(
        &self,
        group: &InstanceGroup,
        hourly_rate: f64,
        breakdown: Option<&HourlyRates>,
    ) {
        if let Some(rates) = breakdown {
            println!("{}", breakdown_line(rates));
        }
        println!("{}", rate_line(group, hourly_rate));
    }

    fn group_finished(&self, group: &GroupCost) {
        for line in group_summary_lines(group) {
            println!("{}", line);
        }
    }

    fn cluster_finished(&self, report: &ClusterCostReport) {
        println!(
            "{}",
            style(format!("Total cost of the cluster ${}", report.total)).green().bold()
        );
        println!("{}", "=".repeat(25));
    }
}

pub fn rate_line(group: &InstanceGroup, hourly_rate: f64) -> String {
    format!(
        "ID: {}  Machine Type: {}  Market: {}  Charged @ ${}/hr",
        group.id,
        group.instance_type,
        group.market,
        round_cost(hourly_rate)
    )
}

/// EC2 and EMR parts of an on-demand rate
pub fn breakdown_line(rates: &HourlyRates) -> String {
    format!(
        "EC2 cost: ${}/hr  EMR cost: ${}/hr",
        round_cost(rates.compute),
        round_cost(rates.managed)
    )
}

pub fn group_summary_lines(group: &GroupCost) -> Vec<String> {
    let mut lines = vec![format!("Total instances used : {}", group.instance_count)];
    if group.skipped_count > 0 {
        lines.push(format!(
            "Still running (not billed) : {}",
            group.skipped_count
        ));
    }
    lines.push(format!("Cost for this group is ${}", group.subtotal));
    lines
}

/// Per-instance table for `--detailed`
pub fn line_item_table(report: &ClusterCostReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("Group"),
        Cell::new("Role"),
        Cell::new("Instance"),
        Cell::new("EC2 ID"),
        Cell::new("Hours"),
        Cell::new("Rate/hr"),
        Cell::new("Cost"),
    ]);

    for group in &report.groups {
        for item in &group.line_items {
            table.add_row(vec![
                Cell::new(&group.group_id),
                Cell::new(group.role.as_str()),
                Cell::new(&item.instance_id),
                Cell::new(item.ec2_instance_id.as_deref().unwrap_or("-")),
                Cell::new(item.billable_hours),
                Cell::new(format!("${}", round_cost(item.hourly_rate))),
                Cell::new(format!("${}", item.cost)),
            ]);
        }
    }
    table
}

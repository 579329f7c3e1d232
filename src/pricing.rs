//! Pricing service seam and local rate sources
//!
//! `PricingSource::lookup_rates` returns the managed-service surcharge and the
//! compute rate for an instance type in a region. `StaticRateTable` serves them
//! from the config file; `crate::aws::pricing::AwsPricingSource` asks the AWS
//! Price List API. `on_demand_usd_per_hour` reads one Price List product
//! document and is shared by the AWS source and its tests.

use crate::config::StaticRate;
use crate::error::{CostError, Result};
use crate::types::HourlyRates;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait PricingSource: Send + Sync {
    /// Fails with `RateNotFound` when the instance type is unknown in `region`.
    async fn lookup_rates(&self, region: &str, instance_type: &str) -> Result<HourlyRates>;
}

/// Rates taken from `[[pricing.rates]]` in the config file
#[derive(Debug, Clone, Default)]
pub struct StaticRateTable {
    rates: Vec<StaticRate>,
}

impl StaticRateTable {
    pub fn new(rates: Vec<StaticRate>) -> Self {
        Self { rates }
    }

    /// Region-specific entry first, then a region-less one.
    fn find(&self, region: &str, instance_type: &str) -> Option<&StaticRate> {
        let of_type = move || self.rates.iter().filter(move |r| r.instance_type == instance_type);
        of_type()
            .find(|r| r.region.as_deref() == Some(region))
            .or_else(|| of_type().find(|r| r.region.is_none()))
    }
}

#[async_trait]
impl PricingSource for StaticRateTable {
    async fn lookup_rates(&self, region: &str, instance_type: &str) -> Result<HourlyRates> {
        self.find(region, instance_type)
            .map(|r| HourlyRates {
                managed: r.managed_per_hour,
                compute: r.compute_per_hour,
            })
            .ok_or_else(|| CostError::RateNotFound {
                instance_type: instance_type.to_string(),
                region: region.to_string(),
            })
    }
}

/// Hourly USD price from an AWS Price List product document.
///
/// Walks `terms.OnDemand.*.priceDimensions.*` and returns the first
/// `pricePerUnit.USD` whose unit is hours. `None` when the document has no
/// hourly on-demand dimension or it cannot be parsed.
pub fn on_demand_usd_per_hour(document: &str) -> Option<f64> {
    let value: Value = serde_json::from_str(document).ok()?;
    let terms = value.get("terms")?.get("OnDemand")?.as_object()?;

    terms
        .values()
        .filter_map(|term| term.get("priceDimensions").and_then(|p| p.as_object()))
        .flat_map(|dims| dims.values())
        .filter(|dim| {
            dim.get("unit")
                .and_then(|u| u.as_str())
                .map(|u| u.eq_ignore_ascii_case("hrs") || u.eq_ignore_ascii_case("hours"))
                .unwrap_or(false)
        })
        .filter_map(|dim| {
            dim.get("pricePerUnit")
                .and_then(|p| p.get("USD"))
                .and_then(|u| u.as_str())
                .and_then(|s| s.parse::<f64>().ok())
        })
        .find(|price| price.is_finite() && *price >= 0.0)
}

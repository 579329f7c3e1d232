//! Pricing from the AWS Price List API
//!
//! The hourly rate of an on-demand group is the EMR surcharge plus the EC2
//! on-demand Linux rate for its instance type. The Price List API is only
//! served from a few regions, so the client always talks to us-east-1 and
//! filters products by `regionCode` instead.

use super::sdk_error;
use crate::error::{CostError, Result};
use crate::pricing::{on_demand_usd_per_hour, PricingSource};
use crate::retry::{ExponentialBackoffPolicy, RetryPolicy};
use crate::types::HourlyRates;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_pricing::config::Region;
use aws_sdk_pricing::types::{Filter, FilterType};
use aws_sdk_pricing::Client as PricingClient;
use tracing::debug;

pub const PRICING_ENDPOINT_REGION: &str = "us-east-1";

const EMR_SERVICE_CODE: &str = "ElasticMapReduce";
const EC2_SERVICE_CODE: &str = "AmazonEC2";

pub struct AwsPricingSource {
    client: PricingClient,
    retry: ExponentialBackoffPolicy,
}

impl AwsPricingSource {
    pub fn new(sdk_config: &SdkConfig, retry: ExponentialBackoffPolicy) -> Self {
        let conf = aws_sdk_pricing::config::Builder::from(sdk_config)
            .region(Region::new(PRICING_ENDPOINT_REGION))
            .build();
        Self {
            client: PricingClient::from_conf(conf),
            retry,
        }
    }

    /// First hourly on-demand price among the products matching `terms`.
    async fn hourly_price(
        &self,
        service_code: &str,
        terms: &[(&str, &str)],
    ) -> Result<Option<f64>> {
        let filters = term_filters(terms)?;

        let response = self
            .retry
            .execute_with_retry(|| {
                let filters = filters.clone();
                async move {
                    self.client
                        .get_products()
                        .service_code(service_code)
                        .set_filters(Some(filters))
                        .max_results(10)
                        .send()
                        .await
                        .map_err(|e| sdk_error("pricing", "GetProducts", e))
                }
            })
            .await?;

        Ok(response
            .price_list()
            .iter()
            .find_map(|doc| on_demand_usd_per_hour(doc)))
    }
}

fn term_filters(terms: &[(&str, &str)]) -> Result<Vec<Filter>> {
    terms
        .iter()
        .map(|(field, value)| {
            Filter::builder()
                .r#type(FilterType::TermMatch)
                .field(*field)
                .value(*value)
                .build()
                .map_err(|e| CostError::Service {
                    service: "pricing".to_string(),
                    operation: "GetProducts".to_string(),
                    message: format!("invalid filter {}={}: {}", field, value, e),
                    retryable: false,
                    source: Some(Box::new(e)),
                })
        })
        .collect()
}

/// Price List filters for the EMR surcharge of an instance type
pub(crate) fn emr_terms<'a>(
    region: &'a str,
    instance_type: &'a str,
) -> Vec<(&'static str, &'a str)> {
    vec![
        ("regionCode", region),
        ("instanceType", instance_type),
        ("softwareType", "EMR"),
    ]
}

/// Price List filters for the EC2 on-demand Linux rate of an instance type
pub(crate) fn ec2_terms<'a>(
    region: &'a str,
    instance_type: &'a str,
) -> Vec<(&'static str, &'a str)> {
    vec![
        ("regionCode", region),
        ("instanceType", instance_type),
        ("operatingSystem", "Linux"),
        ("tenancy", "Shared"),
        ("preInstalledSw", "NA"),
        ("capacitystatus", "Used"),
    ]
}

#[async_trait]
impl PricingSource for AwsPricingSource {
    async fn lookup_rates(&self, region: &str, instance_type: &str) -> Result<HourlyRates> {
        let not_found = || CostError::RateNotFound {
            instance_type: instance_type.to_string(),
            region: region.to_string(),
        };

        let managed = self
            .hourly_price(EMR_SERVICE_CODE, &emr_terms(region, instance_type))
            .await?
            .ok_or_else(not_found)?;
        let compute = self
            .hourly_price(EC2_SERVICE_CODE, &ec2_terms(region, instance_type))
            .await?
            .ok_or_else(not_found)?;

        debug!(
            "Price list for {} in {}: EC2 ${}/hr, EMR ${}/hr",
            instance_type, region, compute, managed
        );
        Ok(HourlyRates { managed, compute })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_are_scoped_to_region_and_type() {
        for terms in [emr_terms("eu-west-1", "r5.xlarge"), ec2_terms("eu-west-1", "r5.xlarge")] {
            assert!(terms.contains(&("regionCode", "eu-west-1")));
            assert!(terms.contains(&("instanceType", "r5.xlarge")));
        }
        assert!(emr_terms("eu-west-1", "r5.xlarge").contains(&("softwareType", "EMR")));
        assert!(ec2_terms("eu-west-1", "r5.xlarge").contains(&("operatingSystem", "Linux")));
    }

    #[test]
    fn test_term_filters_build() {
        let filters = term_filters(&ec2_terms("us-east-1", "m5.xlarge")).unwrap();
        assert_eq!(filters.len(), 6);
        assert_eq!(filters[0].field(), "regionCode");
        assert_eq!(filters[0].value(), "us-east-1");
        assert_eq!(filters[0].r#type(), &FilterType::TermMatch);
    }
}

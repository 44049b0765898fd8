//! Pricing request models

use navilead::{BillingInterval, Plan, SmsCreditPackage};
use serde::Deserialize;

/// Price one billing period of a plan
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPricingRequest {
    pub plan: Plan,
    #[serde(default)]
    pub interval: BillingInterval,
    /// Falls back to the server's default VAT
    pub vat_percent: Option<f64>,
}

/// Price a purchase of SMS credit packages
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsCreditsPricingRequest {
    pub package: SmsCreditPackage,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub vat_percent: Option<f64>,
}

fn default_quantity() -> u32 {
    1
}

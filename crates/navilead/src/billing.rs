//! Merchant billing: subscription plans and SMS credit packages
//!
//! Both charge types share the quote VAT arithmetic from [`crate::pricing`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{NavileadError, PricingError, Result, overflow};
use crate::money::{Currency, to_f64};
use crate::pricing::{apply_vat, validate_non_negative as non_negative};

/// A subscription plan offered to merchants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub name: String,
    pub monthly_price: f64,
    /// Yearly price; twelve months of the monthly price when absent
    #[serde(default)]
    pub yearly_price: Option<f64>,
    /// Charged currency; DKK unless the caller fills it in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
}

/// How often a subscription is charged
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BillingInterval {
    #[default]
    Monthly,
    Yearly,
}

/// A bundle of SMS credits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SmsCreditPackage {
    pub id: String,
    pub credits: u32,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
}

/// Net, VAT and gross amounts of a single charge
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChargeBreakdown {
    pub description: String,
    pub net: f64,
    pub vat_percent: f64,
    pub vat: f64,
    pub gross: f64,
    pub currency: Currency,
}

/// SMS credit purchase: the charge plus the credits it grants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SmsPurchase {
    pub charge: ChargeBreakdown,
    pub credits_granted: u64,
}

/// Charge for one billing period of a plan
pub fn subscription_charge(
    plan: &Plan,
    interval: BillingInterval,
    vat_percent: f64,
) -> Result<ChargeBreakdown> {
    let net = match interval {
        BillingInterval::Monthly => non_negative("monthlyPrice", plan.monthly_price)?,
        BillingInterval::Yearly => match plan.yearly_price {
            Some(yearly) => non_negative("yearlyPrice", yearly)?,
            None => non_negative("monthlyPrice", plan.monthly_price)?
                .checked_mul(Decimal::from(12))
                .ok_or_else(|| overflow("yearlyPrice"))?,
        },
    };

    let description = match interval {
        BillingInterval::Monthly => format!("{} (monthly)", plan.name),
        BillingInterval::Yearly => format!("{} (yearly)", plan.name),
    };

    charge(description, net, vat_percent, plan.currency.unwrap_or_default())
}

/// Charge for buying `quantity` SMS credit packages
pub fn sms_credit_charge(
    package: &SmsCreditPackage,
    quantity: u32,
    vat_percent: f64,
) -> Result<SmsPurchase> {
    if quantity == 0 {
        return Err(NavileadError::Pricing(PricingError::InvalidQuantity { quantity }));
    }

    let net = non_negative("price", package.price)?
        .checked_mul(Decimal::from(quantity))
        .ok_or_else(|| overflow("price"))?;
    let credits_granted = u64::from(package.credits) * u64::from(quantity);
    let description = format!("{} SMS credits", credits_granted);

    let charge = charge(description, net, vat_percent, package.currency.unwrap_or_default())?;
    info!(package = %package.id, credits_granted, gross = charge.gross, "priced SMS credit purchase");

    Ok(SmsPurchase {
        charge,
        credits_granted,
    })
}

fn charge(
    description: String,
    net: Decimal,
    vat_percent: f64,
    currency: Currency,
) -> Result<ChargeBreakdown> {
    let (vat, gross) = apply_vat(net, vat_percent)?;
    Ok(ChargeBreakdown {
        description,
        net: to_f64(net),
        vat_percent,
        vat: to_f64(vat),
        gross: to_f64(gross),
        currency,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(yearly: Option<f64>) -> Plan {
        Plan {
            id: "pro".to_string(),
            name: "Pro".to_string(),
            monthly_price: 299.0,
            yearly_price: yearly,
            currency: Some(Currency::Dkk),
        }
    }

    #[test]
    fn monthly_charge_adds_vat() {
        let charge = subscription_charge(&plan(None), BillingInterval::Monthly, 25.0).unwrap();
        assert_eq!(charge.net, 299.0);
        assert_eq!(charge.vat, 74.75);
        assert_eq!(charge.gross, 373.75);
        assert_eq!(charge.description, "Pro (monthly)");
    }

    #[test]
    fn yearly_falls_back_to_twelve_months() {
        let charge = subscription_charge(&plan(None), BillingInterval::Yearly, 0.0).unwrap();
        assert_eq!(charge.net, 3588.0);

        let discounted = subscription_charge(&plan(Some(2990.0)), BillingInterval::Yearly, 0.0).unwrap();
        assert_eq!(discounted.gross, 2990.0);
    }

    #[test]
    fn sms_purchase_multiplies_package() {
        let package = SmsCreditPackage {
            id: "sms-500".to_string(),
            credits: 500,
            price: 200.0,
            currency: Some(Currency::Dkk),
        };
        let purchase = sms_credit_charge(&package, 3, 25.0).unwrap();
        assert_eq!(purchase.credits_granted, 1500);
        assert_eq!(purchase.charge.net, 600.0);
        assert_eq!(purchase.charge.gross, 750.0);

        assert!(sms_credit_charge(&package, 0, 25.0).is_err());
    }

    #[test]
    fn charge_uses_plan_currency_or_dkk() {
        let mut unset = plan(None);
        unset.currency = None;
        let charge = subscription_charge(&unset, BillingInterval::Monthly, 25.0).unwrap();
        assert_eq!(charge.currency, Currency::Dkk);

        let mut euro = plan(None);
        euro.currency = Some(Currency::Eur);
        let charge = subscription_charge(&euro, BillingInterval::Monthly, 25.0).unwrap();
        assert_eq!(charge.currency, Currency::Eur);
    }

    #[test]
    fn negative_plan_price_is_rejected() {
        let mut bad = plan(None);
        bad.monthly_price = -1.0;
        assert!(subscription_charge(&bad, BillingInterval::Monthly, 25.0).is_err());
    }

    #[test]
    fn oversized_charges_are_errors() {
        let mut big = plan(None);
        big.monthly_price = 7e27;
        assert!(matches!(
            subscription_charge(&big, BillingInterval::Yearly, 0.0),
            Err(NavileadError::Pricing(PricingError::Overflow { .. }))
        ));

        big.monthly_price = 1e30;
        assert!(matches!(
            subscription_charge(&big, BillingInterval::Monthly, 25.0),
            Err(NavileadError::Pricing(PricingError::OutOfRange { .. }))
        ));

        let package = SmsCreditPackage {
            id: "sms-max".to_string(),
            credits: u32::MAX,
            price: 5e19,
            currency: Some(Currency::Dkk),
        };
        assert!(matches!(
            sms_credit_charge(&package, u32::MAX, 25.0),
            Err(NavileadError::Pricing(PricingError::Overflow { .. }))
        ));
    }
}

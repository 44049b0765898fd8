//! Quote price calculation
//!
//! Turns a list of services plus discount and VAT rates into the numbers
//! printed on an offer:
//!
//! ```text
//! line final     = price * qty * (1 - line discount%)   (selected or required lines)
//! subtotal       = sum of line finals
//! after discount = subtotal * (1 - overall discount%)
//! vat            = after discount * vat%
//! total          = after discount + vat
//! ```
//!
//! Uses rust_decimal for precision; every amount is rounded to 2 decimal
//! places before it is summed or exposed.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{NavileadError, PricingError, Result, overflow};
use crate::money::{Currency, checked_decimal, percent_of, round_money, to_decimal, to_f64};
use crate::quote::{Quote, Service};

/// Price of a single service line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineTotal {
    pub service_id: String,
    /// Whether the line counts towards the subtotal
    pub included: bool,
    pub unit_price: f64,
    pub quantity: f64,
    pub discount_percent: f64,
    /// price * quantity
    pub gross: f64,
    pub discount_amount: f64,
    /// gross - discount
    pub final_price: f64,
}

/// Result of a quote price calculation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub lines: Vec<LineTotal>,
    pub subtotal: f64,
    pub overall_discount_percent: f64,
    pub overall_discount_amount: f64,
    pub subtotal_after_discount: f64,
    pub vat_percent: f64,
    pub vat_amount: f64,
    pub total: f64,
    pub currency: Currency,
}

impl PriceBreakdown {
    /// Line for a service id
    pub fn line(&self, service_id: &str) -> Option<&LineTotal> {
        self.lines.iter().find(|l| l.service_id == service_id)
    }

    /// Whether an overall discount was applied
    pub fn has_discount(&self) -> bool {
        self.overall_discount_amount > 0.0
    }
}

/// Calculate the price breakdown of a quote
pub fn calculate_quote(quote: &Quote) -> Result<PriceBreakdown> {
    let mut breakdown = calculate(&quote.services, quote.overall_discount, quote.vat_percent)?;
    breakdown.currency = quote.currency;
    Ok(breakdown)
}

/// Calculate a price breakdown from raw inputs
///
/// # Errors
///
/// Returns `PricingError` when a price or quantity is negative, or when any
/// percentage falls outside `0..=100`. Amounts too large for a `Decimal`, or
/// whose products overflow, are `PricingError::Overflow`/`OutOfRange`.
/// Missing or non-finite numbers count as zero and are not errors.
#[instrument(skip(services), fields(services = services.len()))]
pub fn calculate(
    services: &[Service],
    overall_discount_percent: f64,
    vat_percent: f64,
) -> Result<PriceBreakdown> {
    let overall = validate_percent("overallDiscount", overall_discount_percent)?;
    let vat_rate = validate_percent("vatPercent", vat_percent)?;

    let mut lines = Vec::with_capacity(services.len());
    let mut subtotal = Decimal::ZERO;

    for service in services {
        let line = price_line(service)?;
        if line.included {
            subtotal = subtotal
                .checked_add(line.final_price)
                .ok_or_else(|| overflow("subtotal"))?;
        }
        lines.push(line);
    }

    let overall_discount_amount =
        round_money(percent_of(subtotal, overall).ok_or_else(|| overflow("overallDiscount"))?);
    let subtotal_after_discount = subtotal - overall_discount_amount;
    let vat_amount =
        round_money(percent_of(subtotal_after_discount, vat_rate).ok_or_else(|| overflow("vatAmount"))?);
    let total = subtotal_after_discount
        .checked_add(vat_amount)
        .ok_or_else(|| overflow("total"))?;

    debug!(%subtotal, %total, "calculated quote price");

    Ok(PriceBreakdown {
        lines: lines.into_iter().map(PricedLine::into_line_total).collect(),
        subtotal: to_f64(subtotal),
        overall_discount_percent: to_f64(overall),
        overall_discount_amount: to_f64(overall_discount_amount),
        subtotal_after_discount: to_f64(subtotal_after_discount),
        vat_percent: to_f64(vat_rate),
        vat_amount: to_f64(vat_amount),
        total: to_f64(total),
        currency: Currency::default(),
    })
}

/// Add VAT to a net amount, returning `(vat, gross)`
pub fn apply_vat(net: Decimal, vat_percent: f64) -> Result<(Decimal, Decimal)> {
    let rate = validate_percent("vatPercent", vat_percent)?;
    let vat = round_money(percent_of(net, rate).ok_or_else(|| overflow("vat"))?);
    let gross = round_money(net)
        .checked_add(vat)
        .ok_or_else(|| overflow("gross"))?;
    Ok((vat, gross))
}

// Decimal intermediate, converted once at the end
struct PricedLine {
    service_id: String,
    included: bool,
    unit_price: Decimal,
    quantity: Decimal,
    discount_percent: Decimal,
    gross: Decimal,
    discount_amount: Decimal,
    final_price: Decimal,
}

impl PricedLine {
    fn into_line_total(self) -> LineTotal {
        LineTotal {
            service_id: self.service_id,
            included: self.included,
            unit_price: to_f64(self.unit_price),
            quantity: self.quantity.to_f64().unwrap_or_default(),
            discount_percent: to_f64(self.discount_percent),
            gross: to_f64(self.gross),
            discount_amount: to_f64(self.discount_amount),
            final_price: to_f64(self.final_price),
        }
    }
}

fn price_line(service: &Service) -> Result<PricedLine> {
    let unit_price = validate_non_negative("pricePerUnit", service.price_per_unit)?;
    let quantity = validate_non_negative("quantity", service.quantity)?;
    let discount_percent = validate_percent("discountPercent", service.discount_percent)?;

    let gross = round_money(
        unit_price
            .checked_mul(quantity)
            .ok_or_else(|| overflow(format!("Service '{}'", service.id)))?,
    );
    let discount_amount = round_money(
        percent_of(gross, discount_percent).ok_or_else(|| overflow("discountAmount"))?,
    );
    let final_price = gross - discount_amount;

    Ok(PricedLine {
        service_id: service.id.clone(),
        included: service.is_included(),
        unit_price,
        quantity,
        discount_percent,
        gross,
        discount_amount,
        final_price,
    })
}

pub(crate) fn validate_non_negative(field: &str, value: f64) -> Result<Decimal> {
    let negative = || {
        NavileadError::Pricing(PricingError::NegativeValue {
            field: field.to_string(),
            value,
        })
    };
    let Some(decimal) = checked_decimal(value) else {
        if value < 0.0 {
            return Err(negative());
        }
        return Err(NavileadError::Pricing(PricingError::OutOfRange {
            field: field.to_string(),
            value,
        }));
    };
    if decimal.is_sign_negative() && !decimal.is_zero() {
        return Err(negative());
    }
    Ok(decimal)
}

fn validate_percent(field: &str, value: f64) -> Result<Decimal> {
    let decimal = to_decimal(value);
    if decimal < Decimal::ZERO || decimal > Decimal::ONE_HUNDRED {
        return Err(NavileadError::Pricing(PricingError::PercentOutOfRange {
            field: field.to_string(),
            value,
        }));
    }
    Ok(decimal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_discount_then_vat() {
        let services = vec![Service::new("a", "Consulting", 100.0).with_discount(10.0)];
        let breakdown = calculate(&services, 0.0, 25.0).unwrap();

        assert_eq!(breakdown.lines[0].final_price, 90.0);
        assert_eq!(breakdown.subtotal, 90.0);
        assert_eq!(breakdown.subtotal_after_discount, 90.0);
        assert_eq!(breakdown.vat_amount, 22.5);
        assert_eq!(breakdown.total, 112.5);
    }

    #[test]
    fn overall_discount_applies_before_vat() {
        let services = vec![
            Service::new("a", "Design", 1000.0),
            Service::new("b", "Hosting", 50.0).with_quantity(12.0),
        ];
        let breakdown = calculate(&services, 10.0, 25.0).unwrap();

        assert_eq!(breakdown.subtotal, 1600.0);
        assert_eq!(breakdown.overall_discount_amount, 160.0);
        assert_eq!(breakdown.subtotal_after_discount, 1440.0);
        assert_eq!(breakdown.vat_amount, 360.0);
        assert_eq!(breakdown.total, 1800.0);
        assert!(breakdown.has_discount());
    }

    #[test]
    fn deselected_lines_are_reported_but_not_summed() {
        let services = vec![
            Service::new("a", "Base", 200.0).required(),
            Service::new("b", "Extra", 80.0).deselected(),
        ];
        let breakdown = calculate(&services, 0.0, 0.0).unwrap();

        assert_eq!(breakdown.subtotal, 200.0);
        let extra = breakdown.line("b").unwrap();
        assert!(!extra.included);
        assert_eq!(extra.final_price, 80.0);
    }

    #[test]
    fn missing_numbers_count_as_zero() {
        let mut service = Service::new("a", "Unpriced", f64::NAN);
        service.quantity = f64::NAN;
        let breakdown = calculate(&[service], 0.0, 25.0).unwrap();
        assert_eq!(breakdown.total, 0.0);
    }

    #[test]
    fn empty_selection_is_zero() {
        let breakdown = calculate(&[], 50.0, 25.0).unwrap();
        assert_eq!(breakdown.subtotal, 0.0);
        assert_eq!(breakdown.vat_amount, 0.0);
        assert_eq!(breakdown.total, 0.0);
    }

    #[test]
    fn rejects_invalid_inputs() {
        let negative = vec![Service::new("a", "Refund", -1.0)];
        assert!(matches!(
            calculate(&negative, 0.0, 25.0),
            Err(NavileadError::Pricing(PricingError::NegativeValue { .. }))
        ));

        let too_much = vec![Service::new("a", "Free", 10.0).with_discount(101.0)];
        assert!(matches!(
            calculate(&too_much, 0.0, 25.0),
            Err(NavileadError::Pricing(PricingError::PercentOutOfRange { .. }))
        ));

        assert!(calculate(&[], -1.0, 25.0).is_err());
        assert!(calculate(&[], 0.0, 120.0).is_err());
    }

    #[test]
    fn overflowing_products_are_errors() {
        let huge = vec![Service::new("a", "Big", 1e20).with_quantity(1e20)];
        assert!(matches!(
            calculate(&huge, 0.0, 25.0),
            Err(NavileadError::Pricing(PricingError::Overflow { .. }))
        ));

        let pair = vec![Service::new("a", "Half", 5e28), Service::new("b", "Half", 5e28)];
        assert_eq!(
            calculate(&pair, 0.0, 0.0).unwrap_err().to_string(),
            "Pricing error: subtotal is too large to calculate"
        );

        let taxed = vec![Service::new("a", "Edge", 7e28)];
        assert!(matches!(
            calculate(&taxed, 0.0, 25.0),
            Err(NavileadError::Pricing(PricingError::Overflow { .. }))
        ));
        assert!(apply_vat(Decimal::MAX, 25.0).is_err());
    }

    #[test]
    fn unrepresentable_amounts_are_not_priced_as_zero() {
        let services = vec![Service::new("a", "Enormous", 1e30)];
        assert!(matches!(
            calculate(&services, 0.0, 25.0),
            Err(NavileadError::Pricing(PricingError::OutOfRange { .. }))
        ));

        let negative = vec![Service::new("a", "Enormous refund", -1e30)];
        assert!(matches!(
            calculate(&negative, 0.0, 25.0),
            Err(NavileadError::Pricing(PricingError::NegativeValue { .. }))
        ));

        assert!(matches!(
            calculate(&[], 1e30, 25.0),
            Err(NavileadError::Pricing(PricingError::PercentOutOfRange { .. }))
        ));
    }

    #[test]
    fn vat_helper_rounds() {
        let (vat, gross) = apply_vat(Decimal::new(9999, 2), 25.0).unwrap();
        assert_eq!(vat, Decimal::new(2500, 2));
        assert_eq!(gross, Decimal::new(12499, 2));
    }
}

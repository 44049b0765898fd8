//! Quotes (offers) and the services they contain

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DataError, NavileadError, Result};
use crate::money::Currency;

/// VAT applied when a quote does not say otherwise
pub const DEFAULT_VAT_PERCENT: f64 = 25.0;

/// Unique identifier for a quote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct QuoteId(pub String);

impl From<String> for QuoteId {
    fn from(s: String) -> Self {
        QuoteId(s)
    }
}

impl From<&str> for QuoteId {
    fn from(s: &str) -> Self {
        QuoteId(s.to_string())
    }
}

impl AsRef<str> for QuoteId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A priced line on a quote
///
/// `price_per_unit` and `quantity` are kept as raw numbers because they come
/// straight from merchant input; pricing treats missing or non-finite values
/// as zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "nan", deserialize_with = "lenient_number")]
    pub price_per_unit: f64,
    #[serde(default = "nan", deserialize_with = "lenient_number")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub discount_percent: f64,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub selected: bool,
}

fn nan() -> f64 {
    f64::NAN
}

// Form inputs arrive as numbers, numeric strings or null.
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => n,
        Some(Raw::Text(s)) => s.trim().replace(',', ".").parse().unwrap_or(f64::NAN),
        None => f64::NAN,
    })
}

impl Service {
    /// Create a selected, optional service with quantity 1 and no discount
    pub fn new(id: impl Into<String>, name: impl Into<String>, price_per_unit: f64) -> Self {
        Service {
            id: id.into(),
            name: name.into(),
            description: None,
            price_per_unit,
            quantity: 1.0,
            discount_percent: 0.0,
            is_required: false,
            selected: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_quantity(mut self, quantity: f64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_discount(mut self, percent: f64) -> Self {
        self.discount_percent = percent;
        self
    }

    /// Mark the service as required; required services are always included
    pub fn required(mut self) -> Self {
        self.is_required = true;
        self.selected = true;
        self
    }

    /// Start the service deselected
    pub fn deselected(mut self) -> Self {
        self.selected = false;
        self
    }

    /// Whether the service counts towards the quote total
    pub fn is_included(&self) -> bool {
        self.is_required || self.selected
    }
}

/// A file attached to an offer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attachment {
    pub name: String,
    pub url: String,
}

/// A proposal document sent to a lead with selectable priced services
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    #[serde(default)]
    pub id: QuoteId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub services: Vec<Service>,
    /// Percent discount applied to the subtotal
    #[serde(default)]
    pub overall_discount: f64,
    #[serde(default)]
    pub terms: Option<String>,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default = "default_vat")]
    pub vat_percent: f64,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

fn default_vat() -> f64 {
    DEFAULT_VAT_PERCENT
}

impl Quote {
    /// Create an empty quote with default currency and VAT
    pub fn new(id: impl Into<QuoteId>, title: impl Into<String>) -> Self {
        Quote {
            id: id.into(),
            title: title.into(),
            description: None,
            services: Vec::new(),
            overall_discount: 0.0,
            terms: None,
            currency: Currency::default(),
            vat_percent: DEFAULT_VAT_PERCENT,
            attachments: Vec::new(),
        }
    }

    /// Create a new quote builder
    pub fn builder(id: impl Into<QuoteId>) -> QuoteBuilder {
        QuoteBuilder::new(id.into())
    }

    /// Look up a service by id
    pub fn service(&self, service_id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id == service_id)
    }

    fn service_mut(&mut self, service_id: &str) -> Result<&mut Service> {
        self.services
            .iter_mut()
            .find(|s| s.id == service_id)
            .ok_or_else(|| {
                NavileadError::Data(DataError::ServiceNotFound {
                    id: service_id.to_string(),
                })
            })
    }

    /// Select or deselect a service on behalf of the viewer.
    ///
    /// Required services cannot be deselected. Re-selecting a required
    /// service is a no-op.
    pub fn set_selected(&mut self, service_id: &str, selected: bool) -> Result<()> {
        let service = self.service_mut(service_id)?;
        if service.is_required {
            if selected {
                return Ok(());
            }
            return Err(NavileadError::Data(DataError::ServiceLocked {
                id: service_id.to_string(),
            }));
        }
        debug!(service_id, selected, "viewer toggled service");
        service.selected = selected;
        Ok(())
    }

    /// Change a service discount on behalf of the viewer.
    ///
    /// The percent is clamped into `0..=100`; non-finite input becomes 0.
    pub fn set_discount(&mut self, service_id: &str, percent: f64) -> Result<()> {
        let service = self.service_mut(service_id)?;
        if service.is_required {
            return Err(NavileadError::Data(DataError::ServiceLocked {
                id: service_id.to_string(),
            }));
        }
        let clamped = if percent.is_finite() {
            percent.clamp(0.0, 100.0)
        } else {
            0.0
        };
        debug!(service_id, percent = clamped, "viewer changed discount");
        service.discount_percent = clamped;
        Ok(())
    }

    /// Services that count towards the total, in quote order
    pub fn included_services(&self) -> impl Iterator<Item = &Service> {
        self.services.iter().filter(|s| s.is_included())
    }
}

/// Builder for creating quotes with a fluent API
#[derive(Debug)]
pub struct QuoteBuilder {
    id: QuoteId,
    title: Option<String>,
    description: Option<String>,
    services: Vec<Service>,
    overall_discount: f64,
    terms: Option<String>,
    currency: Currency,
    vat_percent: f64,
    attachments: Vec<Attachment>,
}

impl QuoteBuilder {
    /// Create a new quote builder
    pub fn new(id: QuoteId) -> Self {
        QuoteBuilder {
            id,
            title: None,
            description: None,
            services: Vec::new(),
            overall_discount: 0.0,
            terms: None,
            currency: Currency::default(),
            vat_percent: DEFAULT_VAT_PERCENT,
            attachments: Vec::new(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn service(mut self, service: Service) -> Self {
        self.services.push(service);
        self
    }

    pub fn services(mut self, services: impl IntoIterator<Item = Service>) -> Self {
        self.services.extend(services);
        self
    }

    pub fn overall_discount(mut self, percent: f64) -> Self {
        self.overall_discount = percent;
        self
    }

    pub fn terms(mut self, terms: impl Into<String>) -> Self {
        self.terms = Some(terms.into());
        self
    }

    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn vat_percent(mut self, percent: f64) -> Self {
        self.vat_percent = percent;
        self
    }

    pub fn attachment(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.attachments.push(Attachment {
            name: name.into(),
            url: url.into(),
        });
        self
    }

    /// Build the quote
    pub fn build(self) -> Result<Quote> {
        let title = self.title.ok_or_else(|| {
            NavileadError::Data(DataError::MissingField {
                field: "title".to_string(),
            })
        })?;

        Ok(Quote {
            id: self.id,
            title,
            description: self.description,
            services: self.services,
            overall_discount: self.overall_discount,
            terms: self.terms,
            currency: self.currency,
            vat_percent: self.vat_percent,
            attachments: self.attachments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Quote {
        Quote::builder("q-1")
            .title("Website")
            .service(Service::new("setup", "Setup", 500.0).required())
            .service(Service::new("seo", "SEO", 200.0))
            .build()
            .unwrap()
    }

    #[test]
    fn builder_requires_title() {
        assert!(Quote::builder("q-1").build().is_err());
    }

    #[test]
    fn required_service_cannot_be_deselected() {
        let mut quote = sample();
        let err = quote.set_selected("setup", false).unwrap_err();
        assert!(matches!(err, NavileadError::Data(DataError::ServiceLocked { .. })));
        assert!(quote.set_selected("setup", true).is_ok());
        assert!(quote.service("setup").unwrap().is_included());
    }

    #[test]
    fn optional_service_toggles() {
        let mut quote = sample();
        quote.set_selected("seo", false).unwrap();
        assert_eq!(quote.included_services().count(), 1);
        assert!(quote.set_selected("missing", true).is_err());
    }

    #[test]
    fn viewer_discount_is_clamped() {
        let mut quote = sample();
        quote.set_discount("seo", 140.0).unwrap();
        assert_eq!(quote.service("seo").unwrap().discount_percent, 100.0);
        quote.set_discount("seo", -5.0).unwrap();
        assert_eq!(quote.service("seo").unwrap().discount_percent, 0.0);
        quote.set_discount("seo", f64::NAN).unwrap();
        assert_eq!(quote.service("seo").unwrap().discount_percent, 0.0);
        assert!(quote.set_discount("setup", 10.0).is_err());
    }

    #[test]
    fn deserializes_camel_case_with_defaults() {
        let quote: Quote = serde_json::from_value(json!({
            "title": "Roof",
            "services": [
                { "id": "a", "name": "Tiles", "pricePerUnit": 100, "quantity": 2, "selected": true },
                { "id": "b", "name": "Gutter" },
                { "id": "c", "name": "Paint", "pricePerUnit": "49,5", "quantity": null }
            ]
        }))
        .unwrap();

        assert_eq!(quote.vat_percent, 25.0);
        assert_eq!(quote.currency, Currency::Dkk);
        assert_eq!(quote.services[0].price_per_unit, 100.0);
        assert!(quote.services[1].price_per_unit.is_nan());
        assert!(!quote.services[1].is_included());
        assert_eq!(quote.services[2].price_per_unit, 49.5);
        assert!(quote.services[2].quantity.is_nan());
    }
}

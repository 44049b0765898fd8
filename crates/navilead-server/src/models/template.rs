//! Template-related API models

use navilead::{OfferContext, OfferTemplate, PriceBreakdown, Quote};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

/// Template summary for listing endpoints
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<OfferTemplate> for TemplateSummary {
    fn from(template: OfferTemplate) -> Self {
        Self {
            id: template.id.0,
            name: template.name,
            description: template.description,
            updated_at: template.updated_at,
        }
    }
}

/// Request to create or replace a template
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateRequest {
    pub id: String,
    pub name: String,
    pub content: String,
    pub description: Option<String>,
}

/// Request to validate template content
#[derive(Debug, Deserialize)]
pub struct TemplateValidationRequest {
    pub content: String,
}

/// Offer data to render a template with
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub quote: Quote,
    pub lead_name: Option<String>,
    pub company_name: Option<String>,
    /// `YYYY-MM-DD`; today when absent
    pub offer_date: Option<String>,
}

/// Request to render unsaved template content
#[derive(Debug, Deserialize)]
pub struct TemplatePreviewRequest {
    pub content: String,
    #[serde(flatten)]
    pub offer: RenderRequest,
}

/// A rendered offer and the prices it shows
#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub html: String,
    pub breakdown: PriceBreakdown,
}

impl RenderRequest {
    /// Price the quote and build the binding context
    pub fn into_context(self) -> crate::error::Result<OfferContext> {
        let mut ctx = OfferContext::new(self.quote)?;
        if let Some(name) = self.lead_name {
            ctx = ctx.with_lead_name(name);
        }
        if let Some(name) = self.company_name {
            ctx = ctx.with_company_name(name);
        }
        if let Some(date) = self.offer_date {
            ctx = ctx.with_offer_date(parse_date(&date)?);
        }
        Ok(ctx)
    }
}

/// Parse a `YYYY-MM-DD` request date
pub fn parse_date(value: &str) -> crate::error::Result<Date> {
    let format = time::macros::format_description!("[year]-[month]-[day]");
    Date::parse(value, format).map_err(|_| {
        crate::error::ApiError::validation(&format!("Invalid date '{}', expected YYYY-MM-DD", value))
    })
}

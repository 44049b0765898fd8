//! Binding computed offer values into merchant HTML templates
//!
//! Binding happens in two steps. [`TemplateLayout::locate`] finds the
//! elements the binder acts on (and is what [`crate::cache`] keeps around);
//! [`TemplateLayout::bind`] then clones the service row, drops optional
//! sections and substitutes tokens in a single pass, so values injected into
//! the document are never themselves scanned for tokens.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use tracing::{debug, instrument};

use crate::error::{Result, invalid_structure, missing_placeholders};
use crate::markup::{ElementSpan, TOKEN_RE, find_element_by_id, is_web_url, outer_without_id};
use crate::money::to_decimal;
use crate::placeholders::{self as ph, GLOBAL_TOKENS};
use crate::pricing::{LineTotal, PriceBreakdown, calculate_quote};
use crate::quote::{Quote, Service};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Everything a template needs to render one offer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OfferContext {
    pub quote: Quote,
    pub breakdown: PriceBreakdown,
    pub lead_name: Option<String>,
    pub company_name: Option<String>,
    #[serde(with = "iso_date")]
    pub offer_date: Date,
}

impl OfferContext {
    /// Price the quote and build a context dated today
    pub fn new(quote: Quote) -> Result<Self> {
        let breakdown = calculate_quote(&quote)?;
        Ok(OfferContext {
            quote,
            breakdown,
            lead_name: None,
            company_name: None,
            offer_date: OffsetDateTime::now_utc().date(),
        })
    }

    pub fn with_lead_name(mut self, name: impl Into<String>) -> Self {
        self.lead_name = Some(name.into());
        self
    }

    pub fn with_company_name(mut self, name: impl Into<String>) -> Self {
        self.company_name = Some(name.into());
        self
    }

    pub fn with_offer_date(mut self, date: Date) -> Self {
        self.offer_date = date;
        self
    }
}

/// Located elements of a validated template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateLayout {
    pub services_row: ElementSpan,
    pub discount_row: Option<ElementSpan>,
    pub attachments_section: Option<ElementSpan>,
}

impl TemplateLayout {
    /// Locate the binder's elements and check required placeholders
    ///
    /// # Errors
    ///
    /// `MissingPlaceholders` when a required token or the services row is
    /// absent; `InvalidStructure` when an element is unclosed or two located
    /// elements overlap.
    pub fn locate(html: &str) -> Result<Self> {
        let mut missing: Vec<String> = GLOBAL_TOKENS
            .iter()
            .filter(|spec| spec.required && !html.contains(spec.token))
            .map(|spec| spec.token.to_string())
            .collect();

        let services_row = find_element_by_id(html, ph::SERVICES_ROW_ID)?;
        if services_row.is_none() {
            missing.push(format!("#{}", ph::SERVICES_ROW_ID));
        }
        let services_row = match services_row {
            Some(span) if missing.is_empty() => span,
            _ => return Err(missing_placeholders(missing)),
        };

        let layout = TemplateLayout {
            services_row,
            discount_row: find_element_by_id(html, ph::DISCOUNT_ROW_ID)?,
            attachments_section: find_element_by_id(html, ph::ATTACHMENTS_SECTION_ID)?,
        };
        layout.check_disjoint()?;
        Ok(layout)
    }

    fn check_disjoint(&self) -> Result<()> {
        let spans = [
            (ph::SERVICES_ROW_ID, Some(self.services_row)),
            (ph::DISCOUNT_ROW_ID, self.discount_row),
            (ph::ATTACHMENTS_SECTION_ID, self.attachments_section),
        ];
        for (i, (a_id, a)) in spans.iter().enumerate() {
            for (b_id, b) in spans.iter().skip(i + 1) {
                if let (Some(a), Some(b)) = (a, b) {
                    if a.overlaps(b) {
                        return Err(invalid_structure(format!(
                            "elements #{} and #{} overlap",
                            a_id, b_id
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Render `html` (the template this layout was located in) for an offer.
    ///
    /// Amounts are priced from `ctx.quote` as it is now, so edits made after
    /// [`OfferContext::new`] show up in the output.
    #[instrument(skip_all, fields(quote = %ctx.quote.id.0))]
    pub fn bind(&self, html: &str, ctx: &OfferContext) -> Result<String> {
        let breakdown = calculate_quote(&ctx.quote)?;
        let globals = global_values(ctx, &breakdown);

        let row_template = outer_without_id(html, &self.services_row, ph::SERVICES_ROW_ID);
        let mut rows = String::new();
        let mut row_count = 0;
        // lines are in service order, one per service
        for (service, line) in ctx.quote.services.iter().zip(&breakdown.lines) {
            if !line.included {
                continue;
            }
            let mut values = globals.clone();
            values.extend(row_values(service, line, ctx));
            rows.push_str(&substitute(&row_template, &values));
            row_count += 1;
        }

        let mut edits: Vec<(ElementSpan, String)> = vec![(self.services_row, rows)];
        if let Some(span) = self.discount_row {
            if !breakdown.has_discount() {
                edits.push((span, String::new()));
            }
        }
        if let Some(span) = self.attachments_section {
            if ctx.quote.attachments.is_empty() {
                edits.push((span, String::new()));
            }
        }
        edits.sort_by_key(|(span, _)| span.start);

        let mut out = String::with_capacity(html.len() + edits[0].1.len());
        let mut cursor = 0;
        for (span, replacement) in &edits {
            if span.start < cursor {
                return Err(invalid_structure("template elements overlap"));
            }
            out.push_str(&substitute(&html[cursor..span.start], &globals));
            out.push_str(replacement);
            cursor = span.end;
        }
        out.push_str(&substitute(&html[cursor..], &globals));

        debug!(
            rows = row_count,
            bytes = out.len(),
            "bound offer template"
        );
        Ok(out)
    }
}

/// Validate and bind a template in one go
pub fn bind_offer(html: &str, ctx: &OfferContext) -> Result<String> {
    TemplateLayout::locate(html)?.bind(html, ctx)
}

fn substitute(text: &str, values: &HashMap<&'static str, String>) -> String {
    TOKEN_RE
        .replace_all(text, |caps: &regex::Captures| {
            let token = &caps[0];
            values
                .get(token)
                .cloned()
                .unwrap_or_else(|| token.to_string())
        })
        .into_owned()
}

fn escape(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

/// Trims trailing zeros: 2.50 -> "2.5", 3.00 -> "3"
fn plain_number(value: f64) -> String {
    to_decimal(value).normalize().to_string()
}

fn percent(value: f64) -> String {
    format!("{}%", plain_number(value))
}

fn global_values(ctx: &OfferContext, b: &PriceBreakdown) -> HashMap<&'static str, String> {
    let quote = &ctx.quote;
    let money = |amount: f64| escape(&quote.currency.format(amount));

    let attachments: String = quote
        .attachments
        .iter()
        .map(|a| {
            if !is_web_url(&a.url) {
                return format!("<li>{}</li>", escape(&a.name));
            }
            format!(
                r#"<li><a href="{}">{}</a></li>"#,
                html_escape::encode_double_quoted_attribute(&a.url),
                escape(&a.name)
            )
        })
        .collect();

    HashMap::from([
        (ph::QUOTE_TITLE, escape(&quote.title)),
        (
            ph::QUOTE_DESCRIPTION,
            escape(quote.description.as_deref().unwrap_or_default()),
        ),
        (ph::SUBTOTAL, money(b.subtotal)),
        (ph::DISCOUNT_PERCENT, percent(b.overall_discount_percent)),
        (ph::DISCOUNT_AMOUNT, money(b.overall_discount_amount)),
        (ph::SUBTOTAL_AFTER_DISCOUNT, money(b.subtotal_after_discount)),
        (ph::VAT, money(b.vat_amount)),
        (ph::VAT_PERCENT, percent(b.vat_percent)),
        (ph::TOTAL, money(b.total)),
        (ph::CURRENCY, quote.currency.code().to_string()),
        (ph::TERMS, escape(quote.terms.as_deref().unwrap_or_default())),
        (
            ph::LEAD_NAME,
            escape(ctx.lead_name.as_deref().unwrap_or_default()),
        ),
        (
            ph::COMPANY_NAME,
            escape(ctx.company_name.as_deref().unwrap_or_default()),
        ),
        (ph::OFFER_DATE, format_date(ctx.offer_date)),
        (ph::ATTACHMENT_LIST, attachments),
    ])
}

fn row_values(
    service: &Service,
    line: &LineTotal,
    ctx: &OfferContext,
) -> [(&'static str, String); 6] {
    let currency = ctx.quote.currency;
    let (unit, quantity, discount, total) = (
        line.unit_price,
        line.quantity,
        line.discount_percent,
        line.final_price,
    );
    [
        (ph::SERVICE_NAME, escape(&service.name)),
        (
            ph::SERVICE_DESCRIPTION,
            escape(service.description.as_deref().unwrap_or_default()),
        ),
        (ph::SERVICE_PRICE, escape(&currency.format(unit))),
        (ph::SERVICE_QUANTITY, plain_number(quantity)),
        (ph::SERVICE_DISCOUNT, percent(discount)),
        (ph::SERVICE_TOTAL, escape(&currency.format(total))),
    ]
}

/// dd.mm.yyyy, as printed on Scandinavian offers
pub(crate) fn format_date(date: Date) -> String {
    format!(
        "{:02}.{:02}.{}",
        date.day(),
        u8::from(date.month()),
        date.year()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::Service;
    use time::macros::date;

    const TEMPLATE: &str = r#"<h1>{quotestitle}</h1>
<table>
<tr id="services-row"><td>{servicename}</td><td>{servicequantity}</td><td>{servicetotal}</td></tr>
</table>
<p id="discount-row">Discount {discountpercent}: -{discountamount}</p>
<p>Subtotal {Subtotalprice}</p><p>VAT {Vatprice}</p><p>Total {Totalprice}</p>
<ul id="attachments-section">{attachmentlist}</ul>"#;

    fn context(overall_discount: f64) -> OfferContext {
        let quote = Quote::builder("q-7")
            .title("Garden <makeover>")
            .service(Service::new("a", "Lawn", 100.0).with_discount(10.0).required())
            .service(Service::new("b", "Hedge", 50.0).with_quantity(2.0))
            .service(Service::new("c", "Pond", 900.0).deselected())
            .overall_discount(overall_discount)
            .build()
            .unwrap();
        OfferContext::new(quote)
            .unwrap()
            .with_offer_date(date!(2024 - 03 - 05))
    }

    #[test]
    fn clones_one_row_per_included_service() {
        let html = bind_offer(TEMPLATE, &context(0.0)).unwrap();

        assert!(html.contains("<tr><td>Lawn</td><td>1</td><td>90,00 kr.</td></tr>"));
        assert!(html.contains("<tr><td>Hedge</td><td>2</td><td>100,00 kr.</td></tr>"));
        assert!(!html.contains("Pond"));
        assert!(!html.contains("services-row"));
        assert!(html.contains("Total 237,50 kr."));
    }

    #[test]
    fn escapes_injected_text() {
        let html = bind_offer(TEMPLATE, &context(0.0)).unwrap();
        assert!(html.contains("<h1>Garden &lt;makeover&gt;</h1>"));
    }

    #[test]
    fn hides_discount_and_attachments_when_absent() {
        let html = bind_offer(TEMPLATE, &context(0.0)).unwrap();
        assert!(!html.contains("discount-row"));
        assert!(!html.contains("attachments-section"));
    }

    #[test]
    fn keeps_discount_row_when_discounted() {
        let mut ctx = context(10.0);
        ctx.quote.attachments.push(crate::quote::Attachment {
            name: "Terms.pdf".to_string(),
            url: "https://files.example.com/t.pdf?a=1&b=2".to_string(),
        });
        let html = bind_offer(TEMPLATE, &ctx).unwrap();

        assert!(html.contains(r#"<p id="discount-row">Discount 10%: -19,00 kr.</p>"#));
        assert!(html.contains(
            r#"<li><a href="https://files.example.com/t.pdf?a=1&amp;b=2">Terms.pdf</a></li>"#
        ));
    }

    #[test]
    fn attachments_without_web_urls_are_not_links() {
        let mut ctx = context(0.0);
        ctx.quote.attachments.push(crate::quote::Attachment {
            name: "Click me".to_string(),
            url: "javascript:alert(1)".to_string(),
        });
        let html = bind_offer(TEMPLATE, &ctx).unwrap();

        assert!(html.contains("<li>Click me</li>"));
        assert!(!html.contains("javascript:"));
    }

    #[test]
    fn injected_values_are_not_rescanned() {
        let mut ctx = context(0.0);
        ctx.quote.services[0].name = "{Totalprice}".to_string();
        let html = bind_offer(TEMPLATE, &ctx).unwrap();
        assert!(html.contains("<td>{Totalprice}</td>"));
    }

    #[test]
    fn duplicate_service_ids_keep_their_own_amounts() {
        let quote = Quote::builder("q-8")
            .title("Windows")
            .service(Service::new("w", "Front windows", 100.0))
            .service(Service::new("w", "Back windows", 40.0).with_quantity(3.0))
            .build()
            .unwrap();
        let ctx = OfferContext::new(quote).unwrap();
        let html = bind_offer(TEMPLATE, &ctx).unwrap();

        assert!(html.contains("<tr><td>Front windows</td><td>1</td><td>100,00 kr.</td></tr>"));
        assert!(html.contains("<tr><td>Back windows</td><td>3</td><td>120,00 kr.</td></tr>"));
    }

    #[test]
    fn quote_edits_after_pricing_are_rendered() {
        let mut ctx = context(0.0);
        ctx.quote.set_selected("c", true).unwrap();
        ctx.quote.services.remove(1);
        let html = bind_offer(TEMPLATE, &ctx).unwrap();

        assert!(html.contains("<tr><td>Pond</td><td>1</td><td>900,00 kr.</td></tr>"));
        assert!(!html.contains("Hedge"));
        // 90 + 900 = 990, plus 25% VAT
        assert!(html.contains("Total 1.237,50 kr."));
    }

    #[test]
    fn rejects_template_without_row() {
        let err = bind_offer("{quotestitle}{Subtotalprice}{Vatprice}{Totalprice}", &context(0.0))
            .unwrap_err();
        assert!(err.to_string().contains("#services-row"));
    }

    #[test]
    fn rejects_overlapping_elements() {
        let html = r#"{quotestitle}{Subtotalprice}{Vatprice}{Totalprice}
<div id="discount-row"><p id="services-row">{servicename}</p></div>"#;
        assert!(TemplateLayout::locate(html).is_err());
    }

    #[test]
    fn formats_offer_date() {
        let html = bind_offer(&format!("{}{{offerdate}}", TEMPLATE), &context(0.0)).unwrap();
        assert!(html.ends_with("05.03.2024"));
    }
}

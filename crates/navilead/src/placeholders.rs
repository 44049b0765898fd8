//! Placeholder vocabulary for merchant offer templates
//!
//! Validation is a membership check against these fixed lists; it runs when a
//! merchant saves a custom template.

use serde::{Deserialize, Serialize};

use crate::markup::{TOKEN_RE, find_element_by_id};

pub const QUOTE_TITLE: &str = "{quotestitle}";
pub const QUOTE_DESCRIPTION: &str = "{quotesdescription}";
pub const SUBTOTAL: &str = "{Subtotalprice}";
pub const DISCOUNT_PERCENT: &str = "{discountpercent}";
pub const DISCOUNT_AMOUNT: &str = "{discountamount}";
pub const SUBTOTAL_AFTER_DISCOUNT: &str = "{Subtotalafterdiscount}";
pub const VAT: &str = "{Vatprice}";
pub const VAT_PERCENT: &str = "{Vatpercent}";
pub const TOTAL: &str = "{Totalprice}";
pub const CURRENCY: &str = "{currency}";
pub const TERMS: &str = "{terms}";
pub const LEAD_NAME: &str = "{leadname}";
pub const COMPANY_NAME: &str = "{companyname}";
pub const OFFER_DATE: &str = "{offerdate}";
pub const ATTACHMENT_LIST: &str = "{attachmentlist}";

pub const SERVICE_NAME: &str = "{servicename}";
pub const SERVICE_DESCRIPTION: &str = "{servicedescription}";
pub const SERVICE_PRICE: &str = "{serviceprice}";
pub const SERVICE_QUANTITY: &str = "{servicequantity}";
pub const SERVICE_DISCOUNT: &str = "{servicediscount}";
pub const SERVICE_TOTAL: &str = "{servicetotal}";

/// Element cloned once per included service
pub const SERVICES_ROW_ID: &str = "services-row";
/// Element removed when no overall discount applies
pub const DISCOUNT_ROW_ID: &str = "discount-row";
/// Element removed when the offer has no attachments
pub const ATTACHMENTS_SECTION_ID: &str = "attachments-section";

/// A placeholder token the binder understands
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct TokenSpec {
    pub token: &'static str,
    pub required: bool,
    pub description: &'static str,
}

/// An element id the binder looks up
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ElementSpec {
    pub id: &'static str,
    pub required: bool,
    pub description: &'static str,
}

const fn token(token: &'static str, required: bool, description: &'static str) -> TokenSpec {
    TokenSpec {
        token,
        required,
        description,
    }
}

/// Tokens replaced anywhere in the template
pub const GLOBAL_TOKENS: &[TokenSpec] = &[
    token(QUOTE_TITLE, true, "Offer title"),
    token(QUOTE_DESCRIPTION, false, "Offer description"),
    token(SUBTOTAL, true, "Sum of selected services"),
    token(DISCOUNT_PERCENT, false, "Overall discount percent"),
    token(DISCOUNT_AMOUNT, false, "Overall discount amount"),
    token(SUBTOTAL_AFTER_DISCOUNT, false, "Subtotal after the overall discount"),
    token(VAT, true, "VAT amount"),
    token(VAT_PERCENT, false, "VAT percent"),
    token(TOTAL, true, "Total including VAT"),
    token(CURRENCY, false, "Currency code"),
    token(TERMS, false, "Terms and conditions"),
    token(LEAD_NAME, false, "Name of the lead receiving the offer"),
    token(COMPANY_NAME, false, "Merchant company name"),
    token(OFFER_DATE, false, "Date the offer was issued"),
    token(ATTACHMENT_LIST, false, "List items linking to attachments"),
];

/// Tokens replaced inside each cloned service row
pub const ROW_TOKENS: &[TokenSpec] = &[
    token(SERVICE_NAME, false, "Service name"),
    token(SERVICE_DESCRIPTION, false, "Service description"),
    token(SERVICE_PRICE, false, "Unit price"),
    token(SERVICE_QUANTITY, false, "Quantity"),
    token(SERVICE_DISCOUNT, false, "Service discount percent"),
    token(SERVICE_TOTAL, false, "Service price after discount"),
];

/// Element ids the binder acts on
pub const ELEMENT_IDS: &[ElementSpec] = &[
    ElementSpec {
        id: SERVICES_ROW_ID,
        required: true,
        description: "Row repeated for every selected service",
    },
    ElementSpec {
        id: DISCOUNT_ROW_ID,
        required: false,
        description: "Hidden when no overall discount applies",
    },
    ElementSpec {
        id: ATTACHMENTS_SECTION_ID,
        required: false,
        description: "Hidden when the offer has no attachments",
    },
];

/// Whether a token belongs to the vocabulary
pub fn is_known_token(candidate: &str) -> bool {
    GLOBAL_TOKENS
        .iter()
        .chain(ROW_TOKENS)
        .any(|spec| spec.token == candidate)
}

/// Outcome of validating a merchant template
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ValidationReport {
    /// True when nothing required is missing and the structure is sound
    pub valid: bool,
    /// Required tokens, and required ids as `#id`, absent from the template
    pub missing: Vec<String>,
    /// Brace tokens that are not part of the vocabulary
    pub unknown: Vec<String>,
    /// Structural problems such as unclosed elements
    pub errors: Vec<String>,
}

/// Check a template against the placeholder vocabulary
///
/// Missing required tokens or ids make the template invalid. Unknown tokens
/// are reported as warnings only.
pub fn validate_template(html: &str) -> ValidationReport {
    let mut report = ValidationReport::default();

    for spec in GLOBAL_TOKENS.iter().filter(|spec| spec.required) {
        if !html.contains(spec.token) {
            report.missing.push(spec.token.to_string());
        }
    }

    for spec in ELEMENT_IDS {
        match find_element_by_id(html, spec.id) {
            Ok(Some(_)) => {}
            Ok(None) if spec.required => report.missing.push(format!("#{}", spec.id)),
            Ok(None) => {}
            Err(e) => report.errors.push(e.to_string()),
        }
    }

    for found in TOKEN_RE.find_iter(html) {
        let candidate = found.as_str();
        if !is_known_token(candidate) && !report.unknown.iter().any(|u| u == candidate) {
            report.unknown.push(candidate.to_string());
        }
    }

    report.valid = report.missing.is_empty() && report.errors.is_empty();
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPLETE: &str = r#"
        <h1>{quotestitle}</h1>
        <table><tr id="services-row"><td>{servicename}</td><td>{servicetotal}</td></tr></table>
        <p>{Subtotalprice} {Vatprice} {Totalprice}</p>
    "#;

    #[test]
    fn complete_template_is_valid() {
        let report = validate_template(COMPLETE);
        assert!(report.valid, "{:?}", report);
        assert!(report.missing.is_empty());
        assert!(report.unknown.is_empty());
    }

    #[test]
    fn reports_missing_tokens_and_ids() {
        let report = validate_template("<h1>{quotestitle}</h1><p>{Totalprice}</p>");
        assert!(!report.valid);
        assert_eq!(
            report.missing,
            vec!["{Subtotalprice}", "{Vatprice}", "#services-row"]
        );
    }

    #[test]
    fn unknown_tokens_are_warnings() {
        let html = format!("{}<p>{{signature}} {{signature}}</p>", COMPLETE);
        let report = validate_template(&html);
        assert!(report.valid);
        assert_eq!(report.unknown, vec!["{signature}"]);
    }

    #[test]
    fn css_blocks_are_not_tokens() {
        let html = format!("<style>p {{ color: red; }}</style>{}", COMPLETE);
        assert!(validate_template(&html).unknown.is_empty());
    }

    #[test]
    fn unclosed_row_is_a_structural_error() {
        let html = COMPLETE.replace("</tr></table>", "</table>");
        let report = validate_template(&html);
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn tokens_are_case_sensitive() {
        assert!(is_known_token("{Totalprice}"));
        assert!(!is_known_token("{totalprice}"));
    }
}

//! Transactional email rendering
//!
//! Every email is a pure function of its records. The HTML uses inline styles
//! only, since most mail clients strip `<style>` blocks.

mod layout;
mod templates;

pub use templates::{
    new_lead_notification, offer_response, offer_sent, password_reset, sms_credits_purchased,
    subscription_confirmation, welcome,
};

use serde::{Deserialize, Serialize};

use crate::money::Currency;

/// A rendered email, ready to hand to a mail transport
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// The merchant (NaviLead customer) sending or receiving the email
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Merchant {
    pub company_name: String,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A lead as shown in emails
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeadDetails {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// A NaviLead user account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    pub name: String,
    pub email: String,
}

/// The parts of an offer that appear in emails
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OfferSummary {
    pub title: String,
    pub total: f64,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub valid_until: Option<String>,
}

/// How a lead answered an offer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OfferDecision {
    Accepted,
    Rejected,
}

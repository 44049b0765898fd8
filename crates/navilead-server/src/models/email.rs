//! Email preview models

use navilead::email::{LeadDetails, Merchant, OfferDecision, OfferSummary, UserDetails};
use navilead::{ChargeBreakdown, Plan};
use serde::Deserialize;

/// Which email to render, tagged by `kind`
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum EmailPreviewRequest {
    NewLead {
        lead: LeadDetails,
        merchant: Merchant,
    },
    OfferSent {
        offer: OfferSummary,
        lead: LeadDetails,
        merchant: Merchant,
        offer_url: String,
    },
    OfferResponse {
        offer: OfferSummary,
        lead: LeadDetails,
        response: OfferDecision,
    },
    Welcome {
        user: UserDetails,
    },
    PasswordReset {
        user: UserDetails,
        reset_url: String,
        #[serde(default = "default_expiry")]
        expires_in_minutes: u32,
    },
    SmsCreditsPurchased {
        user: UserDetails,
        charge: ChargeBreakdown,
        credits_granted: u64,
    },
    SubscriptionConfirmation {
        user: UserDetails,
        plan: Plan,
        charge: ChargeBreakdown,
        /// `YYYY-MM-DD`
        next_billing_date: String,
    },
}

fn default_expiry() -> u32 {
    60
}

use time::Date;
use tracing::debug;

use super::layout::EmailBody;
use super::{LeadDetails, Merchant, OfferDecision, OfferSummary, RenderedEmail, UserDetails};
use crate::billing::{ChargeBreakdown, Plan};
use crate::binder::format_date;

/// Tell the merchant a new lead came in
pub fn new_lead_notification(lead: &LeadDetails, merchant: &Merchant) -> RenderedEmail {
    let greeting = match &merchant.contact_name {
        Some(name) => format!("Hi {},", name),
        None => format!("Hi {},", merchant.company_name),
    };

    let email = EmailBody::new("You have a new lead")
        .paragraph(&greeting)
        .paragraph(&format!(
            "{} just got in touch with {}. Here are the details:",
            lead.name, merchant.company_name
        ))
        .details(&[
            ("Name", Some(lead.name.clone())),
            ("Email", lead.email.clone()),
            ("Phone", lead.phone.clone()),
            ("Source", lead.source.clone()),
            ("Message", lead.message.clone()),
        ])
        .paragraph("Reply quickly: leads contacted within the first hour convert far more often.")
        .finish(format!("New lead: {}", lead.name));

    debug!(lead = %lead.name, "rendered new lead notification");
    email
}

/// Send an offer link to a lead
pub fn offer_sent(
    offer: &OfferSummary,
    lead: &LeadDetails,
    merchant: &Merchant,
    offer_url: &str,
) -> RenderedEmail {
    let mut body = EmailBody::new(&offer.title)
        .paragraph(&format!("Dear {},", lead.name))
        .paragraph(&format!(
            "{} has prepared an offer for you. You can review it, choose optional services and accept it online.",
            merchant.company_name
        ))
        .details(&[
            ("Offer", Some(offer.title.clone())),
            ("Total incl. VAT", Some(offer.currency.format(offer.total))),
            ("Valid until", offer.valid_until.clone()),
        ])
        .button("View offer", offer_url);

    let contact = merchant
        .phone
        .as_ref()
        .or(merchant.email.as_ref())
        .map(|reach| format!("Questions? Contact {} at {}.", merchant.company_name, reach));
    if let Some(contact) = contact {
        body = body.paragraph(&contact);
    }

    body.paragraph(&format!("Kind regards,\n{}", merchant.company_name))
        .finish(format!("Your offer from {}: {}", merchant.company_name, offer.title))
}

/// Tell the merchant how a lead answered an offer
pub fn offer_response(
    offer: &OfferSummary,
    lead: &LeadDetails,
    response: OfferDecision,
) -> RenderedEmail {
    let (heading, verb, next_step) = match response {
        OfferDecision::Accepted => (
            "Offer accepted",
            "accepted",
            "Get in touch with the customer to plan the work.",
        ),
        OfferDecision::Rejected => (
            "Offer rejected",
            "rejected",
            "Consider following up to learn why, or send a revised offer.",
        ),
    };

    EmailBody::new(heading)
        .paragraph(&format!("{} has {} your offer \"{}\".", lead.name, verb, offer.title))
        .details(&[
            ("Customer", Some(lead.name.clone())),
            ("Email", lead.email.clone()),
            ("Phone", lead.phone.clone()),
            ("Offer total", Some(offer.currency.format(offer.total))),
            ("Comment", lead.message.clone()),
        ])
        .paragraph(next_step)
        .finish(format!("{}: {} by {}", heading, offer.title, lead.name))
}

pub fn welcome(user: &UserDetails) -> RenderedEmail {
    EmailBody::new("Welcome to NaviLead")
        .paragraph(&format!("Hi {},", user.name))
        .paragraph(
            "Your account is ready. Set up your services and your first offer template, \
             and you can start sending offers to your leads today.",
        )
        .details(&[("Account", Some(user.email.clone()))])
        .finish("Welcome to NaviLead".to_string())
}

pub fn password_reset(user: &UserDetails, reset_url: &str, expires_in_minutes: u32) -> RenderedEmail {
    EmailBody::new("Reset your password")
        .paragraph(&format!("Hi {},", user.name))
        .paragraph(&format!(
            "We received a request to reset the password for {}. Click the button below to choose a new one.",
            user.email
        ))
        .button("Reset password", reset_url)
        .notice(&format!(
            "This link expires in {} minutes. If you did not ask for a reset, you can ignore this email.",
            expires_in_minutes
        ))
        .finish("Reset your NaviLead password".to_string())
}

/// Receipt for a bought SMS credit package
pub fn sms_credits_purchased(
    user: &UserDetails,
    charge: &ChargeBreakdown,
    credits_granted: u64,
) -> RenderedEmail {
    let currency = charge.currency;
    EmailBody::new("SMS credits added")
        .paragraph(&format!("Hi {},", user.name))
        .paragraph(&format!(
            "{} SMS credits have been added to your account.",
            credits_granted
        ))
        .details(&[
            ("Item", Some(charge.description.clone())),
            ("Net", Some(currency.format(charge.net))),
            (
                "VAT",
                Some(format!("{} ({}%)", currency.format(charge.vat), charge.vat_percent)),
            ),
            ("Total", Some(currency.format(charge.gross))),
        ])
        .finish(format!("Receipt: {} SMS credits", credits_granted))
}

pub fn subscription_confirmation(
    user: &UserDetails,
    plan: &Plan,
    charge: &ChargeBreakdown,
    next_billing_date: Date,
) -> RenderedEmail {
    let currency = charge.currency;
    EmailBody::new("Subscription confirmed")
        .paragraph(&format!("Hi {},", user.name))
        .paragraph(&format!("Thank you for subscribing to NaviLead {}.", plan.name))
        .details(&[
            ("Plan", Some(charge.description.clone())),
            ("Net", Some(currency.format(charge.net))),
            (
                "VAT",
                Some(format!("{} ({}%)", currency.format(charge.vat), charge.vat_percent)),
            ),
            ("Total", Some(currency.format(charge.gross))),
            ("Next billing date", Some(format_date(next_billing_date))),
        ])
        .finish(format!("Your NaviLead {} subscription", plan.name))
}

//! Email preview routes

use axum::{Json, Router, extract::rejection::JsonRejection, routing::post};
use navilead::RenderedEmail;
use navilead::email;
use tracing::debug;

use crate::{
    AppState,
    error::Result,
    models::{ApiResponse, EmailPreviewRequest, parse_date},
};

pub fn router() -> Router<AppState> {
    Router::new().route("/preview", post(preview_email))
}

/// Render an email without sending it
async fn preview_email(
    payload: std::result::Result<Json<EmailPreviewRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<RenderedEmail>>> {
    let Json(request) = payload?;

    let rendered = match request {
        EmailPreviewRequest::NewLead { lead, merchant } => {
            email::new_lead_notification(&lead, &merchant)
        }
        EmailPreviewRequest::OfferSent {
            offer,
            lead,
            merchant,
            offer_url,
        } => email::offer_sent(&offer, &lead, &merchant, &offer_url),
        EmailPreviewRequest::OfferResponse {
            offer,
            lead,
            response,
        } => email::offer_response(&offer, &lead, response),
        EmailPreviewRequest::Welcome { user } => email::welcome(&user),
        EmailPreviewRequest::PasswordReset {
            user,
            reset_url,
            expires_in_minutes,
        } => email::password_reset(&user, &reset_url, expires_in_minutes),
        EmailPreviewRequest::SmsCreditsPurchased {
            user,
            charge,
            credits_granted,
        } => email::sms_credits_purchased(&user, &charge, credits_granted),
        EmailPreviewRequest::SubscriptionConfirmation {
            user,
            plan,
            charge,
            next_billing_date,
        } => {
            let date = parse_date(&next_billing_date)?;
            email::subscription_confirmation(&user, &plan, &charge, date)
        }
    };

    debug!(subject = %rendered.subject, "Rendered email preview");
    Ok(Json(ApiResponse::new(rendered)))
}

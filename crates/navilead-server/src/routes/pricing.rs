//! Pricing routes

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use navilead::{
    ChargeBreakdown, PriceBreakdown, Quote, SmsPurchase, calculate_quote, sms_credit_charge,
    subscription_charge,
};
use tracing::debug;

use crate::{
    AppState,
    error::Result,
    models::{ApiResponse, SmsCreditsPricingRequest, SubscriptionPricingRequest},
};

/// Create pricing routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/quote", post(price_quote))
        .route("/subscription", post(price_subscription))
        .route("/sms-credits", post(price_sms_credits))
}

/// Price a quote as the viewer currently sees it
async fn price_quote(
    payload: std::result::Result<Json<Quote>, JsonRejection>,
) -> Result<Json<ApiResponse<PriceBreakdown>>> {
    let Json(quote) = payload?;
    debug!(quote = %quote.id.0, services = quote.services.len(), "Pricing quote");

    let breakdown = calculate_quote(&quote)?;
    Ok(Json(ApiResponse::new(breakdown)))
}

async fn price_subscription(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SubscriptionPricingRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ChargeBreakdown>>> {
    let Json(mut request) = payload?;
    let vat = request.vat_percent.unwrap_or(state.config.default_vat_percent);
    request.plan.currency.get_or_insert(state.config.default_currency);
    debug!(plan = %request.plan.id, interval = ?request.interval, "Pricing subscription");

    let charge = subscription_charge(&request.plan, request.interval, vat)?;
    Ok(Json(ApiResponse::new(charge)))
}

async fn price_sms_credits(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SmsCreditsPricingRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<SmsPurchase>>> {
    let Json(mut request) = payload?;
    let vat = request.vat_percent.unwrap_or(state.config.default_vat_percent);
    request.package.currency.get_or_insert(state.config.default_currency);

    let purchase = sms_credit_charge(&request.package, request.quantity, vat)?;
    Ok(Json(ApiResponse::new(purchase)))
}

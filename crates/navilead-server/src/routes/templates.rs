//! Template management routes

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use navilead::{OfferTemplate, TemplateId, ValidationReport, validate_template};
use tracing::{debug, info};

use crate::{
    AppState,
    error::{ApiError, Result},
    models::{
        ApiResponse, CreateTemplateRequest, RenderRequest, RenderResponse, TemplatePreviewRequest,
        TemplateSummary, TemplateValidationRequest,
    },
};

type JsonBody<T> = std::result::Result<Json<T>, JsonRejection>;

/// Create template routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_templates).post(create_template))
        // Fixed paths before the id routes
        .route("/preview", post(preview_template))
        .route("/validate", post(validate_template_content))
        .route("/{id}", get(get_template).delete(delete_template))
        .route("/{id}/render", post(render_template))
}

fn template_id(raw: &str) -> Result<TemplateId> {
    let decoded = urlencoding::decode(raw)
        .map_err(|_| ApiError::validation("Invalid URL encoding in template id"))?;
    Ok(TemplateId::from(decoded.into_owned()))
}

/// List all stored templates
async fn list_templates(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<TemplateSummary>>>> {
    let templates = state.storage.list_templates().await?;
    debug!("Listing {} templates", templates.len());

    let summaries = templates.into_iter().map(TemplateSummary::from).collect();
    Ok(Json(ApiResponse::new(summaries)))
}

async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<OfferTemplate>>> {
    let id = template_id(&id)?;
    let template = state.storage.get_template(&id).await?;
    Ok(Json(ApiResponse::new(template)))
}

/// Create or replace a template; invalid templates are refused
async fn create_template(
    State(state): State<AppState>,
    payload: JsonBody<CreateTemplateRequest>,
) -> Result<impl IntoResponse> {
    let Json(request) = payload?;
    info!("Saving template: {}", request.id);

    let mut template = OfferTemplate::new(request.id, request.name, request.content);
    if let Some(description) = request.description {
        template = template.with_description(description);
    }

    // keep the original creation time when replacing
    if let Ok(existing) = state.storage.get_template(&template.id).await {
        template.created_at = existing.created_at;
    }

    let report = template.ensure_valid()?;
    state.storage.save_template(&template).await?;

    let message = if report.unknown.is_empty() {
        None
    } else {
        Some(format!("Unknown placeholders left as-is: {}", report.unknown.join(", ")))
    };
    let body = match message {
        Some(message) => ApiResponse::with_message(template, message),
        None => ApiResponse::new(template),
    };

    Ok((StatusCode::CREATED, Json(body)))
}

async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = template_id(&id)?;
    info!("Deleting template: {}", id);

    state.storage.delete_template(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Report missing and unknown placeholders without storing anything
async fn validate_template_content(
    payload: JsonBody<TemplateValidationRequest>,
) -> Result<Json<ApiResponse<ValidationReport>>> {
    let Json(request) = payload?;
    debug!("Validating template");

    Ok(Json(ApiResponse::new(validate_template(&request.content))))
}

/// Render unsaved template content
async fn preview_template(
    payload: JsonBody<TemplatePreviewRequest>,
) -> Result<Json<ApiResponse<RenderResponse>>> {
    let Json(request) = payload?;
    debug!("Previewing template");

    let ctx = request.offer.into_context()?;
    let html = navilead::bind_offer(&request.content, &ctx)?;

    Ok(Json(ApiResponse::new(RenderResponse {
        html,
        breakdown: ctx.breakdown,
    })))
}

/// Render a stored template for an offer
async fn render_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: JsonBody<RenderRequest>,
) -> Result<Json<ApiResponse<RenderResponse>>> {
    let Json(request) = payload?;
    let id = template_id(&id)?;

    let template = state.storage.get_template(&id).await?;
    let ctx = request.into_context()?;
    let html = template.render(&ctx)?;
    info!(template = %id, quote = %ctx.quote.id.0, "Rendered offer");

    Ok(Json(ApiResponse::new(RenderResponse {
        html,
        breakdown: ctx.breakdown,
    })))
}

use crate::config::Config;
use crate::error::{Error, SkillResult};
use crate::skill::{handle_request, RequestEnvelope, ResponseEnvelope, SkillContext, SkillRequest};
use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

/// Build the HTTP router around a skill context
pub fn router(ctx: SkillContext) -> Router {
    Router::new()
        .route("/", post(skill_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Accept one request envelope and answer with one response envelope
pub async fn skill_handler(
    State(ctx): State<SkillContext>,
    body: Bytes,
) -> Result<Json<ResponseEnvelope>, Error> {
    let envelope: RequestEnvelope = serde_json::from_slice(&body)?;
    let request = SkillRequest::try_from(envelope)?;
    verify_application(&ctx.config, &request)?;

    let response = handle_request(&ctx, &request).await;
    Ok(Json(response.into_envelope()))
}

pub async fn health_handler() -> &'static str {
    "OK"
}

/// Reject requests meant for another skill, when a skill id is configured
fn verify_application(config: &Config, request: &SkillRequest) -> SkillResult<()> {
    let Some(expected) = &config.skill_id else {
        return Ok(());
    };

    match request.application_id.as_deref() {
        Some(actual) if actual == expected => Ok(()),
        Some(actual) => Err(Error::Verification(format!(
            "unexpected application id {}",
            actual
        ))),
        None => Err(Error::Verification("missing application id".to_string())),
    }
}

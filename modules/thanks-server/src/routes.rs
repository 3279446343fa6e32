use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{error, info, warn};

use thanks_store::ThanksRepository;

use crate::error::AppError;
use crate::payload::WebhookPayload;
use crate::pipeline::MentionPipeline;
use crate::signature::SignatureVerifier;
use crate::templates::render_thanks;

pub struct AppState {
    pub verify_token: String,
    pub verifier: SignatureVerifier,
    pub store: Arc<dyn ThanksRepository>,
    pub pipeline: MentionPipeline,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_thanks))
        .route("/webhook", get(verify_subscription).post(receive_webhook))
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        // Method + path only; query strings carry the verify token.
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}

// --- Handlers ---

async fn list_thanks(State(state): State<Arc<AppState>>) -> Response {
    match state.store.list_all().await {
        Ok(records) => Html(render_thanks(&records)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to load thanks");
            AppError::Store(e).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct SubscriptionQuery {
    #[serde(rename = "hub.mode")]
    mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    challenge: Option<String>,
}

/// Subscription handshake: echo the challenge back when the token matches.
async fn verify_subscription(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SubscriptionQuery>,
) -> Response {
    let subscribing = params.mode.as_deref() == Some("subscribe");
    let token_matches = params.verify_token.as_deref() == Some(state.verify_token.as_str());

    if subscribing && token_matches {
        info!("Webhook subscription validated");
        (StatusCode::OK, params.challenge.unwrap_or_default()).into_response()
    } else {
        warn!("Webhook subscription failed validation; check the verify token");
        StatusCode::FORBIDDEN.into_response()
    }
}

/// Event delivery. Answers 200 once every mention has been handled, whatever
/// happened downstream, so the platform does not redeliver.
async fn receive_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    state.verifier.check(&headers, &body)?;

    let payload: WebhookPayload = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Failed to parse webhook payload");
        AppError::MalformedPayload(e.to_string())
    })?;

    for mention in payload.mentions() {
        match mention {
            Ok(mention) => {
                state.pipeline.process(mention).await;
            }
            Err(e) => warn!(error = %e, "Skipping mention"),
        }
    }

    Ok(StatusCode::OK)
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! HTTP surface: application state, router, and the message handler.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use drawbridge_common_core::{Message, SecretGrant};
use drawbridge_common_secret::SecretString;
use drawbridge_config::AuthConfig;
use drawbridge_rancher::ContainerVerifier;
use drawbridge_vault::SecretStore;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::error::PipelineError;

pub use drawbridge_common_core::SIGNATURE_HEADER;

/// Dependency-injected actors the pipeline runs against, constructed once at
/// startup and threaded through every request.
#[derive(Clone)]
pub struct AppState {
	pub verifier: Arc<dyn ContainerVerifier>,
	pub store: Arc<dyn SecretStore>,
	signing_key: SecretString,
	max_age: Duration,
}

impl AppState {
	pub fn new(
		verifier: Arc<dyn ContainerVerifier>,
		store: Arc<dyn SecretStore>,
		auth: &AuthConfig,
	) -> Self {
		Self {
			verifier,
			store,
			signing_key: auth.signing_key.clone(),
			max_age: Duration::from_secs(auth.max_age_secs),
		}
	}
}

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route("/v1/message", post(message_handler))
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}

/// `POST /v1/message`: the full trust-and-issuance pipeline for one event.
///
/// The body is taken as raw bytes so the signature gate runs before any
/// parsing: an unauthenticated caller learns nothing, not even whether its
/// JSON was well-formed.
async fn message_handler(
	State(state): State<AppState>,
	headers: HeaderMap,
	body: Bytes,
) -> Response {
	let token = headers
		.get(SIGNATURE_HEADER)
		.and_then(|value| value.to_str().ok())
		.unwrap_or("");

	if let Err(error) =
		drawbridge_signature::verify(token, state.signing_key.expose_bytes(), state.max_age)
	{
		debug!(%error, "rejecting request with bad signature");
		return StatusCode::FORBIDDEN.into_response();
	}

	let message: Message = match serde_json::from_slice(&body) {
		Ok(message) => message,
		Err(error) => {
			debug!(%error, "rejecting malformed message body");
			return StatusCode::BAD_REQUEST.into_response();
		}
	};

	if !message.is_start() {
		debug!(action = %message.action, "unsupported message");
		return StatusCode::NOT_IMPLEMENTED.into_response();
	}

	debug!(uuid = %message.uuid, "received start event");
	match container_start(&state, &message).await {
		Ok(grant) => {
			info!(container = %grant.external_id, "issued credentials");
			(StatusCode::CREATED, Json(grant)).into_response()
		}
		Err(error) => {
			warn!(uuid = %message.uuid, %error, "request rejected");
			error.status().into_response()
		}
	}
}

/// Verify the claimed container and mint its cubbyhole credentials.
async fn container_start(state: &AppState, message: &Message) -> Result<SecretGrant, PipelineError> {
	let identity = state.verifier.verify(message).await?;
	let temp_token = state.store.issue(&identity).await?;

	Ok(SecretGrant {
		external_id: identity.id().to_string(),
		temp_token,
		cubby_path: format!("{}/cubbyhole/{}", state.store.store_url(), identity.path()),
	})
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Event handling: build, sign, post, deliver.

use drawbridge_common_core::labels;
use drawbridge_common_core::{
	ContainerEvent, ContainerKind, Message, SecretGrant, SIGNATURE_HEADER,
};
use drawbridge_common_secret::SecretString;
use drawbridge_config::{AgentConfig, AuthConfig};
use tracing::{debug, info};

use crate::error::AgentError;
use crate::metadata::MetadataSource;
use crate::sink::SecretSink;

/// Handles one container-start event end to end: resolve the claimed
/// identity, sign, post to the bridge, deliver the grant.
pub struct MessageHandler<M, S> {
	metadata: M,
	sink: S,
	http: reqwest::Client,
	message_url: String,
	agent_uuid: String,
	host: String,
	signing_key: SecretString,
}

impl<M: MetadataSource, S: SecretSink> MessageHandler<M, S> {
	/// Build a handler, resolving the agent's own identity from metadata.
	pub async fn new(
		metadata: M,
		sink: S,
		agent: &AgentConfig,
		auth: &AuthConfig,
	) -> Result<Self, AgentError> {
		let me = metadata.self_container().await?;
		if me.uuid.is_empty() {
			return Err(AgentError::NoIdentity);
		}

		let host = hostname::get()
			.map(|h| h.to_string_lossy().into_owned())
			.unwrap_or_default();

		let http = drawbridge_common_http::builder()
			.build()
			.map_err(AgentError::from)?;

		Ok(Self {
			metadata,
			sink,
			http,
			message_url: agent.message_url(),
			agent_uuid: me.uuid,
			host,
			signing_key: auth.signing_key.clone(),
		})
	}

	/// Handle a single event. `Ok(None)` means the bridge declined the event
	/// (a later event for the same container may still succeed; the agent
	/// does not retry).
	pub async fn handle(&self, event: &ContainerEvent) -> Result<Option<SecretGrant>, AgentError> {
		let message = self.build_message(event).await?;

		let token = drawbridge_signature::sign(&self.agent_uuid, self.signing_key.expose_bytes());
		let response = self
			.http
			.post(&self.message_url)
			.header(SIGNATURE_HEADER, token)
			.json(&message)
			.send()
			.await?;

		if response.status() != reqwest::StatusCode::CREATED {
			debug!(status = %response.status(), container = %event.id, "bridge declined event");
			return Ok(None);
		}

		let grant: SecretGrant = response.json().await?;
		info!(container = %grant.external_id, "received credential grant");

		self
			.sink
			.deliver(&grant.external_id, &format_exports(&grant))
			.await?;

		Ok(Some(grant))
	}

	/// Package an event into the signed message the bridge expects.
	async fn build_message(&self, event: &ContainerEvent) -> Result<Message, AgentError> {
		let kind =
			ContainerKind::classify(&event.attributes).map_err(|_| AgentError::NotEnabled)?;

		let raw_name = event
			.attributes
			.get(kind.name_attribute())
			.ok_or(AgentError::NoIdentity)?;
		// Host-side container names carry an `r-` prefix the metadata
		// service does not use.
		let name = raw_name.replacen("r-", "", 1);

		let container = self
			.metadata
			.container_by_name(&name)
			.await?
			.ok_or(AgentError::NoIdentity)?;
		if container.uuid.is_empty() {
			return Err(AgentError::NoIdentity);
		}

		// Pod events do not carry the opt-in label themselves; it lives on
		// the metadata record.
		if kind == ContainerKind::Kubernetes
			&& container.labels.get(labels::SECRETS_ENABLED).map(String::as_str) != Some("true")
		{
			return Err(AgentError::NotEnabled);
		}

		debug!(container = %name, uuid = %container.uuid, ?kind, "packaged message");

		Ok(Message {
			event: event.clone(),
			uuid: container.uuid,
			action: event.action.clone(),
			host: self.host.clone(),
			container_type: kind,
		})
	}
}

/// Shell-sourceable form the delivery sink writes for the container.
pub fn format_exports(grant: &SecretGrant) -> String {
	format!(
		"export CUBBY_PATH={}\nexport TEMP_TOKEN={}\n",
		grant.cubby_path, grant.temp_token
	)
}

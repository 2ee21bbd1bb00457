// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Local metadata service access.
//!
//! The metadata service is the agent's view of the containers on its host.
//! It resolves an event's container name to the stable UUID the bridge
//! server verifies, and provides the agent's own identity for signing.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::AgentError;

/// A container record from the metadata service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataContainer {
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub uuid: String,
	#[serde(default)]
	pub labels: HashMap<String, String>,
}

/// The metadata lookups the handler needs.
#[async_trait]
pub trait MetadataSource: Send + Sync {
	/// The container this agent itself runs in.
	async fn self_container(&self) -> Result<MetadataContainer, AgentError>;

	/// Look up a container on this host by name.
	async fn container_by_name(&self, name: &str) -> Result<Option<MetadataContainer>, AgentError>;
}

/// Metadata source backed by the HTTP metadata service.
#[derive(Debug, Clone)]
pub struct MetadataClient {
	http: reqwest::Client,
	base_url: String,
}

impl MetadataClient {
	pub fn new(base_url: impl Into<String>) -> Result<Self, AgentError> {
		let http = drawbridge_common_http::builder()
			.build()
			.map_err(|e| AgentError::Metadata {
				message: e.to_string(),
			})?;

		Ok(Self {
			http,
			base_url: base_url.into().trim_end_matches('/').to_string(),
		})
	}

	async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, AgentError> {
		self
			.http
			.get(format!("{}/{path}", self.base_url))
			.header("Accept", "application/json")
			.send()
			.await
			.and_then(reqwest::Response::error_for_status)
			.map_err(|e| AgentError::Metadata {
				message: e.to_string(),
			})?
			.json()
			.await
			.map_err(|e| AgentError::Metadata {
				message: e.to_string(),
			})
	}
}

#[async_trait]
impl MetadataSource for MetadataClient {
	async fn self_container(&self) -> Result<MetadataContainer, AgentError> {
		self.get_json("self/container").await
	}

	async fn container_by_name(&self, name: &str) -> Result<Option<MetadataContainer>, AgentError> {
		let containers: Vec<MetadataContainer> = self.get_json("containers").await?;
		Ok(containers.into_iter().find(|c| c.name == name))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use wiremock::matchers::{header, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	#[tokio::test]
	async fn self_container_requests_json() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/self/container"))
			.and(header("Accept", "application/json"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
				"name": "drawbridge-agent",
				"uuid": "agent-uuid-1"
			})))
			.mount(&server)
			.await;

		let me = MetadataClient::new(server.uri())
			.unwrap()
			.self_container()
			.await
			.unwrap();

		assert_eq!(me.uuid, "agent-uuid-1");
	}

	#[tokio::test]
	async fn container_by_name_filters_listing() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/containers"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
				{"name": "other", "uuid": "u-other"},
				{"name": "api-1", "uuid": "u-api", "labels": {"secrets.bridge.enabled": "true"}}
			])))
			.mount(&server)
			.await;

		let client = MetadataClient::new(server.uri()).unwrap();

		let found = client.container_by_name("api-1").await.unwrap().unwrap();
		assert_eq!(found.uuid, "u-api");

		assert!(client.container_by_name("absent").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn unreachable_metadata_is_an_error() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/containers"))
			.respond_with(ResponseTemplate::new(500))
			.mount(&server)
			.await;

		let result = MetadataClient::new(server.uri())
			.unwrap()
			.container_by_name("api-1")
			.await;

		assert!(matches!(result, Err(AgentError::Metadata { .. })));
	}
}

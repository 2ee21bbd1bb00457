// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! HTTP client for the orchestration control plane.

use std::time::Duration;

use drawbridge_common_secret::SecretString;
use drawbridge_config::RancherConfig;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{VerifierError, VerifierResult};
use crate::types::{Collection, Container, Project};

/// Resolution attempt delays. The control plane's view of a just-started
/// container is eventually consistent, so lookups retry with doubling delays
/// for a ~60 second wall-clock budget before giving up.
const RESOLVE_DELAYS_SECS: [u64; 6] = [1, 2, 4, 8, 16, 32];

/// Container list filter, one per indexed identity field.
#[derive(Debug, Clone, Copy)]
pub enum ContainerFilter<'a> {
	Uuid(&'a str),
	ExternalId(&'a str),
}

impl<'a> ContainerFilter<'a> {
	fn query(&self) -> (&'static str, &'a str) {
		match self {
			ContainerFilter::Uuid(value) => ("uuid", value),
			ContainerFilter::ExternalId(value) => ("externalId", value),
		}
	}
}

/// Authenticated client for the control-plane API.
#[derive(Debug, Clone)]
pub struct RancherClient {
	http: reqwest::Client,
	base_url: String,
	access_key: String,
	secret_key: SecretString,
	resolve_delays: Vec<Duration>,
}

impl RancherClient {
	pub fn new(config: &RancherConfig) -> VerifierResult<Self> {
		let http = drawbridge_common_http::builder()
			.build()
			.map_err(VerifierError::from)?;

		Ok(Self {
			http,
			base_url: config.url.trim_end_matches('/').to_string(),
			access_key: config.access_key.clone(),
			secret_key: config.secret_key.clone(),
			resolve_delays: RESOLVE_DELAYS_SECS
				.iter()
				.map(|s| Duration::from_secs(*s))
				.collect(),
		})
	}

	/// Override the resolution backoff schedule (shorter budgets for tests,
	/// slower control planes in unusual deployments).
	pub fn with_resolve_delays(mut self, delays: Vec<Duration>) -> Self {
		self.resolve_delays = delays;
		self
	}

	/// List containers matching a filter. A single attempt, no retries.
	pub async fn list_containers(
		&self,
		filter: ContainerFilter<'_>,
	) -> VerifierResult<Vec<Container>> {
		let url = format!("{}/containers", self.base_url);
		let collection: Collection<Container> = self.get_json(&url, &[filter.query()]).await?;
		Ok(collection.data)
	}

	/// Resolve a container with backoff until it appears with an external ID
	/// or the budget is exhausted.
	pub async fn resolve_container(
		&self,
		filter: ContainerFilter<'_>,
	) -> VerifierResult<Container> {
		for (attempt, delay) in self.resolve_delays.iter().enumerate() {
			let containers = self.list_containers(filter).await?;
			if let Some(container) = containers
				.into_iter()
				.find(|c| !c.external_id.is_empty())
			{
				return Ok(container);
			}

			debug!(
				?filter,
				attempt = attempt + 1,
				delay_secs = delay.as_secs(),
				"container not visible yet, backing off"
			);
			tokio::time::sleep(*delay).await;
		}

		Err(VerifierError::NotFound)
	}

	/// The first environment (project) visible to the API key.
	pub async fn first_project(&self) -> VerifierResult<Option<Project>> {
		let url = format!("{}/projects", self.base_url);
		let collection: Collection<Project> = self.get_json(&url, &[]).await?;
		Ok(collection.data.into_iter().next())
	}

	/// Follow a relationship link from a resource's `links` map.
	pub async fn follow_link<T: DeserializeOwned>(&self, url: &str) -> VerifierResult<T> {
		self.get_json(url, &[]).await
	}

	async fn get_json<T: DeserializeOwned>(
		&self,
		url: &str,
		query: &[(&str, &str)],
	) -> VerifierResult<T> {
		let response = self
			.http
			.get(url)
			.query(query)
			.basic_auth(&self.access_key, Some(self.secret_key.expose()))
			.send()
			.await?
			.error_for_status()?;

		Ok(response.json().await?)
	}
}

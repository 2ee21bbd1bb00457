// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Host agent configuration section.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Agent configuration layer (for merging).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfigLayer {
	/// Local metadata service used to resolve claimed container UUIDs.
	pub metadata_url: Option<String>,
	/// Bridge server endpoint events are posted to.
	pub bridge_url: Option<String>,
	/// Directory secrets are delivered under, one subdirectory per container.
	pub delivery_root: Option<PathBuf>,
}

impl AgentConfigLayer {
	/// Merges another layer on top of this one.
	pub fn merge(&mut self, other: AgentConfigLayer) {
		if other.metadata_url.is_some() {
			self.metadata_url = other.metadata_url;
		}
		if other.bridge_url.is_some() {
			self.bridge_url = other.bridge_url;
		}
		if other.delivery_root.is_some() {
			self.delivery_root = other.delivery_root;
		}
	}

	/// Whether no source contributed anything to this section.
	pub fn is_empty(&self) -> bool {
		self.metadata_url.is_none() && self.bridge_url.is_none() && self.delivery_root.is_none()
	}

	/// Resolves this layer, validating that the bridge endpoint is present.
	pub fn resolve(self) -> Result<AgentConfig, ConfigError> {
		let bridge_url = self
			.bridge_url
			.ok_or_else(|| ConfigError::missing("agent.bridge_url"))?;

		Ok(AgentConfig {
			metadata_url: self
				.metadata_url
				.unwrap_or_else(|| "http://rancher-metadata/2015-12-19".to_string()),
			bridge_url: bridge_url.trim_end_matches('/').to_string(),
			delivery_root: self
				.delivery_root
				.unwrap_or_else(|| PathBuf::from("/var/run/drawbridge")),
		})
	}
}

/// Agent configuration (runtime, resolved).
#[derive(Debug, Clone)]
pub struct AgentConfig {
	pub metadata_url: String,
	pub bridge_url: String,
	pub delivery_root: PathBuf,
}

impl AgentConfig {
	/// The full message endpoint on the bridge server.
	pub fn message_url(&self) -> String {
		format!("{}/v1/message", self.bridge_url)
	}
}

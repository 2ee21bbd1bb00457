// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Orchestration control-plane (Rancher API) configuration section.

use drawbridge_common_secret::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Rancher configuration layer (for merging).
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct RancherConfigLayer {
	pub url: Option<String>,
	pub access_key: Option<String>,
	pub secret_key: Option<SecretString>,
}

impl std::fmt::Debug for RancherConfigLayer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RancherConfigLayer")
			.field("url", &self.url)
			.field("access_key", &self.access_key)
			.field("secret_key", &self.secret_key)
			.finish()
	}
}

impl RancherConfigLayer {
	/// Merges another layer on top of this one.
	pub fn merge(&mut self, other: RancherConfigLayer) {
		if other.url.is_some() {
			self.url = other.url;
		}
		if other.access_key.is_some() {
			self.access_key = other.access_key;
		}
		if other.secret_key.is_some() {
			self.secret_key = other.secret_key;
		}
	}

	/// Whether no source contributed anything to this section.
	pub fn is_empty(&self) -> bool {
		self.url.is_none() && self.access_key.is_none() && self.secret_key.is_none()
	}

	/// Resolves this layer, validating that all required fields are present.
	pub fn resolve(self) -> Result<RancherConfig, ConfigError> {
		Ok(RancherConfig {
			url: self.url.ok_or_else(|| ConfigError::missing("rancher.url"))?,
			access_key: self
				.access_key
				.ok_or_else(|| ConfigError::missing("rancher.access_key"))?,
			secret_key: self
				.secret_key
				.ok_or_else(|| ConfigError::missing("rancher.secret_key"))?,
		})
	}
}

/// Rancher configuration (runtime, resolved).
#[derive(Clone)]
pub struct RancherConfig {
	pub url: String,
	pub access_key: String,
	pub secret_key: SecretString,
}

impl std::fmt::Debug for RancherConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RancherConfig")
			.field("url", &self.url)
			.field("access_key", &self.access_key)
			.field("secret_key", &self.secret_key)
			.finish()
	}
}

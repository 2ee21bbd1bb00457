// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared signing-key configuration section.

use drawbridge_common_secret::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Auth configuration layer (for merging).
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AuthConfigLayer {
	pub signing_key: Option<SecretString>,
	/// Replay window for agent signatures, in seconds.
	pub max_age_secs: Option<u64>,
}

impl std::fmt::Debug for AuthConfigLayer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AuthConfigLayer")
			.field("signing_key", &self.signing_key)
			.field("max_age_secs", &self.max_age_secs)
			.finish()
	}
}

impl AuthConfigLayer {
	/// Merges another layer on top of this one.
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.signing_key.is_some() {
			self.signing_key = other.signing_key;
		}
		if other.max_age_secs.is_some() {
			self.max_age_secs = other.max_age_secs;
		}
	}

	/// Resolves this layer, validating that the signing key is present.
	pub fn resolve(self) -> Result<AuthConfig, ConfigError> {
		let signing_key = self
			.signing_key
			.ok_or_else(|| ConfigError::missing("auth.signing_key"))?;
		if signing_key.is_empty() {
			return Err(ConfigError::Validation(
				"auth.signing_key must not be empty".to_string(),
			));
		}

		Ok(AuthConfig {
			signing_key,
			max_age_secs: self.max_age_secs.unwrap_or(300),
		})
	}
}

/// Auth configuration (runtime, resolved).
#[derive(Clone)]
pub struct AuthConfig {
	pub signing_key: SecretString,
	pub max_age_secs: u64,
}

impl std::fmt::Debug for AuthConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AuthConfig")
			.field("signing_key", &self.signing_key)
			.field("max_age_secs", &self.max_age_secs)
			.finish()
	}
}

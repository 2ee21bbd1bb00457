// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Secret backend (Vault) configuration section.

use std::path::PathBuf;

use drawbridge_common_secret::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Vault configuration layer (for merging).
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct VaultConfigLayer {
	pub url: Option<String>,
	/// Bootstrap token, exchanged at startup for the real issuing credential.
	pub token: Option<SecretString>,
	/// Indirection path at which the bootstrap token is exchanged.
	pub cubby_path: Option<String>,
	/// Optional CA certificate for backend TLS.
	pub ca_cert: Option<PathBuf>,
}

impl std::fmt::Debug for VaultConfigLayer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("VaultConfigLayer")
			.field("url", &self.url)
			.field("token", &self.token)
			.field("cubby_path", &self.cubby_path)
			.field("ca_cert", &self.ca_cert)
			.finish()
	}
}

impl VaultConfigLayer {
	/// Merges another layer on top of this one.
	pub fn merge(&mut self, other: VaultConfigLayer) {
		if other.url.is_some() {
			self.url = other.url;
		}
		if other.token.is_some() {
			self.token = other.token;
		}
		if other.cubby_path.is_some() {
			self.cubby_path = other.cubby_path;
		}
		if other.ca_cert.is_some() {
			self.ca_cert = other.ca_cert;
		}
	}

	/// Whether no source contributed anything to this section.
	pub fn is_empty(&self) -> bool {
		self.url.is_none()
			&& self.token.is_none()
			&& self.cubby_path.is_none()
			&& self.ca_cert.is_none()
	}

	/// Resolves this layer, validating that all required fields are present.
	pub fn resolve(self) -> Result<VaultConfig, ConfigError> {
		Ok(VaultConfig {
			url: self.url.ok_or_else(|| ConfigError::missing("vault.url"))?,
			token: self
				.token
				.ok_or_else(|| ConfigError::missing("vault.token"))?,
			cubby_path: self
				.cubby_path
				.ok_or_else(|| ConfigError::missing("vault.cubby_path"))?,
			ca_cert: self.ca_cert,
		})
	}
}

/// Vault configuration (runtime, resolved).
#[derive(Clone)]
pub struct VaultConfig {
	pub url: String,
	pub token: SecretString,
	pub cubby_path: String,
	pub ca_cert: Option<PathBuf>,
}

impl std::fmt::Debug for VaultConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("VaultConfig")
			.field("url", &self.url)
			.field("token", &self.token)
			.field("cubby_path", &self.cubby_path)
			.field("ca_cert", &self.ca_cert)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn full_layer() -> VaultConfigLayer {
		VaultConfigLayer {
			url: Some("https://vault.example.com:8200".to_string()),
			token: Some(SecretString::from("bootstrap-token")),
			cubby_path: Some("cubbyhole/bridge-key".to_string()),
			ca_cert: None,
		}
	}

	#[test]
	fn resolve_with_required_fields() {
		let config = full_layer().resolve().unwrap();
		assert_eq!(config.url, "https://vault.example.com:8200");
		assert_eq!(config.token.expose(), "bootstrap-token");
		assert_eq!(config.cubby_path, "cubbyhole/bridge-key");
		assert!(config.ca_cert.is_none());
	}

	#[test]
	fn resolve_fails_without_token() {
		let mut layer = full_layer();
		layer.token = None;
		assert!(layer.resolve().is_err());
	}

	#[test]
	fn resolve_fails_without_cubby_path() {
		let mut layer = full_layer();
		layer.cubby_path = None;
		assert!(layer.resolve().is_err());
	}

	#[test]
	fn debug_redacts_bootstrap_token() {
		let rendered = format!("{:?}", full_layer().resolve().unwrap());
		assert!(!rendered.contains("bootstrap-token"));
		assert!(rendered.contains("[REDACTED]"));
	}
}

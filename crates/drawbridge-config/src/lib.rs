// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Centralized configuration management for the drawbridge server and agent.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file,
//!   environment)
//! - Type-safe configuration with eager validation: missing required keys
//!   fail at startup, not at first use
//! - Consistent environment variable naming (`DRAWBRIDGE_*`), with the
//!   legacy `CATTLE_*`/`VAULT_*` variables honored as fallbacks
//!
//! # Usage
//!
//! ```ignore
//! let config = drawbridge_config::load_config()?;
//! let rancher = config.require_rancher()?;
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::debug;

/// Fully resolved process configuration.
///
/// The `rancher`, `vault`, and `agent` sections are optional: a server
/// deployment carries the first two, an agent deployment carries the last.
/// [`Config::require_rancher`] and friends turn absence into a startup error
/// for the role that needs them.
#[derive(Debug, Clone)]
pub struct Config {
	pub http: HttpConfig,
	pub auth: AuthConfig,
	pub logging: LoggingConfig,
	pub rancher: Option<RancherConfig>,
	pub vault: Option<VaultConfig>,
	pub agent: Option<AgentConfig>,
}

impl Config {
	pub fn require_rancher(&self) -> Result<&RancherConfig, ConfigError> {
		self
			.rancher
			.as_ref()
			.ok_or_else(|| ConfigError::missing("rancher configuration"))
	}

	pub fn require_vault(&self) -> Result<&VaultConfig, ConfigError> {
		self
			.vault
			.as_ref()
			.ok_or_else(|| ConfigError::missing("vault configuration"))
	}

	pub fn require_agent(&self) -> Result<&AgentConfig, ConfigError> {
		self
			.agent
			.as_ref()
			.ok_or_else(|| ConfigError::missing("agent configuration"))
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`DRAWBRIDGE_*`)
/// 2. Config file (`/etc/drawbridge/config.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<Config, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration from environment only (for testing or simple
/// deployments).
pub fn load_config_from_env() -> Result<Config, ConfigError> {
	load_from_sources(vec![Box::new(DefaultsSource), Box::new(EnvSource)])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<Config, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<Config, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

/// Finalize a merged configuration layer into a resolved config.
fn finalize(layer: ConfigLayer) -> Result<Config, ConfigError> {
	let rancher = match layer.rancher {
		Some(section) if !section.is_empty() => Some(section.resolve()?),
		_ => None,
	};
	let vault = match layer.vault {
		Some(section) if !section.is_empty() => Some(section.resolve()?),
		_ => None,
	};
	let agent = match layer.agent {
		Some(section) if !section.is_empty() => Some(section.resolve()?),
		_ => None,
	};

	Ok(Config {
		http: layer.http.unwrap_or_default().resolve(),
		auth: layer.auth.unwrap_or_default().resolve()?,
		logging: layer.logging.unwrap_or_default().resolve(),
		rancher,
		vault,
		agent,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use drawbridge_common_secret::SecretString;

	fn layer_with_auth() -> ConfigLayer {
		ConfigLayer {
			auth: Some(AuthConfigLayer {
				signing_key: Some(SecretString::from("key")),
				max_age_secs: None,
			}),
			..Default::default()
		}
	}

	#[test]
	fn finalize_minimal_layer() {
		let config = finalize(layer_with_auth()).unwrap();
		assert_eq!(config.http.port, 8181);
		assert_eq!(config.logging.level, "info");
		assert!(config.rancher.is_none());
		assert!(config.vault.is_none());
		assert!(config.agent.is_none());
	}

	#[test]
	fn finalize_fails_without_signing_key() {
		assert!(finalize(ConfigLayer::default()).is_err());
	}

	#[test]
	fn finalize_rejects_partial_rancher_section() {
		let mut layer = layer_with_auth();
		layer.rancher = Some(RancherConfigLayer {
			url: Some("https://rancher.example.com/v1".to_string()),
			..Default::default()
		});

		assert!(finalize(layer).is_err());
	}

	#[test]
	fn require_helpers_report_missing_sections() {
		let config = finalize(layer_with_auth()).unwrap();
		assert!(config.require_rancher().is_err());
		assert!(config.require_vault().is_err());
		assert!(config.require_agent().is_err());
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Configuration sources: defaults, TOML files, and environment variables.

use std::path::PathBuf;

use drawbridge_common_secret::SecretString;
use tracing::debug;

use crate::error::ConfigError;
use crate::layer::ConfigLayer;
use crate::sections::{
	AgentConfigLayer, AuthConfigLayer, HttpConfigLayer, LoggingConfigLayer, RancherConfigLayer,
	VaultConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		Ok(ConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/drawbridge/config.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
			path: self.path.clone(),
			source: e,
		})
	}
}

/// Environment variable source.
///
/// Convention: `DRAWBRIDGE_<SECTION>_<FIELD>`. The legacy `CATTLE_*` and
/// `VAULT_*` variables the original deployment used are honored as fallbacks.
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ConfigLayer {
			http: Some(HttpConfigLayer {
				host: env_var("DRAWBRIDGE_HOST"),
				port: env_u16("DRAWBRIDGE_PORT")?,
			}),
			rancher: Some(RancherConfigLayer {
				url: env_var("DRAWBRIDGE_RANCHER_URL").or_else(|| env_var("CATTLE_URL")),
				access_key: env_var("DRAWBRIDGE_RANCHER_ACCESS_KEY")
					.or_else(|| env_var("CATTLE_ACCESS_KEY")),
				secret_key: env_secret("DRAWBRIDGE_RANCHER_SECRET_KEY")
					.or_else(|| env_secret("CATTLE_SECRET_KEY")),
			}),
			vault: Some(VaultConfigLayer {
				url: env_var("DRAWBRIDGE_VAULT_URL"),
				token: env_secret("DRAWBRIDGE_VAULT_TOKEN").or_else(|| env_secret("VAULT_TOKEN")),
				cubby_path: env_var("DRAWBRIDGE_VAULT_CUBBYPATH")
					.or_else(|| env_var("VAULT_CUBBYPATH")),
				ca_cert: env_var("DRAWBRIDGE_VAULT_CACERT").map(PathBuf::from),
			}),
			auth: Some(AuthConfigLayer {
				signing_key: env_secret("DRAWBRIDGE_SIGNING_KEY")
					.or_else(|| env_secret("CATTLE_SECRET_KEY")),
				max_age_secs: env_u64("DRAWBRIDGE_SIGNATURE_MAX_AGE_SECS")?,
			}),
			agent: Some(AgentConfigLayer {
				metadata_url: env_var("DRAWBRIDGE_METADATA_URL"),
				bridge_url: env_var("DRAWBRIDGE_BRIDGE_URL"),
				delivery_root: env_var("DRAWBRIDGE_DELIVERY_ROOT").map(PathBuf::from),
			}),
			logging: Some(LoggingConfigLayer {
				level: env_var("DRAWBRIDGE_LOG_LEVEL"),
			}),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_secret(name: &str) -> Option<SecretString> {
	env_var(name).map(SecretString::new)
}

fn env_u16(name: &str) -> Result<Option<u16>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid u16 value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn env_u64(name: &str) -> Result<Option<u64>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid u64 value '{v}'"),
		}),
		None => Ok(None),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn toml_source_skips_missing_file() {
		let layer = TomlSource::new("/nonexistent/drawbridge.toml").load().unwrap();
		assert!(layer.http.is_none());
	}

	#[test]
	fn toml_source_parses_sections() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
[http]
port = 9000

[rancher]
url = "https://rancher.example.com/v1"
access_key = "ak"
secret_key = "sk"

[auth]
signing_key = "shared"
"#
		)
		.unwrap();

		let layer = TomlSource::new(file.path()).load().unwrap();
		assert_eq!(layer.http.unwrap().port, Some(9000));

		let rancher = layer.rancher.unwrap();
		assert_eq!(rancher.access_key, Some("ak".to_string()));
		assert_eq!(rancher.secret_key.unwrap().expose(), "sk");
		assert_eq!(layer.auth.unwrap().signing_key.unwrap().expose(), "shared");
	}

	#[test]
	fn toml_source_rejects_invalid_syntax() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "not [valid toml").unwrap();

		assert!(matches!(
			TomlSource::new(file.path()).load(),
			Err(ConfigError::TomlParse { .. })
		));
	}

	#[test]
	fn precedence_orders_sources() {
		assert!(Precedence::Environment > Precedence::ConfigFile);
		assert!(Precedence::ConfigFile > Precedence::Defaults);
	}
}

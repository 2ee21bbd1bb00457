// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The secret store: bootstrap exchange, policy resolution, and the
//! cubbyhole double-token issuance.

use std::collections::HashMap;

use async_trait::async_trait;
use drawbridge_common_core::ContainerIdentity;
use drawbridge_common_secret::SecretString;
use drawbridge_config::VaultConfig;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::client::VaultClient;
use crate::error::{VaultError, VaultResult};
use crate::types::{Lease, TokenCreateRequest};

/// Token parameters for one cubbyhole issuance.
///
/// The temporary token gets two uses: one is consumed writing the permanent
/// token into the cubbyhole, the other lets the caller read it back.
#[derive(Debug, Clone)]
pub struct CubbyholeSpec {
	pub temp_ttl: String,
	pub temp_use_limit: u64,
	pub perm_ttl: String,
	pub perm_use_limit: u64,
}

impl Default for CubbyholeSpec {
	fn default() -> Self {
		Self {
			temp_ttl: "300s".to_string(),
			temp_use_limit: 2,
			perm_ttl: "1h".to_string(),
			perm_use_limit: 0,
		}
	}
}

/// The seam the request pipeline consumes for secret issuance.
#[async_trait]
pub trait SecretStore: Send + Sync {
	/// Mint a one-time credential for a verified identity. Returns the
	/// temporary token the caller spends reading its cubbyhole.
	async fn issue(&self, identity: &ContainerIdentity) -> VaultResult<String>;

	/// Base URL callers combine with a cubbyhole path to read their secret.
	fn store_url(&self) -> String;
}

/// Secret store backed by the Vault API.
pub struct VaultSecretStore {
	client: VaultClient,
	config_path: String,
	role: Option<String>,
	spec: CubbyholeSpec,
}

impl VaultSecretStore {
	/// Exchange the bootstrap token for the issuing credential and discover
	/// the credential's lease, scoping role, and policy-lookup namespace.
	///
	/// The bootstrap token is itself a cubbyhole token: the real credential
	/// is read as `permKey` from the configured indirection path, so the
	/// long-lived credential never appears in the process environment.
	pub async fn connect(config: &VaultConfig) -> VaultResult<(Self, Lease)> {
		let bootstrap = VaultClient::new(config)?;

		let data = bootstrap.read(&config.cubby_path).await?.ok_or_else(|| {
			VaultError::bootstrap(format!("nothing stored at {}", config.cubby_path))
		})?;
		let issuing_token = data
			.get("permKey")
			.and_then(Value::as_str)
			.ok_or_else(|| {
				VaultError::bootstrap(format!(
					"the key 'permKey' was not found at {}",
					config.cubby_path
				))
			})?;

		let client = bootstrap.with_token(SecretString::from(issuing_token));

		let token = client.lookup_self().await?;
		let config_path = token
			.config_path()
			.ok_or_else(|| VaultError::bootstrap("no configPath key on token metadata"))?
			.to_string();
		let remaining = token.ttl.filter(|ttl| *ttl > 0).ok_or(VaultError::NoLease)?;
		let increment = token.creation_ttl.unwrap_or(remaining);

		if token.role.is_none() {
			warn!("issuing credential has no token-create role; child tokens will be unscoped");
		}

		info!(
			config_path = %config_path,
			remaining,
			"connected to secret backend"
		);

		Ok((
			Self {
				client,
				config_path,
				role: token.role,
				spec: CubbyholeSpec::default(),
			},
			Lease {
				remaining,
				increment,
			},
		))
	}

	/// Build a store around an already-established issuing credential.
	pub fn new(client: VaultClient, config_path: impl Into<String>, role: Option<String>) -> Self {
		Self {
			client,
			config_path: config_path.into(),
			role,
			spec: CubbyholeSpec::default(),
		}
	}

	/// The underlying client, for the lease renewer.
	pub fn client(&self) -> &VaultClient {
		&self.client
	}

	/// Resolve the policy set for an identity path: walk prefixes from most
	/// specific to the bare config root, first `policies` key wins.
	pub async fn lookup_policies(&self, path: &str) -> VaultResult<Vec<String>> {
		let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

		for n in (0..=segments.len()).rev() {
			let candidate = if n == 0 {
				self.config_path.clone()
			} else {
				format!("{}/{}", self.config_path, segments[..n].join("/"))
			};

			debug!(path = %candidate, "looking up policies");
			if let Some(data) = self.client.read(&candidate).await? {
				if let Some(policies) = data.get("policies").and_then(Value::as_str) {
					return Ok(policies.split(',').map(|p| p.trim().to_string()).collect());
				}
			}
		}

		Err(VaultError::NoPolicy {
			path: path.to_string(),
		})
	}

	async fn create_token(&self, policies: Vec<String>, ttl: &str, num_uses: u64) -> VaultResult<String> {
		let auth = self
			.client
			.create_token(
				&TokenCreateRequest {
					policies,
					ttl: ttl.to_string(),
					num_uses,
				},
				self.role.as_deref(),
			)
			.await?;
		Ok(auth.client_token)
	}
}

#[async_trait]
impl SecretStore for VaultSecretStore {
	async fn issue(&self, identity: &ContainerIdentity) -> VaultResult<String> {
		if !identity.is_verified() {
			return Err(VaultError::IssuanceAborted);
		}

		let path = identity.path();
		info!(container = %identity.id(), "issuing cubbyhole credentials");

		let temp_token = self
			.create_token(
				vec!["default".to_string()],
				&self.spec.temp_ttl,
				self.spec.temp_use_limit,
			)
			.await?;

		let policies = self.lookup_policies(&path).await?;
		debug!(?policies, "resolved policy set");

		let perm_token = self
			.create_token(policies, &self.spec.perm_ttl, self.spec.perm_use_limit)
			.await?;

		// The write authenticates as the temp token, so the permanent
		// credential lands where only that token can reach it and consumes
		// one of its two uses.
		let body: HashMap<String, Value> = [("permKey".to_string(), Value::String(perm_token))]
			.into_iter()
			.collect();
		self
			.client
			.write_with_token(&temp_token, &format!("cubbyhole/{path}"), &body)
			.await?;

		Ok(temp_token)
	}

	fn store_url(&self) -> String {
		format!("{}/v1", self.client.address())
	}
}

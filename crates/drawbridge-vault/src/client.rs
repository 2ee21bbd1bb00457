// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Low-level HTTP client for the secret backend.
//!
//! The active credential is sent per request in the `X-Vault-Token` header.
//! Writes that must happen under a different identity (the cubbyhole write
//! under the temporary token) pass that token explicitly instead of swapping
//! any shared session state, so concurrent issuances and the lease renewer
//! never interfere.

use std::collections::HashMap;

use drawbridge_common_secret::SecretString;
use drawbridge_config::VaultConfig;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{VaultError, VaultResult};
use crate::types::{TokenAuth, TokenCreateRequest, TokenData};

const TOKEN_HEADER: &str = "X-Vault-Token";

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
	data: T,
}

#[derive(Debug, Deserialize)]
struct AuthEnvelope {
	auth: Option<TokenAuth>,
}

/// Authenticated client for the secret backend API.
#[derive(Debug, Clone)]
pub struct VaultClient {
	http: reqwest::Client,
	address: String,
	token: SecretString,
}

impl VaultClient {
	/// Build a client authenticated with the bootstrap token. The real
	/// issuing credential replaces it via [`VaultClient::with_token`] once
	/// the bootstrap exchange completes.
	pub fn new(config: &VaultConfig) -> VaultResult<Self> {
		let mut builder = drawbridge_common_http::builder();

		if let Some(ca_cert) = &config.ca_cert {
			let pem = std::fs::read(ca_cert).map_err(|e| {
				VaultError::bootstrap(format!("cannot read CA certificate {}: {e}", ca_cert.display()))
			})?;
			let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
				VaultError::bootstrap(format!("invalid CA certificate {}: {e}", ca_cert.display()))
			})?;
			builder = builder.add_root_certificate(cert);
		}

		Ok(Self {
			http: builder.build().map_err(VaultError::from)?,
			address: config.url.trim_end_matches('/').to_string(),
			token: config.token.clone(),
		})
	}

	/// Replace the active credential (bootstrap token → issuing credential).
	pub fn with_token(mut self, token: SecretString) -> Self {
		self.token = token;
		self
	}

	/// Backend base address, without the API version prefix.
	pub fn address(&self) -> &str {
		&self.address
	}

	/// Read a logical path. `None` when the path holds nothing.
	pub async fn read(&self, path: &str) -> VaultResult<Option<HashMap<String, Value>>> {
		let response = self
			.http
			.get(self.url(path))
			.header(TOKEN_HEADER, self.token.expose())
			.send()
			.await?;

		if response.status() == reqwest::StatusCode::NOT_FOUND {
			return Ok(None);
		}

		let envelope: DataEnvelope<HashMap<String, Value>> =
			response.error_for_status()?.json().await?;
		Ok(Some(envelope.data))
	}

	/// Write a logical path, authenticated as an explicitly provided token
	/// rather than the client's own credential.
	pub async fn write_with_token(
		&self,
		token: &str,
		path: &str,
		body: &HashMap<String, Value>,
	) -> VaultResult<()> {
		self
			.http
			.post(self.url(path))
			.header(TOKEN_HEADER, token)
			.json(body)
			.send()
			.await?
			.error_for_status()?;
		Ok(())
	}

	/// Look up the client's own token.
	pub async fn lookup_self(&self) -> VaultResult<TokenData> {
		let envelope: DataEnvelope<TokenData> = self
			.http
			.get(self.url("auth/token/lookup-self"))
			.header(TOKEN_HEADER, self.token.expose())
			.send()
			.await?
			.error_for_status()?
			.json()
			.await?;
		Ok(envelope.data)
	}

	/// Renew the client's own token by `increment` seconds.
	pub async fn renew_self(&self, increment: u64) -> VaultResult<TokenAuth> {
		let envelope: AuthEnvelope = self
			.http
			.post(self.url("auth/token/renew-self"))
			.header(TOKEN_HEADER, self.token.expose())
			.json(&serde_json::json!({ "increment": increment }))
			.send()
			.await?
			.error_for_status()?
			.json()
			.await?;

		envelope.auth.ok_or(VaultError::NoLease)
	}

	/// Create a child token, optionally under a scoping role.
	pub async fn create_token(
		&self,
		request: &TokenCreateRequest,
		role: Option<&str>,
	) -> VaultResult<TokenAuth> {
		let path = match role {
			Some(role) => format!("auth/token/create/{role}"),
			None => "auth/token/create".to_string(),
		};

		let envelope: AuthEnvelope = self
			.http
			.post(self.url(&path))
			.header(TOKEN_HEADER, self.token.expose())
			.json(request)
			.send()
			.await?
			.error_for_status()?
			.json()
			.await?;

		envelope.auth.ok_or_else(|| VaultError::Backend {
			message: "token create response carried no auth block".to_string(),
		})
	}

	fn url(&self, path: &str) -> String {
		format!("{}/v1/{path}", self.address)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use drawbridge_config::VaultConfigLayer;
	use wiremock::matchers::{header, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	fn client(server: &MockServer) -> VaultClient {
		let config = VaultConfigLayer {
			url: Some(server.uri()),
			token: Some("bootstrap".into()),
			cubby_path: Some("cubbyhole/bridge-key".to_string()),
			ca_cert: None,
		}
		.resolve()
		.unwrap();

		VaultClient::new(&config).unwrap()
	}

	#[tokio::test]
	async fn read_sends_token_header_and_unwraps_data() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/v1/secret/config/prod"))
			.and(header("X-Vault-Token", "bootstrap"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
				"data": {"policies": "app-prod,default"}
			})))
			.expect(1)
			.mount(&server)
			.await;

		let data = client(&server)
			.read("secret/config/prod")
			.await
			.unwrap()
			.unwrap();
		assert_eq!(data["policies"], "app-prod,default");
	}

	#[tokio::test]
	async fn read_maps_not_found_to_none() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/v1/secret/missing"))
			.respond_with(ResponseTemplate::new(404))
			.mount(&server)
			.await;

		assert!(client(&server).read("secret/missing").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn write_with_token_authenticates_as_given_token() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/v1/cubbyhole/prod/app"))
			.and(header("X-Vault-Token", "temp-token"))
			.respond_with(ResponseTemplate::new(204))
			.expect(1)
			.mount(&server)
			.await;

		let body = [(
			"permKey".to_string(),
			Value::String("perm-token".to_string()),
		)]
		.into_iter()
		.collect();

		client(&server)
			.write_with_token("temp-token", "cubbyhole/prod/app", &body)
			.await
			.unwrap();
	}

	#[tokio::test]
	async fn renew_self_without_auth_block_is_no_lease() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/v1/auth/token/renew-self"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
			.mount(&server)
			.await;

		assert!(matches!(
			client(&server).renew_self(3600).await,
			Err(VaultError::NoLease)
		));
	}

	#[tokio::test]
	async fn create_token_uses_role_path_when_scoped() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/v1/auth/token/create/bridge"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
				"auth": {"client_token": "child", "lease_duration": 300}
			})))
			.expect(1)
			.mount(&server)
			.await;

		let auth = client(&server)
			.create_token(
				&TokenCreateRequest {
					policies: vec!["default".to_string()],
					ttl: "300s".to_string(),
					num_uses: 2,
				},
				Some("bridge"),
			)
			.await
			.unwrap();

		assert_eq!(auth.client_token, "child");
		assert_eq!(auth.lease_duration, 300);
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! A mock secret store for exercising the request pipeline without a
//! backend.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use drawbridge_common_core::ContainerIdentity;

use crate::error::{VaultError, VaultResult};
use crate::store::SecretStore;

/// A mock [`SecretStore`] with configurable responses, returned in FIFO
/// order. Calls are counted so tests can assert the pipeline never reaches
/// issuance when an earlier gate rejects.
pub struct MockSecretStore {
	responses: Arc<Mutex<Vec<VaultResult<String>>>>,
	calls: AtomicUsize,
	store_url: String,
}

impl MockSecretStore {
	pub fn new() -> Self {
		Self {
			responses: Arc::new(Mutex::new(Vec::new())),
			calls: AtomicUsize::new(0),
			store_url: "https://vault.test/v1".to_string(),
		}
	}

	/// Queue a response for the next `issue` call.
	pub fn push(&self, response: VaultResult<String>) {
		self.responses.lock().unwrap().push(response);
	}

	/// How many times `issue` has been called.
	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

impl Default for MockSecretStore {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl SecretStore for MockSecretStore {
	async fn issue(&self, identity: &ContainerIdentity) -> VaultResult<String> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		if !identity.is_verified() {
			return Err(VaultError::IssuanceAborted);
		}

		let mut responses = self.responses.lock().unwrap();
		if responses.is_empty() {
			Ok("mock-temp-token".to_string())
		} else {
			responses.remove(0)
		}
	}

	fn store_url(&self) -> String {
		self.store_url.clone()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use drawbridge_common_core::IdentityScope;

	fn verified() -> ContainerIdentity {
		ContainerIdentity::verified(
			"ext-1",
			IdentityScope::Kubernetes {
				environment: "prod".to_string(),
				namespace: "payments".to_string(),
				label_path: None,
			},
		)
	}

	#[tokio::test]
	async fn returns_default_token_when_queue_is_empty() {
		let mock = MockSecretStore::new();
		assert_eq!(mock.issue(&verified()).await.unwrap(), "mock-temp-token");
		assert_eq!(mock.calls(), 1);
	}

	#[tokio::test]
	async fn rejects_unverified_identity() {
		let mock = MockSecretStore::new();
		assert!(matches!(
			mock.issue(&ContainerIdentity::unverified("ext-1")).await,
			Err(VaultError::IssuanceAborted)
		));
	}
}

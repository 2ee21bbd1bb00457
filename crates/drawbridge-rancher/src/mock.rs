// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! A mock verifier for exercising the request pipeline without a control
//! plane.
//!
//! Responses are returned in FIFO order and every call is counted, so tests
//! can assert both outcomes and that gates short-circuit before verification.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use drawbridge_common_core::{ContainerIdentity, Message};

use crate::error::{VerifierError, VerifierResult};
use crate::verifier::ContainerVerifier;

/// A mock [`ContainerVerifier`] with configurable responses.
#[derive(Default)]
pub struct MockVerifier {
	responses: Arc<Mutex<Vec<VerifierResult<ContainerIdentity>>>>,
	calls: AtomicUsize,
}

impl MockVerifier {
	pub fn new() -> Self {
		Self::default()
	}

	/// Queue a response for the next `verify` call.
	pub fn push(&self, response: VerifierResult<ContainerIdentity>) {
		self.responses.lock().unwrap().push(response);
	}

	/// How many times `verify` has been called.
	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl ContainerVerifier for MockVerifier {
	async fn verify(&self, _message: &Message) -> VerifierResult<ContainerIdentity> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		let mut responses = self.responses.lock().unwrap();
		if responses.is_empty() {
			Err(VerifierError::NotFound)
		} else {
			responses.remove(0)
		}
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Pipeline error to HTTP status mapping.

use axum::http::StatusCode;
use drawbridge_rancher::VerifierError;
use drawbridge_vault::VaultError;
use thiserror::Error;

/// A failure past the signature and shape gates.
#[derive(Error, Debug)]
pub enum PipelineError {
	#[error(transparent)]
	Verification(#[from] VerifierError),

	#[error(transparent)]
	Issuance(#[from] VaultError),
}

impl PipelineError {
	/// Identity verification failures answer 404 rather than 403 so a
	/// well-formed-but-wrong claim learns nothing about which layer rejected
	/// it. Issuance failures are server-side faults and answer 500.
	pub fn status(&self) -> StatusCode {
		match self {
			PipelineError::Verification(_) => StatusCode::NOT_FOUND,
			PipelineError::Issuance(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

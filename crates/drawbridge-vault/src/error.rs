// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Result type alias for secret backend operations.
pub type VaultResult<T> = Result<T, VaultError>;

/// Errors that can occur against the secret backend.
#[derive(Error, Debug)]
pub enum VaultError {
	/// The backend could not be reached or answered with an error status.
	#[error("secret backend error: {message}")]
	Backend { message: String },

	/// The bootstrap exchange could not produce an issuing credential.
	#[error("bootstrap failed: {message}")]
	Bootstrap { message: String },

	/// The backend reported no lease information for the issuing credential.
	/// Continuing to issue with a credential of unknown freshness is unsafe,
	/// so this is fatal for the process.
	#[error("issuing credential has no lease information")]
	NoLease,

	/// No prefix of the identity path (including the root) carries a policy
	/// list.
	#[error("no policies found for path {path}")]
	NoPolicy { path: String },

	/// Issuance was requested for an identity that never verified. No
	/// backend call is made in this case.
	#[error("secret issuance aborted for unverified identity")]
	IssuanceAborted,
}

impl VaultError {
	pub(crate) fn bootstrap(message: impl Into<String>) -> Self {
		VaultError::Bootstrap {
			message: message.into(),
		}
	}
}

impl From<reqwest::Error> for VaultError {
	fn from(err: reqwest::Error) -> Self {
		VaultError::Backend {
			message: err.to_string(),
		}
	}
}

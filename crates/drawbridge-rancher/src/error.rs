// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Result type alias for verifier operations.
pub type VerifierResult<T> = Result<T, VerifierError>;

/// Errors that can occur during container identity verification.
#[derive(Error, Debug)]
pub enum VerifierError {
	/// The control plane could not be reached or answered with an error.
	#[error("control plane unavailable: {message}")]
	Upstream { message: String },

	/// The claimed container never appeared within the resolution budget.
	#[error("no container found for claimed identity")]
	NotFound,

	/// The claimed identity does not match the control plane's records.
	#[error("claimed identity does not match control-plane records")]
	IdentityMismatch,

	/// A hop in the container's relationship graph is missing.
	#[error("container topology incomplete: {message}")]
	TopologyIncomplete { message: String },
}

impl VerifierError {
	pub(crate) fn topology(message: impl Into<String>) -> Self {
		VerifierError::TopologyIncomplete {
			message: message.into(),
		}
	}
}

impl From<reqwest::Error> for VerifierError {
	fn from(err: reqwest::Error) -> Self {
		VerifierError::Upstream {
			message: err.to_string(),
		}
	}
}

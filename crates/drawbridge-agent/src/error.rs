// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Errors that can occur in the agent's event handling path.
#[derive(Error, Debug)]
pub enum AgentError {
	/// The container has not opted in to secret delivery.
	#[error("secrets bridge not enabled for container")]
	NotEnabled,

	/// No stable identity could be resolved for the event.
	#[error("no container identity found for event")]
	NoIdentity,

	#[error("metadata service error: {message}")]
	Metadata { message: String },

	#[error("bridge request failed: {message}")]
	Bridge { message: String },

	#[error("secret delivery failed: {message}")]
	Delivery { message: String },
}

impl From<reqwest::Error> for AgentError {
	fn from(err: reqwest::Error) -> Self {
		AgentError::Bridge {
			message: err.to_string(),
		}
	}
}

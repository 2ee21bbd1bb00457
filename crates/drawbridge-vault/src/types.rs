// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Secret backend API wire types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Token metadata from a self-lookup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenData {
	/// Remaining lease in seconds.
	pub ttl: Option<u64>,
	/// Lease increment granted at creation, reused for renewals.
	pub creation_ttl: Option<u64>,
	/// Role the token may create child tokens under.
	pub role: Option<String>,
	#[serde(default)]
	pub meta: Option<HashMap<String, String>>,
}

impl TokenData {
	/// The policy-lookup namespace attached to the token's metadata.
	pub fn config_path(&self) -> Option<&str> {
		self
			.meta
			.as_ref()
			.and_then(|meta| meta.get("configPath"))
			.map(String::as_str)
	}
}

/// Auth block returned by token create and renew operations.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenAuth {
	pub client_token: String,
	#[serde(default)]
	pub lease_duration: u64,
}

/// Request body for token creation.
#[derive(Debug, Clone, Serialize)]
pub struct TokenCreateRequest {
	pub policies: Vec<String>,
	pub ttl: String,
	pub num_uses: u64,
}

/// Lease state of the issuing credential, captured at bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lease {
	/// Remaining seconds before the credential expires.
	pub remaining: u64,
	/// Seconds to request on each renewal.
	pub increment: u64,
}

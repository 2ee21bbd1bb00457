// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP client construction with a consistent User-Agent header.
//!
//! Every outbound client in the workspace (control plane, secret backend,
//! bridge endpoint, metadata service) goes through [`builder`] so timeouts
//! and identification stay uniform.

use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Default timeout applied to every outbound request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Creates a new HTTP client builder with the standard User-Agent header and
/// default timeout.
///
/// Use this when you need to customize the client (e.g., add a root
/// certificate) before building.
pub fn builder() -> ClientBuilder {
	Client::builder()
		.user_agent(user_agent())
		.timeout(DEFAULT_TIMEOUT)
		.connect_timeout(DEFAULT_TIMEOUT)
}

/// Creates a new HTTP client with the standard User-Agent header.
pub fn new_client() -> Client {
	builder().build().expect("failed to build HTTP client")
}

/// Creates a new HTTP client with a custom timeout and the standard
/// User-Agent.
pub fn new_client_with_timeout(timeout: Duration) -> Client {
	builder()
		.timeout(timeout)
		.build()
		.expect("failed to build HTTP client")
}

/// Returns the standard User-Agent string.
///
/// Format: `drawbridge/{version}`
pub fn user_agent() -> String {
	format!("drawbridge/{}", env!("CARGO_PKG_VERSION"))
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Control-plane API resource types.
//!
//! Every resource carries a `links` map pointing at its related resources;
//! topology walks follow those links rather than assembling URLs by hand.

use std::collections::HashMap;

use serde::Deserialize;

/// A list response from the control plane.
#[derive(Debug, Clone, Deserialize)]
pub struct Collection<T> {
	#[serde(default = "Vec::new")]
	pub data: Vec<T>,
}

/// A container as reported by the control plane.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
	#[serde(default)]
	pub id: String,
	#[serde(default)]
	pub uuid: String,
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub external_id: String,
	#[serde(default)]
	pub labels: HashMap<String, String>,
	#[serde(default)]
	pub links: HashMap<String, String>,
}

/// A service a container belongs to.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Service {
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub links: HashMap<String, String>,
}

/// A stack (service grouping inside an environment).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Stack {
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub links: HashMap<String, String>,
}

/// A top-level environment (project) visible to the API key.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Project {
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub links: HashMap<String, String>,
}

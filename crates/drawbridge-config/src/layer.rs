// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Top-level configuration layer merged across sources.

use serde::{Deserialize, Serialize};

use crate::sections::{
	AgentConfigLayer, AuthConfigLayer, HttpConfigLayer, LoggingConfigLayer, RancherConfigLayer,
	VaultConfigLayer,
};

/// All-optional configuration layer, one per source, merged in precedence
/// order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigLayer {
	pub http: Option<HttpConfigLayer>,
	pub rancher: Option<RancherConfigLayer>,
	pub vault: Option<VaultConfigLayer>,
	pub auth: Option<AuthConfigLayer>,
	pub agent: Option<AgentConfigLayer>,
	pub logging: Option<LoggingConfigLayer>,
}

impl ConfigLayer {
	/// Merges another layer on top of this one, section by section.
	pub fn merge(&mut self, other: ConfigLayer) {
		merge_section(&mut self.http, other.http, HttpConfigLayer::merge);
		merge_section(&mut self.rancher, other.rancher, RancherConfigLayer::merge);
		merge_section(&mut self.vault, other.vault, VaultConfigLayer::merge);
		merge_section(&mut self.auth, other.auth, AuthConfigLayer::merge);
		merge_section(&mut self.agent, other.agent, AgentConfigLayer::merge);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_section<T>(base: &mut Option<T>, overlay: Option<T>, merge: impl FnOnce(&mut T, T)) {
	match (base.as_mut(), overlay) {
		(Some(base), Some(overlay)) => merge(base, overlay),
		(None, Some(overlay)) => *base = Some(overlay),
		(_, None) => {}
	}
}

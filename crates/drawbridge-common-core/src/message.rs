// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The signed message the agent sends for each container-start event, and the
//! grant the server answers with.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::labels;

/// A container lifecycle transition as reported by the runtime event feed.
///
/// Only `action == "start"` is meaningful downstream; everything else is
/// rejected by the pipeline as not-implemented.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerEvent {
	/// Runtime-assigned container ID (the externally visible one).
	pub id: String,
	#[serde(default)]
	pub action: String,
	/// Container attributes/labels attached to the event.
	#[serde(default)]
	pub attributes: HashMap<String, String>,
}

/// The two container variants the bridge can verify.
///
/// Constructed exactly once per event via [`ContainerKind::classify`]; call
/// sites dispatch on the enum, never on the raw wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerKind {
	/// A plain orchestrator-managed container.
	#[serde(rename = "cattle")]
	Cattle,
	/// A container running inside a pod.
	#[serde(rename = "kubernetes")]
	Kubernetes,
}

/// Why an event does not qualify for secret delivery.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ClassifyError {
	#[error("secrets bridge not enabled for container")]
	NotEnabled,
}

impl ContainerKind {
	/// Classify an event by its attributes.
	///
	/// A namespace label marks the container as pod-managed. Plain containers
	/// must opt in explicitly via `secrets.bridge.enabled=true`; without it no
	/// secret is ever issued for them.
	pub fn classify(attributes: &HashMap<String, String>) -> Result<Self, ClassifyError> {
		if attributes.contains_key(labels::POD_NAMESPACE) {
			return Ok(ContainerKind::Kubernetes);
		}

		match attributes.get(labels::SECRETS_ENABLED).map(String::as_str) {
			Some("true") => Ok(ContainerKind::Cattle),
			_ => Err(ClassifyError::NotEnabled),
		}
	}

	/// The attribute key carrying the container's name for this variant.
	pub fn name_attribute(&self) -> &'static str {
		match self {
			ContainerKind::Cattle => labels::CONTAINER_NAME,
			ContainerKind::Kubernetes => labels::POD_NAME,
		}
	}
}

/// The signed, transmitted unit built from a [`ContainerEvent`].
///
/// `uuid` is the claimed stable container identity, resolved by the agent
/// against its local metadata service before signing. The server never trusts
/// it without an independent control-plane lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
	#[serde(rename = "Event")]
	pub event: ContainerEvent,
	#[serde(rename = "UUID")]
	pub uuid: String,
	#[serde(rename = "Action")]
	pub action: String,
	#[serde(rename = "Host")]
	pub host: String,
	#[serde(rename = "container_type")]
	pub container_type: ContainerKind,
}

impl Message {
	/// Whether this message is one the pipeline implements: a start event
	/// carrying a claimed identity.
	pub fn is_start(&self) -> bool {
		self.action == "start" && !self.uuid.is_empty()
	}
}

/// Successful issuance response: a one-time token and where it can be spent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretGrant {
	#[serde(rename = "externalId")]
	pub external_id: String,
	#[serde(rename = "tempToken")]
	pub temp_token: String,
	#[serde(rename = "cubbyPath")]
	pub cubby_path: String,
}

#[cfg(test)]
mod tests {
	use super::*;

	fn attributes(pairs: &[(&str, &str)]) -> HashMap<String, String> {
		pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect()
	}

	mod classify {
		use super::*;

		#[test]
		fn namespace_label_selects_kubernetes() {
			let attrs = attributes(&[(labels::POD_NAMESPACE, "default")]);
			assert_eq!(
				ContainerKind::classify(&attrs),
				Ok(ContainerKind::Kubernetes)
			);
		}

		#[test]
		fn enabled_label_selects_cattle() {
			let attrs = attributes(&[(labels::SECRETS_ENABLED, "true")]);
			assert_eq!(ContainerKind::classify(&attrs), Ok(ContainerKind::Cattle));
		}

		#[test]
		fn missing_enabled_label_is_rejected() {
			let attrs = attributes(&[(labels::CONTAINER_NAME, "web-1")]);
			assert_eq!(
				ContainerKind::classify(&attrs),
				Err(ClassifyError::NotEnabled)
			);
		}

		#[test]
		fn non_true_enabled_value_is_rejected() {
			let attrs = attributes(&[(labels::SECRETS_ENABLED, "yes")]);
			assert_eq!(
				ContainerKind::classify(&attrs),
				Err(ClassifyError::NotEnabled)
			);
		}

		#[test]
		fn namespace_wins_over_enabled_flag() {
			let attrs = attributes(&[
				(labels::POD_NAMESPACE, "kube-system"),
				(labels::SECRETS_ENABLED, "false"),
			]);
			assert_eq!(
				ContainerKind::classify(&attrs),
				Ok(ContainerKind::Kubernetes)
			);
		}
	}

	mod wire_format {
		use super::*;

		#[test]
		fn message_round_trips_with_original_field_names() {
			let msg = Message {
				event: ContainerEvent {
					id: "ext-1".to_string(),
					action: "start".to_string(),
					attributes: attributes(&[(labels::SECRETS_ENABLED, "true")]),
				},
				uuid: "c1".to_string(),
				action: "start".to_string(),
				host: "host-a".to_string(),
				container_type: ContainerKind::Cattle,
			};

			let json = serde_json::to_value(&msg).unwrap();
			assert_eq!(json["UUID"], "c1");
			assert_eq!(json["Action"], "start");
			assert_eq!(json["Host"], "host-a");
			assert_eq!(json["container_type"], "cattle");
			assert_eq!(json["Event"]["id"], "ext-1");

			let back: Message = serde_json::from_value(json).unwrap();
			assert_eq!(back.uuid, msg.uuid);
			assert_eq!(back.container_type, ContainerKind::Cattle);
		}

		#[test]
		fn message_parses_with_missing_event_details() {
			let raw = r#"{
				"Event": {"id": "ext-9"},
				"UUID": "u-9",
				"Action": "start",
				"Host": "host-b",
				"container_type": "kubernetes"
			}"#;

			let msg: Message = serde_json::from_str(raw).unwrap();
			assert!(msg.is_start());
			assert_eq!(msg.container_type, ContainerKind::Kubernetes);
			assert!(msg.event.attributes.is_empty());
		}

		#[test]
		fn grant_uses_camel_case_keys() {
			let grant = SecretGrant {
				external_id: "ext-1".to_string(),
				temp_token: "tok".to_string(),
				cubby_path: "https://vault/v1/cubbyhole/a/b".to_string(),
			};

			let json = serde_json::to_value(&grant).unwrap();
			assert_eq!(json["externalId"], "ext-1");
			assert_eq!(json["tempToken"], "tok");
			assert_eq!(json["cubbyPath"], "https://vault/v1/cubbyhole/a/b");
		}
	}

	mod is_start {
		use super::*;

		fn message(action: &str, uuid: &str) -> Message {
			Message {
				event: ContainerEvent::default(),
				uuid: uuid.to_string(),
				action: action.to_string(),
				host: "h".to_string(),
				container_type: ContainerKind::Cattle,
			}
		}

		#[test]
		fn start_with_uuid_is_accepted() {
			assert!(message("start", "c1").is_start());
		}

		#[test]
		fn non_start_action_is_rejected() {
			assert!(!message("stop", "c1").is_start());
		}

		#[test]
		fn empty_uuid_is_rejected() {
			assert!(!message("start", "").is_start());
		}
	}
}

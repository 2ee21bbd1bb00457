// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Container identity verification against the control plane.

use async_trait::async_trait;
use drawbridge_common_core::labels;
use drawbridge_common_core::{ContainerIdentity, ContainerKind, IdentityScope, Message};
use tracing::{debug, info};

use crate::client::{ContainerFilter, RancherClient};
use crate::error::{VerifierError, VerifierResult};
use crate::types::{Collection, Container, Service, Stack};

/// The seam the request pipeline consumes.
///
/// Verification is a pure function of the message and the control plane's
/// current state: it returns a fresh [`ContainerIdentity`] per call and a
/// mismatch is an error, never a verified result.
#[async_trait]
pub trait ContainerVerifier: Send + Sync {
	async fn verify(&self, message: &Message) -> VerifierResult<ContainerIdentity>;
}

/// Verifier backed by the Rancher-style control plane.
pub struct RancherVerifier {
	client: RancherClient,
}

impl RancherVerifier {
	pub fn new(client: RancherClient) -> Self {
		Self { client }
	}

	async fn verify_cattle(
		&self,
		message: &Message,
		container: Container,
	) -> VerifierResult<ContainerIdentity> {
		if message.event.id != container.external_id {
			debug!(
				claimed = %message.event.id,
				resolved = %container.external_id,
				"event ID does not match resolved container"
			);
			return Err(VerifierError::IdentityMismatch);
		}

		let scope = self.cattle_scope(&container).await?;
		Ok(ContainerIdentity::verified(container.external_id, scope))
	}

	/// Walk container → service → stack → environment to build the backend
	/// path for a plain container.
	async fn cattle_scope(&self, container: &Container) -> VerifierResult<IdentityScope> {
		let services_url = container
			.links
			.get("services")
			.ok_or_else(|| VerifierError::topology("container has no services link"))?;
		let services: Collection<Service> = self.client.follow_link(services_url).await?;
		let service = services
			.data
			.into_iter()
			.next()
			.ok_or_else(|| VerifierError::topology("container is not running inside a service"))?;

		let stack_url = service
			.links
			.get("environment")
			.ok_or_else(|| VerifierError::topology("service has no environment link"))?;
		let stack: Stack = self.client.follow_link(stack_url).await?;
		if stack.name.is_empty() {
			return Err(VerifierError::topology("service stack has no name"));
		}

		let account_url = stack
			.links
			.get("account")
			.ok_or_else(|| VerifierError::topology("stack has no account link"))?;
		let environment: crate::types::Project = self.client.follow_link(account_url).await?;
		if environment.name.is_empty() {
			return Err(VerifierError::topology("stack environment has no name"));
		}

		Ok(IdentityScope::Cattle {
			environment: environment.name,
			stack: stack.name,
			service: service.name,
			container: container.name.clone(),
		})
	}

	async fn verify_kubernetes(
		&self,
		message: &Message,
		container: Container,
	) -> VerifierResult<ContainerIdentity> {
		// Second lookup keyed by the event's own external ID: a valid claimed
		// UUID paired with a forged pod label must not verify.
		let event_container = self
			.client
			.resolve_container(ContainerFilter::ExternalId(&message.event.id))
			.await?;

		let claimed_uid = container.labels.get(labels::POD_UID);
		let event_uid = event_container.labels.get(labels::POD_UID);
		match (claimed_uid, event_uid) {
			(Some(claimed), Some(event)) if claimed == event => {
				debug!(pod_uid = %claimed, "pod identity labels match");
			}
			_ => return Err(VerifierError::IdentityMismatch),
		}

		let scope = self.kubernetes_scope(&container).await?;
		Ok(ContainerIdentity::verified(message.event.id.clone(), scope))
	}

	async fn kubernetes_scope(&self, container: &Container) -> VerifierResult<IdentityScope> {
		let environment = self
			.client
			.first_project()
			.await?
			.ok_or_else(|| VerifierError::topology("no environment visible to the API key"))?;

		let namespace = container
			.labels
			.get(labels::POD_NAMESPACE)
			.ok_or_else(|| VerifierError::topology("pod container has no namespace label"))?;

		Ok(IdentityScope::Kubernetes {
			environment: environment.name,
			namespace: namespace.clone(),
			label_path: container.labels.get(labels::SECRETS_PATH).cloned(),
		})
	}
}

#[async_trait]
impl ContainerVerifier for RancherVerifier {
	async fn verify(&self, message: &Message) -> VerifierResult<ContainerIdentity> {
		info!(uuid = %message.uuid, kind = ?message.container_type, "verifying container identity");

		let container = self
			.client
			.resolve_container(ContainerFilter::Uuid(&message.uuid))
			.await?;

		match message.container_type {
			ContainerKind::Cattle => self.verify_cattle(message, container).await,
			ContainerKind::Kubernetes => self.verify_kubernetes(message, container).await,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use drawbridge_common_core::ContainerEvent;
	use drawbridge_config::RancherConfigLayer;
	use std::time::Duration;
	use wiremock::matchers::{method, path, query_param};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	fn message(kind: ContainerKind, uuid: &str, event_id: &str) -> Message {
		Message {
			event: ContainerEvent {
				id: event_id.to_string(),
				action: "start".to_string(),
				attributes: Default::default(),
			},
			uuid: uuid.to_string(),
			action: "start".to_string(),
			host: "host-a".to_string(),
			container_type: kind,
		}
	}

	async fn verifier(server: &MockServer) -> RancherVerifier {
		let config = RancherConfigLayer {
			url: Some(server.uri()),
			access_key: Some("access".to_string()),
			secret_key: Some("secret".into()),
		}
		.resolve()
		.unwrap();

		let client = RancherClient::new(&config)
			.unwrap()
			.with_resolve_delays(vec![Duration::from_millis(1)]);
		RancherVerifier::new(client)
	}

	async fn mount_containers(server: &MockServer, key: &str, value: &str, body: serde_json::Value) {
		Mock::given(method("GET"))
			.and(path("/containers"))
			.and(query_param(key, value))
			.respond_with(ResponseTemplate::new(200).set_body_json(body))
			.mount(server)
			.await;
	}

	#[tokio::test]
	async fn cattle_identity_verifies_and_builds_path() {
		let server = MockServer::start().await;
		let base = server.uri();

		mount_containers(
			&server,
			"uuid",
			"c1",
			serde_json::json!({"data": [{
				"uuid": "c1",
				"name": "api-1",
				"externalId": "ext-1",
				"links": {"services": format!("{base}/containers/1/services")}
			}]}),
		)
		.await;

		Mock::given(method("GET"))
			.and(path("/containers/1/services"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
				"data": [{"name": "api", "links": {"environment": format!("{base}/stacks/5")}}]
			})))
			.mount(&server)
			.await;

		Mock::given(method("GET"))
			.and(path("/stacks/5"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
				"name": "billing", "links": {"account": format!("{base}/projects/9")}
			})))
			.mount(&server)
			.await;

		Mock::given(method("GET"))
			.and(path("/projects/9"))
			.respond_with(
				ResponseTemplate::new(200).set_body_json(serde_json::json!({"name": "prod"})),
			)
			.mount(&server)
			.await;

		let identity = verifier(&server)
			.await
			.verify(&message(ContainerKind::Cattle, "c1", "ext-1"))
			.await
			.unwrap();

		assert!(identity.is_verified());
		assert_eq!(identity.id(), "ext-1");
		assert_eq!(identity.path(), "prod/billing/api/api-1");
	}

	#[tokio::test]
	async fn cattle_external_id_mismatch_is_rejected() {
		let server = MockServer::start().await;
		mount_containers(
			&server,
			"uuid",
			"c1",
			serde_json::json!({"data": [{"uuid": "c1", "externalId": "ext-other"}]}),
		)
		.await;

		let result = verifier(&server)
			.await
			.verify(&message(ContainerKind::Cattle, "c1", "ext-1"))
			.await;

		assert!(matches!(result, Err(VerifierError::IdentityMismatch)));
	}

	#[tokio::test]
	async fn cattle_container_outside_service_is_topology_error() {
		let server = MockServer::start().await;
		let base = server.uri();

		mount_containers(
			&server,
			"uuid",
			"c1",
			serde_json::json!({"data": [{
				"uuid": "c1",
				"externalId": "ext-1",
				"links": {"services": format!("{base}/containers/1/services")}
			}]}),
		)
		.await;

		Mock::given(method("GET"))
			.and(path("/containers/1/services"))
			.respond_with(
				ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})),
			)
			.mount(&server)
			.await;

		let result = verifier(&server)
			.await
			.verify(&message(ContainerKind::Cattle, "c1", "ext-1"))
			.await;

		assert!(matches!(result, Err(VerifierError::TopologyIncomplete { .. })));
	}

	#[tokio::test]
	async fn kubernetes_identity_verifies_when_pod_uids_match() {
		let server = MockServer::start().await;

		mount_containers(
			&server,
			"uuid",
			"c1",
			serde_json::json!({"data": [{
				"uuid": "c1",
				"externalId": "ext-claimed",
				"labels": {
					"io.kubernetes.pod.uid": "pod-9",
					"io.kubernetes.pod.namespace": "payments"
				}
			}]}),
		)
		.await;

		mount_containers(
			&server,
			"externalId",
			"ext-1",
			serde_json::json!({"data": [{
				"externalId": "ext-1",
				"labels": {"io.kubernetes.pod.uid": "pod-9"}
			}]}),
		)
		.await;

		Mock::given(method("GET"))
			.and(path("/projects"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
				"data": [{"name": "prod"}]
			})))
			.mount(&server)
			.await;

		let identity = verifier(&server)
			.await
			.verify(&message(ContainerKind::Kubernetes, "c1", "ext-1"))
			.await
			.unwrap();

		assert_eq!(identity.path(), "prod/payments/ext-1");
	}

	#[tokio::test]
	async fn kubernetes_label_path_extends_scope() {
		let server = MockServer::start().await;

		mount_containers(
			&server,
			"uuid",
			"c1",
			serde_json::json!({"data": [{
				"uuid": "c1",
				"externalId": "ext-claimed",
				"labels": {
					"io.kubernetes.pod.uid": "pod-9",
					"io.kubernetes.pod.namespace": "payments",
					"secrets.bridge.path": "workers"
				}
			}]}),
		)
		.await;

		mount_containers(
			&server,
			"externalId",
			"ext-1",
			serde_json::json!({"data": [{
				"externalId": "ext-1",
				"labels": {"io.kubernetes.pod.uid": "pod-9"}
			}]}),
		)
		.await;

		Mock::given(method("GET"))
			.and(path("/projects"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
				"data": [{"name": "prod"}]
			})))
			.mount(&server)
			.await;

		let identity = verifier(&server)
			.await
			.verify(&message(ContainerKind::Kubernetes, "c1", "ext-1"))
			.await
			.unwrap();

		assert_eq!(identity.path(), "prod/payments/workers/ext-1");
	}

	#[tokio::test]
	async fn kubernetes_missing_pod_uid_label_is_mismatch() {
		let server = MockServer::start().await;

		mount_containers(
			&server,
			"uuid",
			"c1",
			serde_json::json!({"data": [{
				"uuid": "c1",
				"externalId": "ext-claimed",
				"labels": {"io.kubernetes.pod.namespace": "payments"}
			}]}),
		)
		.await;

		mount_containers(
			&server,
			"externalId",
			"ext-1",
			serde_json::json!({"data": [{
				"externalId": "ext-1",
				"labels": {"io.kubernetes.pod.uid": "pod-9"}
			}]}),
		)
		.await;

		let result = verifier(&server)
			.await
			.verify(&message(ContainerKind::Kubernetes, "c1", "ext-1"))
			.await;

		assert!(matches!(result, Err(VerifierError::IdentityMismatch)));
	}

	#[tokio::test]
	async fn kubernetes_differing_pod_uids_are_mismatch() {
		let server = MockServer::start().await;

		mount_containers(
			&server,
			"uuid",
			"c1",
			serde_json::json!({"data": [{
				"uuid": "c1",
				"externalId": "ext-claimed",
				"labels": {
					"io.kubernetes.pod.uid": "pod-1",
					"io.kubernetes.pod.namespace": "payments"
				}
			}]}),
		)
		.await;

		mount_containers(
			&server,
			"externalId",
			"ext-1",
			serde_json::json!({"data": [{
				"externalId": "ext-1",
				"labels": {"io.kubernetes.pod.uid": "pod-2"}
			}]}),
		)
		.await;

		let result = verifier(&server)
			.await
			.verify(&message(ContainerKind::Kubernetes, "c1", "ext-1"))
			.await;

		assert!(matches!(result, Err(VerifierError::IdentityMismatch)));
	}
}

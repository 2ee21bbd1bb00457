// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Verified container identity and its secret-backend path.

/// The hierarchical namespace under which the secret backend stores policy
/// for a container, one shape per container variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityScope {
	/// Plain container: environment → stack → service → container.
	Cattle {
		environment: String,
		stack: String,
		service: String,
		container: String,
	},
	/// Pod-managed container: environment → namespace, with an optional
	/// label-provided path segment between namespace and container ID.
	Kubernetes {
		environment: String,
		namespace: String,
		label_path: Option<String>,
	},
}

/// The outcome of container identity verification.
///
/// Immutable once constructed: [`ContainerIdentity::unverified`] carries no
/// scope and an empty path, [`ContainerIdentity::verified`] carries the full
/// backend path. Verification produces a fresh value per request; identities
/// are never reused or mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerIdentity {
	id: String,
	verified: bool,
	scope: Option<IdentityScope>,
}

impl ContainerIdentity {
	/// An identity that failed (or has not undergone) verification.
	pub fn unverified(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			verified: false,
			scope: None,
		}
	}

	/// An identity confirmed against the control plane.
	pub fn verified(id: impl Into<String>, scope: IdentityScope) -> Self {
		Self {
			id: id.into(),
			verified: true,
			scope: Some(scope),
		}
	}

	/// Externally visible container ID the secret is delivered to.
	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn is_verified(&self) -> bool {
		self.verified
	}

	/// The backend path for this container; empty for unverified identities.
	pub fn path(&self) -> String {
		match &self.scope {
			None => String::new(),
			Some(IdentityScope::Cattle {
				environment,
				stack,
				service,
				container,
			}) => format!("{environment}/{stack}/{service}/{container}"),
			Some(IdentityScope::Kubernetes {
				environment,
				namespace,
				label_path,
			}) => match label_path {
				Some(label_path) => format!("{environment}/{namespace}/{label_path}/{}", self.id),
				None => format!("{environment}/{namespace}/{}", self.id),
			},
		}
	}
}

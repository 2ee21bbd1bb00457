// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Well-known container label keys.

/// Opt-in flag; containers without `secrets.bridge.enabled=true` never
/// receive credentials.
pub const SECRETS_ENABLED: &str = "secrets.bridge.enabled";

/// Optional override for the policy path segment of a pod's identity path.
pub const SECRETS_PATH: &str = "secrets.bridge.path";

/// Namespace label a pod-managed container always carries.
pub const POD_NAMESPACE: &str = "io.kubernetes.pod.namespace";

/// Pod name label, used by the agent to resolve the pod's metadata record.
pub const POD_NAME: &str = "io.kubernetes.pod.name";

/// Stable pod identity; both lookups of a pod container must agree on it.
pub const POD_UID: &str = "io.kubernetes.pod.uid";

/// Container name attribute on plain (non-pod) events.
pub const CONTAINER_NAME: &str = "name";

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Configuration sections.
//!
//! Each section comes in two forms: a `*Layer` with all-optional fields that
//! can be merged across sources, and a resolved runtime struct produced by
//! `resolve()`. Sections with required fields validate them eagerly so a
//! missing key fails at startup, not at first use.

mod agent;
mod auth;
mod http;
mod logging;
mod rancher;
mod vault;

pub use agent::{AgentConfig, AgentConfigLayer};
pub use auth::{AuthConfig, AuthConfigLayer};
pub use http::{HttpConfig, HttpConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use rancher::{RancherConfig, RancherConfigLayer};
pub use vault::{VaultConfig, VaultConfigLayer};

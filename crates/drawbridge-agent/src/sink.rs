// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Secret delivery.
//!
//! The core only needs a sink: given a container ID and a text blob, deposit
//! the blob where that container can read it. [`FsSink`] writes a
//! `secrets.txt` under a per-container directory, which the deployment
//! bind-mounts into the container at a fixed path.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::error::AgentError;

/// A delivery target for issued credentials.
#[async_trait]
pub trait SecretSink: Send + Sync {
	async fn deliver(&self, container_id: &str, text: &str) -> Result<(), AgentError>;
}

/// Filesystem delivery sink.
#[derive(Debug, Clone)]
pub struct FsSink {
	root: PathBuf,
}

const SECRETS_FILE: &str = "secrets.txt";

impl FsSink {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}
}

#[async_trait]
impl SecretSink for FsSink {
	async fn deliver(&self, container_id: &str, text: &str) -> Result<(), AgentError> {
		let dir = self.root.join(container_id);
		tokio::fs::create_dir_all(&dir)
			.await
			.map_err(|e| AgentError::Delivery {
				message: format!("cannot create {}: {e}", dir.display()),
			})?;

		let file = dir.join(SECRETS_FILE);
		// The file holds a short-TTL token; it is overwritten on every
		// delivery rather than appended.
		tokio::fs::write(&file, text)
			.await
			.map_err(|e| AgentError::Delivery {
				message: format!("cannot write {}: {e}", file.display()),
			})?;

		debug!(path = %file.display(), "delivered secrets file");
		Ok(())
	}
}

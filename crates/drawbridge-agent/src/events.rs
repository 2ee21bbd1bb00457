// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Container event intake.
//!
//! The bridge core only consumes `(action, container ID, attributes)`; where
//! those events come from is a seam. [`StdinEventSource`] reads the Docker
//! events JSON format line by line, so the agent composes with
//! `docker events --format '{{json .}}'` without speaking to the runtime
//! socket itself.

use std::collections::HashMap;

use async_trait::async_trait;
use drawbridge_common_core::ContainerEvent;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::warn;

/// A source of container lifecycle events.
#[async_trait]
pub trait EventSource {
	/// The next event, or `None` when the feed is exhausted.
	async fn next_event(&mut self) -> Option<ContainerEvent>;
}

/// One event in the Docker events JSON format.
#[derive(Debug, Deserialize)]
struct DockerEvent {
	#[serde(rename = "Action", default)]
	action: String,
	#[serde(rename = "Actor", default)]
	actor: DockerActor,
}

#[derive(Debug, Default, Deserialize)]
struct DockerActor {
	#[serde(rename = "ID", default)]
	id: String,
	#[serde(rename = "Attributes", default)]
	attributes: HashMap<String, String>,
}

impl From<DockerEvent> for ContainerEvent {
	fn from(event: DockerEvent) -> Self {
		ContainerEvent {
			id: event.actor.id,
			action: event.action,
			attributes: event.actor.attributes,
		}
	}
}

/// Event source reading Docker-format JSON lines from stdin.
pub struct StdinEventSource {
	lines: Lines<BufReader<Stdin>>,
}

impl StdinEventSource {
	pub fn new() -> Self {
		Self {
			lines: BufReader::new(tokio::io::stdin()).lines(),
		}
	}
}

impl Default for StdinEventSource {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl EventSource for StdinEventSource {
	async fn next_event(&mut self) -> Option<ContainerEvent> {
		loop {
			match self.lines.next_line().await {
				Ok(Some(line)) => {
					let line = line.trim();
					if line.is_empty() {
						continue;
					}
					match serde_json::from_str::<DockerEvent>(line) {
						Ok(event) => return Some(event.into()),
						Err(error) => {
							warn!(%error, "skipping unparsable event line");
						}
					}
				}
				Ok(None) => return None,
				Err(error) => {
					warn!(%error, "event feed read error");
					return None;
				}
			}
		}
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Drawbridge agent binary.
//!
//! Reads Docker-format container events from stdin and requests credentials
//! for each started, opted-in container:
//!
//! ```text
//! docker events --format '{{json .}}' | drawbridge-agent
//! ```

use std::sync::Arc;

use clap::Parser;
use drawbridge_agent::{EventSource, FsSink, MessageHandler, MetadataClient, StdinEventSource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Drawbridge agent - requests container credentials from the bridge server.
#[derive(Parser, Debug)]
#[command(name = "drawbridge-agent", about = "Secrets bridge host agent", version)]
struct Args {
	/// Path to a config file (defaults to /etc/drawbridge/config.toml).
	#[arg(long, env = "DRAWBRIDGE_CONFIG")]
	config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Load .env file if present
	dotenvy::dotenv().ok();

	// Load configuration
	let config = match &args.config {
		Some(path) => drawbridge_config::load_config_with_file(path)?,
		None => drawbridge_config::load_config()?,
	};

	// Setup tracing
	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();

	let agent_config = config.require_agent()?;

	tracing::info!(
		bridge = %agent_config.bridge_url,
		metadata = %agent_config.metadata_url,
		"starting drawbridge-agent"
	);

	let metadata = MetadataClient::new(&agent_config.metadata_url)?;
	let sink = FsSink::new(&agent_config.delivery_root);
	let handler = Arc::new(MessageHandler::new(metadata, sink, agent_config, &config.auth).await?);

	tracing::info!("entering event loop");
	let mut events = StdinEventSource::new();
	while let Some(event) = events.next_event().await {
		if event.action != "start" {
			continue;
		}

		// Each event is independent work; nothing throttles the fan-out.
		let handler = Arc::clone(&handler);
		tokio::spawn(async move {
			if let Err(error) = handler.handle(&event).await {
				tracing::debug!(container = %event.id, %error, "event not handled");
			}
		});
	}

	tracing::info!("event feed closed, exiting");
	Ok(())
}

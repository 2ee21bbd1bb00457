// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Drawbridge server binary.

use std::sync::Arc;

use clap::Parser;
use drawbridge_server::{create_router, AppState};
use drawbridge_rancher::{RancherClient, RancherVerifier};
use drawbridge_vault::{LeaseRenewer, VaultSecretStore};
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Drawbridge server - verifies container identities and issues cubbyhole
/// credentials.
#[derive(Parser, Debug)]
#[command(name = "drawbridge-server", about = "Secrets bridge server", version)]
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

	let rancher_config = config.require_rancher()?;
	let vault_config = config.require_vault()?;

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		rancher = %rancher_config.url,
		vault = %vault_config.url,
		"starting drawbridge-server"
	);

	// Control-plane verifier
	let verifier = RancherVerifier::new(RancherClient::new(rancher_config)?);

	// Secret store: bootstrap exchange, then keep the issuing credential
	// alive for the process lifetime.
	let (store, lease) = VaultSecretStore::connect(vault_config).await?;
	let (shutdown_tx, _) = broadcast::channel(1);
	let mut renewer =
		LeaseRenewer::new(store.client().clone(), lease).spawn(shutdown_tx.subscribe());

	let state = AppState::new(Arc::new(verifier), Arc::new(store), &config.auth);
	let router = create_router(state);

	let listener = tokio::net::TcpListener::bind(config.http.socket_addr()).await?;
	tracing::info!(addr = %config.http.socket_addr(), "listening");

	axum::serve(listener, router)
		.with_graceful_shutdown(async move {
			tokio::select! {
				_ = tokio::signal::ctrl_c() => {
					tracing::info!("received ctrl-c, shutting down");
				}
				reason = renewer.fatal() => {
					tracing::error!(%reason, "lease renewer hit a fatal condition, shutting down");
				}
			}
		})
		.await?;

	// Stop the renewal loop before exiting.
	let _ = shutdown_tx.send(());

	Ok(())
}

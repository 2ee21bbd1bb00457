// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Background renewal of the issuing credential's lease.
//!
//! Every issuance depends on the issuing credential being valid, so a single
//! long-lived task renews it for the whole process lifetime. Renewal is
//! scheduled a fixed margin before expiry. A backend that stops reporting
//! lease information is fatal: the task signals the owning process instead of
//! silently serving with a credential of unknown freshness.

use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::VaultClient;
use crate::error::VaultError;
use crate::types::Lease;

/// Safety margin, in seconds, subtracted from the remaining lease so renewal
/// lands before expiry.
const RENEW_MARGIN_SECS: u64 = 180;

/// Seconds until the next renewal attempt for a lease with `remaining`
/// seconds left. Never zero or negative: a lease already inside the margin
/// renews (almost) immediately.
pub fn calculate_refresh_delay(remaining: u64) -> u64 {
	if remaining > RENEW_MARGIN_SECS {
		remaining - RENEW_MARGIN_SECS
	} else {
		1
	}
}

/// Handle to a spawned [`LeaseRenewer`].
pub struct RenewerHandle {
	fatal: watch::Receiver<Option<String>>,
	handle: JoinHandle<()>,
}

impl RenewerHandle {
	/// Resolves when the renewer hits a fatal condition, with the reason.
	/// The owning process should shut down when this fires.
	pub async fn fatal(&mut self) -> String {
		loop {
			if let Some(reason) = self.fatal.borrow_and_update().clone() {
				return reason;
			}
			if self.fatal.changed().await.is_err() {
				// Renewer exited without a fatal signal (shutdown).
				return "lease renewer stopped".to_string();
			}
		}
	}

	/// Waits for the renewer task to finish after shutdown is signalled.
	pub async fn join(self) {
		let _ = self.handle.await;
	}
}

/// The renewal loop for the process's issuing credential.
pub struct LeaseRenewer {
	client: VaultClient,
	lease: Lease,
}

impl LeaseRenewer {
	pub fn new(client: VaultClient, lease: Lease) -> Self {
		Self { client, lease }
	}

	/// Spawn the renewal loop. It runs until `shutdown` fires or a fatal
	/// condition is hit.
	pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> RenewerHandle {
		let (fatal_tx, fatal_rx) = watch::channel(None);
		let handle = tokio::spawn(self.run(shutdown, fatal_tx));
		RenewerHandle {
			fatal: fatal_rx,
			handle,
		}
	}

	async fn run(
		self,
		mut shutdown: broadcast::Receiver<()>,
		fatal: watch::Sender<Option<String>>,
	) {
		let mut remaining = self.lease.remaining;
		info!(
			remaining,
			increment = self.lease.increment,
			"starting issuing-credential renewal loop"
		);

		loop {
			let delay = Duration::from_secs(calculate_refresh_delay(remaining));
			debug!(delay_secs = delay.as_secs(), "scheduling next renewal");

			tokio::select! {
				_ = tokio::time::sleep(delay) => {
					match self.client.renew_self(self.lease.increment).await {
						Ok(auth) if auth.lease_duration > 0 => {
							remaining = auth.lease_duration;
							info!(remaining, "issuing credential renewed");
						}
						Ok(_) | Err(VaultError::NoLease) => {
							let reason =
								"issuing credential reported no remaining lease".to_string();
							warn!("{reason}");
							let _ = fatal.send(Some(reason));
							break;
						}
						// Transient failure: keep the previous schedule
						// rather than hammering an unavailable backend.
						Err(e) => {
							warn!(error = %e, "could not renew issuing credential, retrying at next tick");
						}
					}
				}
				_ = shutdown.recv() => {
					info!("shutting down lease renewer");
					break;
				}
			}
		}
	}
}

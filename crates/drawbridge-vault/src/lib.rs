// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Secret backend integration: the issuing credential, the cubbyhole
//! double-token handoff, and the lease renewal loop that keeps the issuing
//! credential alive.
//!
//! The server never hands a caller the permanent credential directly. Each
//! issuance mints a short-lived, two-use temporary token, writes the
//! permanent token into a cubbyhole only that temporary token can read, and
//! returns the temporary token. The caller spends one use reading the
//! cubbyhole; the write already consumed the other.

mod client;
mod error;
mod mock;
mod renewer;
mod store;
mod types;

pub use client::VaultClient;
pub use error::{VaultError, VaultResult};
pub use mock::MockSecretStore;
pub use renewer::{calculate_refresh_delay, LeaseRenewer, RenewerHandle};
pub use store::{CubbyholeSpec, SecretStore, VaultSecretStore};
pub use types::{Lease, TokenAuth, TokenCreateRequest, TokenData};

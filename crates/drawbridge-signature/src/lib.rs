// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! HMAC-SHA256 agent signature tokens for host authentication.
//!
//! The agent and server share a signing key distributed out of band. For each
//! request the agent computes `HMAC-SHA256(key, identity || timestamp)` and
//! sends `base64("identity:timestamp:hex(mac)")` in the `X-Agent-Signature`
//! header. The server recomputes the MAC with the shared key, compares in
//! constant time, and rejects timestamps outside a small freshness window so
//! captured tokens cannot be replayed later.
//!
//! Pure computation; no I/O and no state beyond the shared key.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Default replay window: tokens older (or further in the future) than this
/// are rejected.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(300);

/// Why a presented signature token was rejected.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SignatureError {
	#[error("no signature token found")]
	Missing,

	#[error("malformed signature token")]
	Malformed,

	#[error("signature does not match")]
	Invalid,

	#[error("signature timestamp outside freshness window")]
	Stale,
}

/// The authenticated content of a valid signature token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSignature {
	/// Stable identity of the signing host.
	pub identity: String,
	/// Unix seconds at signing time.
	pub timestamp: i64,
}

/// Sign `identity` with the shared key at the current time.
pub fn sign(identity: &str, key: &[u8]) -> String {
	sign_at(identity, key, unix_now())
}

/// Verify a signature token against the shared key.
///
/// Checks, in order: presence, base64/triple structure, MAC match
/// (constant-time), timestamp freshness within `max_age` of now.
pub fn verify(token: &str, key: &[u8], max_age: Duration) -> Result<AgentSignature, SignatureError> {
	verify_at(token, key, max_age, unix_now())
}

fn sign_at(identity: &str, key: &[u8], timestamp: i64) -> String {
	let mac = compute_mac(key, identity, timestamp);
	BASE64.encode(format!("{identity}:{timestamp}:{}", hex::encode(mac)))
}

fn verify_at(
	token: &str,
	key: &[u8],
	max_age: Duration,
	now: i64,
) -> Result<AgentSignature, SignatureError> {
	if token.is_empty() {
		return Err(SignatureError::Missing);
	}

	let decoded = BASE64.decode(token).map_err(|_| SignatureError::Malformed)?;
	let decoded = String::from_utf8(decoded).map_err(|_| SignatureError::Malformed)?;

	let fields: Vec<&str> = decoded.splitn(3, ':').collect();
	let &[identity, timestamp, mac_hex] = fields.as_slice() else {
		return Err(SignatureError::Malformed);
	};
	if identity.is_empty() {
		return Err(SignatureError::Malformed);
	}

	let timestamp: i64 = timestamp.parse().map_err(|_| SignatureError::Malformed)?;
	let mac_bytes = hex::decode(mac_hex).map_err(|_| SignatureError::Malformed)?;

	let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
	mac.update(identity.as_bytes());
	mac.update(timestamp.to_string().as_bytes());
	mac
		.verify_slice(&mac_bytes)
		.map_err(|_| SignatureError::Invalid)?;

	let age = now.abs_diff(timestamp);
	if age > max_age.as_secs() {
		return Err(SignatureError::Stale);
	}

	Ok(AgentSignature {
		identity: identity.to_string(),
		timestamp,
	})
}

fn compute_mac(key: &[u8], identity: &str, timestamp: i64) -> Vec<u8> {
	let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
	mac.update(identity.as_bytes());
	mac.update(timestamp.to_string().as_bytes());
	mac.finalize().into_bytes().to_vec()
}

fn unix_now() -> i64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("system clock before Unix epoch")
		.as_secs() as i64
}

#[cfg(test)]
mod tests {
	use super::*;

	const KEY: &[u8] = b"shared-signing-key";
	const NOW: i64 = 1_700_000_000;

	#[test]
	fn sign_then_verify_round_trips() {
		let token = sign_at("agent-uuid-1", KEY, NOW);
		let sig = verify_at(&token, KEY, DEFAULT_MAX_AGE, NOW).unwrap();
		assert_eq!(sig.identity, "agent-uuid-1");
		assert_eq!(sig.timestamp, NOW);
	}

	#[test]
	fn empty_token_is_missing() {
		assert_eq!(
			verify_at("", KEY, DEFAULT_MAX_AGE, NOW),
			Err(SignatureError::Missing)
		);
	}

	#[test]
	fn invalid_base64_is_malformed() {
		assert_eq!(
			verify_at("%%%not-base64%%%", KEY, DEFAULT_MAX_AGE, NOW),
			Err(SignatureError::Malformed)
		);
	}

	#[test]
	fn wrong_field_count_is_malformed() {
		let token = BASE64.encode("identity-and-no-timestamp");
		assert_eq!(
			verify_at(&token, KEY, DEFAULT_MAX_AGE, NOW),
			Err(SignatureError::Malformed)
		);

		let token = BASE64.encode("identity:12345");
		assert_eq!(
			verify_at(&token, KEY, DEFAULT_MAX_AGE, NOW),
			Err(SignatureError::Malformed)
		);
	}

	#[test]
	fn non_numeric_timestamp_is_malformed() {
		let token = BASE64.encode(format!("agent:yesterday:{}", "ab".repeat(32)));
		assert_eq!(
			verify_at(&token, KEY, DEFAULT_MAX_AGE, NOW),
			Err(SignatureError::Malformed)
		);
	}

	#[test]
	fn wrong_key_is_invalid() {
		let token = sign_at("agent-uuid-1", KEY, NOW);
		assert_eq!(
			verify_at(&token, b"other-key", DEFAULT_MAX_AGE, NOW),
			Err(SignatureError::Invalid)
		);
	}

	#[test]
	fn tampered_identity_is_invalid() {
		let token = sign_at("agent-uuid-1", KEY, NOW);
		let decoded = String::from_utf8(BASE64.decode(token).unwrap()).unwrap();
		let tampered = BASE64.encode(decoded.replacen("agent-uuid-1", "agent-uuid-2", 1));
		assert_eq!(
			verify_at(&tampered, KEY, DEFAULT_MAX_AGE, NOW),
			Err(SignatureError::Invalid)
		);
	}

	#[test]
	fn expired_timestamp_is_stale() {
		let signed_at = NOW - DEFAULT_MAX_AGE.as_secs() as i64 - 1;
		let token = sign_at("agent-uuid-1", KEY, signed_at);
		assert_eq!(
			verify_at(&token, KEY, DEFAULT_MAX_AGE, NOW),
			Err(SignatureError::Stale)
		);
	}

	#[test]
	fn future_timestamp_is_stale() {
		let signed_at = NOW + DEFAULT_MAX_AGE.as_secs() as i64 + 1;
		let token = sign_at("agent-uuid-1", KEY, signed_at);
		assert_eq!(
			verify_at(&token, KEY, DEFAULT_MAX_AGE, NOW),
			Err(SignatureError::Stale)
		);
	}

	#[test]
	fn timestamp_at_window_edge_is_accepted() {
		let signed_at = NOW - DEFAULT_MAX_AGE.as_secs() as i64;
		let token = sign_at("agent-uuid-1", KEY, signed_at);
		assert!(verify_at(&token, KEY, DEFAULT_MAX_AGE, NOW).is_ok());
	}
}

#[cfg(test)]
mod proptests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		#[test]
		fn prop_roundtrip(
			identity in "[a-zA-Z0-9-]{1,64}",
			key in proptest::collection::vec(proptest::num::u8::ANY, 1..100),
			now in 0i64..4_000_000_000
		) {
			let token = sign_at(&identity, &key, now);
			let sig = verify_at(&token, &key, DEFAULT_MAX_AGE, now).unwrap();
			prop_assert_eq!(sig.identity, identity);
			prop_assert_eq!(sig.timestamp, now);
		}

		#[test]
		fn prop_wrong_key_fails(
			identity in "[a-zA-Z0-9-]{1,64}",
			key1 in proptest::collection::vec(proptest::num::u8::ANY, 1..100),
			key2 in proptest::collection::vec(proptest::num::u8::ANY, 1..100),
			now in 0i64..4_000_000_000
		) {
			if key1 != key2 {
				let token = sign_at(&identity, &key1, now);
				prop_assert_eq!(
					verify_at(&token, &key2, DEFAULT_MAX_AGE, now),
					Err(SignatureError::Invalid)
				);
			}
		}

		#[test]
		fn prop_garbage_never_panics(token in ".{0,200}", key in proptest::collection::vec(proptest::num::u8::ANY, 1..64)) {
			let _ = verify_at(&token, &key, DEFAULT_MAX_AGE, 1_700_000_000);
		}
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Host agent for the drawbridge.
//!
//! The agent watches container-start events, resolves the started
//! container's stable identity against the local metadata service, and posts
//! a signed message to the bridge server. On a successful answer it deposits
//! the returned one-time credentials where the container can read them.
//!
//! The event feed and delivery target are seams ([`EventSource`],
//! [`SecretSink`]): the shipped implementations read Docker-format events
//! from stdin and write to a per-container directory, but the handler logic
//! is independent of both.

mod error;
mod events;
mod handler;
mod metadata;
mod sink;

pub use error::AgentError;
pub use events::{EventSource, StdinEventSource};
pub use handler::{format_exports, MessageHandler};
pub use metadata::{MetadataClient, MetadataContainer, MetadataSource};
pub use sink::{FsSink, SecretSink};

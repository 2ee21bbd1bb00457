// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The drawbridge server: authenticates the calling host, verifies the
//! claimed container against the control plane, and answers with a one-time
//! cubbyhole credential.
//!
//! Request pipeline, terminal at the first failing gate:
//!
//! ```text
//! signature → body parse → action/identity check → verify → issue → 201
//!    403          400             501               404     500
//! ```

pub mod api;
pub mod error;

pub use api::{create_router, AppState, SIGNATURE_HEADER};
pub use error::PipelineError;

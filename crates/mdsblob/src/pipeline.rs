// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The one-call ingestion pipeline: verify → normalize → reconcile.
//!
//! Each stage fully consumes the previous stage's output; given identical
//! input bytes and a fixed verification time the result is byte-for-byte
//! reproducible.

use std::time::{SystemTime, UNIX_EPOCH};

use mdsblob_validation::{verify_metadata_token, VerifyError};
use mdsblob_x509::{AnchorParseError, TrustAnchors};

use crate::anchors::mds_trust_anchors;
use crate::normalize::{decode_metadata_payload, decode_supplement, NormalizeError};
use crate::reconcile::{reconcile, MetadataRegistry};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Verify(#[from] VerifyError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    TrustAnchor(#[from] AnchorParseError),
}

/// Run the full pipeline against an explicit anchor set and verification
/// time.
///
/// Trust failures abort with no partial table; per-entry issues surface as
/// diagnostics on the returned registry.
pub fn build_registry(
    token: &str,
    supplement: &[u8],
    anchors: &TrustAnchors,
    at: i64,
) -> Result<MetadataRegistry, PipelineError> {
    let payload = verify_metadata_token(token, anchors, at)?;
    let normalized = decode_metadata_payload(&payload)?;
    let names = decode_supplement(supplement)?;
    Ok(reconcile(normalized, &names))
}

/// Run the full pipeline against the embedded production root.
pub fn build_registry_with_mds_root(
    token: &str,
    supplement: &[u8],
    at: i64,
) -> Result<MetadataRegistry, PipelineError> {
    build_registry(token, supplement, &mds_trust_anchors()?, at)
}

/// Convenience wrapper that fixes the verification time to wall-clock
/// "now" once at entry.
pub fn build_registry_at_now(
    token: &str,
    supplement: &[u8],
    anchors: &TrustAnchors,
) -> Result<MetadataRegistry, PipelineError> {
    // A clock before the epoch maps to time zero, which fails closed at
    // the validity-window check.
    let at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default();
    build_registry(token, supplement, anchors, at)
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Verified FIDO Metadata Service ingestion.
//!
//! This crate is the primary entry point: it reduces a signed Metadata
//! BLOB token and an unsigned supplementary name feed into one
//! deterministic AAGUID → entry table, refusing the whole feed unless its
//! certificate chain terminates at the embedded trust anchor and its
//! signature verifies.
//!
//! Design note: to keep the public API simple, the layered crates'
//! verification types are re-exported at the crate root alongside the
//! domain layer.
//!
//! ```no_run
//! # fn main() -> Result<(), mdsblob::PipelineError> {
//! let token = "...";              // fetched BLOB JWT
//! let supplement = b"{}";         // fetched supplementary feed
//! let registry = mdsblob::build_registry_with_mds_root(token, supplement, 1_700_000_000)?;
//! for (aaguid, entry) in &registry.table {
//!     println!("{aaguid}: {:?}", entry.current_status());
//! }
//! # Ok(())
//! # }
//! ```

mod anchors;
mod diagnostics;
mod normalize;
mod pipeline;
mod reconcile;
mod types;

pub use anchors::{mds_trust_anchors, MDS_ROOT_CA_DER};
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use normalize::{
    decode_metadata_payload, decode_supplement, NormalizeError, NormalizedPayload,
    SupplementaryRecord, SUPPORTED_SCHEMA,
};
pub use pipeline::{build_registry, build_registry_at_now, build_registry_with_mds_root, PipelineError};
pub use reconcile::{is_canonical_aaguid, reconcile, MetadataRegistry};
pub use types::{
    AuthenticatorStatus, BiometricStatusReport, Entry, MetadataStatement, ProtocolFamily,
    StatusReport,
};

// Verification layer, re-exported for callers that supply their own
// anchors or verification time.
pub use mdsblob_common::{parse_compact_jws, JoseHeader, ParsedMetadataJws, TokenParseError};
pub use mdsblob_validation::{
    verify_metadata_token, VerifiedPayload, VerifyError, PINNED_ALGORITHM,
};
pub use mdsblob_x509::{validate_chain, AnchorParseError, ChainError, LeafPublicKey, TrustAnchors};

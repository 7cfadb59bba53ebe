// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use mdsblob_x509::{AnchorParseError, TrustAnchors};

/// GlobalSign Root CA - R3, the root the metadata feed's signing chain
/// terminates at.
///
/// Embedded rather than configurable so a misconfigured deployment cannot
/// downgrade the trust decision at runtime.
pub const MDS_ROOT_CA_DER: &[u8] = include_bytes!("../data/globalsign-root-r3.der");

/// The process-wide anchor set for the production metadata feed.
pub fn mds_trust_anchors() -> Result<TrustAnchors, AnchorParseError> {
    TrustAnchors::from_der([MDS_ROOT_CA_DER])
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! X.509 chain validation for the metadata token's `x5c` header.
//!
//! The token header carries a certificate chain, leaf first. This crate
//! validates that chain against a fixed trust-anchor set: adjacent links
//! must be issuer/signature related, every certificate must be inside its
//! validity window at an explicit verification time, and the terminal
//! certificate must chain to an anchor. Revocation checking (OCSP/CRL) is
//! deliberately not performed.

mod cert_signature;
mod chain;

pub use chain::{validate_chain, AnchorParseError, ChainError, LeafPublicKey, TrustAnchors};

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Metadata token verification.
//!
//! This crate is the trust boundary of the pipeline: it pins a single JWS
//! algorithm, validates the `x5c` chain through `mdsblob-x509`, verifies
//! the token signature with the chain's leaf key, and only then releases
//! the payload bytes as a [`VerifiedPayload`]. Nothing else can construct
//! a `VerifiedPayload`, so downstream code cannot accidentally consume an
//! unverified feed.

mod verifier;

pub use verifier::{verify_metadata_token, verify_parsed_token, VerifiedPayload, VerifyError, PINNED_ALGORITHM};

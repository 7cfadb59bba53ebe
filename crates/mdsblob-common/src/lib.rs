// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Compact JWS parsing for the FIDO Metadata Service BLOB.
//!
//! The metadata feed is distributed as a compact serialization JWS: three
//! base64url segments joined by `.`. This crate splits and decodes that
//! envelope and models the JOSE header. Parsing establishes no trust;
//! signature and chain verification live in `mdsblob-validation`.

mod compact_jws;

pub use compact_jws::{parse_compact_jws, JoseHeader, ParsedMetadataJws, TokenParseError};

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use serde::Deserialize;

/// Errors raised while splitting and decoding a compact JWS envelope.
#[derive(Debug, thiserror::Error)]
pub enum TokenParseError {
    #[error("token must have exactly three dot-separated segments")]
    SegmentCount,

    #[error("{segment} segment is not valid base64url: {source}")]
    SegmentEncoding {
        segment: &'static str,
        source: base64::DecodeError,
    },

    #[error("protected header is not a valid JSON object: {0}")]
    HeaderJson(#[source] serde_json::Error),

    #[error("x5c[{index}] is not a valid base64 certificate: {source}")]
    CertificateEncoding {
        index: usize,
        source: base64::DecodeError,
    },
}

/// Decoded JOSE header of the metadata token.
///
/// Only the fields this pipeline consumes are modeled. Additional header
/// members (`typ`, ...) are tolerated and ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoseHeader {
    /// The `alg` header value, verbatim. The verifier pins one algorithm
    /// and refuses everything else.
    pub alg: String,
    /// The `x5c` certificate chain as DER bytes, leaf first. Empty when the
    /// header carries no chain.
    pub certificate_chain: Vec<Vec<u8>>,
}

/// A split and decoded (but unverified) metadata token.
#[derive(Debug, Clone)]
pub struct ParsedMetadataJws {
    pub header: JoseHeader,
    /// The exact ASCII bytes `base64url(header) || '.' || base64url(payload)`
    /// the signature is computed over.
    pub signing_input: Vec<u8>,
    /// Decoded payload bytes. Untrusted until the verifier has checked both
    /// the certificate chain and the signature.
    pub payload: Vec<u8>,
    /// Decoded signature bytes.
    pub signature: Vec<u8>,
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
    #[serde(default)]
    x5c: Vec<String>,
}

/// Parse a compact serialization JWS into its decoded parts.
///
/// The token must consist of exactly three base64url (unpadded) segments.
/// Certificates inside `x5c` are standard-base64 per RFC 7515 §4.1.6.
pub fn parse_compact_jws(token: &str) -> Result<ParsedMetadataJws, TokenParseError> {
    let token = token.trim();

    let mut segments = token.split('.');
    let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(TokenParseError::SegmentCount);
    };

    let header_bytes = decode_segment("header", header_b64)?;
    let payload = decode_segment("payload", payload_b64)?;
    let signature = decode_segment("signature", signature_b64)?;

    let raw: RawHeader =
        serde_json::from_slice(&header_bytes).map_err(TokenParseError::HeaderJson)?;

    let mut certificate_chain = Vec::with_capacity(raw.x5c.len());
    for (index, cert_b64) in raw.x5c.iter().enumerate() {
        let der = STANDARD
            .decode(cert_b64)
            .map_err(|source| TokenParseError::CertificateEncoding { index, source })?;
        certificate_chain.push(der);
    }

    let mut signing_input = Vec::with_capacity(header_b64.len() + 1 + payload_b64.len());
    signing_input.extend_from_slice(header_b64.as_bytes());
    signing_input.push(b'.');
    signing_input.extend_from_slice(payload_b64.as_bytes());

    Ok(ParsedMetadataJws {
        header: JoseHeader {
            alg: raw.alg,
            certificate_chain,
        },
        signing_input,
        payload,
        signature,
    })
}

fn decode_segment(segment: &'static str, b64: &str) -> Result<Vec<u8>, TokenParseError> {
    URL_SAFE_NO_PAD
        .decode(b64)
        .map_err(|source| TokenParseError::SegmentEncoding { segment, source })
}

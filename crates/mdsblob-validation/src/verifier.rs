// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use mdsblob_common::{parse_compact_jws, ParsedMetadataJws, TokenParseError};
use mdsblob_x509::{validate_chain, ChainError, TrustAnchors};
use p256::elliptic_curve::sec1::ToEncodedPoint as _;
use p256::pkcs8::DecodePublicKey as _;
use signature::Verifier as _;

/// The single JWS algorithm this feed is verified with.
///
/// Algorithm confusion is the classic attack surface for signed tokens, so
/// the value is a constant rather than an option: every other `alg`,
/// including `none`, is refused before any cryptography runs.
pub const PINNED_ALGORITHM: &str = "ES256";

/// Errors raised while establishing trust in the metadata token.
///
/// Chain failures propagate verbatim; all variants abort the run.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("malformed metadata token: {0}")]
    MalformedToken(#[from] TokenParseError),

    #[error("unsupported token algorithm {alg:?} (only {PINNED_ALGORITHM} is accepted)")]
    UnsupportedAlgorithm { alg: String },

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("token signature verification failed")]
    SignatureInvalid,
}

/// Payload bytes that have passed chain and signature verification.
///
/// Constructible only inside this crate, after both checks succeed.
#[derive(Clone, PartialEq, Eq)]
pub struct VerifiedPayload {
    bytes: Vec<u8>,
}

impl VerifiedPayload {
    fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl std::fmt::Debug for VerifiedPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifiedPayload")
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Verify a compact metadata token end to end.
///
/// `at` is the verification time (Unix timestamp) used for certificate
/// validity windows; callers fix it once per run.
pub fn verify_metadata_token(
    token: &str,
    anchors: &TrustAnchors,
    at: i64,
) -> Result<VerifiedPayload, VerifyError> {
    let parsed = parse_compact_jws(token)?;
    verify_parsed_token(&parsed, anchors, at)
}

/// Verify an already-split token.
///
/// Order matters: the algorithm pin is enforced first, then chain trust,
/// then the signature over the exact signing-input bytes. The payload is
/// released only after all three.
pub fn verify_parsed_token(
    parsed: &ParsedMetadataJws,
    anchors: &TrustAnchors,
    at: i64,
) -> Result<VerifiedPayload, VerifyError> {
    if parsed.header.alg != PINNED_ALGORITHM {
        return Err(VerifyError::UnsupportedAlgorithm {
            alg: parsed.header.alg.clone(),
        });
    }

    let leaf_key = validate_chain(&parsed.header.certificate_chain, anchors, at)?;

    verify_es256(leaf_key.spki_der(), &parsed.signing_input, &parsed.signature)
        .map_err(|_| VerifyError::SignatureInvalid)?;

    Ok(VerifiedPayload::new(parsed.payload.clone()))
}

/// Verify an ES256 (P-256 ECDSA) JWS signature.
///
/// JWS carries ECDSA signatures as the raw `r || s` concatenation.
fn verify_es256(spki_der: &[u8], signing_input: &[u8], signature: &[u8]) -> Result<(), String> {
    let pk = p256::PublicKey::from_public_key_der(spki_der)
        .map_err(|e| format!("bad P-256 public key: {e}"))?;
    let ep = pk.to_encoded_point(false);
    let vk = p256::ecdsa::VerifyingKey::from_sec1_bytes(ep.as_bytes())
        .map_err(|e| format!("bad P-256 public key: {e}"))?;
    let sig = p256::ecdsa::Signature::from_slice(signature)
        .map_err(|e| format!("bad ES256 signature: {e}"))?;
    vk.verify(signing_input, &sig)
        .map_err(|_| "signature verification failed".to_string())
}

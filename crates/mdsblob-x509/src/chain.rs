// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::cert_signature::verify_certificate_signature;

/// Errors raised while establishing chain trust.
///
/// All variants are fatal to a pipeline run: trust cannot be partially
/// established.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("certificate chain is empty")]
    EmptyChain,

    #[error("certificate chain link is broken: {0}")]
    ChainBroken(String),

    #[error("certificate for {subject} is outside its validity window")]
    ChainExpired { subject: String },

    #[error("certificate chain does not terminate at a trust anchor")]
    UntrustedRoot,
}

/// A trust anchor that could not be parsed at construction time.
#[derive(Debug, thiserror::Error)]
#[error("trust anchor {index} could not be parsed: {detail}")]
pub struct AnchorParseError {
    pub index: usize,
    pub detail: String,
}

/// The verified leaf public key returned on chain success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafPublicKey {
    spki_der: Vec<u8>,
}

impl LeafPublicKey {
    /// DER SubjectPublicKeyInfo of the chain's leaf certificate.
    pub fn spki_der(&self) -> &[u8] {
        &self.spki_der
    }
}

/// An owned, eagerly-decoded view of one certificate.
#[derive(Debug, Clone)]
struct ParsedCert {
    der: Vec<u8>,
    subject_dn: String,
    issuer_dn: String,
    spki_der: Vec<u8>,
    tbs_der: Vec<u8>,
    signature_oid: String,
    signature: Vec<u8>,
    not_before: i64,
    not_after: i64,
}

impl ParsedCert {
    fn from_der(der: &[u8]) -> Result<Self, String> {
        let (_, cert) =
            x509_parser::parse_x509_certificate(der).map_err(|e| format!("invalid cert DER: {e}"))?;

        Ok(Self {
            der: der.to_vec(),
            subject_dn: cert.tbs_certificate.subject.to_string(),
            issuer_dn: cert.tbs_certificate.issuer.to_string(),
            spki_der: cert.tbs_certificate.subject_pki.raw.to_vec(),
            // `x509-parser` keeps the raw DER for TBSCertificate; expose it via `AsRef`.
            tbs_der: cert.tbs_certificate.as_ref().to_vec(),
            signature_oid: cert.signature_algorithm.algorithm.to_string(),
            signature: cert.signature_value.data.to_vec(),
            not_before: cert.validity().not_before.timestamp(),
            not_after: cert.validity().not_after.timestamp(),
        })
    }

    fn in_validity_window(&self, at: i64) -> bool {
        self.not_before <= at && at <= self.not_after
    }

    /// Whether `child`'s signature verifies under this certificate's key.
    fn issued(&self, child: &ParsedCert) -> bool {
        self.subject_dn == child.issuer_dn
            && verify_certificate_signature(
                &self.spki_der,
                &child.tbs_der,
                &child.signature_oid,
                &child.signature,
            )
            .is_ok()
    }
}

/// The fixed set of root certificates a chain must terminate at.
///
/// The production anchor set is embedded in the `mdsblob` crate and never
/// changes at runtime; this type exists so validation code (and tests) can
/// receive the set as a value.
#[derive(Debug, Clone)]
pub struct TrustAnchors {
    roots: Vec<ParsedCert>,
}

impl TrustAnchors {
    /// Build an anchor set from DER certificates.
    pub fn from_der<I, B>(roots_der: I) -> Result<Self, AnchorParseError>
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let mut roots = Vec::new();
        for (index, der) in roots_der.into_iter().enumerate() {
            let parsed = ParsedCert::from_der(der.as_ref())
                .map_err(|detail| AnchorParseError { index, detail })?;
            roots.push(parsed);
        }
        Ok(Self { roots })
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    fn contains_der(&self, der: &[u8]) -> bool {
        self.roots.iter().any(|r| r.der == der)
    }
}

// Anchor-to-anchor walks are short in practice; the cap only guards against
// pathological cross-signature cycles inside the anchor set.
const MAX_ANCHOR_WALK: usize = 16;

/// Validate a certificate chain (leaf first) against the trust anchors.
///
/// `at` is the verification time as a Unix timestamp; callers fix it once
/// per run so results are reproducible.
///
/// Checks, in order:
/// 1. the chain is non-empty and every certificate parses,
/// 2. every presented certificate is inside its validity window at `at`,
/// 3. each adjacent pair is a valid issuer/signature link,
/// 4. the terminal certificate is an anchor or chains to one.
///
/// On success, returns the leaf's public key for token signature
/// verification.
pub fn validate_chain(
    chain_der: &[Vec<u8>],
    anchors: &TrustAnchors,
    at: i64,
) -> Result<LeafPublicKey, ChainError> {
    if chain_der.is_empty() {
        return Err(ChainError::EmptyChain);
    }

    let mut certs = Vec::with_capacity(chain_der.len());
    for (index, der) in chain_der.iter().enumerate() {
        let parsed = ParsedCert::from_der(der)
            .map_err(|e| ChainError::ChainBroken(format!("certificate {index}: {e}")))?;
        certs.push(parsed);
    }

    // Expiry is diagnosed before link evaluation so an expired intermediate
    // reports `ChainExpired` even when the chain is also untrusted.
    for cert in &certs {
        if !cert.in_validity_window(at) {
            return Err(ChainError::ChainExpired {
                subject: cert.subject_dn.clone(),
            });
        }
    }

    for pair in certs.windows(2) {
        let (child, issuer) = (&pair[0], &pair[1]);
        if child.issuer_dn != issuer.subject_dn {
            return Err(ChainError::ChainBroken(format!(
                "{} was not issued by {}",
                child.subject_dn, issuer.subject_dn
            )));
        }
        if !issuer.issued(child) {
            return Err(ChainError::ChainBroken(format!(
                "signature of {} does not verify under {}",
                child.subject_dn, issuer.subject_dn
            )));
        }
    }

    // Terminal trust: the last presented certificate must be an anchor, or
    // reach one transitively through anchor-issued links.
    let mut current = certs.last().cloned().ok_or(ChainError::EmptyChain)?;
    for _ in 0..MAX_ANCHOR_WALK {
        if anchors.contains_der(&current.der) {
            return Ok(LeafPublicKey {
                spki_der: certs[0].spki_der.clone(),
            });
        }

        let Some(issuer) = anchors.roots.iter().find(|a| a.issued(&current)) else {
            return Err(ChainError::UntrustedRoot);
        };

        if !issuer.in_validity_window(at) {
            return Err(ChainError::ChainExpired {
                subject: issuer.subject_dn.clone(),
            });
        }

        current = issuer.clone();
    }

    Err(ChainError::UntrustedRoot)
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Per-certificate signature verification.
//!
//! Verifies a TBSCertificate's signature under the issuer's
//! SubjectPublicKeyInfo, dispatching on the certificate signature
//! algorithm OID.

use p256::elliptic_curve::sec1::ToEncodedPoint as _;
use rsa::pkcs1v15;
use rsa::pkcs8::DecodePublicKey as _;
use rsa::RsaPublicKey;
use sha2::digest::const_oid::AssociatedOid;
use sha2::{Digest, Sha256, Sha384, Sha512};
use signature::Verifier as _;

const OID_SHA256_WITH_RSA: &str = "1.2.840.113549.1.1.11";
const OID_SHA384_WITH_RSA: &str = "1.2.840.113549.1.1.12";
const OID_SHA512_WITH_RSA: &str = "1.2.840.113549.1.1.13";
const OID_ECDSA_WITH_SHA256: &str = "1.2.840.10045.4.3.2";
const OID_ECDSA_WITH_SHA384: &str = "1.2.840.10045.4.3.3";
const OID_ECDSA_WITH_SHA512: &str = "1.2.840.10045.4.3.4";

/// Verify `signature` over `tbs_der` using the issuer public key.
pub(crate) fn verify_certificate_signature(
    issuer_spki_der: &[u8],
    tbs_der: &[u8],
    signature_oid: &str,
    signature: &[u8],
) -> Result<(), String> {
    match signature_oid {
        OID_SHA256_WITH_RSA => verify_rsa::<Sha256>(issuer_spki_der, tbs_der, signature),
        OID_SHA384_WITH_RSA => verify_rsa::<Sha384>(issuer_spki_der, tbs_der, signature),
        OID_SHA512_WITH_RSA => verify_rsa::<Sha512>(issuer_spki_der, tbs_der, signature),
        OID_ECDSA_WITH_SHA256 => verify_ecdsa_p256(issuer_spki_der, tbs_der, signature),
        OID_ECDSA_WITH_SHA384 => verify_ecdsa_p384(issuer_spki_der, tbs_der, signature),
        OID_ECDSA_WITH_SHA512 => verify_ecdsa_p521(issuer_spki_der, tbs_der, signature),
        other => Err(format!(
            "unsupported certificate signature algorithm OID: {other}"
        )),
    }
}

fn verify_rsa<D>(issuer_spki_der: &[u8], tbs_der: &[u8], signature: &[u8]) -> Result<(), String>
where
    D: Digest + AssociatedOid,
{
    let key = RsaPublicKey::from_public_key_der(issuer_spki_der)
        .map_err(|e| format!("bad RSA issuer public key: {e}"))?;
    let vk = pkcs1v15::VerifyingKey::<D>::new(key);
    let sig = pkcs1v15::Signature::try_from(signature)
        .map_err(|e| format!("bad RSA signature bytes: {e}"))?;
    vk.verify(tbs_der, &sig)
        .map_err(|_| "certificate signature verification failed".to_string())
}

fn verify_ecdsa_p256(issuer_spki_der: &[u8], tbs_der: &[u8], signature: &[u8]) -> Result<(), String> {
    let pk = p256::PublicKey::from_public_key_der(issuer_spki_der)
        .map_err(|e| format!("bad P-256 issuer public key: {e}"))?;
    let ep = pk.to_encoded_point(false);
    let vk = p256::ecdsa::VerifyingKey::from_sec1_bytes(ep.as_bytes())
        .map_err(|e| format!("bad P-256 issuer public key: {e}"))?;
    let sig = p256::ecdsa::Signature::from_der(signature)
        .map_err(|e| format!("bad ECDSA signature bytes: {e}"))?;
    vk.verify(tbs_der, &sig)
        .map_err(|_| "certificate signature verification failed".to_string())
}

fn verify_ecdsa_p384(issuer_spki_der: &[u8], tbs_der: &[u8], signature: &[u8]) -> Result<(), String> {
    let pk = p384::PublicKey::from_public_key_der(issuer_spki_der)
        .map_err(|e| format!("bad P-384 issuer public key: {e}"))?;
    let ep = pk.to_encoded_point(false);
    let vk = p384::ecdsa::VerifyingKey::from_sec1_bytes(ep.as_bytes())
        .map_err(|e| format!("bad P-384 issuer public key: {e}"))?;
    let sig = p384::ecdsa::Signature::from_der(signature)
        .map_err(|e| format!("bad ECDSA signature bytes: {e}"))?;
    vk.verify(tbs_der, &sig)
        .map_err(|_| "certificate signature verification failed".to_string())
}

fn verify_ecdsa_p521(issuer_spki_der: &[u8], tbs_der: &[u8], signature: &[u8]) -> Result<(), String> {
    let pk = p521::PublicKey::from_public_key_der(issuer_spki_der)
        .map_err(|e| format!("bad P-521 issuer public key: {e}"))?;
    let ep = pk.to_encoded_point(false);
    let vk = p521::ecdsa::VerifyingKey::from_sec1_bytes(ep.as_bytes())
        .map_err(|e| format!("bad P-521 issuer public key: {e}"))?;
    let sig = p521::ecdsa::Signature::from_der(signature)
        .map_err(|e| format!("bad ECDSA signature bytes: {e}"))?;
    vk.verify(tbs_der, &sig)
        .map_err(|_| "certificate signature verification failed".to_string())
}

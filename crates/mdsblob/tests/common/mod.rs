// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(dead_code)]

//! Shared helpers for the `mdsblob` integration tests.
//!
//! Builds a small PKI with `rcgen` and signs BLOB tokens the way the feed
//! publisher would: ES256 over `base64url(header).base64url(payload)` with
//! the chain in `x5c`.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use mdsblob::TrustAnchors;
use rcgen::{BasicConstraints, CertificateParams, DnType, IsCa, KeyPair};
use signature::Signer as _;

/// Fixed verification time for every test: 2023-11-14.
pub const AT: i64 = 1_700_000_000;

pub struct FeedSigner {
    pub anchors: TrustAnchors,
    pub chain_der: Vec<Vec<u8>>,
    pub leaf_key: p256::ecdsa::SigningKey,
}

impl FeedSigner {
    pub fn new() -> Self {
        use p256::pkcs8::DecodePrivateKey as _;

        let root_key = KeyPair::generate().unwrap();
        let mut root_params = CertificateParams::default();
        root_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        root_params
            .distinguished_name
            .push(DnType::CommonName, "Test Metadata Root");
        let root = root_params.self_signed(&root_key).unwrap();

        let leaf_key_pair = KeyPair::generate().unwrap();
        let mut leaf_params = CertificateParams::default();
        leaf_params
            .distinguished_name
            .push(DnType::CommonName, "Test Metadata Signer");
        let leaf = leaf_params
            .signed_by(&leaf_key_pair, &root, &root_key)
            .unwrap();

        Self {
            anchors: TrustAnchors::from_der([root.der().to_vec()]).unwrap(),
            chain_der: vec![leaf.der().to_vec()],
            leaf_key: p256::ecdsa::SigningKey::from_pkcs8_der(&leaf_key_pair.serialize_der())
                .unwrap(),
        }
    }

    /// Sign arbitrary payload bytes into a complete token.
    pub fn token_for(&self, payload: &[u8]) -> String {
        let x5c: Vec<String> = self.chain_der.iter().map(|d| STANDARD.encode(d)).collect();
        let header = serde_json::json!({ "typ": "JWT", "alg": "ES256", "x5c": x5c }).to_string();
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(payload),
        );
        let sig: p256::ecdsa::Signature = self.leaf_key.sign(signing_input.as_bytes());
        format!(
            "{signing_input}.{}",
            URL_SAFE_NO_PAD.encode(sig.to_bytes())
        )
    }

    /// Sign a JSON payload value.
    pub fn token(&self, payload: &serde_json::Value) -> String {
        self.token_for(payload.to_string().as_bytes())
    }
}

/// A minimal well-formed BLOB payload with the given entries.
pub fn blob_payload(entries: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "legalHeader": "Retrieval and use of this BLOB indicates acceptance of the agreement.",
        "no": 42,
        "nextUpdate": "2026-09-01",
        "entries": entries,
    })
}

/// A fully-populated FIDO2 entry for the given aaguid.
pub fn fido2_entry(aaguid: &str, description: &str) -> serde_json::Value {
    serde_json::json!({
        "aaguid": aaguid,
        "metadataStatement": {
            "legalHeader": "https://fidoalliance.org/metadata/metadata-statement-legal-header/",
            "aaguid": aaguid,
            "description": description,
            "alternativeDescriptions": { "fr-FR": format!("{description} (FR)") },
            "authenticatorVersion": 2,
            "protocolFamily": "fido2",
            "schema": 3,
            "icon": "data:image/png;base64,iVBORw0KGgo="
        },
        "statusReports": [
            { "status": "FIDO_CERTIFIED", "effectiveDate": "2021-05-18" }
        ],
        "timeOfLastStatusChange": "2021-05-18"
    })
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Chain validation tests.
//!
//! Chains are minted with `rcgen`; validity windows are pinned so every
//! assertion is reproducible at the fixed verification time below.

use mdsblob_x509::{validate_chain, ChainError, TrustAnchors};
use rcgen::{date_time_ymd, BasicConstraints, CertificateParams, DnType, IsCa, KeyPair};
use signature::{Signer, Verifier};

// 2023-11-14, inside the default rcgen validity window.
const AT: i64 = 1_700_000_000;

fn ca_params(cn: &str) -> CertificateParams {
    let mut params = CertificateParams::default();
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.distinguished_name.push(DnType::CommonName, cn);
    params
}

fn leaf_params(cn: &str) -> CertificateParams {
    let mut params = CertificateParams::default();
    params.distinguished_name.push(DnType::CommonName, cn);
    params
}

struct TestCa {
    cert: rcgen::Certificate,
    key: KeyPair,
}

fn make_root(cn: &str) -> TestCa {
    let key = KeyPair::generate().unwrap();
    let cert = ca_params(cn).self_signed(&key).unwrap();
    TestCa { cert, key }
}

fn make_intermediate(cn: &str, issuer: &TestCa) -> TestCa {
    let key = KeyPair::generate().unwrap();
    let cert = ca_params(cn)
        .signed_by(&key, &issuer.cert, &issuer.key)
        .unwrap();
    TestCa { cert, key }
}

fn make_leaf(cn: &str, issuer: &TestCa) -> TestCa {
    let key = KeyPair::generate().unwrap();
    let cert = leaf_params(cn)
        .signed_by(&key, &issuer.cert, &issuer.key)
        .unwrap();
    TestCa { cert, key }
}

fn der(ca: &TestCa) -> Vec<u8> {
    ca.cert.der().to_vec()
}

fn anchors_of(cas: &[&TestCa]) -> TrustAnchors {
    TrustAnchors::from_der(cas.iter().map(|c| der(c))).unwrap()
}

#[test]
fn empty_chain_is_rejected() {
    let root = make_root("Root");
    let err = validate_chain(&[], &anchors_of(&[&root]), AT).unwrap_err();
    assert!(matches!(err, ChainError::EmptyChain));
}

#[test]
fn garbage_der_is_a_broken_chain() {
    let root = make_root("Root");
    let err = validate_chain(&[vec![0xde, 0xad]], &anchors_of(&[&root]), AT).unwrap_err();
    assert!(matches!(err, ChainError::ChainBroken(_)));
}

#[test]
fn leaf_and_intermediate_chain_to_anchor() {
    let root = make_root("Root");
    let intermediate = make_intermediate("Intermediate", &root);
    let leaf = make_leaf("Leaf", &intermediate);

    let chain = vec![der(&leaf), der(&intermediate)];
    let key = validate_chain(&chain, &anchors_of(&[&root]), AT).unwrap();

    // The returned SPKI must actually be the leaf's key: a signature made
    // with the leaf private key must verify under it.
    use p256::pkcs8::DecodePrivateKey as _;
    use p256::pkcs8::DecodePublicKey as _;
    let sk = p256::ecdsa::SigningKey::from_pkcs8_der(&leaf.key.serialize_der()).unwrap();
    let sig: p256::ecdsa::Signature = sk.sign(b"probe");
    let vk = p256::ecdsa::VerifyingKey::from_public_key_der(key.spki_der()).unwrap();
    vk.verify(b"probe", &sig).unwrap();
}

#[test]
fn leaf_issued_directly_by_anchor_is_trusted() {
    let root = make_root("Root");
    let leaf = make_leaf("Leaf", &root);

    validate_chain(&[der(&leaf)], &anchors_of(&[&root]), AT).unwrap();
}

#[test]
fn chain_including_the_anchor_itself_is_trusted() {
    let root = make_root("Root");
    let intermediate = make_intermediate("Intermediate", &root);
    let leaf = make_leaf("Leaf", &intermediate);

    let chain = vec![der(&leaf), der(&intermediate), der(&root)];
    validate_chain(&chain, &anchors_of(&[&root]), AT).unwrap();
}

#[test]
fn p384_chain_is_supported() {
    let key = KeyPair::generate_for(&rcgen::PKCS_ECDSA_P384_SHA384).unwrap();
    let cert = ca_params("P384 Root").self_signed(&key).unwrap();
    let root = TestCa { cert, key };

    let leaf_key = KeyPair::generate_for(&rcgen::PKCS_ECDSA_P384_SHA384).unwrap();
    let leaf_cert = leaf_params("P384 Leaf")
        .signed_by(&leaf_key, &root.cert, &root.key)
        .unwrap();

    validate_chain(&[leaf_cert.der().to_vec()], &anchors_of(&[&root]), AT).unwrap();
}

#[test]
fn issuer_name_mismatch_is_a_broken_chain() {
    let root = make_root("Root");
    let issuing = make_intermediate("Issuing CA", &root);
    let unrelated = make_intermediate("Unrelated CA", &root);
    let leaf = make_leaf("Leaf", &issuing);

    let chain = vec![der(&leaf), der(&unrelated)];
    let err = validate_chain(&chain, &anchors_of(&[&root]), AT).unwrap_err();
    assert!(matches!(err, ChainError::ChainBroken(_)));
}

#[test]
fn same_name_different_key_is_a_broken_chain() {
    // Two intermediates share a subject DN; only one signed the leaf.
    let root = make_root("Root");
    let signer = make_intermediate("Intermediate", &root);
    let impostor = make_intermediate("Intermediate", &root);
    let leaf = make_leaf("Leaf", &signer);

    let chain = vec![der(&leaf), der(&impostor)];
    let err = validate_chain(&chain, &anchors_of(&[&root]), AT).unwrap_err();
    assert!(matches!(err, ChainError::ChainBroken(_)));
}

#[test]
fn untrusted_root_is_reported_even_when_links_verify() {
    let feed_root = make_root("Feed Root");
    let intermediate = make_intermediate("Intermediate", &feed_root);
    let leaf = make_leaf("Leaf", &intermediate);
    let other_root = make_root("Other Root");

    let chain = vec![der(&leaf), der(&intermediate)];
    let err = validate_chain(&chain, &anchors_of(&[&other_root]), AT).unwrap_err();
    assert!(matches!(err, ChainError::UntrustedRoot));
}

#[test]
fn expired_intermediate_is_reported_before_trust() {
    let root = make_root("Root");

    let key = KeyPair::generate().unwrap();
    let mut params = ca_params("Expired Intermediate");
    params.not_before = date_time_ymd(2019, 1, 1);
    params.not_after = date_time_ymd(2020, 1, 1);
    let cert = params.signed_by(&key, &root.cert, &root.key).unwrap();
    let intermediate = TestCa { cert, key };

    let leaf = make_leaf("Leaf", &intermediate);

    // Anchor set deliberately does not contain the root either; the expiry
    // diagnosis must win.
    let other_root = make_root("Other Root");
    let chain = vec![der(&leaf), der(&intermediate)];
    let err = validate_chain(&chain, &anchors_of(&[&other_root]), AT).unwrap_err();
    assert!(matches!(
        err,
        ChainError::ChainExpired { ref subject } if subject.contains("Expired Intermediate")
    ));
}

#[test]
fn not_yet_valid_leaf_is_expired_for_this_run() {
    let root = make_root("Root");

    let key = KeyPair::generate().unwrap();
    let mut params = leaf_params("Future Leaf");
    params.not_before = date_time_ymd(2031, 1, 1);
    params.not_after = date_time_ymd(2033, 1, 1);
    let cert = params.signed_by(&key, &root.cert, &root.key).unwrap();

    let err = validate_chain(&[cert.der().to_vec()], &anchors_of(&[&root]), AT).unwrap_err();
    assert!(matches!(err, ChainError::ChainExpired { .. }));
}

#[test]
fn expired_anchor_cannot_vouch_for_a_chain() {
    let key = KeyPair::generate().unwrap();
    let mut params = ca_params("Expired Root");
    params.not_before = date_time_ymd(2015, 1, 1);
    params.not_after = date_time_ymd(2016, 1, 1);
    let cert = params.self_signed(&key).unwrap();
    let root = TestCa { cert, key };

    let leaf = make_leaf("Leaf", &root);
    let err = validate_chain(&[der(&leaf)], &anchors_of(&[&root]), AT).unwrap_err();
    assert!(matches!(err, ChainError::ChainExpired { .. }));
}

#[test]
fn unparseable_anchor_is_rejected_at_construction() {
    let err = TrustAnchors::from_der([b"junk".to_vec()]).unwrap_err();
    assert_eq!(err.index, 0);
}

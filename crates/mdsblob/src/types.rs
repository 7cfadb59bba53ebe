// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Domain entities of the FIDO Metadata Service v3 BLOB payload.
//!
//! Field names and shapes follow the Metadata Service / Metadata Statement
//! v3.0 specifications. Status kinds and protocol families are closed
//! enums: an unrecognized value fails that entry's decode instead of
//! passing through as opaque text. Optional JSON members stay `None` when
//! absent; "not provided" and "explicitly empty" are distinct.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Status values an authenticator model can carry (MDS v3 §3.1.4).
///
/// Certification-related, security-notification, and info statuses share
/// one enumeration in the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthenticatorStatus {
    #[serde(rename = "NOT_FIDO_CERTIFIED")]
    NotFidoCertified,
    #[serde(rename = "FIDO_CERTIFIED")]
    FidoCertified,
    #[serde(rename = "USER_VERIFICATION_BYPASS")]
    UserVerificationBypass,
    #[serde(rename = "ATTESTATION_KEY_COMPROMISE")]
    AttestationKeyCompromise,
    #[serde(rename = "USER_KEY_REMOTE_COMPROMISE")]
    UserKeyRemoteCompromise,
    #[serde(rename = "USER_KEY_PHYSICAL_COMPROMISE")]
    UserKeyPhysicalCompromise,
    #[serde(rename = "UPDATE_AVAILABLE")]
    UpdateAvailable,
    #[serde(rename = "REVOKED")]
    Revoked,
    #[serde(rename = "SELF_ASSERTION_SUBMITTED")]
    SelfAssertionSubmitted,
    #[serde(rename = "FIDO_CERTIFIED_L1")]
    FidoCertifiedL1,
    #[serde(rename = "FIDO_CERTIFIED_L1plus")]
    FidoCertifiedL1Plus,
    #[serde(rename = "FIDO_CERTIFIED_L2")]
    FidoCertifiedL2,
    #[serde(rename = "FIDO_CERTIFIED_L2plus")]
    FidoCertifiedL2Plus,
    #[serde(rename = "FIDO_CERTIFIED_L3")]
    FidoCertifiedL3,
    #[serde(rename = "FIDO_CERTIFIED_L3plus")]
    FidoCertifiedL3Plus,
}

/// The protocol family a metadata statement describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolFamily {
    Uaf,
    U2f,
    Fido2,
}

/// One status assertion in an authenticator's history (MDS v3 §3.1.3).
///
/// A model owns a chronologically ordered sequence of these; the last
/// element is authoritative for the current status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub status: AuthenticatorStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator_version: Option<u64>,
    /// Base64 DER PKIX certificate identifying a compromised batch, when
    /// the status calls for one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certification_descriptor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certification_policy_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certification_requirements_version: Option<String>,
}

/// Biometric certification status for one verification modality
/// (MDS v3 §3.1.2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiometricStatusReport {
    pub cert_level: u8,
    pub modality: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certification_descriptor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certification_policy_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certification_requirements_version: Option<String>,
}

/// An authenticator's detailed description (Metadata Statement v3 §5).
///
/// `aaid` identifies UAF models and `aaguid` FIDO2 models; U2F models
/// carry neither and are identified by their attestation certificate key
/// identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataStatement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aaid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aaguid: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attestation_certificate_key_identifiers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Translated descriptions keyed by IETF language tag.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub alternative_descriptions: BTreeMap<String, String>,
    #[serde(default)]
    pub authenticator_version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_family: Option<ProtocolFamily>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<u16>,
    #[serde(default)]
    pub is_key_restricted: bool,
    #[serde(default)]
    pub is_fresh_user_verification_required: bool,
    /// data: URL (PNG) representing the authenticator visually.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "icon_dark")]
    pub icon_dark: Option<String>,
}

/// One Metadata BLOB payload entry (MDS v3 §3.1.1).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aaguid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aaid: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attestation_certificate_key_identifiers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_statement: Option<MetadataStatement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub biometric_status_reports: Vec<BiometricStatusReport>,
    /// Status transitions from earliest to latest.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub status_reports: Vec<StatusReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_last_status_change: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "rogueListURL")]
    pub rogue_list_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rogue_list_hash: Option<String>,
}

impl Entry {
    /// The AAGUID this entry would be keyed by, from the entry itself or
    /// its metadata statement.
    pub fn aaguid(&self) -> Option<&str> {
        self.aaguid
            .as_deref()
            .or_else(|| self.metadata_statement.as_ref()?.aaguid.as_deref())
    }

    /// The authoritative status assertion: the latest report, if any.
    pub fn current_status(&self) -> Option<&StatusReport> {
        self.status_reports.last()
    }

    /// Whether the entry carries any identifier at all.
    pub fn has_identifier(&self) -> bool {
        if self.aaguid.is_some()
            || self.aaid.is_some()
            || !self.attestation_certificate_key_identifiers.is_empty()
        {
            return true;
        }
        self.metadata_statement.as_ref().is_some_and(|s| {
            s.aaguid.is_some()
                || s.aaid.is_some()
                || !s.attestation_certificate_key_identifiers.is_empty()
        })
    }

    /// Best-effort identifier for diagnostics when the entry is skipped.
    pub(crate) fn any_identifier(&self) -> Option<String> {
        self.aaguid()
            .map(str::to_owned)
            .or_else(|| self.aaid.clone())
            .or_else(|| self.attestation_certificate_key_identifiers.first().cloned())
    }
}

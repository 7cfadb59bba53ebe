// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Payload normalization.
//!
//! Decodes the verified BLOB payload and the unsigned supplementary feed
//! into domain values. The BLOB's top-level structure is required; each
//! entry is then decoded individually so one malformed entry degrades to a
//! diagnostic instead of blocking ingestion of the rest.

use std::collections::BTreeMap;

use mdsblob_validation::VerifiedPayload;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::types::Entry;

/// The metadata-statement schema generation this implementation decodes.
pub const SUPPORTED_SCHEMA: u16 = 3;

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("metadata payload is malformed: {0}")]
    MalformedPayload(#[source] serde_json::Error),

    #[error("supplementary feed is malformed: {0}")]
    MalformedSupplement(#[source] serde_json::Error),
}

/// The decoded primary feed: header fields plus per-entry results.
#[derive(Debug, Clone)]
pub struct NormalizedPayload {
    pub legal_header: Option<String>,
    /// The BLOB serial number, when present.
    pub no: Option<i64>,
    pub next_update: String,
    pub entries: Vec<Entry>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPayload {
    #[serde(default)]
    legal_header: Option<String>,
    #[serde(default)]
    no: Option<i64>,
    next_update: String,
    entries: Vec<Value>,
}

/// Decode the verified BLOB payload.
///
/// Fails only on top-level structural errors; per-entry problems become
/// diagnostics.
pub fn decode_metadata_payload(
    payload: &VerifiedPayload,
) -> Result<NormalizedPayload, NormalizeError> {
    let raw: RawPayload =
        serde_json::from_slice(payload.as_bytes()).map_err(NormalizeError::MalformedPayload)?;

    let mut entries = Vec::with_capacity(raw.entries.len());
    let mut diagnostics = Vec::new();

    for (index, value) in raw.entries.into_iter().enumerate() {
        // Pull the identifier out of the raw JSON first so decode failures
        // can still name the entry they concern.
        let raw_identifier = value
            .get("aaguid")
            .or_else(|| value.get("aaid"))
            .and_then(Value::as_str)
            .map(str::to_owned);

        let entry: Entry = match serde_json::from_value(value) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(index, identifier = ?raw_identifier, error = %e, "skipping undecodable entry");
                diagnostics.push(Diagnostic::new(
                    raw_identifier,
                    DiagnosticKind::SchemaMismatch,
                    format!("entry {index} did not decode: {e}"),
                ));
                continue;
            }
        };

        if !entry.has_identifier() {
            warn!(index, "skipping entry without any identifier");
            diagnostics.push(Diagnostic::new(
                None,
                DiagnosticKind::NoIdentifier,
                format!("entry {index} carries no aaguid, aaid, or attestation key identifier"),
            ));
            continue;
        }

        // A newer statement schema is a soft failure: skip the entry, keep
        // the run.
        if let Some(schema) = entry.metadata_statement.as_ref().and_then(|s| s.schema) {
            if schema != SUPPORTED_SCHEMA {
                warn!(index, schema, "skipping entry with unrecognized schema");
                diagnostics.push(Diagnostic::new(
                    entry.any_identifier(),
                    DiagnosticKind::SchemaMismatch,
                    format!("entry {index} declares schema {schema}, expected {SUPPORTED_SCHEMA}"),
                ));
                continue;
            }
        }

        entries.push(entry);
    }

    Ok(NormalizedPayload {
        legal_header: raw.legal_header,
        no: raw.no,
        next_update: raw.next_update,
        entries,
        diagnostics,
    })
}

/// One record of the supplementary feed's array form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SupplementaryRecord {
    #[serde(alias = "id", alias = "identifier")]
    pub aaguid: String,
    pub name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSupplement {
    Table(BTreeMap<String, RawSupplementName>),
    List(Vec<SupplementaryRecord>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSupplementName {
    Plain(String),
    Detailed { name: String },
}

/// Decode the unsigned supplementary feed into identifier → display name.
///
/// Both published shapes are accepted: a flat object keyed by identifier
/// (values either a name string or an object with a `name` member) and an
/// array of `{identifier, name}` records. In the array form a repeated
/// identifier resolves to the later record, matching the primary feed's
/// later-wins rule.
pub fn decode_supplement(bytes: &[u8]) -> Result<BTreeMap<String, String>, NormalizeError> {
    let raw: RawSupplement =
        serde_json::from_slice(bytes).map_err(NormalizeError::MalformedSupplement)?;

    let names = match raw {
        RawSupplement::Table(table) => table
            .into_iter()
            .map(|(aaguid, name)| {
                let name = match name {
                    RawSupplementName::Plain(name) => name,
                    RawSupplementName::Detailed { name } => name,
                };
                (aaguid, name)
            })
            .collect(),
        RawSupplement::List(records) => records
            .into_iter()
            .map(|r| (r.aaguid, r.name))
            .collect(),
    };

    Ok(names)
}

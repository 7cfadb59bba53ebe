// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Identifier reconciliation.
//!
//! Merges the normalized primary entries and the supplementary name map
//! into one table keyed by canonical AAGUID. The consuming ecosystem is
//! FIDO2/WebAuthn-only: UAF- and U2F-identified entries are skipped with a
//! diagnostic rather than silently lost.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::normalize::NormalizedPayload;
use crate::types::{Entry, MetadataStatement};

/// The reconciled output of one pipeline run.
///
/// `table` is a `BTreeMap` so iteration order, and therefore any
/// serialized rendering, is deterministic for identical inputs.
#[derive(Debug, Clone, Serialize)]
pub struct MetadataRegistry {
    pub table: BTreeMap<String, Entry>,
    pub next_update: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legal_header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no: Option<i64>,
    pub diagnostics: Vec<Diagnostic>,
}

impl MetadataRegistry {
    pub fn get(&self, aaguid: &str) -> Option<&Entry> {
        self.table.get(aaguid)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Whether `s` is the canonical textual AAGUID form: 36 bytes,
/// `8-4-4-4-12` hex groups.
///
/// Keys are compared byte-exact; no case folding is applied, so two
/// case-distinct identifiers never collapse to one key.
pub fn is_canonical_aaguid(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 36 {
        return false;
    }
    bytes.iter().enumerate().all(|(i, &c)| match i {
        8 | 13 | 18 | 23 => c == b'-',
        _ => c.is_ascii_hexdigit(),
    })
}

/// Produce the final table from the normalized primary feed and the
/// supplementary name map.
///
/// Selection policy, in order:
/// 1. only AAGUID-keyed entries are retained; UAF/U2F-identified entries
///    are skipped with a diagnostic,
/// 2. a repeated AAGUID resolves to the later feed position (the feed is
///    authored as an append/amend list); the earlier entry is reported
///    overridden,
/// 3. supplementary names fill only a description the primary left absent;
///    supplementary-only identifiers are admitted as minimal entries.
pub fn reconcile(
    payload: NormalizedPayload,
    supplement: &BTreeMap<String, String>,
) -> MetadataRegistry {
    let mut table: BTreeMap<String, Entry> = BTreeMap::new();
    let mut diagnostics = payload.diagnostics;

    for entry in payload.entries {
        let Some(aaguid) = entry.aaguid().map(str::to_owned) else {
            warn!(identifier = ?entry.any_identifier(), "skipping entry without an aaguid");
            diagnostics.push(Diagnostic::new(
                entry.any_identifier(),
                DiagnosticKind::NoIdentifier,
                "entry is not AAGUID-keyed (UAF or U2F identifiers only)",
            ));
            continue;
        };

        if !is_canonical_aaguid(&aaguid) {
            warn!(%aaguid, "skipping entry with non-canonical aaguid");
            diagnostics.push(Diagnostic::new(
                Some(aaguid),
                DiagnosticKind::SchemaMismatch,
                "aaguid is not in canonical 8-4-4-4-12 form",
            ));
            continue;
        }

        if table.insert(aaguid.clone(), entry).is_some() {
            warn!(%aaguid, "duplicate aaguid in primary feed; later entry wins");
            diagnostics.push(Diagnostic::new(
                Some(aaguid),
                DiagnosticKind::Overridden,
                "earlier entry replaced by a later feed position",
            ));
        }
    }

    for (aaguid, name) in supplement {
        if !is_canonical_aaguid(aaguid) {
            warn!(%aaguid, "skipping supplementary record with non-canonical identifier");
            diagnostics.push(Diagnostic::new(
                Some(aaguid.clone()),
                DiagnosticKind::SchemaMismatch,
                "supplementary identifier is not in canonical 8-4-4-4-12 form",
            ));
            continue;
        }

        match table.get_mut(aaguid) {
            Some(entry) => {
                // Signed data outranks the supplement: only a description
                // the primary left absent is filled in.
                let statement = entry.metadata_statement.get_or_insert_with(Default::default);
                if statement.description.is_none() {
                    debug!(%aaguid, "filling absent description from supplement");
                    statement.description = Some(name.clone());
                } else {
                    debug!(%aaguid, "ignoring supplementary name for primary entry");
                }
            }
            None => {
                debug!(%aaguid, "admitting supplement-only identifier as minimal entry");
                table.insert(aaguid.clone(), minimal_entry(aaguid, name));
            }
        }
    }

    MetadataRegistry {
        table,
        next_update: payload.next_update,
        legal_header: payload.legal_header,
        no: payload.no,
        diagnostics,
    }
}

fn minimal_entry(aaguid: &str, name: &str) -> Entry {
    Entry {
        aaguid: Some(aaguid.to_owned()),
        metadata_statement: Some(MetadataStatement {
            description: Some(name.to_owned()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use serde::Serialize;

/// Why an entry was skipped or demoted during normalization/reconciliation.
///
/// Diagnostics are recoverable by definition: they accompany a successful
/// run rather than aborting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    /// The entry cannot be keyed by an AAGUID (no identifier at all, or
    /// only UAF/U2F identifiers).
    NoIdentifier,
    /// The entry's structure or an enumerated value did not match the
    /// schema this implementation understands.
    SchemaMismatch,
    /// An earlier entry for the same AAGUID was replaced by a later feed
    /// position.
    Overridden,
}

/// One skip/override report, surfaced alongside the final table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// The identifier involved, when one could be determined.
    pub identifier: Option<String>,
    pub kind: DiagnosticKind,
    pub detail: String,
}

impl Diagnostic {
    pub(crate) fn new(
        identifier: Option<String>,
        kind: DiagnosticKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            identifier,
            kind,
            detail: detail.into(),
        }
    }
}

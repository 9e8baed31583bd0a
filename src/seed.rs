//! Seeding from the persistence collaborator.
//!
//! On startup the engine is rebuilt from previously persisted source and
//! citation records. Records may arrive in any order — sources before or
//! after the citations referencing them — and malformed records are skipped
//! rather than aborting the batch. Citation records keep the bias labels
//! stamped when they were first observed, so rebuilt analytics match the
//! original session.

use serde::{Deserialize, Serialize};

use crate::network::{Citation, CitationKind, CitationNetwork, DEFAULT_BIAS};

/// A persisted source record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRecord {
    pub name: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default = "default_bias")]
    pub bias_label: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

/// A persisted citation record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitationRecord {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub article_id: Option<String>,
    #[serde(default)]
    pub target_url: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub kind: CitationKind,
    #[serde(default)]
    pub from_bias: Option<String>,
    #[serde(default)]
    pub to_bias: Option<String>,
}

fn default_bias() -> String {
    DEFAULT_BIAS.to_string()
}

fn default_true() -> bool {
    true
}

/// What a seeding pass actually loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub sources_loaded: usize,
    pub citations_loaded: usize,
    /// Inactive or malformed records dropped from the batch.
    pub skipped: usize,
}

impl CitationNetwork {
    /// Rebuild network state from persisted records.
    ///
    /// Sources are applied before citations regardless of how the collaborator
    /// ordered them, and a source record arriving for a name that a citation
    /// already auto-registered backfills the empty default attributes instead
    /// of being dropped. Inactive sources and records with empty names are
    /// skipped and counted.
    pub fn load_seed(&mut self, sources: &[SourceRecord], citations: &[CitationRecord]) -> SeedReport {
        let mut report = SeedReport::default();

        for record in sources {
            if !record.active || record.name.is_empty() {
                report.skipped += 1;
                continue;
            }
            if self.add_source(&record.name, &record.domain, &record.bias_label).is_err() {
                report.skipped += 1;
                continue;
            }
            self.backfill_source(record);
            report.sources_loaded += 1;
        }

        for record in citations {
            let mut citation = Citation::new(record.from.clone(), record.to.clone(), record.kind);
            citation.article_id = record.article_id.clone();
            citation.target_url = record.target_url.clone();
            if let Some(context) = &record.context {
                citation = citation.with_context(context.clone());
            }
            citation.from_bias = record.from_bias.clone();
            citation.to_bias = record.to_bias.clone();

            match self.add_citation(citation) {
                Ok(()) => report.citations_loaded += 1,
                Err(_) => report.skipped += 1,
            }
        }

        tracing::debug!(
            sources = report.sources_loaded,
            citations = report.citations_loaded,
            skipped = report.skipped,
            "seeded citation network"
        );
        report
    }

    /// Fill default attributes on a source that a citation auto-registered
    /// before its own record arrived. Explicit registrations are untouched.
    fn backfill_source(&mut self, record: &SourceRecord) {
        let Some(source) = self.source_mut(&record.name) else {
            return;
        };
        if source.domain.is_empty() && !record.domain.is_empty() {
            source.domain = record.domain.clone();
        }
        if source.bias_label == DEFAULT_BIAS && record.bias_label != DEFAULT_BIAS {
            source.bias_label = record.bias_label.clone();
        }
    }
}

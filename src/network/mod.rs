//! Citation network: directed weighted graph of news sources.
//!
//! The network stores [`Source`] nodes with aggregate counters and an
//! insertion-ordered log of [`Citation`] records, folded into per-pair edge
//! weights.
//!
//! - **Store** ([`CitationNetwork`]): mutable graph state and counters
//! - **Authority** ([`authority`]): weighted power-iteration importance scores
//! - **Community** ([`community`]): echo-chamber detection with fallback
//! - **Analytics** ([`analytics`]): read-only derived views

pub mod analytics;
pub mod authority;
pub mod community;
pub mod store;

use serde::{Deserialize, Serialize};

pub use store::CitationNetwork;

/// Bias label assigned to sources nobody has classified yet.
pub const DEFAULT_BIAS: &str = "unknown";

/// Upper bound on stored citation context, in characters.
pub const MAX_CONTEXT_LEN: usize = 200;

/// How a citation was detected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CitationKind {
    /// An embedded hyperlink whose host resolved to a known outlet.
    #[default]
    DirectLink,
    /// An attribution phrase ("according to X") naming a known outlet.
    TextualMention,
    /// A bare occurrence of a known outlet's display name.
    InferredReference,
}

impl std::fmt::Display for CitationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CitationKind::DirectLink => "direct-link",
            CitationKind::TextualMention => "textual-mention",
            CitationKind::InferredReference => "inferred-reference",
        };
        f.write_str(s)
    }
}

/// A single directed citation between two sources.
///
/// Immutable once recorded. The endpoint bias labels are stamped when the
/// citation enters the network, so historical analyses stay stable even if
/// a source is relabeled later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// Citing source name.
    pub from: String,
    /// Cited source name.
    pub to: String,
    /// Identifier of the originating article, if known.
    pub article_id: Option<String>,
    /// Raw link target for direct-link citations.
    pub target_url: Option<String>,
    /// Surrounding text, truncated to [`MAX_CONTEXT_LEN`] characters.
    pub context: Option<String>,
    /// Detection method.
    pub kind: CitationKind,
    /// Citing source's bias label at citation time. Stamped on insertion.
    pub from_bias: Option<String>,
    /// Cited source's bias label at citation time. Stamped on insertion.
    pub to_bias: Option<String>,
}

impl Citation {
    /// Create a citation with no provenance attached.
    pub fn new(from: impl Into<String>, to: impl Into<String>, kind: CitationKind) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            article_id: None,
            target_url: None,
            context: None,
            kind,
            from_bias: None,
            to_bias: None,
        }
    }

    /// Attach the originating article identifier.
    pub fn with_article_id(mut self, article_id: impl Into<String>) -> Self {
        self.article_id = Some(article_id.into());
        self
    }

    /// Attach the raw link target.
    pub fn with_target_url(mut self, url: impl Into<String>) -> Self {
        self.target_url = Some(url.into());
        self
    }

    /// Attach surrounding text, truncated to [`MAX_CONTEXT_LEN`] characters.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(truncate_context(&context.into()));
        self
    }

    /// Pre-stamp endpoint bias labels (used when loading persisted records).
    pub fn with_biases(mut self, from_bias: impl Into<String>, to_bias: impl Into<String>) -> Self {
        self.from_bias = Some(from_bias.into());
        self.to_bias = Some(to_bias.into());
        self
    }
}

/// Truncate to [`MAX_CONTEXT_LEN`] characters on a char boundary.
pub(crate) fn truncate_context(text: &str) -> String {
    match text.char_indices().nth(MAX_CONTEXT_LEN) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// A news outlet node with aggregate network statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Unique display name (identity key).
    pub name: String,
    /// Origin domain; empty if unknown.
    pub domain: String,
    /// Editorial-bias label. Opaque string owned by an external classifier.
    pub bias_label: String,
    /// Outgoing citation count.
    pub citations_made: u64,
    /// Incoming citation count.
    pub citations_received: u64,
    /// Network-normalized authority score; recomputed on demand.
    pub authority_score: f64,
    /// Fraction of outgoing citations that stayed within the same bias label.
    pub echo_chamber_score: f64,
    /// Outgoing citations whose endpoints shared a bias label at citation time.
    pub same_bias_citations: u64,
    /// Outgoing citations whose endpoints differed at citation time.
    pub different_bias_citations: u64,
    /// Distinct targets this source has cited, in first-seen order.
    pub cited_sources: Vec<String>,
    /// Distinct sources that have cited this one, in first-seen order.
    pub citing_sources: Vec<String>,
}

impl Source {
    /// Create a source with zeroed counters.
    pub fn new(
        name: impl Into<String>,
        domain: impl Into<String>,
        bias_label: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            bias_label: bias_label.into(),
            citations_made: 0,
            citations_received: 0,
            authority_score: 0.0,
            echo_chamber_score: 0.0,
            same_bias_citations: 0,
            different_bias_citations: 0,
            cited_sources: Vec::new(),
            citing_sources: Vec::new(),
        }
    }
}

/// A detected echo chamber: a cluster whose citation traffic is
/// disproportionately internal. Transient; recomputed on every detection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EchoChamber {
    /// Cluster identifier, stable within one detection run.
    pub id: usize,
    /// Member source names.
    pub sources: Vec<String>,
    /// Most frequent bias label among members (first-encountered on ties).
    pub dominant_bias: String,
    /// Citations with both endpoints inside the cluster.
    pub internal_citations: u64,
    /// Citations leaving the cluster (source inside, target outside).
    pub external_citations: u64,
    /// internal / (internal + external); 0.0 when there is no traffic.
    pub insularity: f64,
    /// Mean authority score of the members.
    pub avg_authority: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_is_bounded_at_char_boundary() {
        let long: String = "é".repeat(300);
        let citation = Citation::new("A", "B", CitationKind::TextualMention).with_context(long);
        let context = citation.context.unwrap();
        assert_eq!(context.chars().count(), MAX_CONTEXT_LEN);
    }

    #[test]
    fn short_context_is_untouched() {
        let citation = Citation::new("A", "B", CitationKind::DirectLink).with_context("brief");
        assert_eq!(citation.context.as_deref(), Some("brief"));
    }

    #[test]
    fn kind_serializes_kebab_case() {
        let json = serde_json::to_string(&CitationKind::InferredReference).unwrap();
        assert_eq!(json, "\"inferred-reference\"");
    }

    #[test]
    fn builder_stamps_biases() {
        let citation = Citation::new("A", "B", CitationKind::DirectLink).with_biases("left", "right");
        assert_eq!(citation.from_bias.as_deref(), Some("left"));
        assert_eq!(citation.to_bias.as_deref(), Some("right"));
    }
}

//! Citation extraction from article content.
//!
//! The extractor is stateless over the article stream: given one article and
//! the identity of its publisher, it produces citations targeting other
//! *known* outlets. Markup goes through a link scan first; the mention scan
//! then runs over the raw content on every path, so markup articles still
//! yield textual attributions.
//!
//! Contract highlights:
//! - a citation to the publishing outlet itself is never emitted
//! - mention-derived citations are deduplicated against everything already
//!   extracted for the same article
//! - malformed markup degrades to best-effort scanning, never an error

pub mod links;
pub mod mentions;

use crate::network::{Citation, CitationKind};
use crate::registry::SourceRegistry;

pub use links::LinkScan;
use links::LinkScanner;
use mentions::MentionScanner;

/// One article as delivered by the article supplier.
#[derive(Debug, Clone)]
pub struct Article {
    /// Publisher's display name.
    pub source: String,
    /// Supplier-side article identifier.
    pub article_id: Option<String>,
    /// Raw content.
    pub content: String,
    /// Whether `content` is markup rather than plain text.
    pub is_markup: bool,
}

impl Article {
    /// Convenience constructor for plain-text articles.
    pub fn text(source: impl Into<String>, article_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            article_id: Some(article_id.into()),
            content: content.into(),
            is_markup: false,
        }
    }

    /// Convenience constructor for markup articles.
    pub fn markup(source: impl Into<String>, article_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            article_id: Some(article_id.into()),
            content: content.into(),
            is_markup: true,
        }
    }
}

/// Stateless citation extractor over a fixed known-source registry.
pub struct CitationExtractor {
    registry: SourceRegistry,
    links: LinkScanner,
    mentions: MentionScanner,
}

impl CitationExtractor {
    /// Extractor with the DOM link-scanning strategy.
    pub fn new(registry: SourceRegistry) -> Self {
        Self::with_link_scan(registry, LinkScan::default())
    }

    /// Extractor with an explicit link-scanning strategy.
    pub fn with_link_scan(registry: SourceRegistry, strategy: LinkScan) -> Self {
        Self {
            registry,
            links: LinkScanner::new(strategy),
            mentions: MentionScanner::new(),
        }
    }

    /// The registry this extractor recognizes.
    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Extract citations from one article.
    ///
    /// The returned citations are not yet part of any network; the caller
    /// feeds them to the graph store and hands them to the persistence
    /// collaborator.
    pub fn extract(&self, article: &Article) -> Vec<Citation> {
        let mut extracted: Vec<Citation> = Vec::new();

        if article.is_markup {
            for hit in self.links.scan(&article.content) {
                let Some(known) = self.registry.match_host(&hit.host) else {
                    continue;
                };
                if known.name.eq_ignore_ascii_case(&article.source) {
                    continue;
                }
                let mut citation = Citation::new(&article.source, &known.name, CitationKind::DirectLink)
                    .with_target_url(&hit.url);
                if let Some(id) = &article.article_id {
                    citation = citation.with_article_id(id.clone());
                }
                if !hit.text.is_empty() {
                    citation = citation.with_context(hit.text.clone());
                }
                extracted.push(citation);
            }
        }

        // The mention scan runs on the raw content for both kinds; markup
        // tags in the text cost nothing beyond a few dead pattern windows.
        for hit in self.mentions.scan(&article.content, &self.registry) {
            if hit.name.eq_ignore_ascii_case(&article.source) {
                continue;
            }
            if extracted.iter().any(|c| c.to == hit.name) {
                continue;
            }
            let kind = if hit.inferred {
                CitationKind::InferredReference
            } else {
                CitationKind::TextualMention
            };
            let mut citation = Citation::new(&article.source, &hit.name, kind);
            if let Some(id) = &article.article_id {
                citation = citation.with_article_id(id.clone());
            }
            if !hit.context.is_empty() {
                citation = citation.with_context(hit.context.clone());
            }
            extracted.push(citation);
        }

        tracing::debug!(
            source = %article.source,
            article_id = ?article.article_id,
            count = extracted.len(),
            "extracted citations"
        );
        extracted
    }
}

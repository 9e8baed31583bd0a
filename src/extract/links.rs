//! Link scanning strategies for markup content.
//!
//! Two concrete strategies, selected at extractor construction:
//!
//! - [`LinkScan::Dom`] parses the markup with `scraper` (html5ever) and
//!   walks the anchor elements. html5ever recovers from malformed markup,
//!   so broken documents degrade to whatever anchors survive parsing.
//! - [`LinkScan::Regex`] pulls `href` values straight out of the raw text.
//!   Anchor text is not available on this path, so those citations carry
//!   no context.

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

/// Which link-scanning strategy to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkScan {
    /// Full DOM parse via `scraper`.
    #[default]
    Dom,
    /// Regex scan over the raw markup.
    Regex,
}

/// A hyperlink found in markup.
#[derive(Debug, Clone)]
pub(crate) struct LinkHit {
    /// Raw href value.
    pub url: String,
    /// Host with any leading `www.` removed.
    pub host: String,
    /// Anchor text; empty on the regex path.
    pub text: String,
}

pub(crate) struct LinkScanner {
    strategy: LinkScan,
    href_pattern: Regex,
}

impl LinkScanner {
    pub fn new(strategy: LinkScan) -> Self {
        let href_pattern = Regex::new(r#"href=["']?(https?://[^"'\s>]+)["']?"#)
            .expect("static pattern must compile");
        Self {
            strategy,
            href_pattern,
        }
    }

    pub fn scan(&self, content: &str) -> Vec<LinkHit> {
        match self.strategy {
            LinkScan::Dom => self.scan_dom(content),
            LinkScan::Regex => self.scan_regex(content),
        }
    }

    fn scan_dom(&self, content: &str) -> Vec<LinkHit> {
        let document = Html::parse_document(content);
        let anchor = Selector::parse("a[href]").expect("static selector must parse");

        let mut hits = Vec::new();
        for element in document.select(&anchor) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let Some(host) = host_of(href) else {
                continue;
            };
            let text = element.text().collect::<String>().trim().to_string();
            hits.push(LinkHit {
                url: href.to_string(),
                host,
                text,
            });
        }
        hits
    }

    fn scan_regex(&self, content: &str) -> Vec<LinkHit> {
        self.href_pattern
            .captures_iter(content)
            .filter_map(|cap| {
                let href = cap.get(1)?.as_str();
                let host = host_of(href)?;
                Some(LinkHit {
                    url: href.to_string(),
                    host,
                    text: String::new(),
                })
            })
            .collect()
    }
}

/// Host of an absolute URL, lowercased, with a leading `www.` removed.
fn host_of(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    let host = url.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
}

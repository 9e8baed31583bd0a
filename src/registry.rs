//! Known-source registry: the set of outlets the extractor can recognize.
//!
//! The registry maps outlet domains and display names to canonical entries.
//! Lookups are case-insensitive on names and suffix-matched on hosts, so
//! `www.cnn.com` and `edition.cnn.com` both resolve to the `cnn.com` entry.
//!
//! A built-in table covers the common English-language outlets; deployments
//! can extend or replace it from a TOML file.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use url::Url;

use crate::error::RegistryError;
use crate::network::DEFAULT_BIAS;

/// One recognized outlet.
#[derive(Debug, Clone)]
pub struct KnownSource {
    /// Canonical display name, e.g. "Fox News".
    pub name: String,
    /// Primary origin domain, e.g. "foxnews.com".
    pub domain: String,
    /// Default editorial-bias label. Opaque to the engine; classifiers own it.
    pub bias_label: String,
}

/// Registry of recognized outlets with domain and name indices.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    entries: Vec<KnownSource>,
    /// Domain → entry index. Multiple domains may share one outlet (bbc.com, bbc.co.uk).
    by_domain: HashMap<String, usize>,
    /// Lowercased display name → entry index (first registration wins).
    by_name: HashMap<String, usize>,
}

impl SourceRegistry {
    /// Create an empty registry.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in outlet table.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for &(name, domain) in BUILTIN_SOURCES {
            registry.insert(KnownSource {
                name: name.to_string(),
                domain: domain.to_string(),
                bias_label: DEFAULT_BIAS.to_string(),
            });
        }
        registry
    }

    /// Load a registry from a TOML file, replacing the built-in table.
    pub fn from_toml_file(path: &Path) -> Result<Self, RegistryError> {
        let text = std::fs::read_to_string(path).map_err(|source| RegistryError::Io { source })?;
        Self::from_toml_str(&text)
    }

    /// Parse a registry from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, RegistryError> {
        let file: RegistryFile = toml::from_str(text).map_err(|e| RegistryError::Parse {
            message: e.to_string(),
        })?;
        let mut registry = Self::empty();
        for entry in file.source {
            registry.insert(KnownSource {
                name: entry.name,
                domain: entry.domain,
                bias_label: entry.bias,
            });
        }
        Ok(registry)
    }

    /// Insert an outlet. A domain already present is remapped to the new
    /// entry; a display name already present keeps its first mapping.
    pub fn insert(&mut self, source: KnownSource) {
        let idx = self.entries.len();
        self.by_domain.insert(source.domain.clone(), idx);
        self.by_name
            .entry(source.name.to_lowercase())
            .or_insert(idx);
        self.entries.push(source);
    }

    /// Resolve a host against the registry.
    ///
    /// Strips a leading `www.`, then tries an exact domain match followed by
    /// a dot-boundary suffix match (`edition.cnn.com` → `cnn.com`).
    pub fn match_host(&self, host: &str) -> Option<&KnownSource> {
        let host = host.strip_prefix("www.").unwrap_or(host).to_lowercase();
        if let Some(&idx) = self.by_domain.get(&host) {
            return Some(&self.entries[idx]);
        }
        for (domain, &idx) in &self.by_domain {
            if host.ends_with(&format!(".{domain}")) {
                return Some(&self.entries[idx]);
            }
        }
        None
    }

    /// Resolve a full URL to a known outlet via its host.
    pub fn match_url(&self, raw: &str) -> Option<&KnownSource> {
        let url = Url::parse(raw).ok()?;
        self.match_host(url.host_str()?)
    }

    /// Look up an outlet by display name (case-insensitive).
    pub fn lookup_name(&self, name: &str) -> Option<&KnownSource> {
        self.by_name
            .get(&name.to_lowercase())
            .map(|&idx| &self.entries[idx])
    }

    /// All registered outlets, in insertion order.
    pub fn entries(&self) -> &[KnownSource] {
        &self.entries
    }

    /// Number of registered outlets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    source: Vec<RegistryEntry>,
}

#[derive(Debug, Deserialize)]
struct RegistryEntry {
    name: String,
    domain: String,
    #[serde(default = "default_bias")]
    bias: String,
}

fn default_bias() -> String {
    DEFAULT_BIAS.to_string()
}

/// Built-in outlet table: (display name, primary domain).
const BUILTIN_SOURCES: &[(&str, &str)] = &[
    ("CNN", "cnn.com"),
    ("Fox News", "foxnews.com"),
    ("New York Times", "nytimes.com"),
    ("Washington Post", "washingtonpost.com"),
    ("Wall Street Journal", "wsj.com"),
    ("BBC", "bbc.com"),
    ("BBC", "bbc.co.uk"),
    ("Reuters", "reuters.com"),
    ("AP News", "apnews.com"),
    ("NPR", "npr.org"),
    ("MSNBC", "msnbc.com"),
    ("NBC News", "nbcnews.com"),
    ("CBS News", "cbsnews.com"),
    ("ABC News", "abcnews.go.com"),
    ("Politico", "politico.com"),
    ("The Hill", "thehill.com"),
    ("Breitbart", "breitbart.com"),
    ("HuffPost", "huffpost.com"),
    ("Vox", "vox.com"),
    ("Daily Wire", "dailywire.com"),
    ("The Guardian", "theguardian.com"),
    ("USA Today", "usatoday.com"),
    ("LA Times", "latimes.com"),
    ("New York Post", "nypost.com"),
    ("Newsweek", "newsweek.com"),
    ("Time", "time.com"),
    ("The Atlantic", "theatlantic.com"),
    ("Slate", "slate.com"),
    ("Salon", "salon.com"),
    ("National Review", "nationalreview.com"),
    ("The Daily Beast", "thedailybeast.com"),
    ("Axios", "axios.com"),
    ("BuzzFeed News", "buzzfeednews.com"),
    ("Vice", "vice.com"),
    ("Jacobin", "jacobin.com"),
    ("Reason", "reason.com"),
];

//! # echograph
//!
//! A citation network engine for news sources: who cites whom, who carries
//! authority, and which clusters of outlets mostly talk to themselves.
//!
//! ## Architecture
//!
//! - **Extraction** (`extract`): citations from article markup or plain text
//! - **Graph store** (`network`): weighted directed graph + per-source counters
//! - **Authority** (`network::authority`): normalized importance scores
//! - **Echo chambers** (`network::community`): modularity clustering with a
//!   deterministic bias-grouping fallback
//! - **Analytics & export** (`network::analytics`, `export`): plain-data views
//!
//! ## Library usage
//!
//! ```
//! use echograph::extract::{Article, CitationExtractor};
//! use echograph::network::CitationNetwork;
//! use echograph::registry::SourceRegistry;
//!
//! let extractor = CitationExtractor::new(SourceRegistry::builtin());
//! let mut network = CitationNetwork::new();
//!
//! let article = Article::text("NPR", "a-1", "According to Reuters, the talks continue.");
//! for citation in extractor.extract(&article) {
//!     network.add_citation(citation).unwrap();
//! }
//! assert_eq!(network.source("Reuters").unwrap().citations_received, 1);
//! ```

pub mod error;
pub mod export;
pub mod extract;
pub mod network;
pub mod registry;
pub mod seed;

pub use error::{EchoError, EchoResult};
pub use network::{Citation, CitationKind, CitationNetwork, EchoChamber, Source};

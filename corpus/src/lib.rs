//! Vocabulary indexing, tf/df/tf-idf statistics and random topic seeding over a
//! small plain-text corpus.
//!
//! Pipeline: [`source::DirectorySource`] → [`builder::NormalizedCorpusBuilder`] →
//! [`index::VocabularyIndex`] → [`stats::FrequencyStatistics`] and
//! [`topics::TopicAssigner`]. [`model::CorpusModel`] runs all of it from a
//! [`config::CorpusConfig`].

pub mod builder;
pub mod config;
pub mod error;
pub mod index;
pub mod model;
pub mod source;
pub mod stats;
pub mod stem;
pub mod tokenizer;
pub mod topics;

pub use error::{Error, Result};
pub use index::VocabularyIndex;

use serde::{Deserialize, Serialize};

pub type Token = String;
pub type TermId = u32;
pub type TopicId = u32;

/// Unprocessed document text as read from storage. `id` is the file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub id: String,
    pub text: String,
}

impl RawDocument {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into() }
    }
}

/// Ordered tokens of one document after cleaning and stemming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedDocument {
    pub id: String,
    pub tokens: Vec<Token>,
}

/// One vocabulary id per token occurrence, same order and length as the cleaned document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedDocument {
    pub id: String,
    pub terms: Vec<TermId>,
}

impl EncodedDocument {
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn count(&self, term: TermId) -> usize {
        self.terms.iter().filter(|&&t| t == term).count()
    }

    pub fn contains(&self, term: TermId) -> bool {
        self.terms.contains(&term)
    }
}

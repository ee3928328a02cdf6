use crate::builder::{EncodedCorpus, NormalizedCorpusBuilder};
use crate::config::CorpusConfig;
use crate::error::Result;
use crate::index::VocabularyIndex;
use crate::source::DirectorySource;
use crate::stats::{FrequencyStatistics, Term};
use crate::tokenizer::Normalizer;
use crate::topics::{SeededSource, TopicAssigner, TopicSeed};
use crate::{EncodedDocument, RawDocument, TermId, Token, TopicId};
use serde::Serialize;
use std::collections::BTreeMap;

/// Statistics for one term across the corpus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermReport {
    pub term: String,
    pub term_id: Option<TermId>,
    pub documents: u32,
    pub tf: Vec<f64>,
    pub df: f64,
    pub tfidf: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredTerm {
    pub term: Token,
    pub score: f64,
}

/// A built corpus with its statistics and topic seed, ready to be queried.
#[derive(Debug)]
pub struct CorpusModel {
    normalizer: Normalizer,
    stats: FrequencyStatistics,
    topics: TopicSeed,
    skipped: usize,
}

impl CorpusModel {
    /// Read `config.docs_dir` and build everything.
    pub fn build(config: &CorpusConfig) -> Result<Self> {
        config.validate()?;
        let normalizer = config.normalizer()?;
        let source = DirectorySource::open(&config.docs_dir)?;
        let mut builder = NormalizedCorpusBuilder::new(normalizer.clone());
        if config.parallel {
            builder.ingest_parallel(&source.into_paths())?;
        } else {
            builder.ingest(source)?;
        }
        let skipped = builder.skipped();
        Self::assemble(config, normalizer, builder.finish()?, skipped)
    }

    /// Build from documents already in memory; `config.docs_dir` is ignored.
    pub fn from_documents<I>(config: &CorpusConfig, docs: I) -> Result<Self>
    where
        I: IntoIterator<Item = RawDocument>,
    {
        config.validate()?;
        let normalizer = config.normalizer()?;
        let mut builder = NormalizedCorpusBuilder::new(normalizer.clone());
        builder.ingest(docs.into_iter().map(Ok))?;
        Self::assemble(config, normalizer, builder.finish()?, 0)
    }

    fn assemble(config: &CorpusConfig, normalizer: Normalizer, corpus: EncodedCorpus, skipped: usize) -> Result<Self> {
        let source = match config.seed {
            Some(seed) => SeededSource::seeded(seed),
            None => SeededSource::from_entropy(),
        };
        let topics = TopicAssigner::new(config.topics, source)?.assign_corpus(corpus.documents());
        let stats = FrequencyStatistics::with_smoothing(corpus, config.idf_smoothing);
        Ok(Self { normalizer, stats, topics, skipped })
    }

    pub fn stats(&self) -> &FrequencyStatistics {
        &self.stats
    }

    pub fn index(&self) -> &VocabularyIndex {
        self.stats.index()
    }

    pub fn vocabulary(&self) -> &[Token] {
        self.index().tokens()
    }

    pub fn documents(&self) -> &[EncodedDocument] {
        self.stats.corpus().documents()
    }

    pub fn topics(&self) -> &TopicSeed {
        &self.topics
    }

    /// Documents that could not be read during the build.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Run a query word through the same cleaning and stemming as the corpus.
    pub fn normalize_term(&self, word: &str) -> Option<Token> {
        self.normalizer.normalize_word(word)
    }

    pub fn term_frequency_vector<'t>(&self, term: impl Into<Term<'t>>) -> Vec<f64> {
        self.stats.term_frequency_vector(term)
    }

    pub fn document_frequency<'t>(&self, term: impl Into<Term<'t>>) -> f64 {
        self.stats.document_frequency(term)
    }

    pub fn tfidf<'t>(&self, term: impl Into<Term<'t>>) -> Vec<f64> {
        self.stats.tfidf(term)
    }

    pub fn topic_proportions(&self, doc_id: &str) -> Option<&BTreeMap<TopicId, f64>> {
        self.topics.document(doc_id).map(|d| &d.proportions)
    }

    pub fn term_report(&self, term: &str) -> TermReport {
        TermReport {
            term: term.to_string(),
            term_id: self.stats.resolve(term),
            documents: self.stats.containing_documents(term),
            tf: self.stats.term_frequency_vector(term),
            df: self.stats.document_frequency(term),
            tfidf: self.stats.tfidf(term),
        }
    }

    /// Highest tf-idf terms of one document; `None` for an unknown document.
    pub fn top_terms(&self, doc_id: &str, n: usize) -> Option<Vec<ScoredTerm>> {
        let (_, doc) = self.stats.corpus().document(doc_id)?;
        let index = self.index();
        Some(
            self.stats
                .top_terms(doc, n)
                .into_iter()
                .filter_map(|(id, score)| index.token_of(id).ok().map(|t| ScoredTerm { term: t.to_string(), score }))
                .collect(),
        )
    }
}

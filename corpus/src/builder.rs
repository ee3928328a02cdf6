use crate::error::Result;
use crate::index::VocabularyIndex;
use crate::source::read_document;
use crate::tokenizer::Normalizer;
use crate::{CleanedDocument, EncodedDocument, RawDocument};
use rayon::prelude::*;
use std::path::PathBuf;

/// Cleans raw documents and accumulates the vocabulary.
///
/// Documents are kept in the order they were added. Documents that are empty after
/// cleaning are dropped. A document that fails to load is logged and skipped, and
/// the rest of the corpus is still built.
pub struct NormalizedCorpusBuilder {
    normalizer: Normalizer,
    documents: Vec<CleanedDocument>,
    vocabulary: VocabularyIndex,
    skipped: usize,
    dropped_empty: usize,
}

impl NormalizedCorpusBuilder {
    pub fn new(normalizer: Normalizer) -> Self {
        Self { normalizer, documents: Vec::new(), vocabulary: VocabularyIndex::new(), skipped: 0, dropped_empty: 0 }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Clean one document. No shared state is touched.
    pub fn clean(&self, raw: &RawDocument) -> CleanedDocument {
        CleanedDocument { id: raw.id.clone(), tokens: self.normalizer.normalize(&raw.text) }
    }

    pub fn add_document(&mut self, raw: &RawDocument) -> Result<()> {
        let doc = self.clean(raw);
        self.merge(doc)
    }

    /// Add an already cleaned document and union its tokens into the vocabulary.
    pub fn merge(&mut self, doc: CleanedDocument) -> Result<()> {
        if doc.tokens.is_empty() {
            tracing::debug!(doc = %doc.id, "dropping empty document");
            self.dropped_empty += 1;
            return Ok(());
        }
        self.vocabulary.extend(&doc.tokens)?;
        tracing::debug!(doc = %doc.id, tokens = doc.tokens.len(), "cleaned document");
        self.documents.push(doc);
        Ok(())
    }

    /// Stream documents one at a time. `Err` items are skipped with a warning.
    pub fn ingest<I>(&mut self, docs: I) -> Result<()>
    where
        I: IntoIterator<Item = Result<RawDocument>>,
    {
        for item in docs {
            match item {
                Ok(raw) => self.add_document(&raw)?,
                Err(err) => self.skip(&err),
            }
        }
        Ok(())
    }

    /// Read and clean files on the rayon pool, then merge them in the given order.
    pub fn ingest_parallel(&mut self, paths: &[PathBuf]) -> Result<()> {
        let normalizer = &self.normalizer;
        let cleaned: Vec<Result<CleanedDocument>> = paths
            .par_iter()
            .map(|p| read_document(p).map(|raw| CleanedDocument { tokens: normalizer.normalize(&raw.text), id: raw.id }))
            .collect();
        for item in cleaned {
            match item {
                Ok(doc) => self.merge(doc)?,
                Err(err) => self.skip(&err),
            }
        }
        Ok(())
    }

    fn skip(&mut self, err: &crate::Error) {
        tracing::warn!(error = %err, "skipping document");
        self.skipped += 1;
    }

    pub fn documents(&self) -> &[CleanedDocument] {
        &self.documents
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn dropped_empty(&self) -> usize {
        self.dropped_empty
    }

    /// Freeze the vocabulary and encode every retained document.
    pub fn finish(mut self) -> Result<EncodedCorpus> {
        self.vocabulary.freeze()?;
        let corpus = EncodedCorpus::encode(self.vocabulary, &self.documents)?;
        tracing::info!(
            documents = corpus.len(),
            vocabulary = corpus.index().size(),
            skipped = self.skipped,
            dropped_empty = self.dropped_empty,
            "built corpus"
        );
        Ok(corpus)
    }
}

/// Frozen vocabulary plus the encoded documents, in corpus order.
#[derive(Debug, Clone)]
pub struct EncodedCorpus {
    index: VocabularyIndex,
    documents: Vec<EncodedDocument>,
}

impl EncodedCorpus {
    /// Encode `docs` against a frozen `index`.
    pub fn encode(index: VocabularyIndex, docs: &[CleanedDocument]) -> Result<Self> {
        let documents = docs.iter().map(|d| index.encode(d)).collect::<Result<Vec<_>>>()?;
        Ok(Self { index, documents })
    }

    /// Index and encode documents that were cleaned elsewhere.
    pub fn from_cleaned(docs: Vec<CleanedDocument>) -> Result<Self> {
        let docs: Vec<CleanedDocument> = docs.into_iter().filter(|d| !d.tokens.is_empty()).collect();
        let index = VocabularyIndex::from_tokens(docs.iter().flat_map(|d| d.tokens.iter().cloned()));
        Self::encode(index, &docs)
    }

    pub fn index(&self) -> &VocabularyIndex {
        &self.index
    }

    pub fn documents(&self) -> &[EncodedDocument] {
        &self.documents
    }

    /// Position and contents of the document with this id.
    pub fn document(&self, id: &str) -> Option<(usize, &EncodedDocument)> {
        self.documents.iter().enumerate().find(|(_, d)| d.id == id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn total_tokens(&self) -> usize {
        self.documents.iter().map(EncodedDocument::len).sum()
    }
}

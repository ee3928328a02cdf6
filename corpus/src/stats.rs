use crate::builder::EncodedCorpus;
use crate::index::VocabularyIndex;
use crate::{EncodedDocument, TermId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

/// How document frequency turns `D / df` into a score.
///
/// The default applies no smoothing: `ln(D / df)`, so a term present in every
/// document scores 0. `Smoothed` uses `ln(1 + D / df)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdfSmoothing {
    #[default]
    None,
    Smoothed,
}

/// A term given either as a token (resolved through the vocabulary) or as an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term<'a> {
    Token(&'a str),
    Id(TermId),
}

impl<'a> From<&'a str> for Term<'a> {
    fn from(token: &'a str) -> Self {
        Term::Token(token)
    }
}

impl<'a> From<&'a String> for Term<'a> {
    fn from(token: &'a String) -> Self {
        Term::Token(token)
    }
}

impl From<TermId> for Term<'_> {
    fn from(id: TermId) -> Self {
        Term::Id(id)
    }
}

/// tf, df and tf-idf over an immutable encoded corpus.
///
/// Unknown terms and empty documents produce zeros rather than errors.
#[derive(Debug, Clone)]
pub struct FrequencyStatistics {
    corpus: EncodedCorpus,
    // number of documents containing each term id
    containing: Vec<u32>,
    smoothing: IdfSmoothing,
}

impl FrequencyStatistics {
    pub fn new(corpus: EncodedCorpus) -> Self {
        Self::with_smoothing(corpus, IdfSmoothing::None)
    }

    pub fn with_smoothing(corpus: EncodedCorpus, smoothing: IdfSmoothing) -> Self {
        let mut containing = vec![0u32; corpus.index().size()];
        let mut seen_in_doc: HashSet<TermId> = HashSet::new();
        for doc in corpus.documents() {
            seen_in_doc.clear();
            for &t in &doc.terms {
                if seen_in_doc.insert(t) {
                    containing[t as usize] += 1;
                }
            }
        }
        Self { corpus, containing, smoothing }
    }

    pub fn corpus(&self) -> &EncodedCorpus {
        &self.corpus
    }

    pub fn index(&self) -> &VocabularyIndex {
        self.corpus.index()
    }

    pub fn smoothing(&self) -> IdfSmoothing {
        self.smoothing
    }

    pub fn document_count(&self) -> usize {
        self.corpus.len()
    }

    /// Vocabulary id for `term`, or `None` if the corpus never saw it.
    pub fn resolve<'t>(&self, term: impl Into<Term<'t>>) -> Option<TermId> {
        match term.into() {
            Term::Token(token) => self.index().get(token),
            Term::Id(id) => ((id as usize) < self.containing.len()).then_some(id),
        }
    }

    /// Occurrences of `term` in `doc` divided by the document length.
    pub fn term_frequency<'t>(&self, term: impl Into<Term<'t>>, doc: &EncodedDocument) -> f64 {
        self.resolve(term).map_or(0.0, |id| relative_frequency(id, doc))
    }

    /// One tf value per document, in corpus order.
    pub fn term_frequency_vector<'t>(&self, term: impl Into<Term<'t>>) -> Vec<f64> {
        match self.resolve(term) {
            Some(id) => self.corpus.documents().iter().map(|d| relative_frequency(id, d)).collect(),
            None => vec![0.0; self.document_count()],
        }
    }

    /// Number of documents that contain `term` at least once.
    pub fn containing_documents<'t>(&self, term: impl Into<Term<'t>>) -> u32 {
        self.resolve(term).map_or(0, |id| self.containing[id as usize])
    }

    /// `ln(D / df)`, or 0.0 when no document contains the term.
    pub fn document_frequency<'t>(&self, term: impl Into<Term<'t>>) -> f64 {
        let df = self.containing_documents(term);
        if df == 0 {
            return 0.0;
        }
        let ratio = self.document_count() as f64 / df as f64;
        match self.smoothing {
            IdfSmoothing::None => ratio.ln(),
            IdfSmoothing::Smoothed => (1.0 + ratio).ln(),
        }
    }

    pub fn tfidf<'t>(&self, term: impl Into<Term<'t>>) -> Vec<f64> {
        let Some(id) = self.resolve(term) else {
            return vec![0.0; self.document_count()];
        };
        let df = self.document_frequency(id);
        self.term_frequency_vector(id).into_iter().map(|tf| tf * df).collect()
    }

    /// Relative frequency of every distinct term in `doc`.
    pub fn document_term_frequencies(&self, doc: &EncodedDocument) -> BTreeMap<TermId, f64> {
        let mut counts: BTreeMap<TermId, usize> = BTreeMap::new();
        for &t in &doc.terms {
            *counts.entry(t).or_insert(0) += 1;
        }
        let len = doc.len() as f64;
        counts.into_iter().map(|(t, c)| (t, c as f64 / len)).collect()
    }

    /// The `n` highest tf-idf terms of `doc`, ties broken by term id.
    pub fn top_terms(&self, doc: &EncodedDocument, n: usize) -> Vec<(TermId, f64)> {
        let mut scored: Vec<(TermId, f64)> = self
            .document_term_frequencies(doc)
            .into_iter()
            .map(|(t, tf)| (t, tf * self.document_frequency(t)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then(a.0.cmp(&b.0)));
        scored.truncate(n);
        scored
    }
}

fn relative_frequency(term: TermId, doc: &EncodedDocument) -> f64 {
    if doc.is_empty() {
        return 0.0;
    }
    doc.count(term) as f64 / doc.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CleanedDocument;

    fn stats(docs: &[(&str, &str)]) -> FrequencyStatistics {
        let cleaned = docs
            .iter()
            .map(|(id, text)| CleanedDocument { id: id.to_string(), tokens: text.split_whitespace().map(String::from).collect() })
            .collect();
        FrequencyStatistics::new(EncodedCorpus::from_cleaned(cleaned).unwrap())
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn cat_dog_bird_scenario() {
        let s = stats(&[("d1", "cat dog cat"), ("d2", "dog bird")]);
        let (d1, d2) = (&s.corpus().documents()[0], &s.corpus().documents()[1]);
        assert!(close(s.term_frequency("cat", d1), 2.0 / 3.0));
        assert_eq!(s.term_frequency("cat", d2), 0.0);
        assert!(close(s.document_frequency("cat"), 2f64.ln()));
        let tfidf = s.tfidf("cat");
        assert!(close(tfidf[0], 2.0 / 3.0 * 2f64.ln()));
        assert!((tfidf[0] - 0.4621).abs() < 1e-4);
        assert_eq!(tfidf[1], 0.0);
    }

    #[test]
    fn term_in_every_document_has_zero_df() {
        let s = stats(&[("a", "x y"), ("b", "x z"), ("c", "x")]);
        assert_eq!(s.document_frequency("x"), 0.0);
        assert!(s.tfidf("x").iter().all(|&v| v == 0.0));
    }

    #[test]
    fn df_decreases_as_coverage_grows() {
        let s = stats(&[("a", "p q r"), ("b", "q r"), ("c", "r s"), ("d", "s")]);
        let dfs: Vec<f64> = ["p", "q", "r"].iter().map(|t| s.document_frequency(*t)).collect();
        assert!(close(dfs[0], 4f64.ln()));
        assert!(close(dfs[1], 2f64.ln()));
        assert!(close(dfs[2], (4.0f64 / 3.0).ln()));
        assert!(dfs[0] > dfs[1] && dfs[1] > dfs[2]);
    }

    #[test]
    fn unknown_terms_give_zeros() {
        let s = stats(&[("a", "x"), ("b", "y")]);
        assert_eq!(s.term_frequency_vector("nope"), vec![0.0, 0.0]);
        assert_eq!(s.tfidf(99u32), vec![0.0, 0.0]);
        assert_eq!(s.document_frequency("nope"), 0.0);
    }

    #[test]
    fn id_and_token_queries_agree() {
        let s = stats(&[("a", "x y x"), ("b", "y")]);
        let id = s.index().id_of("x").unwrap();
        assert_eq!(s.term_frequency_vector(id), s.term_frequency_vector("x"));
        assert_eq!(s.tfidf(id), s.tfidf("x"));
    }

    #[test]
    fn empty_document_has_zero_tf() {
        let s = stats(&[("a", "x")]);
        let empty = EncodedDocument { id: "e".into(), terms: vec![] };
        assert_eq!(s.term_frequency("x", &empty), 0.0);
    }

    #[test]
    fn smoothing_is_opt_in() {
        let cleaned = vec![
            CleanedDocument { id: "a".into(), tokens: vec!["x".into()] },
            CleanedDocument { id: "b".into(), tokens: vec!["x".into(), "y".into()] },
        ];
        let s = FrequencyStatistics::with_smoothing(EncodedCorpus::from_cleaned(cleaned).unwrap(), IdfSmoothing::Smoothed);
        assert!(close(s.document_frequency("x"), 2f64.ln()));
        assert!(close(s.document_frequency("y"), 3f64.ln()));
        assert_eq!(s.document_frequency("z"), 0.0);
    }

    #[test]
    fn top_terms_rank_by_tfidf() {
        let s = stats(&[("a", "rare rare common"), ("b", "common other")]);
        let doc = &s.corpus().documents()[0];
        let top = s.top_terms(doc, 1);
        assert_eq!(top.len(), 1);
        assert_eq!(s.index().token_of(top[0].0).unwrap(), "rare");

        let freqs = s.document_term_frequencies(doc);
        assert!(close(freqs.values().sum::<f64>(), 1.0));
    }
}

use crate::error::{Error, Result};
use crate::{EncodedDocument, TermId, TopicId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::BTreeMap;

/// Source of uniform integers in `[0, bound)`.
pub trait UniformSource {
    fn next_uniform_int(&mut self, bound: usize) -> usize;
}

/// `StdRng`-backed source; fix the seed for reproducible assignments.
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: StdRng,
}

impl SeededSource {
    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_entropy() }
    }
}

impl UniformSource for SeededSource {
    fn next_uniform_int(&mut self, bound: usize) -> usize {
        self.rng.gen_range(0..bound)
    }
}

/// Topic labels and proportions for one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentTopics {
    pub id: String,
    pub topics: Vec<TopicId>,
    pub proportions: BTreeMap<TopicId, f64>,
}

/// Random initialization of a topic model over a whole corpus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicSeed {
    pub num_topics: usize,
    pub documents: Vec<DocumentTopics>,
    // term id behind each label, parallel to `documents[i].topics`
    #[serde(skip)]
    terms: Vec<Vec<TermId>>,
}

impl TopicSeed {
    pub fn document(&self, id: &str) -> Option<&DocumentTopics> {
        self.documents.iter().find(|d| d.id == id)
    }

    /// Every term occurrence grouped by the topic it was drawn for, in corpus order.
    pub fn topic_terms(&self) -> BTreeMap<TopicId, Vec<TermId>> {
        let mut out: BTreeMap<TopicId, Vec<TermId>> = BTreeMap::new();
        for (doc, terms) in self.documents.iter().zip(&self.terms) {
            for (&topic, &term) in doc.topics.iter().zip(terms) {
                out.entry(topic).or_default().push(term);
            }
        }
        out
    }

    /// Occurrences drawn for each topic across the corpus.
    pub fn topic_sizes(&self) -> BTreeMap<TopicId, usize> {
        let mut sizes = BTreeMap::new();
        for topic in self.documents.iter().flat_map(|d| d.topics.iter()) {
            *sizes.entry(*topic).or_insert(0) += 1;
        }
        sizes
    }
}

/// Draws one uniform topic per token occurrence.
///
/// This is only the seed stage of a topic model: no likelihood is evaluated and
/// nothing is resampled.
pub struct TopicAssigner<R: UniformSource> {
    num_topics: usize,
    source: R,
}

impl<R: UniformSource> TopicAssigner<R> {
    pub fn new(num_topics: usize, source: R) -> Result<Self> {
        if num_topics < 1 {
            return Err(Error::Configuration(format!("number of topics must be at least 1, got {num_topics}")));
        }
        Ok(Self { num_topics, source })
    }

    pub fn num_topics(&self) -> usize {
        self.num_topics
    }

    pub fn assign(&mut self, doc: &EncodedDocument) -> Vec<TopicId> {
        (0..doc.len()).map(|_| self.source.next_uniform_int(self.num_topics) as TopicId).collect()
    }

    pub fn assign_corpus(&mut self, docs: &[EncodedDocument]) -> TopicSeed {
        let documents = docs
            .iter()
            .map(|doc| {
                let topics = self.assign(doc);
                let proportions = aggregate(&topics);
                DocumentTopics { id: doc.id.clone(), topics, proportions }
            })
            .collect();
        let terms = docs.iter().map(|d| d.terms.clone()).collect();
        tracing::info!(documents = docs.len(), topics = self.num_topics, "assigned initial topics");
        TopicSeed { num_topics: self.num_topics, documents, terms }
    }
}

/// Share of each observed topic. Unobserved topics are absent; an empty input
/// yields an empty map.
pub fn aggregate(topics: &[TopicId]) -> BTreeMap<TopicId, f64> {
    let mut counts: BTreeMap<TopicId, usize> = BTreeMap::new();
    for &t in topics {
        *counts.entry(t).or_insert(0) += 1;
    }
    let total = topics.len() as f64;
    counts.into_iter().map(|(t, c)| (t, c as f64 / total)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays a fixed sequence, wrapped into range.
    struct Cycle(Vec<usize>, usize);

    impl UniformSource for Cycle {
        fn next_uniform_int(&mut self, bound: usize) -> usize {
            let v = self.0[self.1 % self.0.len()];
            self.1 += 1;
            v % bound
        }
    }

    fn doc(len: usize) -> EncodedDocument {
        EncodedDocument { id: "d".into(), terms: (0..len as TermId).collect() }
    }

    #[test]
    fn zero_topics_is_a_configuration_error() {
        let err = TopicAssigner::new(0, SeededSource::seeded(1)).err().unwrap();
        assert!(err.is_configuration());
    }

    #[test]
    fn assigns_one_topic_per_occurrence_in_range() {
        let mut a = TopicAssigner::new(4, SeededSource::seeded(7)).unwrap();
        let topics = a.assign(&doc(250));
        assert_eq!(topics.len(), 250);
        assert!(topics.iter().all(|&t| t < 4));
    }

    #[test]
    fn same_seed_same_assignment() {
        let d = doc(40);
        let a = TopicAssigner::new(3, SeededSource::seeded(42)).unwrap().assign(&d);
        let b = TopicAssigner::new(3, SeededSource::seeded(42)).unwrap().assign(&d);
        assert_eq!(a, b);
    }

    #[test]
    fn aggregate_lists_only_observed_topics() {
        let p = aggregate(&[0, 2, 2, 2]);
        assert_eq!(p.keys().copied().collect::<Vec<_>>(), vec![0, 2]);
        assert!((p[&0] - 0.25).abs() < 1e-9);
        assert!((p.values().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn corpus_seed_groups_terms_by_topic() {
        let docs = vec![
            EncodedDocument { id: "a".into(), terms: vec![5, 6, 7] },
            EncodedDocument { id: "b".into(), terms: vec![8] },
        ];
        let mut a = TopicAssigner::new(2, Cycle(vec![0, 1], 0)).unwrap();
        let seed = a.assign_corpus(&docs);
        assert_eq!(seed.documents[0].topics, vec![0, 1, 0]);
        assert_eq!(seed.documents[1].topics, vec![1]);
        let by_topic = seed.topic_terms();
        assert_eq!(by_topic[&0], vec![5, 7]);
        assert_eq!(by_topic[&1], vec![6, 8]);
        assert_eq!(seed.topic_sizes()[&0], 2);
        assert_eq!(seed.document("b").unwrap().proportions[&1], 1.0);
    }
}

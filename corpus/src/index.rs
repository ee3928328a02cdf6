use crate::error::{Error, Result};
use crate::{CleanedDocument, EncodedDocument, TermId, Token};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
enum State {
    Building(HashSet<Token>),
    Frozen { tokens: Vec<Token>, ids: HashMap<Token, TermId> },
}

/// Bijection between tokens and dense ids `0..N`.
///
/// Starts out `Building`, where tokens may be inserted but no ids exist yet.
/// [`VocabularyIndex::freeze`] sorts the tokens lexicographically and assigns ids in
/// that order, so the same vocabulary always yields the same ids. After freezing
/// the index is immutable.
#[derive(Debug, Clone)]
pub struct VocabularyIndex {
    state: State,
}

impl Default for VocabularyIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl VocabularyIndex {
    pub fn new() -> Self {
        Self { state: State::Building(HashSet::new()) }
    }

    /// Build and immediately freeze an index over `tokens`.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Token>,
    {
        let set: HashSet<Token> = tokens.into_iter().map(Into::into).collect();
        Self { state: Self::frozen_state(set) }
    }

    fn frozen_state(set: HashSet<Token>) -> State {
        let mut tokens: Vec<Token> = set.into_iter().collect();
        tokens.sort_unstable();
        let ids = tokens.iter().enumerate().map(|(i, t)| (t.clone(), i as TermId)).collect();
        State::Frozen { tokens, ids }
    }

    pub fn is_frozen(&self) -> bool {
        matches!(self.state, State::Frozen { .. })
    }

    pub fn insert(&mut self, token: &str) -> Result<()> {
        match &mut self.state {
            State::Building(set) => {
                if !set.contains(token) {
                    set.insert(token.to_string());
                }
                Ok(())
            }
            State::Frozen { .. } => Err(Error::InvalidState("cannot insert into a frozen vocabulary")),
        }
    }

    pub fn extend<'a, I: IntoIterator<Item = &'a Token>>(&mut self, tokens: I) -> Result<()> {
        for t in tokens {
            self.insert(t)?;
        }
        Ok(())
    }

    /// Assign ids in lexicographic order. One-way.
    pub fn freeze(&mut self) -> Result<()> {
        let set = match &mut self.state {
            State::Building(set) => std::mem::take(set),
            State::Frozen { .. } => return Err(Error::InvalidState("vocabulary is already frozen")),
        };
        self.state = Self::frozen_state(set);
        tracing::debug!(size = self.size(), "vocabulary frozen");
        Ok(())
    }

    pub fn size(&self) -> usize {
        match &self.state {
            State::Building(set) => set.len(),
            State::Frozen { tokens, .. } => tokens.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    fn frozen(&self) -> Result<(&[Token], &HashMap<Token, TermId>)> {
        match &self.state {
            State::Frozen { tokens, ids } => Ok((tokens.as_slice(), ids)),
            State::Building(_) => Err(Error::InvalidState("vocabulary is not frozen yet")),
        }
    }

    /// Lookup that never fails: `None` for unknown tokens or an unfrozen index.
    pub fn get(&self, token: &str) -> Option<TermId> {
        match &self.state {
            State::Frozen { ids, .. } => ids.get(token).copied(),
            State::Building(_) => None,
        }
    }

    pub fn id_of(&self, token: &str) -> Result<TermId> {
        let (_, ids) = self.frozen()?;
        ids.get(token).copied().ok_or_else(|| Error::TokenNotFound(token.to_string()))
    }

    pub fn token_of(&self, id: TermId) -> Result<&str> {
        let (tokens, _) = self.frozen()?;
        tokens.get(id as usize).map(String::as_str).ok_or(Error::IdNotFound(id))
    }

    /// Tokens in id order. Empty until frozen.
    pub fn tokens(&self) -> &[Token] {
        match &self.state {
            State::Frozen { tokens, .. } => tokens.as_slice(),
            State::Building(_) => &[],
        }
    }

    pub fn encode(&self, doc: &CleanedDocument) -> Result<EncodedDocument> {
        let (_, ids) = self.frozen()?;
        let terms = doc
            .tokens
            .iter()
            .map(|t| ids.get(t).copied().ok_or_else(|| Error::TokenNotFound(t.clone())))
            .collect::<Result<Vec<TermId>>>()?;
        Ok(EncodedDocument { id: doc.id.clone(), terms })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, tokens: &[&str]) -> CleanedDocument {
        CleanedDocument { id: id.into(), tokens: tokens.iter().map(|t| t.to_string()).collect() }
    }

    #[test]
    fn ids_follow_lexicographic_order() {
        let mut v = VocabularyIndex::new();
        for t in ["dog", "cat", "bird", "cat"] {
            v.insert(t).unwrap();
        }
        v.freeze().unwrap();
        assert_eq!(v.size(), 3);
        assert_eq!(v.tokens(), &["bird", "cat", "dog"]);
        assert_eq!(v.id_of("bird").unwrap(), 0);
        assert_eq!(v.id_of("dog").unwrap(), 2);
    }

    #[test]
    fn round_trips_every_token() {
        let v = VocabularyIndex::from_tokens(["zeta", "alpha", "mu", "beta"]);
        for t in v.tokens() {
            assert_eq!(v.token_of(v.id_of(t).unwrap()).unwrap(), t);
        }
        let mut ids: Vec<TermId> = v.tokens().iter().map(|t| v.id_of(t).unwrap()).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..4).collect::<Vec<TermId>>());
    }

    #[test]
    fn lookups_fail_on_unknown() {
        let v = VocabularyIndex::from_tokens(["cat"]);
        assert!(matches!(v.id_of("dog"), Err(Error::TokenNotFound(_))));
        assert!(matches!(v.token_of(1), Err(Error::IdNotFound(1))));
        assert_eq!(v.get("dog"), None);
    }

    #[test]
    fn mutation_after_freeze_is_rejected() {
        let mut v = VocabularyIndex::new();
        v.insert("cat").unwrap();
        v.freeze().unwrap();
        assert!(matches!(v.insert("dog"), Err(Error::InvalidState(_))));
        assert!(matches!(v.freeze(), Err(Error::InvalidState(_))));
        assert_eq!(v.size(), 1);
    }

    #[test]
    fn queries_before_freeze_are_rejected() {
        let mut v = VocabularyIndex::new();
        v.insert("cat").unwrap();
        assert!(matches!(v.id_of("cat"), Err(Error::InvalidState(_))));
        assert!(matches!(v.encode(&doc("d", &["cat"])), Err(Error::InvalidState(_))));
    }

    #[test]
    fn encode_preserves_order_and_repeats() {
        let v = VocabularyIndex::from_tokens(["bird", "cat", "dog"]);
        let e = v.encode(&doc("d1", &["cat", "dog", "cat"])).unwrap();
        assert_eq!(e.id, "d1");
        assert_eq!(e.terms, vec![1, 2, 1]);
    }
}

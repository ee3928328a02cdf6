use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Reduces a cleaned token to its base form. One stemmer is used for a whole corpus.
pub trait TokenStemmer: Send + Sync {
    fn base_form(&self, token: &str) -> String;
}

/// Snowball stemmer backed by `rust-stemmers`.
pub struct SnowballStemmer {
    inner: Stemmer,
}

impl SnowballStemmer {
    pub fn new(algorithm: Algorithm) -> Self {
        Self { inner: Stemmer::create(algorithm) }
    }

    pub fn english() -> Self {
        Self::new(Algorithm::English)
    }
}

impl Default for SnowballStemmer {
    fn default() -> Self {
        Self::english()
    }
}

impl TokenStemmer for SnowballStemmer {
    fn base_form(&self, token: &str) -> String {
        self.inner.stem(token).into_owned()
    }
}

/// Leaves tokens untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStemmer;

impl TokenStemmer for NoopStemmer {
    fn base_form(&self, token: &str) -> String {
        token.to_string()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StemmerKind {
    #[default]
    Snowball,
    None,
}

impl StemmerKind {
    pub fn build(self) -> Arc<dyn TokenStemmer> {
        match self {
            StemmerKind::Snowball => Arc::new(SnowballStemmer::english()),
            StemmerKind::None => Arc::new(NoopStemmer),
        }
    }
}

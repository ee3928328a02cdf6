use crate::error::{Error, Result};
use crate::stem::TokenStemmer;
use crate::Token;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use unicode_normalization::UnicodeNormalization;

/// Tokens this long (in chars) or longer are dropped.
pub const DEFAULT_MAX_TOKEN_LEN: usize = 20;

lazy_static! {
    static ref NON_ALNUM: Regex = Regex::new(r"[^a-zA-Z0-9]+").expect("valid regex");
    static ref BUILTIN_STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "i","me","my","myself","we","our","ours","ourselves",
            "you","you're","you've","you'll","you'd","your","yours","yourself","yourselves",
            "he","him","his","himself","she","she's","her","hers","herself",
            "it","it's","its","itself","they","them","their","theirs","themselves",
            "what","which","who","whom","this","that","that'll","these","those",
            "am","is","are","was","were","be","been","being","have","has","had","having","do","does","did","doing",
            "a","an","the","and","but","if","or","because","as","until","while",
            "of","at","by","for","with","about","against","between","into","through","during","before","after",
            "above","below","to","from","up","down","in","out","on","off","over","under",
            "again","further","then","once","here","there","when","where","why","how",
            "all","any","both","each","few","more","most","other","some","such",
            "no","nor","not","only","own","same","so","than","too","very",
            "s","t","can","will","just","don","don't","should","should've","now",
            "d","ll","m","o","re","ve","y","ain","aren","aren't","couldn","couldn't",
            "didn","didn't","doesn","doesn't","hadn","hadn't","hasn","hasn't","haven","haven't",
            "isn","isn't","ma","mightn","mightn't","mustn","mustn't","needn","needn't",
            "shan","shan't","shouldn","shouldn't","wasn","wasn't","weren","weren't",
            "won","won't","wouldn","wouldn't",
        ];
        words.iter().copied().collect()
    };
}

/// Case-insensitive stopword set.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in English list.
    pub fn builtin() -> Self {
        Self { words: BUILTIN_STOPWORDS.iter().map(|w| w.to_string()).collect() }
    }

    /// Parse a whitespace/newline delimited list.
    pub fn parse(text: &str) -> Self {
        Self { words: text.split_whitespace().map(str::to_lowercase).collect() }
    }

    /// Load a stopword file. A missing or unreadable file is a configuration error.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::StopwordResource { path: path.to_path_buf(), source })?;
        let words = Self::parse(&text);
        tracing::debug!(path = %path.display(), count = words.len(), "loaded stopwords");
        Ok(words)
    }

    pub fn union(mut self, other: StopWords) -> Self {
        self.words.extend(other.words);
        self
    }

    pub fn insert(&mut self, word: &str) {
        self.words.insert(word.to_lowercase());
    }

    pub fn contains(&self, word: &str) -> bool {
        if word.chars().any(char::is_uppercase) {
            self.words.contains(&word.to_lowercase())
        } else {
            self.words.contains(word)
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Turns raw document text into stemmed tokens.
///
/// Text is lowercased and split on whitespace. Every char outside `[a-zA-Z0-9]` is
/// stripped, then empty tokens, stopwords and overlong tokens are dropped and the
/// survivors are stemmed. Stopwords are matched against the raw lowercased word as
/// well as the stripped token, so list entries like `don't` still apply.
#[derive(Clone)]
pub struct Normalizer {
    stopwords: StopWords,
    stemmer: Arc<dyn TokenStemmer>,
    max_token_len: usize,
    fold_accents: bool,
}

impl Normalizer {
    pub fn new(stopwords: StopWords, stemmer: Arc<dyn TokenStemmer>) -> Self {
        Self { stopwords, stemmer, max_token_len: DEFAULT_MAX_TOKEN_LEN, fold_accents: false }
    }

    pub fn with_max_token_len(mut self, max_token_len: usize) -> Self {
        self.max_token_len = max_token_len;
        self
    }

    /// Decompose (NFKD) before stripping so accented letters keep their base letter.
    pub fn with_accent_folding(mut self, fold_accents: bool) -> Self {
        self.fold_accents = fold_accents;
        self
    }

    pub fn stopwords(&self) -> &StopWords {
        &self.stopwords
    }

    pub fn normalize(&self, text: &str) -> Vec<Token> {
        text.to_lowercase().split_whitespace().filter_map(|w| self.clean_lowercased(w)).collect()
    }

    /// Normalize a single query word; `None` if it would be filtered out.
    pub fn normalize_word(&self, word: &str) -> Option<Token> {
        let lower = word.trim().to_lowercase();
        self.clean_lowercased(&lower)
    }

    fn clean_lowercased(&self, word: &str) -> Option<Token> {
        if self.stopwords.contains(word) {
            return None;
        }
        let stripped = if self.fold_accents {
            let decomposed = word.nfkd().collect::<String>();
            NON_ALNUM.replace_all(&decomposed, "").into_owned()
        } else {
            NON_ALNUM.replace_all(word, "").into_owned()
        };
        if stripped.is_empty() || stripped.len() >= self.max_token_len || self.stopwords.contains(&stripped) {
            return None;
        }
        Some(self.stemmer.base_form(&stripped))
    }
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer")
            .field("stopwords", &self.stopwords.len())
            .field("max_token_len", &self.max_token_len)
            .field("fold_accents", &self.fold_accents)
            .finish()
    }
}

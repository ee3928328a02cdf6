use corpus::stem::{NoopStemmer, SnowballStemmer};
use corpus::tokenizer::{Normalizer, StopWords};
use std::sync::Arc;

fn english() -> Normalizer {
    Normalizer::new(StopWords::builtin(), Arc::new(SnowballStemmer::english()))
}

#[test]
fn it_normalizes_and_stems() {
    let words = english().normalize("Running Runners RUN! The cafe's menu.");
    // Stemming to "run" should appear
    assert!(words.contains(&"run".to_string()));
    assert!(words.contains(&"menu".to_string()));
}

#[test]
fn it_filters_stopwords() {
    let words = english().normalize("The quick brown fox and the lazy dog");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    assert!(words.contains(&"fox".to_string()));
}

#[test]
fn it_drops_tokens_at_the_length_threshold() {
    let n = Normalizer::new(StopWords::empty(), Arc::new(NoopStemmer));
    let long = "a".repeat(20);
    let almost = "b".repeat(19);
    let words = n.normalize(&format!("{long} {almost}"));
    assert_eq!(words, vec![almost]);
}

#[test]
fn it_keeps_digits() {
    let n = Normalizer::new(StopWords::empty(), Arc::new(NoopStemmer));
    assert_eq!(n.normalize("Route 66, (1999)"), vec!["route", "66", "1999"]);
}

#[test]
fn stopwords_match_the_raw_word_before_stripping() {
    let n = Normalizer::new(StopWords::parse("aren't the"), Arc::new(NoopStemmer));
    // "aren't" is dropped before stripping, the literal "arent" is kept
    assert_eq!(n.normalize("aren't (the) arent"), vec!["arent"]);
    assert_eq!(n.normalize_word("Aren't"), None);
    assert_eq!(n.normalize_word("arent").as_deref(), Some("arent"));
}

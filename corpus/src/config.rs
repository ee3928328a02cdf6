use crate::error::{Error, Result};
use crate::stats::IdfSmoothing;
use crate::stem::StemmerKind;
use crate::tokenizer::{Normalizer, StopWords, DEFAULT_MAX_TOKEN_LEN};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_TOPICS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Directory of plain-text documents, one per file.
    pub docs_dir: PathBuf,
    /// Stopword file; when set it must be readable.
    pub stopwords_path: Option<PathBuf>,
    /// Union the built-in English stopwords into the set.
    pub builtin_stopwords: bool,
    pub max_token_len: usize,
    pub stemmer: StemmerKind,
    pub fold_accents: bool,
    pub topics: usize,
    /// Seed for topic assignment; random when unset.
    pub seed: Option<u64>,
    pub idf_smoothing: IdfSmoothing,
    /// Normalize documents on the rayon pool.
    pub parallel: bool,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("data/docs"),
            stopwords_path: None,
            builtin_stopwords: true,
            max_token_len: DEFAULT_MAX_TOKEN_LEN,
            stemmer: StemmerKind::default(),
            fold_accents: false,
            topics: DEFAULT_TOPICS,
            seed: None,
            idf_smoothing: IdfSmoothing::default(),
            parallel: false,
        }
    }
}

impl CorpusConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = read_json(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.topics < 1 {
            return Err(Error::Configuration(format!("number of topics must be at least 1, got {}", self.topics)));
        }
        if self.max_token_len == 0 {
            return Err(Error::Configuration("max_token_len must be positive".into()));
        }
        Ok(())
    }

    /// Built-in list (if enabled) unioned with the stopword file (if set).
    pub fn load_stopwords(&self) -> Result<StopWords> {
        let mut stopwords = if self.builtin_stopwords { StopWords::builtin() } else { StopWords::empty() };
        if let Some(path) = &self.stopwords_path {
            stopwords = stopwords.union(StopWords::from_file(path)?);
        }
        Ok(stopwords)
    }

    pub fn normalizer(&self) -> Result<Normalizer> {
        Ok(Normalizer::new(self.load_stopwords()?, self.stemmer.build())
            .with_max_token_len(self.max_token_len)
            .with_accent_folding(self.fold_accents))
    }

    /// Read `file` (or start from the defaults), then apply `overrides` on top.
    ///
    /// The result is validated after the overrides, so a flag can repair a
    /// value the file got wrong.
    pub fn layered(file: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let mut config = match file {
            Some(path) => read_json(path)?,
            None => CorpusConfig::default(),
        };
        overrides.apply(&mut config);
        config.validate()?;
        Ok(config)
    }
}

fn read_json(path: &Path) -> Result<CorpusConfig> {
    let text = fs::read_to_string(path)
        .map_err(|e| Error::Configuration(format!("cannot read config {}: {e}", path.display())))?;
    serde_json::from_str(&text).map_err(|e| Error::Configuration(format!("invalid config {}: {e}", path.display())))
}

/// Settings given on the command line. `None` and `false` leave the underlying value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub docs_dir: Option<PathBuf>,
    pub stopwords_path: Option<PathBuf>,
    pub no_builtin_stopwords: bool,
    pub max_token_len: Option<usize>,
    pub no_stem: bool,
    pub fold_accents: bool,
    pub topics: Option<usize>,
    pub seed: Option<u64>,
    pub smoothed_idf: bool,
    pub parallel: bool,
}

impl ConfigOverrides {
    pub fn apply(self, config: &mut CorpusConfig) {
        if let Some(dir) = self.docs_dir {
            config.docs_dir = dir;
        }
        if self.stopwords_path.is_some() {
            config.stopwords_path = self.stopwords_path;
        }
        if self.no_builtin_stopwords {
            config.builtin_stopwords = false;
        }
        if let Some(n) = self.max_token_len {
            config.max_token_len = n;
        }
        if self.no_stem {
            config.stemmer = StemmerKind::None;
        }
        if self.fold_accents {
            config.fold_accents = true;
        }
        if let Some(k) = self.topics {
            config.topics = k;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.smoothed_idf {
            config.idf_smoothing = IdfSmoothing::Smoothed;
        }
        if self.parallel {
            config.parallel = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "topics": 5, "stemmer": "none", "idf_smoothing": "smoothed" }"#).unwrap();
        let c = CorpusConfig::from_json_file(&path).unwrap();
        assert_eq!(c.topics, 5);
        assert_eq!(c.stemmer, StemmerKind::None);
        assert_eq!(c.idf_smoothing, IdfSmoothing::Smoothed);
        assert_eq!(c.max_token_len, DEFAULT_MAX_TOKEN_LEN);
        assert!(c.builtin_stopwords);
    }

    #[test]
    fn rejects_zero_topics() {
        let c = CorpusConfig { topics: 0, ..Default::default() };
        assert!(c.validate().unwrap_err().is_configuration());
    }

    #[test]
    fn missing_stopword_file_is_fatal() {
        let dir = tempdir().unwrap();
        let c = CorpusConfig { stopwords_path: Some(dir.path().join("missing.txt")), ..Default::default() };
        let err = c.load_stopwords().unwrap_err();
        assert!(matches!(err, Error::StopwordResource { .. }));
    }

    #[test]
    fn stopword_file_is_unioned_with_builtin() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stop.txt");
        fs::write(&path, "Foo\nbar baz\n").unwrap();
        let c = CorpusConfig { stopwords_path: Some(path), ..Default::default() };
        let s = c.load_stopwords().unwrap();
        assert!(s.contains("foo") && s.contains("BAZ") && s.contains("the"));
    }

    #[test]
    fn flags_override_the_file_and_unset_flags_keep_it() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "docs_dir": "from/file", "topics": 7, "seed": 1, "stemmer": "none" }"#).unwrap();

        let overrides = ConfigOverrides { topics: Some(4), smoothed_idf: true, ..Default::default() };
        let c = CorpusConfig::layered(Some(&path), overrides).unwrap();
        assert_eq!(c.topics, 4);
        assert_eq!(c.idf_smoothing, IdfSmoothing::Smoothed);
        assert_eq!(c.docs_dir, PathBuf::from("from/file"));
        assert_eq!(c.seed, Some(1));
        assert_eq!(c.stemmer, StemmerKind::None);
    }

    #[test]
    fn flag_can_repair_an_invalid_file_value() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "topics": 0 }"#).unwrap();
        assert!(CorpusConfig::from_json_file(&path).unwrap_err().is_configuration());

        let c = CorpusConfig::layered(Some(&path), ConfigOverrides { topics: Some(2), ..Default::default() }).unwrap();
        assert_eq!(c.topics, 2);
        let err = CorpusConfig::layered(Some(&path), ConfigOverrides::default()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn without_a_file_overrides_apply_to_defaults() {
        let overrides = ConfigOverrides {
            docs_dir: Some(PathBuf::from("corpus")),
            no_builtin_stopwords: true,
            no_stem: true,
            max_token_len: Some(12),
            parallel: true,
            ..Default::default()
        };
        let c = CorpusConfig::layered(None, overrides).unwrap();
        assert_eq!(c.docs_dir, PathBuf::from("corpus"));
        assert!(!c.builtin_stopwords);
        assert_eq!(c.stemmer, StemmerKind::None);
        assert_eq!(c.max_token_len, 12);
        assert!(c.parallel);
        assert_eq!(c.topics, DEFAULT_TOPICS);
    }
}

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use corpus::config::{ConfigOverrides, CorpusConfig};
use corpus::model::{CorpusModel, ScoredTerm, TermReport};
use corpus::topics::DocumentTopics;
use corpus::TopicId;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "analyzer")]
#[command(about = "Vocabulary, tf-idf and topic seeding over a directory of text files", long_about = None)]
struct Cli {
    #[command(flatten)]
    corpus: CorpusArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CorpusArgs {
    /// JSON config file; flags given here override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory of plain-text documents
    #[arg(long)]
    docs: Option<PathBuf>,
    /// Stopword file (whitespace separated)
    #[arg(long)]
    stopwords: Option<PathBuf>,
    /// Do not add the built-in English stopwords
    #[arg(long, default_value_t = false)]
    no_builtin_stopwords: bool,
    /// Drop tokens at least this long
    #[arg(long)]
    max_token_len: Option<usize>,
    /// Skip stemming
    #[arg(long, default_value_t = false)]
    no_stem: bool,
    /// Fold accented letters to their base letter before stripping
    #[arg(long, default_value_t = false)]
    fold_accents: bool,
    /// Number of topics
    #[arg(long)]
    topics: Option<usize>,
    /// Seed for topic assignment
    #[arg(long)]
    seed: Option<u64>,
    /// Use smoothed IDF = ln(1 + N/df) instead of ln(N/df)
    #[arg(long, default_value_t = false)]
    smoothed_idf: bool,
    /// Normalize documents in parallel
    #[arg(long, default_value_t = false)]
    parallel: bool,
}

impl CorpusArgs {
    fn into_config(self) -> Result<CorpusConfig> {
        let overrides = ConfigOverrides {
            docs_dir: self.docs,
            stopwords_path: self.stopwords,
            no_builtin_stopwords: self.no_builtin_stopwords,
            max_token_len: self.max_token_len,
            no_stem: self.no_stem,
            fold_accents: self.fold_accents,
            topics: self.topics,
            seed: self.seed,
            smoothed_idf: self.smoothed_idf,
            parallel: self.parallel,
        };
        Ok(CorpusConfig::layered(self.config.as_deref(), overrides)?)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the vocabulary in id order
    Vocab,
    /// Print tf, df and tf-idf for each term
    Terms {
        #[arg(required = true)]
        terms: Vec<String>,
        /// Clean and stem each term the way documents are
        #[arg(long, default_value_t = false)]
        normalize: bool,
    },
    /// Print per-document topic proportions
    Topics {
        /// Only this document
        #[arg(long)]
        doc: Option<String>,
        /// Also list the terms drawn for each topic
        #[arg(long, default_value_t = false)]
        terms: bool,
    },
    /// Print the highest tf-idf terms of each document
    Top {
        #[arg(short, long, default_value_t = 10)]
        k: usize,
        /// Only this document
        #[arg(long)]
        doc: Option<String>,
    },
}

#[derive(Serialize)]
struct Report<T: Serialize> {
    generated_at: String,
    documents: usize,
    vocabulary: usize,
    skipped: usize,
    result: T,
}

#[derive(Serialize)]
struct TopicsResult<'a> {
    documents: Vec<&'a DocumentTopics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    topic_terms: Option<BTreeMap<TopicId, Vec<String>>>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let config = cli.corpus.into_config()?;
    let model = CorpusModel::build(&config)?;

    match cli.command {
        Commands::Vocab => print_report(&model, model.vocabulary()),
        Commands::Terms { terms, normalize } => {
            let reports: Vec<TermReport> = terms
                .into_iter()
                .map(|t| {
                    let key = if normalize { model.normalize_term(&t).unwrap_or(t) } else { t };
                    model.term_report(&key)
                })
                .collect();
            print_report(&model, reports)
        }
        Commands::Topics { doc, terms } => {
            let documents: Vec<&DocumentTopics> = match &doc {
                Some(id) => vec![model.topics().document(id).ok_or_else(|| anyhow::anyhow!("unknown document {id}"))?],
                None => model.topics().documents.iter().collect(),
            };
            let by_topic = terms.then(|| topic_terms(&model));
            print_report(&model, TopicsResult { documents, topic_terms: by_topic })
        }
        Commands::Top { k, doc } => {
            let ids: Vec<String> = match doc {
                Some(id) => vec![id],
                None => model.documents().iter().map(|d| d.id.clone()).collect(),
            };
            let mut out: BTreeMap<String, Vec<ScoredTerm>> = BTreeMap::new();
            for id in ids {
                let top = model.top_terms(&id, k).ok_or_else(|| anyhow::anyhow!("unknown document {id}"))?;
                out.insert(id, top);
            }
            print_report(&model, out)
        }
    }
}

fn topic_terms(model: &CorpusModel) -> BTreeMap<TopicId, Vec<String>> {
    let index = model.index();
    model
        .topics()
        .topic_terms()
        .into_iter()
        .map(|(topic, ids)| {
            let tokens = ids.into_iter().filter_map(|id| index.token_of(id).ok().map(str::to_string)).collect();
            (topic, tokens)
        })
        .collect()
}

fn print_report<T: Serialize>(model: &CorpusModel, result: T) -> Result<()> {
    let report = Report {
        generated_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "".into()),
        documents: model.documents().len(),
        vocabulary: model.vocabulary().len(),
        skipped: model.skipped(),
        result,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    tracing::info!(documents = report.documents, "report written");
    Ok(())
}

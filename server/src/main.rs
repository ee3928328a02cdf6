use anyhow::Result;
use axum::Router;
use clap::Parser;
use corpus::config::{ConfigOverrides, CorpusConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};
use server::build_app;
use tokio::net::TcpListener;

#[derive(Parser)]
struct Args {
    /// JSON corpus config; the corpus flags below override it
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
    /// Skip stemming
    #[arg(long, default_value_t = false)]
    no_stem: bool,
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
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

impl Args {
    fn corpus_config(&self) -> Result<CorpusConfig> {
        let overrides = ConfigOverrides {
            docs_dir: self.docs.clone(),
            stopwords_path: self.stopwords.clone(),
            no_builtin_stopwords: self.no_builtin_stopwords,
            no_stem: self.no_stem,
            topics: self.topics,
            seed: self.seed,
            smoothed_idf: self.smoothed_idf,
            parallel: self.parallel,
            ..Default::default()
        };
        Ok(CorpusConfig::layered(self.config.as_deref(), overrides)?)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let app: Router = build_app(&args.corpus_config()?)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

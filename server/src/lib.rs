use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::get, Json, Router};
use corpus::config::CorpusConfig;
use corpus::model::{CorpusModel, ScoredTerm, TermReport};
use corpus::TopicId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct TermParams {
    /// Clean and stem the path term before lookup
    #[serde(default)]
    pub normalize: bool,
}

#[derive(Deserialize)]
pub struct TopParams {
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct VocabularyResponse {
    pub size: usize,
    pub tokens: Vec<String>,
}

#[derive(Serialize)]
pub struct DocSummary {
    pub doc_id: String,
    pub tokens: usize,
}

#[derive(Serialize)]
pub struct TermResponse {
    pub query: String,
    #[serde(flatten)]
    pub report: TermReport,
}

#[derive(Serialize)]
pub struct TopicsResponse {
    pub doc_id: String,
    pub num_topics: usize,
    pub proportions: BTreeMap<TopicId, f64>,
}

#[derive(Serialize)]
pub struct TopTermsResponse {
    pub doc_id: String,
    pub terms: Vec<ScoredTerm>,
}

#[derive(Clone)]
pub struct AppState {
    pub model: Arc<CorpusModel>,
}

type ApiError = (StatusCode, Json<serde_json::Value>);

/// Build the corpus described by `config` and serve queries over it.
pub fn build_app(config: &CorpusConfig) -> Result<Router> {
    let model = CorpusModel::build(config)?;
    tracing::info!(
        documents = model.documents().len(),
        vocabulary = model.vocabulary().len(),
        skipped = model.skipped(),
        "corpus loaded"
    );
    Ok(router(Arc::new(model)))
}

pub fn router(model: Arc<CorpusModel>) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/vocabulary", get(vocabulary_handler))
        .route("/terms/:term", get(term_handler))
        .route("/docs", get(docs_handler))
        .route("/docs/:doc_id/topics", get(topics_handler))
        .route("/docs/:doc_id/top", get(top_terms_handler))
        .with_state(AppState { model })
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

// CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
fn cors_layer() -> CorsLayer {
    match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    }
}

pub async fn vocabulary_handler(State(state): State<AppState>) -> Json<VocabularyResponse> {
    let tokens = state.model.vocabulary().to_vec();
    Json(VocabularyResponse { size: tokens.len(), tokens })
}

pub async fn docs_handler(State(state): State<AppState>) -> Json<Vec<DocSummary>> {
    let docs = state
        .model
        .documents()
        .iter()
        .map(|d| DocSummary { doc_id: d.id.clone(), tokens: d.len() })
        .collect();
    Json(docs)
}

pub async fn term_handler(
    State(state): State<AppState>,
    Path(term): Path<String>,
    Query(params): Query<TermParams>,
) -> Json<TermResponse> {
    // unknown terms are not an error: the report is all zeros
    let key = if params.normalize { state.model.normalize_term(&term).unwrap_or_else(|| term.clone()) } else { term.clone() };
    Json(TermResponse { query: term, report: state.model.term_report(&key) })
}

pub async fn topics_handler(State(state): State<AppState>, Path(doc_id): Path<String>) -> Result<Json<TopicsResponse>, ApiError> {
    let proportions = state.model.topic_proportions(&doc_id).ok_or_else(|| not_found(&doc_id))?.clone();
    let num_topics = state.model.topics().num_topics;
    Ok(Json(TopicsResponse { doc_id, num_topics, proportions }))
}

pub async fn top_terms_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
    Query(params): Query<TopParams>,
) -> Result<Json<TopTermsResponse>, ApiError> {
    let k = params.k.max(1).min(100);
    let terms = state.model.top_terms(&doc_id, k).ok_or_else(|| not_found(&doc_id))?;
    Ok(Json(TopTermsResponse { doc_id, terms }))
}

fn not_found(doc_id: &str) -> ApiError {
    (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "not found", "doc_id": doc_id })))
}

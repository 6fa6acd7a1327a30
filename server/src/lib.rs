use anyhow::{Context, Result};
use axum::{extract::{Query, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use invindex::{CodecKind, InvertedIndex};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub index_path: PathBuf,
    pub codec: CodecKind,
    /// Required in `X-ADMIN-TOKEN` for admin endpoints; admin is disabled when unset.
    pub admin_token: Option<String>,
    /// Comma-separated origins; any origin when unset or empty.
    pub cors_allow_origin: Option<String>,
}

impl ServerConfig {
    pub fn new(index_path: impl Into<PathBuf>, codec: CodecKind) -> Self {
        Self { index_path: index_path.into(), codec, admin_token: None, cors_allow_origin: None }
    }

    /// Fill the optional settings from `ADMIN_TOKEN` and `CORS_ALLOW_ORIGIN`.
    pub fn with_env(mut self) -> Self {
        self.admin_token = std::env::var("ADMIN_TOKEN").ok();
        self.cors_allow_origin = std::env::var("CORS_ALLOW_ORIGIN").ok();
        self
    }
}

#[derive(Deserialize)]
pub struct QueryParams {
    #[serde(default)]
    pub q: String,
    /// Term separator; whitespace when absent.
    pub sep: Option<String>,
}

#[derive(Serialize)]
pub struct QueryResponse {
    pub terms: Vec<String>,
    pub total_hits: usize,
    pub doc_ids: Vec<String>,
    pub took_s: f64,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub num_terms: usize,
    pub codec: CodecKind,
    pub index_path: String,
}

/// Shared application state. The index itself is never mutated: a reload
/// swaps in a freshly loaded value and readers keep whichever `Arc` they took.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ServerConfig>,
    index: Arc<RwLock<Arc<InvertedIndex>>>,
}

impl AppState {
    pub fn load(config: ServerConfig) -> Result<Self> {
        let index = load_index(&config)?;
        Ok(Self { config: Arc::new(config), index: Arc::new(RwLock::new(Arc::new(index))) })
    }

    pub fn index(&self) -> Arc<InvertedIndex> {
        self.index.read().clone()
    }

    fn stats(&self) -> StatsResponse {
        StatsResponse {
            num_terms: self.index().len(),
            codec: self.config.codec,
            index_path: self.config.index_path.display().to_string(),
        }
    }
}

fn load_index(config: &ServerConfig) -> Result<InvertedIndex> {
    InvertedIndex::load(&config.index_path, config.codec).with_context(|| {
        format!("failed to load index {} with {} codec", config.index_path.display(), config.codec)
    })
}

pub fn build_app(config: ServerConfig) -> Result<Router> {
    let cors = cors_layer(config.cors_allow_origin.as_deref());
    let app_state = AppState::load(config)?;

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/query", get(query_handler))
        .route("/stats", get(stats_handler))
        .route("/admin/reload", post(reload_handler))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);
    Ok(app)
}

fn cors_layer(allow_origin: Option<&str>) -> CorsLayer {
    let origins: Vec<_> = allow_origin
        .unwrap_or("")
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();
    if origins.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
    }
}

pub fn split_terms(q: &str, sep: Option<&str>) -> Vec<String> {
    let words: Box<dyn Iterator<Item = &str> + '_> = match sep.filter(|s| !s.is_empty()) {
        Some(sep) => Box::new(q.split(sep)),
        None => Box::new(q.split_whitespace()),
    };
    words.map(str::trim).filter(|w| !w.is_empty()).map(str::to_string).collect()
}

pub async fn query_handler(State(state): State<AppState>, Query(params): Query<QueryParams>) -> Json<QueryResponse> {
    let start = std::time::Instant::now();
    let terms = split_terms(&params.q, params.sep.as_deref());
    let doc_ids = state.index().query(terms.as_slice());
    let elapsed = start.elapsed();
    tracing::debug!(?terms, hits = doc_ids.len(), "query");
    Json(QueryResponse { terms, total_hits: doc_ids.len(), doc_ids, took_s: elapsed.as_secs_f64() })
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.stats())
}

async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<StatsResponse>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let config = state.config.clone();
    let loaded = tokio::task::spawn_blocking(move || load_index(&config))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("reload task failed: {e}")))?;
    match loaded {
        Ok(index) => {
            *state.index.write() = Arc::new(index);
            let stats = state.stats();
            tracing::info!(num_terms = stats.num_terms, "index reloaded");
            Ok(Json(stats))
        }
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "reload failed, keeping current index");
            Err((StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")))
        }
    }
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.config.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}

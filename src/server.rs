use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::sync::Arc;

use anyhow::Result;
use askama::Template;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::catalog::{Catalog, PoiTable};
use crate::cascade::Recommender;
use crate::config::AppConfig;
use crate::models::{
    HealthResponse, ParseQueryRequest, ParseQueryResponse, RecommendRequest, ResultEnvelope,
};

#[derive(Clone)]
struct AppState {
    config: Arc<AppConfig>,
    recommender: Recommender<PoiTable>,
}

impl AppState {
    fn rng(&self) -> StdRng {
        match self.config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    fn top_k(&self, requested: Option<usize>) -> Result<NonZeroUsize, ApiError> {
        let value = requested.unwrap_or(self.config.default_top_k);
        NonZeroUsize::new(value)
            .ok_or_else(|| ApiError::bad_request("top_k must be at least 1".to_string()))
    }
}

pub fn router(config: AppConfig, recommender: Recommender<PoiTable>) -> Router {
    let state = AppState {
        config: Arc::new(config),
        recommender,
    };

    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health))
        .route("/api/parse-query", post(parse_query_handler))
        .route("/api/recommend", post(recommend_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: AppConfig, recommender: Recommender<PoiTable>) -> Result<()> {
    let addr: SocketAddr = config.bind_addr.parse()?;
    let app = router(config, recommender);

    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "SpatiaLynk API is running.".to_string(),
        catalog_rows: state.recommender.catalog().len(),
    })
}

async fn parse_query_handler(
    State(state): State<AppState>,
    Json(request): Json<ParseQueryRequest>,
) -> Json<ParseQueryResponse> {
    let parsed = state.recommender.parse(&request.query);
    Json(ParseQueryResponse {
        raw_query: request.query,
        parsed,
    })
}

async fn recommend_handler(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> Result<Json<ResultEnvelope>, ApiError> {
    let top_k = state.top_k(request.top_k)?;
    let envelope = state
        .recommender
        .recommend(&request.query, top_k, &mut state.rng());
    Ok(Json(envelope))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
    k: Option<usize>,
}

async fn index_page(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Html<String>, ApiError> {
    let query = params.q.unwrap_or_default();
    let top_k = state.top_k(params.k)?;

    let mut template = IndexTemplate {
        query: query.clone(),
        top_k: top_k.get(),
        searched: false,
        level: String::new(),
        level_reason: String::new(),
        category_reason: String::new(),
        cards: Vec::new(),
    };

    if !query.trim().is_empty() {
        let envelope = state.recommender.recommend(&query, top_k, &mut state.rng());
        template.searched = true;
        template.level = envelope.level.as_str().to_string();
        template.level_reason = envelope.explanation.level_reason;
        template.category_reason = envelope.explanation.category_reason;
        template.cards = envelope
            .results
            .into_iter()
            .zip(envelope.poi_explanations)
            .map(|(poi, reason)| ResultCard {
                name: poi.name,
                category: poi.category,
                district: poi.district,
                region: poi.region,
                characteristic: poi.characteristic.unwrap_or_default(),
                reason,
            })
            .collect();
    }

    let body = template.render().map_err(ApiError::from)?;
    Ok(Html(body))
}

struct ResultCard {
    name: String,
    category: String,
    district: String,
    region: String,
    characteristic: String,
    reason: String,
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    query: String,
    top_k: usize,
    searched: bool,
    level: String,
    level_reason: String,
    category_reason: String,
    cards: Vec<ResultCard>,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: String) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message,
        }
    }
}

impl From<askama::Error> for ApiError {
    fn from(value: askama::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: value.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::Vocabulary;
    use crate::test_support::fixture_catalog;

    fn state(seed: Option<u64>) -> AppState {
        AppState {
            config: Arc::new(AppConfig {
                bind_addr: "127.0.0.1:0".to_string(),
                data_dir: std::env::temp_dir(),
                default_top_k: 5,
                rng_seed: seed,
                vocabulary_path: None,
            }),
            recommender: Recommender::new(
                Arc::new(fixture_catalog()),
                Arc::new(Vocabulary::builtin()),
            ),
        }
    }

    #[test]
    fn zero_top_k_is_rejected() {
        let err = state(None).top_k(Some(0)).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(state(None).top_k(None).unwrap().get(), 5);
    }

    #[tokio::test]
    async fn recommend_handler_returns_envelope() {
        let Json(envelope) = recommend_handler(
            State(state(Some(11))),
            Json(RecommendRequest {
                query: "Cafes in the east".to_string(),
                top_k: Some(5),
            }),
        )
        .await
        .unwrap();

        let body = serde_json::to_value(&envelope).unwrap();
        assert_eq!(body["level"], "region");
        assert_eq!(body["scope_label"], "EAST");
        assert_eq!(body["parsed"]["location"]["level"], "region");
        assert_eq!(body["parsed"]["categories"], serde_json::json!(["cafe"]));
        assert_eq!(
            body["results"].as_array().unwrap().len(),
            body["poi_explanations"].as_array().unwrap().len()
        );
    }

    #[tokio::test]
    async fn seeded_state_is_deterministic() {
        let request = || RecommendRequest {
            query: "Fun things to do in Singapore".to_string(),
            top_k: Some(3),
        };

        let Json(first) = recommend_handler(State(state(Some(4))), Json(request()))
            .await
            .unwrap();
        let Json(second) = recommend_handler(State(state(Some(4))), Json(request()))
            .await
            .unwrap();
        assert_eq!(first.results, second.results);
    }

    #[tokio::test]
    async fn index_page_renders_cards() {
        let Html(body) = index_page(
            State(state(Some(1))),
            Query(SearchParams {
                q: Some("I want to visit Hougang Mall".to_string()),
                k: Some(3),
            }),
        )
        .await
        .unwrap();

        assert!(body.contains("Hougang Mall"));
        assert!(body.contains("poi"));
    }
}

//! Axum HTTP server exposing the address tagging pipeline as JSON endpoints

mod config;

use std::sync::Arc;

use address_core::{
    corpus::demo_texts, AddressError, AddressParser, ReferenceSets, TaggedAddress, TaggedToken,
    TokenFeatures,
};
use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

/// Shared application state
struct AppState {
    parser: AddressParser,
}

#[derive(Deserialize)]
struct AddressRequest {
    text: String,
}

#[derive(Serialize)]
struct ParseResponse {
    tagged_tokens: Vec<TaggedToken>,
    total_tokens: usize,
}

#[derive(Serialize)]
struct TagResponse {
    components: TaggedAddress,
}

#[derive(Serialize)]
struct FeaturesResponse {
    features: Vec<TokenFeatures>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env()?;
    let reference = match &config.reference_csv {
        Some(path) => {
            info!(path = %path.display(), "loading reference table");
            ReferenceSets::from_csv_path(path)
                .with_context(|| format!("loading reference table {}", path.display()))?
        }
        None => ReferenceSets::sample(),
    };

    let parser = tokio::task::spawn_blocking(move || AddressParser::pretrained_with(reference, config.training))
        .await??;
    let state = Arc::new(AppState { parser });

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("address server listening on http://{}", config.addr);
    axum::serve(listener, app(state)).await?;
    Ok(())
}

fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/parse", post(parse_handler))
        .route("/tag", post(tag_handler))
        .route("/features", post(features_handler))
        .route("/demo-texts", get(demo_texts_handler))
        .layer(cors)
        .with_state(state)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

fn empty_text() -> Response {
    error_response(StatusCode::BAD_REQUEST, "empty text")
}

fn pipeline_error(err: AddressError) -> Response {
    warn!(error = %err, "address pipeline failed");
    match err {
        AddressError::ModelUnavailable => error_response(StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
        other => error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

/// Labelled tokens for one address
async fn parse_handler(State(state): State<Arc<AppState>>, Json(req): Json<AddressRequest>) -> Response {
    if req.text.trim().is_empty() {
        return empty_text();
    }
    match state.parser.parse(&req.text) {
        Ok(tagged_tokens) => Json(ParseResponse {
            total_tokens: tagged_tokens.len(),
            tagged_tokens,
        })
        .into_response(),
        Err(err) => pipeline_error(err),
    }
}

/// Assembled components for one address
async fn tag_handler(State(state): State<Arc<AppState>>, Json(req): Json<AddressRequest>) -> Response {
    if req.text.trim().is_empty() {
        return empty_text();
    }
    match state.parser.tag(&req.text) {
        Ok(components) => Json(TagResponse { components }).into_response(),
        Err(err) => pipeline_error(err),
    }
}

/// Feature maps the tagger sees, for inspection
async fn features_handler(State(state): State<Arc<AppState>>, Json(req): Json<AddressRequest>) -> Response {
    if req.text.trim().is_empty() {
        return empty_text();
    }
    Json(FeaturesResponse {
        features: state.parser.features(&req.text),
    })
    .into_response()
}

async fn demo_texts_handler() -> impl IntoResponse {
    let texts: Vec<serde_json::Value> = demo_texts()
        .iter()
        .map(|(kind, text)| serde_json::json!({ "kind": kind, "text": text }))
        .collect();
    Json(texts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use address_core::{Label, Lexicon};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn untrained() -> Arc<AppState> {
        Arc::new(AppState {
            parser: AddressParser::new(Lexicon::standard(), ReferenceSets::sample()),
        })
    }

    fn with_rules() -> Arc<AppState> {
        let tagger = |features: &[TokenFeatures]| {
            features
                .iter()
                .map(|fm| {
                    if fm.get_bool("posttown") == Some(true) {
                        Label::TownName
                    } else {
                        Label::StreetName
                    }
                })
                .collect::<Vec<_>>()
        };
        Arc::new(AppState {
            parser: AddressParser::new(Lexicon::standard(), ReferenceSets::sample()).with_tagger(tagger),
        })
    }

    async fn post_json(state: Arc<AppState>, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_tag_endpoint() {
        let (status, json) = post_json(with_rules(), "/tag", r#"{"text":"Mill Lane, Leeds"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["components"]["StreetName"], "Mill Lane");
        assert_eq!(json["components"]["TownName"], "Leeds");
    }

    #[tokio::test]
    async fn test_parse_endpoint() {
        let (status, json) = post_json(with_rules(), "/parse", r#"{"text":"Mill Lane, Leeds"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_tokens"], 3);
        assert_eq!(json["tagged_tokens"][2]["label"], "TownName");
        assert_eq!(json["tagged_tokens"][1]["token"]["text"], "Lane,");
    }

    #[tokio::test]
    async fn test_model_unavailable_is_503() {
        let (status, json) = post_json(untrained(), "/tag", r#"{"text":"Mill Lane"}"#).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(json["error"].as_str().unwrap().contains("missing model"));
    }

    #[tokio::test]
    async fn test_features_without_model() {
        let (status, json) = post_json(untrained(), "/features", r#"{"text":"10 Mill Lane"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["features"][0]["digits"], "all_digits");
        assert_eq!(json["features"][0]["rawstring.start"], true);
    }

    #[tokio::test]
    async fn test_empty_text_is_400() {
        let (status, _) = post_json(with_rules(), "/parse", r#"{"text":"   "}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

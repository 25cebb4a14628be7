//! Federated wiki "foreign server" endpoints.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Static description page |
//! | `GET`  | `/system/sitemap.json` | Sitemap, `Last-Modified` = feed fetch time |
//! | `GET`  | `/system/site-index.json` | MiniSearch index export |
//! | `GET`  | `/{slug}.json` | Rendered page document |
//! | `GET`  | `/favicon.png` | Site flag |
//!
//! Every request first gives the refresh scheduler a chance to rebuild a
//! stale wiki. Handlers then work on one snapshot for their whole lifetime.

mod assets;

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use crate::app::WikiError;
use crate::refresh::RefreshScheduler;
use crate::render::render;

#[derive(Clone)]
pub struct AppState {
    pub scheduler: Arc<RefreshScheduler>,
    pub feed_url: Arc<str>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_index))
        .route("/favicon.png", get(handle_flag))
        .route("/favicon.ico", get(handle_flag))
        .route("/system/sitemap.json", get(handle_sitemap))
        .route("/system/site-index.json", get(handle_site_index))
        .route("/{file}", get(handle_page))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            refresh_before_routing,
        ))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(bind: &str, state: AppState) -> anyhow::Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("Wiki listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn refresh_before_routing(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    state.scheduler.maybe_refresh(Utc::now()).await;
    next.run(request).await
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<WikiError> for ApiError {
    fn from(err: WikiError) -> Self {
        match err {
            WikiError::NotFound(_) => ApiError {
                status: StatusCode::NOT_FOUND,
                code: "not_found",
                message: err.to_string(),
            },
            other => ApiError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "internal",
                message: other.to_string(),
            },
        }
    }
}

fn http_date(date: DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

// ============ Handlers ============

async fn handle_index(State(state): State<AppState>) -> Html<String> {
    Html(assets::index_page(&state.feed_url))
}

async fn handle_flag() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/svg+xml")], assets::FLAG_SVG)
}

async fn handle_sitemap(State(state): State<AppState>) -> Response {
    let snapshot = state.scheduler.snapshot();
    (
        [(header::LAST_MODIFIED, http_date(snapshot.last_update()))],
        Json(snapshot.sitemap()),
    )
        .into_response()
}

async fn handle_site_index(State(state): State<AppState>) -> Response {
    let snapshot = state.scheduler.snapshot();
    Json(snapshot.search_index().export()).into_response()
}

async fn handle_page(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response, ApiError> {
    let slug = file
        .strip_suffix(".json")
        .ok_or_else(|| WikiError::NotFound(file.clone()))?;

    let snapshot = state.scheduler.snapshot();
    let document = render(slug, &snapshot)?;
    Ok(Json(document).into_response())
}

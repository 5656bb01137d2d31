use std::{sync::Arc, time::Duration};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

/// How long `/slow` waits before answering.
pub const SLOW_DELAY: Duration = Duration::from_secs(2);
pub const BEARER_TOKEN: &str = "Bearer secret";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub name: String,
}

/// Status texts posted to `/status`, oldest first.
pub type Statuses = Arc<RwLock<Vec<String>>>;

pub fn app() -> Router {
    let statuses: Statuses = Arc::default();
    Router::new()
        .route("/status", get(last_status).post(record_status))
        .route("/status/{code}", get(fixed_status))
        .route("/items", get(list_items))
        .route("/bytes/{len}", get(pattern_bytes))
        .route("/text", get(text))
        .route("/latin1", get(latin1))
        .route("/headers/{name}", get(echo_header))
        .route("/protected", get(protected))
        .route("/slow", get(slow))
        .with_state(statuses)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    tracing::debug!(addr = ?listener.local_addr().ok(), "mock server starting");
    axum::serve(listener, app()).await
}

/// Bytes served by `/bytes/{len}`.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

pub fn sample_items() -> Vec<Item> {
    vec![
        Item {
            id: 1,
            name: "first".to_string(),
        },
        Item {
            id: 2,
            name: "second".to_string(),
        },
    ]
}

async fn fixed_status(Path(code): Path<u16>) -> Result<(StatusCode, String), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, format!("status {code}")))
}

async fn list_items() -> Json<Vec<Item>> {
    Json(sample_items())
}

async fn pattern_bytes(Path(len): Path<usize>) -> ([(header::HeaderName, &'static str); 1], Vec<u8>) {
    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        pattern(len),
    )
}

async fn text() -> &'static str {
    "hello, world"
}

async fn latin1() -> ([(header::HeaderName, &'static str); 1], Vec<u8>) {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=iso-8859-1")],
        b"caf\xe9".to_vec(),
    )
}

async fn echo_header(Path(name): Path<String>, headers: HeaderMap) -> Result<String, StatusCode> {
    headers
        .get(name.as_str())
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn protected(headers: HeaderMap) -> Result<Json<Vec<Item>>, StatusCode> {
    match headers.get(header::AUTHORIZATION).map(|v| v.as_bytes()) {
        None => Err(StatusCode::UNAUTHORIZED),
        Some(value) if value == BEARER_TOKEN.as_bytes() => Ok(Json(sample_items())),
        Some(_) => Err(StatusCode::FORBIDDEN),
    }
}

async fn slow() -> &'static str {
    tokio::time::sleep(SLOW_DELAY).await;
    "finally"
}

async fn record_status(State(statuses): State<Statuses>, body: String) -> StatusCode {
    tracing::debug!(status = %body, "status recorded");
    statuses.write().await.push(body);
    StatusCode::OK
}

async fn last_status(State(statuses): State<Statuses>) -> Result<String, StatusCode> {
    statuses.read().await.last().cloned().ok_or(StatusCode::NOT_FOUND)
}

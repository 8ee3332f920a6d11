use axum::{
    debug_handler,
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, put},
    Json, Router,
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
#[allow(unused)]
use metrics::{counter, gauge, histogram};
use serde_json::Value;
use std::{
    num::NonZeroU32,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// Shared state of a mock API instance.
#[derive(Clone)]
pub struct MockState {
    inner: Arc<Inner>,
}

struct Inner {
    token: String,
    updates: AtomicU64,
    unauthorized: AtomicU64,
    limiter: DefaultDirectRateLimiter,
    tps: AtomicU64,
}

impl MockState {
    /// Accept `token` as the only valid bearer token; `/limited` admits `max_tps` per second.
    pub fn new(token: &str, max_tps: u32) -> Self {
        Self {
            inner: Arc::new(Inner {
                token: token.to_string(),
                updates: AtomicU64::new(0),
                unauthorized: AtomicU64::new(0),
                limiter: rate_limiter(max_tps),
                tps: AtomicU64::new(0),
            }),
        }
    }

    /// Authorized `PUT`s served so far.
    pub fn updates(&self) -> u64 {
        self.inner.updates.load(Ordering::Acquire)
    }

    /// Requests rejected for a missing or wrong bearer token.
    pub fn unauthorized(&self) -> u64 {
        self.inner.unauthorized.load(Ordering::Acquire)
    }
}

pub fn app(state: MockState) -> Router {
    Router::new()
        .route("/api/notes/:id", put(update))
        .route("/api/project/:id", put(update))
        .route("/api/templates/:id", put(update))
        .route("/limited", get(limited))
        .route("/status/:code", get(status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(listener: TcpListener, state: MockState) -> std::io::Result<()> {
    info!("Mock service listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state)).await
}

#[debug_handler]
async fn update(
    State(state): State<MockState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    state.inner.tps.fetch_add(1, Ordering::Relaxed);

    let expected = format!("Bearer {}", state.inner.token);
    let authorized = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == expected);
    if !authorized {
        state.inner.unauthorized.fetch_add(1, Ordering::AcqRel);
        counter!("mock_service.unauthorized").increment(1);
        return Err(StatusCode::UNAUTHORIZED);
    }
    if !body.is_object() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    state.inner.updates.fetch_add(1, Ordering::AcqRel);
    counter!("mock_service.updates").increment(1);
    debug!("Updated {id}");
    Ok(Json(body))
}

#[debug_handler]
async fn limited(State(state): State<MockState>) -> StatusCode {
    state.inner.tps.fetch_add(1, Ordering::Relaxed);
    match state.inner.limiter.check() {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::TOO_MANY_REQUESTS,
    }
}

#[debug_handler]
async fn status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

/** Utils **/

pub fn rate_limiter(tps: u32) -> DefaultDirectRateLimiter {
    RateLimiter::direct(Quota::per_second(
        NonZeroU32::new(tps).unwrap_or(NonZeroU32::MIN),
    ))
}

/** TPS Printer **/

pub async fn tps_measure_task(state: MockState) {
    loop {
        tokio::time::sleep(Duration::from_millis(1000)).await;
        let requests = state.inner.tps.swap(0, Ordering::Relaxed);
        gauge!("mock_service.tps").set(requests as f64);
        info!("{requests} TPS");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    async fn spawn(state: MockState) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener, state));
        addr
    }

    #[tokio::test]
    #[ntest::timeout(5_000)]
    async fn updates_require_bearer_token() {
        let state = MockState::new("secret", 10);
        let addr = spawn(state.clone()).await;
        let client = reqwest::Client::new();
        let url = format!("http://{addr}/api/notes/1");

        let res = client
            .put(&url)
            .bearer_auth("secret")
            .json(&serde_json::json!({ "slug": "x" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), reqwest::StatusCode::OK);

        let res = client
            .put(&url)
            .bearer_auth("wrong")
            .json(&serde_json::json!({ "slug": "x" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), reqwest::StatusCode::UNAUTHORIZED);

        assert_eq!(state.updates(), 1);
        assert_eq!(state.unauthorized(), 1);
    }

    #[tokio::test]
    #[ntest::timeout(5_000)]
    async fn limited_rejects_over_quota() {
        let addr = spawn(MockState::new("secret", 1)).await;
        let client = reqwest::Client::new();
        let url = format!("http://{addr}/limited");

        let mut statuses = vec![];
        for _ in 0..5 {
            statuses.push(client.get(&url).send().await.unwrap().status());
        }
        assert_eq!(statuses[0], reqwest::StatusCode::OK);
        assert!(statuses.contains(&reqwest::StatusCode::TOO_MANY_REQUESTS));
    }
}

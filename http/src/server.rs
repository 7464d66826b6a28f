use crate::health::HealthEndpoint;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use dbsd_core::metrics::DiscoveryMetrics;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// State shared by the HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
  pub health: HealthEndpoint,
  pub metrics: DiscoveryMetrics,
}

/// `/metrics` (Prometheus text) and `/healthz` (JSON, 503 until ready).
pub fn router(state: HttpState) -> Router {
  Router::new()
    .route("/metrics", get(metrics))
    .route("/healthz", get(healthz))
    .with_state(state)
}

/// Serve [`router`] on `addr` until `shutdown` fires.
pub async fn serve(addr: &str, state: HttpState, shutdown: CancellationToken) -> anyhow::Result<()> {
  let listener = tokio::net::TcpListener::bind(addr).await?;
  info!(addr = %listener.local_addr()?, "http listener bound");

  axum::serve(listener, router(state))
    .with_graceful_shutdown(shutdown.cancelled_owned())
    .await?;

  info!("http listener stopped");
  Ok(())
}

async fn metrics(State(state): State<HttpState>) -> impl IntoResponse {
  (
    [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
    state.metrics.encode(),
  )
}

async fn healthz(State(state): State<HttpState>) -> impl IntoResponse {
  let status = if state.health.is_ready() && state.health.is_live() {
    StatusCode::OK
  } else {
    StatusCode::SERVICE_UNAVAILABLE
  };
  (
    status,
    [(header::CONTENT_TYPE, "application/json")],
    state.health.status_json(),
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::body::{to_bytes, Body};
  use axum::http::Request;
  use tower::ServiceExt;

  fn state() -> HttpState {
    HttpState {
      health: HealthEndpoint::new(),
      metrics: DiscoveryMetrics::new("database").unwrap(),
    }
  }

  async fn get_path(app: Router, path: &str) -> (StatusCode, String) {
    let response = app
      .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
      .await
      .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
  }

  #[tokio::test]
  async fn healthz_is_unavailable_until_first_cycle() {
    let state = state();
    let (status, _) = get_path(router(state.clone()), "/healthz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    state.health.record_cycle(true);
    let (status, body) = get_path(router(state), "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""ready":true"#));
  }

  #[tokio::test]
  async fn metrics_exposes_refresh_counters() {
    let state = state();
    state.metrics.refreshes.inc();
    let (status, body) = get_path(router(state), "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("dbsd_refreshes_total"));
  }
}

//! Relay routes

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

#[derive(Clone)]
struct RelayState {
    client: reqwest::Client,
}

/// Build the relay router: the proxy endpoint plus a health probe.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/proxy", get(proxy))
        .with_state(RelayState {
            client: reqwest::Client::new(),
        })
}

#[derive(Debug, Deserialize)]
struct ProxyQuery {
    url: Option<String>,
}

/// `GET /api/proxy?url=<absolute URL>`
///
/// Forwards the GET and relays whatever status and body the upstream
/// produced, labelled `text/plain` regardless of the true content type.
/// Binary payloads still pass through intact; callers wanting them must read
/// the body as bytes. The upstream status is the caller's to check; a relay
/// round trip completing says nothing about upstream success.
async fn proxy(State(state): State<RelayState>, Query(query): Query<ProxyQuery>) -> Response {
    let Some(target) = query.url else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing url parameter" })),
        )
            .into_response();
    };

    debug!("Forwarding GET {}", target);
    let upstream = match state.client.get(&target).send().await {
        Ok(response) => response,
        Err(err) => return transport_error(err),
    };

    let status =
        StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    match upstream.bytes().await {
        Ok(body) => (
            status,
            [(header::CONTENT_TYPE, "text/plain")],
            body.to_vec(),
        )
            .into_response(),
        Err(err) => transport_error(err),
    }
}

fn transport_error(err: reqwest::Error) -> Response {
    warn!("Upstream fetch failed: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": err.to_string() })),
    )
        .into_response()
}

async fn health() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get as route_get;
    use tokio::net::TcpListener;

    /// Serve a router on an ephemeral port, returning its base address.
    async fn spawn(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn spawn_relay() -> String {
        spawn(router()).await
    }

    async fn spawn_upstream() -> String {
        let app = Router::new()
            .route("/page", route_get(|| async { "<html>hi</html>" }))
            .route(
                "/image.png",
                route_get(|| async { b"\x89PNG____".to_vec() }),
            )
            .route(
                "/teapot",
                route_get(|| async { (StatusCode::IM_A_TEAPOT, "short and stout") }),
            );
        spawn(app).await
    }

    #[tokio::test]
    async fn test_missing_url_parameter_is_a_client_error() {
        let relay = spawn_relay().await;
        let response = reqwest::get(format!("{}/api/proxy", relay)).await.unwrap();
        assert_eq!(response.status().as_u16(), 400);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Missing url parameter");
    }

    #[tokio::test]
    async fn test_body_and_content_type_passthrough() {
        let relay = spawn_relay().await;
        let upstream = spawn_upstream().await;

        let response = reqwest::get(format!("{}/api/proxy?url={}/page", relay, upstream))
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(
            response.headers()[reqwest::header::CONTENT_TYPE],
            "text/plain"
        );
        assert_eq!(response.text().await.unwrap(), "<html>hi</html>");
    }

    #[tokio::test]
    async fn test_binary_body_survives_verbatim() {
        let relay = spawn_relay().await;
        let upstream = spawn_upstream().await;

        let response = reqwest::get(format!("{}/api/proxy?url={}/image.png", relay, upstream))
            .await
            .unwrap();
        assert_eq!(
            response.bytes().await.unwrap().as_ref(),
            b"\x89PNG____"
        );
    }

    #[tokio::test]
    async fn test_upstream_status_is_relayed_not_masked() {
        let relay = spawn_relay().await;
        let upstream = spawn_upstream().await;

        let response = reqwest::get(format!("{}/api/proxy?url={}/teapot", relay, upstream))
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 418);
        assert_eq!(response.text().await.unwrap(), "short and stout");

        let response = reqwest::get(format!("{}/api/proxy?url={}/nowhere", relay, upstream))
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 404);
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces_as_500_with_message() {
        let relay = spawn_relay().await;
        // Nothing listens on port 1
        let response = reqwest::get(format!(
            "{}/api/proxy?url=http://127.0.0.1:1/",
            relay
        ))
        .await
        .unwrap();
        assert_eq!(response.status().as_u16(), 500);
        let body: serde_json::Value = response.json().await.unwrap();
        assert!(body["error"].as_str().is_some_and(|msg| !msg.is_empty()));
    }

    #[tokio::test]
    async fn test_health_probe() {
        let relay = spawn_relay().await;
        let response = reqwest::get(format!("{}/health", relay)).await.unwrap();
        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(response.text().await.unwrap(), "OK");
    }
}

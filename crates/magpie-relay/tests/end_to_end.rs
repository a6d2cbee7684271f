//! End-to-end inspection through the real relay: upstream site, relay, and
//! pipeline all talking over local sockets.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use magpie_core::{
    HistoryStore, InspectConfig, InspectEvent, Inspector, MemoryStore, RelayClient,
};
use tokio::net::TcpListener;
use url::Url;

async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// An upstream site whose page references its own images by absolute URL:
/// one that resolves, one that 404s, one tag with no source at all.
async fn spawn_site() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let page = format!(
        r#"<html><head><title>Demo Site</title></head><body>
            <img src="http://{addr}/logo.gif">
            <img src="http://{addr}/gone.gif">
            <img>
            <a href="/about">About us</a>
            <a href="https://elsewhere.test/page">Away</a>
        </body></html>"#
    );
    let app = Router::new()
        .route("/", get(move || async move { axum::response::Html(page) }))
        .route("/logo.gif", get(|| async { b"GIF89a".to_vec() }))
        .route(
            "/gone.gif",
            get(|| async { StatusCode::NOT_FOUND.into_response() }),
        );
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn inspector_against_relay() -> Inspector<MemoryStore> {
    let relay = spawn(magpie_relay::router()).await;
    Inspector::new(
        RelayClient::new(Url::parse(&relay).unwrap()),
        HistoryStore::new(MemoryStore::new()),
        InspectConfig::default(),
    )
}

#[tokio::test]
async fn test_inspection_through_real_relay() {
    let site = spawn_site().await;
    let mut inspector = inspector_against_relay().await;

    let mut loads = Vec::new();
    let page = inspector
        .inspect(&site, |event| {
            if let InspectEvent::ImageLoaded { loaded, .. } = event {
                loads.push(loaded);
            }
        })
        .await
        .unwrap();

    assert_eq!(page.title, "Demo Site");
    assert_eq!(page.total_image_count, 3);
    assert_eq!(page.images_not_found, 1);
    assert_eq!(page.images.len(), 2);

    assert_eq!(page.images[0].file_type, "gif");
    assert_eq!(page.images[0].size, 6);
    assert_eq!(page.images[1].size, -1);
    assert_eq!(page.images[1].file_type, "unknown");

    assert_eq!(loads, vec![1, 2, 3]);

    assert_eq!(page.internal_links.len(), 1);
    assert!(page.internal_links[0].src.ends_with("/about"));
    assert_eq!(page.external_links.len(), 1);
    assert_eq!(page.external_links[0].src, "https://elsewhere.test/page");

    let entries = inspector.history().list();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].pages[0].url, page.url);
}

#[tokio::test]
async fn test_unreachable_site_through_real_relay() {
    let mut inspector = inspector_against_relay().await;

    // The relay reports its own transport failure as a 500, which the
    // pipeline must treat as a failed document fetch.
    let err = inspector
        .inspect("http://127.0.0.1:1/", |_| {})
        .await
        .unwrap_err();
    match err {
        magpie_core::MagpieError::DocumentFetch { status, .. } => assert_eq!(status, 500),
        other => panic!("unexpected error: {other}"),
    }
    assert!(inspector.history().list().is_empty());
}

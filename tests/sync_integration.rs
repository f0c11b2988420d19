use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use std::fs;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use zelig_docs::assets::{manifest_path, sync_all, Asset, SyncManifest, ASSETS};
use zelig_docs::config::SiteConfig;
use zelig_docs::DocsError;

const MODELS_JSON: &[u8] = br#"{"ls": {"name": "Least Squares Regression"}}"#;
const CHOICE_JSON: &[u8] = br#"{"blogit": {"name": "Bivariate Logistic Regression"}}"#;
const TREE_HTML: &[u8] = b"<ul class=\"models\"><li>ls</li><li>logit</li></ul>";
const NAV_HTML: &[u8] = b"<li><a href=\"index.html\">Zelig</a></li>";

/// Start an in-process HTTP server and return its address
async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to read local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    addr
}

/// An upstream serving all four navigation assets
fn upstream() -> Router {
    Router::new()
        .route(
            "/_static/zelig5models.json",
            get(|| async { MODELS_JSON.to_vec() }),
        )
        .route(
            "/_static/zelig5choicemodels.json",
            get(|| async { CHOICE_JSON.to_vec() }),
        )
        .route(
            "/_static/modelstree.html",
            get(|| async { TREE_HTML.to_vec() }),
        )
        .route("/zelignav.html", get(|| async { NAV_HTML.to_vec() }))
}

/// The fixed asset table resolved against the test server
fn assets_for(addr: SocketAddr) -> Vec<Asset> {
    let base = format!("http://{addr}");
    ASSETS.iter().map(|info| info.resolve(&base)).collect()
}

fn test_config() -> SiteConfig {
    let mut config = SiteConfig::default();
    config.sync.timeout_secs = 5;
    config.sync.attempts = 2;
    config.sync.backoff_ms = 10;
    config
}

#[tokio::test]
async fn test_sync_installs_all_assets() {
    let addr = serve(upstream()).await;
    let root = TempDir::new().expect("Failed to create temp root");
    let config = test_config();

    let report = sync_all(root.path(), &assets_for(addr), &config.sync, false)
        .await
        .expect("Sync should succeed");

    assert_eq!(report.written(), 4);
    assert_eq!(report.unchanged(), 0);

    // Every asset landed byte for byte, including under the created _static/
    assert_eq!(
        fs::read(root.path().join("_static/zelig5models.json")).unwrap(),
        MODELS_JSON
    );
    assert_eq!(
        fs::read(root.path().join("_static/zelig5choicemodels.json")).unwrap(),
        CHOICE_JSON
    );
    assert_eq!(
        fs::read(root.path().join("_static/modelstree.html")).unwrap(),
        TREE_HTML
    );
    assert_eq!(fs::read(root.path().join("zelignav.html")).unwrap(), NAV_HTML);

    // Manifest records every asset
    let manifest =
        SyncManifest::load(&manifest_path(root.path())).expect("Manifest should load");
    assert_eq!(manifest.assets.len(), 4);
    for entry in &manifest.assets {
        assert!(entry.checksum.starts_with("sha256:"), "{}", entry.checksum);
        assert!(entry.size_bytes > 0);
    }
}

#[tokio::test]
async fn test_resync_skips_unchanged_assets() {
    let addr = serve(upstream()).await;
    let root = TempDir::new().expect("Failed to create temp root");
    let config = test_config();
    let assets = assets_for(addr);

    sync_all(root.path(), &assets, &config.sync, false)
        .await
        .expect("First sync should succeed");

    let report = sync_all(root.path(), &assets, &config.sync, false)
        .await
        .expect("Second sync should succeed");

    assert_eq!(report.written(), 0);
    assert_eq!(report.unchanged(), 4);
    assert_eq!(fs::read(root.path().join("zelignav.html")).unwrap(), NAV_HTML);
}

#[tokio::test]
async fn test_force_rewrites_unchanged_assets() {
    let addr = serve(upstream()).await;
    let root = TempDir::new().expect("Failed to create temp root");
    let config = test_config();
    let assets = assets_for(addr);

    sync_all(root.path(), &assets, &config.sync, false)
        .await
        .expect("First sync should succeed");

    let report = sync_all(root.path(), &assets, &config.sync, true)
        .await
        .expect("Forced sync should succeed");

    assert_eq!(report.written(), 4);
    assert_eq!(report.unchanged(), 0);
}

#[tokio::test]
async fn test_missing_asset_fails_only_that_asset() {
    // No route for zelignav.html, so the upstream answers 404 for it
    let app = Router::new()
        .route(
            "/_static/zelig5models.json",
            get(|| async { MODELS_JSON.to_vec() }),
        )
        .route(
            "/_static/zelig5choicemodels.json",
            get(|| async { CHOICE_JSON.to_vec() }),
        )
        .route(
            "/_static/modelstree.html",
            get(|| async { TREE_HTML.to_vec() }),
        );
    let addr = serve(app).await;
    let root = TempDir::new().expect("Failed to create temp root");
    let config = test_config();

    let err = sync_all(root.path(), &assets_for(addr), &config.sync, false)
        .await
        .expect_err("Sync should be incomplete");

    assert!(err.to_string().contains("1 of 4"), "{err}");
    assert!(err.to_string().contains("zelignav.html"), "{err}");

    // The other assets still landed
    assert!(root.path().join("_static/zelig5models.json").exists());
    assert!(root.path().join("_static/zelig5choicemodels.json").exists());
    assert!(root.path().join("_static/modelstree.html").exists());
    assert!(!root.path().join("zelignav.html").exists());

    // Successes are recorded even though the sync as a whole failed
    let manifest =
        SyncManifest::load(&manifest_path(root.path())).expect("Manifest should load");
    assert_eq!(manifest.assets.len(), 3);
    assert!(manifest.find("zelignav.html").is_none());
}

#[tokio::test]
async fn test_failed_fetch_preserves_existing_file() {
    // Empty router answers 404 for everything
    let addr = serve(Router::new()).await;
    let root = TempDir::new().expect("Failed to create temp root");
    fs::write(root.path().join("zelignav.html"), b"stale nav").unwrap();

    let config = test_config();
    let err = sync_all(root.path(), &assets_for(addr), &config.sync, false)
        .await
        .expect_err("Sync should fail");

    match err {
        DocsError::SyncIncomplete { total, failed } => {
            assert_eq!(total, 4);
            assert_eq!(failed.len(), 4);
        }
        other => panic!("Expected SyncIncomplete, got {other}"),
    }

    assert_eq!(
        fs::read(root.path().join("zelignav.html")).unwrap(),
        b"stale nav"
    );
}

#[tokio::test]
async fn test_unreachable_upstream_fails_all_assets() {
    // Bind and immediately drop to get an address nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read local addr");
    drop(listener);

    let root = TempDir::new().expect("Failed to create temp root");
    fs::write(root.path().join("zelignav.html"), b"stale nav").unwrap();
    let mut config = test_config();
    config.sync.attempts = 1;

    let err = sync_all(root.path(), &assets_for(addr), &config.sync, false)
        .await
        .expect_err("Sync should fail");

    match err {
        DocsError::SyncIncomplete { total, failed } => {
            assert_eq!(total, 4);
            assert_eq!(failed.len(), 4);
        }
        other => panic!("Expected SyncIncomplete, got {other}"),
    }

    // Nothing new lands, and the prior copy keeps its bytes
    assert!(!root.path().join("_static").exists());
    assert_eq!(
        fs::read(root.path().join("zelignav.html")).unwrap(),
        b"stale nav"
    );
}

async fn counted_bad_json(State(hits): State<Arc<AtomicUsize>>) -> Vec<u8> {
    hits.fetch_add(1, Ordering::SeqCst);
    b"<html>not the index you wanted</html>".to_vec()
}

#[tokio::test]
async fn test_malformed_json_is_rejected_without_retry() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/_static/zelig5models.json", get(counted_bad_json))
        .route(
            "/_static/zelig5choicemodels.json",
            get(|| async { CHOICE_JSON.to_vec() }),
        )
        .route(
            "/_static/modelstree.html",
            get(|| async { TREE_HTML.to_vec() }),
        )
        .route("/zelignav.html", get(|| async { NAV_HTML.to_vec() }))
        .with_state(hits.clone());
    let addr = serve(app).await;
    let root = TempDir::new().expect("Failed to create temp root");
    let config = test_config();

    let err = sync_all(root.path(), &assets_for(addr), &config.sync, false)
        .await
        .expect_err("Sync should be incomplete");

    assert!(err.to_string().contains("zelig5models.json"), "{err}");

    // The bad payload never reaches disk, and bad JSON is not retried
    assert!(!root.path().join("_static/zelig5models.json").exists());
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    // The HTML assets are untouched by the JSON check
    assert!(root.path().join("zelignav.html").exists());
}

async fn flaky_nav(State(hits): State<Arc<AtomicUsize>>) -> (StatusCode, Vec<u8>) {
    let n = hits.fetch_add(1, Ordering::SeqCst);
    if n == 0 {
        (StatusCode::INTERNAL_SERVER_ERROR, Vec::new())
    } else {
        (StatusCode::OK, NAV_HTML.to_vec())
    }
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/_static/zelig5models.json",
            get(|| async { MODELS_JSON.to_vec() }),
        )
        .route(
            "/_static/zelig5choicemodels.json",
            get(|| async { CHOICE_JSON.to_vec() }),
        )
        .route(
            "/_static/modelstree.html",
            get(|| async { TREE_HTML.to_vec() }),
        )
        .route("/zelignav.html", get(flaky_nav))
        .with_state(hits.clone());
    let addr = serve(app).await;
    let root = TempDir::new().expect("Failed to create temp root");
    let config = test_config();

    let report = sync_all(root.path(), &assets_for(addr), &config.sync, false)
        .await
        .expect("Sync should recover after a retry");

    assert_eq!(report.written(), 4);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert_eq!(fs::read(root.path().join("zelignav.html")).unwrap(), NAV_HTML);
}

async fn counted_missing(State(hits): State<Arc<AtomicUsize>>) -> StatusCode {
    hits.fetch_add(1, Ordering::SeqCst);
    StatusCode::NOT_FOUND
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/_static/zelig5models.json",
            get(|| async { MODELS_JSON.to_vec() }),
        )
        .route(
            "/_static/zelig5choicemodels.json",
            get(|| async { CHOICE_JSON.to_vec() }),
        )
        .route(
            "/_static/modelstree.html",
            get(|| async { TREE_HTML.to_vec() }),
        )
        .route("/zelignav.html", get(counted_missing))
        .with_state(hits.clone());
    let addr = serve(app).await;
    let root = TempDir::new().expect("Failed to create temp root");
    let mut config = test_config();
    config.sync.attempts = 3;

    let err = sync_all(root.path(), &assets_for(addr), &config.sync, false)
        .await
        .expect_err("Sync should be incomplete");

    assert!(err.to_string().contains("zelignav.html"), "{err}");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let app = Router::new()
        .route(
            "/_static/zelig5models.json",
            get(|| async { MODELS_JSON.to_vec() }),
        )
        .route(
            "/_static/zelig5choicemodels.json",
            get(|| async { CHOICE_JSON.to_vec() }),
        )
        .route(
            "/_static/modelstree.html",
            get(|| async { TREE_HTML.to_vec() }),
        )
        .route(
            "/zelignav.html",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                NAV_HTML.to_vec()
            }),
        );
    let addr = serve(app).await;
    let root = TempDir::new().expect("Failed to create temp root");
    let mut config = test_config();
    config.sync.timeout_secs = 1;
    config.sync.attempts = 1;

    let err = sync_all(root.path(), &assets_for(addr), &config.sync, false)
        .await
        .expect_err("Sync should time out");

    assert!(err.to_string().contains("zelignav.html"), "{err}");
    assert!(root.path().join("_static/modelstree.html").exists());
    assert!(!root.path().join("zelignav.html").exists());
}

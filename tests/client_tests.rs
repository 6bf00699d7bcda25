use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use glsync::api::GitlabClient;
use glsync::config::GitlabConfig;
use glsync::error::GlsyncError;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use tokio::net::TcpListener;
use url::Url;

async fn spawn_test_server(app: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let base = Url::parse(&format!("http://{addr}")).expect("valid base url");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });

    base
}

fn make_cfg(base_url: Url, retry_max_times: usize) -> GitlabConfig {
    GitlabConfig {
        base_url,
        token: "secret-token".to_string(),
        http_timeout_secs: 5,
        retry_max_times,
        per_page: 2,
    }
}

fn project_json(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "visibility": "public",
        "web_url": format!("https://gitlab.test/{name}"),
        "namespace": {"id": id + 1000, "name": "group", "path": "group"}
    })
}

#[derive(Clone, Default)]
struct CaptureState {
    reqs: Arc<Mutex<Vec<(HeaderMap, HashMap<String, String>)>>>,
}

async fn paged_projects(
    State(state): State<CaptureState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> ([(&'static str, &'static str); 1], Json<Value>) {
    let page = query.get("page").cloned().unwrap_or_default();
    state.reqs.lock().unwrap().push((headers, query));

    if page == "1" {
        (
            [("x-next-page", "2")],
            Json(json!([project_json(1, "one"), project_json(2, "two")])),
        )
    } else {
        ([("x-next-page", "")], Json(json!([project_json(3, "three")])))
    }
}

#[tokio::test]
async fn sends_bearer_token_and_follows_pagination_header() {
    let captured = CaptureState::default();
    let app = Router::new()
        .route("/projects", get(paged_projects))
        .with_state(captured.clone());
    let base = spawn_test_server(app).await;

    let client = GitlabClient::new(&make_cfg(base, 0)).unwrap();

    let first = client.fetch_projects(1).await.unwrap();
    assert_eq!(first.records.len(), 2);
    assert!(first.malformed.is_empty());
    assert_eq!(first.next_page, Some(2));

    let second = client.fetch_projects(2).await.unwrap();
    assert_eq!(second.records.len(), 1);
    assert_eq!(second.next_page, None, "empty header means no next page");

    let reqs = captured.reqs.lock().unwrap().clone();
    assert_eq!(reqs.len(), 2);
    for (headers, query) in &reqs {
        assert_eq!(
            headers
                .get("authorization")
                .and_then(|v| v.to_str().ok()),
            Some("Bearer secret-token")
        );
        assert_eq!(query.get("per_page").map(String::as_str), Some("2"));
    }
}

#[tokio::test]
async fn malformed_records_are_skipped_not_fatal() {
    async fn mixed_page() -> ([(&'static str, &'static str); 1], Json<Value>) {
        (
            [("x-next-page", "")],
            Json(json!([
                project_json(10, "good"),
                {"id": 11, "name": 12345},
                {"description": "no id at all"}
            ])),
        )
    }

    let app = Router::new().route("/projects", get(mixed_page));
    let base = spawn_test_server(app).await;
    let client = GitlabClient::new(&make_cfg(base, 0)).unwrap();

    let page = client.fetch_projects(1).await.unwrap();
    assert_eq!(page.records.len(), 1);
    assert_eq!(page.records[0].id, 10);
    assert_eq!(page.malformed.len(), 2);
    assert_eq!(page.malformed[0].id, Some(11));
    assert_eq!(page.malformed[1].id, None);
}

#[derive(Clone, Default)]
struct HitCounter {
    hits: Arc<AtomicUsize>,
}

#[tokio::test]
async fn auth_failure_is_fatal_and_not_retried() {
    async fn unauthorized(State(state): State<HitCounter>) -> StatusCode {
        state.hits.fetch_add(1, Ordering::SeqCst);
        StatusCode::UNAUTHORIZED
    }

    let counter = HitCounter::default();
    let app = Router::new()
        .route("/projects", get(unauthorized))
        .with_state(counter.clone());
    let base = spawn_test_server(app).await;
    let client = GitlabClient::new(&make_cfg(base, 3)).unwrap();

    let err = client.fetch_projects(1).await.unwrap_err();
    assert!(
        matches!(err, GlsyncError::Auth(StatusCode::UNAUTHORIZED)),
        "got {err:?}"
    );
    assert_eq!(counter.hits.load(Ordering::SeqCst), 1, "401 must not retry");
}

#[tokio::test]
async fn server_errors_are_retried_until_success() {
    async fn flaky(State(state): State<HitCounter>) -> Response {
        if state.hits.fetch_add(1, Ordering::SeqCst) == 0 {
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        } else {
            ([("x-next-page", "")], Json(json!([]))).into_response()
        }
    }

    let counter = HitCounter::default();
    let app = Router::new()
        .route("/projects", get(flaky))
        .with_state(counter.clone());
    let base = spawn_test_server(app).await;
    let client = GitlabClient::new(&make_cfg(base, 2)).unwrap();

    let page = client.fetch_projects(1).await.unwrap();
    assert!(page.records.is_empty());
    assert_eq!(counter.hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn rate_limit_surfaces_after_retries_exhausted() {
    async fn throttled(State(state): State<HitCounter>) -> StatusCode {
        state.hits.fetch_add(1, Ordering::SeqCst);
        StatusCode::TOO_MANY_REQUESTS
    }

    let counter = HitCounter::default();
    let app = Router::new()
        .route("/projects", get(throttled))
        .with_state(counter.clone());
    let base = spawn_test_server(app).await;
    let client = GitlabClient::new(&make_cfg(base, 2)).unwrap();

    let err = client.fetch_projects(1).await.unwrap_err();
    assert!(matches!(err, GlsyncError::RateLimited), "got {err:?}");
    // Initial attempt plus two retries.
    assert_eq!(counter.hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn fetch_project_maps_404_to_not_found() {
    async fn detail(Path(id): Path<i64>) -> Response {
        if id == 42 {
            Json(project_json(42, "demo")).into_response()
        } else {
            StatusCode::NOT_FOUND.into_response()
        }
    }

    let app = Router::new().route("/projects/{id}", get(detail));
    let base = spawn_test_server(app).await;
    let client = GitlabClient::new(&make_cfg(base, 0)).unwrap();

    let project = client.fetch_project(42).await.unwrap();
    assert_eq!(project.name, "demo");

    let err = client.fetch_project(43).await.unwrap_err();
    assert!(matches!(err, GlsyncError::NotFound(43)), "got {err:?}");
}

#[tokio::test]
async fn missing_token_is_a_config_error() {
    let mut cfg = make_cfg(Url::parse("https://gitlab.test/api/v4").unwrap(), 0);
    cfg.token = String::new();
    let err = GitlabClient::new(&cfg).unwrap_err();
    assert!(matches!(err, GlsyncError::Config(_)), "got {err:?}");
}

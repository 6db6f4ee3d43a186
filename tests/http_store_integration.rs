//! Integration tests for the REST adapters.
//!
//! These tests run the HTTP document store and text reviser against an
//! in-process fake backend:
//! 1. Every store operation hits the expected route and decodes the reply
//! 2. Status codes map onto `StoreError` / `ReviseError`
//! 3. The bearer token is attached when configured
//! 4. An editor session persists through the real adapter

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use draft_desk::adapters::memory::{MockTextReviser, RecordingNotifier};
use draft_desk::adapters::rest::{
    HttpDocumentStore, HttpReviserConfig, HttpStoreConfig, HttpTextReviser,
};
use draft_desk::application::{EditorSession, SaveOutcome, SessionIdentity, SessionSettings};
use draft_desk::domain::document::{Document, DocumentKind, DocumentType};
use draft_desk::domain::foundation::{DocumentId, Timestamp};
use draft_desk::ports::{DocumentStore, ReviseError, StoreError, TextReviser};

// =============================================================================
// Fake backend
// =============================================================================

/// `updatedAt` the fake backend writes on every PUT.
const SERVER_TIME: &str = "2031-01-01T08:00:00.000Z";

fn server_time() -> Timestamp {
    serde_json::from_value(json!(SERVER_TIME)).unwrap()
}

#[derive(Clone, Default)]
struct FakeBackend {
    drafts: Arc<Mutex<BTreeMap<String, Value>>>,
    templates: Arc<Mutex<BTreeMap<String, Value>>>,
    next_id: Arc<AtomicU64>,
    authorization: Arc<Mutex<Option<String>>>,
    fail_with: Arc<Mutex<Option<StatusCode>>>,
}

impl FakeBackend {
    fn seed_draft(&self, id: &str, content: &str) {
        self.drafts.lock().unwrap().insert(
            id.to_string(),
            json!({
                "id": id,
                "content": content,
                "kind": "draft",
                "documentType": "event_notice",
                "createdAt": "2024-05-01T10:00:00.000Z"
            }),
        );
    }

    fn draft(&self, id: &str) -> Option<Value> {
        self.drafts.lock().unwrap().get(id).cloned()
    }

    /// Numeric ids, like the production backend.
    fn assign_id(&self, body: &mut Value) -> String {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        body["id"] = json!(id);
        id.to_string()
    }

    fn fail_with(&self, status: StatusCode) {
        *self.fail_with.lock().unwrap() = Some(status);
    }

    fn authorization(&self) -> Option<String> {
        self.authorization.lock().unwrap().clone()
    }

    /// Records the request headers and applies any forced failure.
    fn observe(&self, headers: &HeaderMap) -> Result<(), StatusCode> {
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        *self.authorization.lock().unwrap() = auth;
        match *self.fail_with.lock().unwrap() {
            Some(status) => Err(status),
            None => Ok(()),
        }
    }
}

async fn list_drafts(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
) -> Result<Json<Vec<Value>>, StatusCode> {
    backend.observe(&headers)?;
    Ok(Json(backend.drafts.lock().unwrap().values().cloned().collect()))
}

async fn get_draft(
    State(backend): State<FakeBackend>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    backend.observe(&headers)?;
    backend.draft(&id).map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn create_draft(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    backend.observe(&headers)?;
    let id = backend.assign_id(&mut body);
    backend.drafts.lock().unwrap().insert(id, body.clone());
    Ok((StatusCode::CREATED, Json(body)))
}

async fn put_draft(
    State(backend): State<FakeBackend>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    backend.observe(&headers)?;
    body["updatedAt"] = json!(SERVER_TIME);
    backend.drafts.lock().unwrap().insert(id, body.clone());
    Ok(Json(body))
}

async fn delete_draft(
    State(backend): State<FakeBackend>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, StatusCode> {
    backend.observe(&headers)?;
    match backend.drafts.lock().unwrap().remove(&id) {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(StatusCode::NOT_FOUND),
    }
}

async fn list_templates(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
) -> Result<Json<Vec<Value>>, StatusCode> {
    backend.observe(&headers)?;
    Ok(Json(
        backend.templates.lock().unwrap().values().cloned().collect(),
    ))
}

async fn create_template(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    backend.observe(&headers)?;
    let id = backend.assign_id(&mut body);
    backend.templates.lock().unwrap().insert(id, body.clone());
    Ok((StatusCode::CREATED, Json(body)))
}

async fn update_template(
    State(backend): State<FakeBackend>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    backend.observe(&headers)?;
    let mut templates = backend.templates.lock().unwrap();
    match templates.get_mut(&id) {
        Some(existing) => {
            body["updatedAt"] = json!(SERVER_TIME);
            *existing = body.clone();
            Ok(Json(body))
        }
        None => Err(StatusCode::NOT_FOUND),
    }
}

async fn delete_template(
    State(backend): State<FakeBackend>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, StatusCode> {
    backend.observe(&headers)?;
    match backend.templates.lock().unwrap().remove(&id) {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// Echoes the instruction back as the revised paragraph.
async fn gemini_edit(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    backend.observe(&headers)?;
    let instruction = body["instruction"].as_str().unwrap_or_default();
    let content = match instruction {
        "break it" => "<p>unclosed".to_string(),
        other => format!("<p>{}</p>", other),
    };
    Ok(Json(json!({ "content": content })))
}

/// Serves `backend` on an ephemeral port and returns the API endpoint.
async fn spawn(backend: FakeBackend) -> String {
    let app = Router::new()
        .route("/api/drafts", get(list_drafts).post(create_draft))
        .route(
            "/api/drafts/:id",
            get(get_draft).put(put_draft).delete(delete_draft),
        )
        .route("/api/templates", get(list_templates).post(create_template))
        .route(
            "/api/templates/:id",
            put(update_template).delete(delete_template),
        )
        .route("/api/gemini_edit", post(gemini_edit))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api", addr)
}

fn store(endpoint: &str) -> HttpDocumentStore {
    HttpDocumentStore::new(HttpStoreConfig::new(endpoint).with_timeout(Duration::from_secs(5)))
        .unwrap()
}

fn id(value: &str) -> DocumentId {
    DocumentId::parse(value).unwrap()
}

// =============================================================================
// Drafts
// =============================================================================

#[tokio::test]
async fn draft_lifecycle_round_trips_through_http() {
    let backend = FakeBackend::default();
    backend.seed_draft("7", "<p>Original</p>");
    let store = store(&spawn(backend.clone()).await);

    let fetched = store.fetch_draft(&id("7")).await.unwrap();
    assert_eq!(fetched.content(), "<p>Original</p>");
    assert_eq!(fetched.document_type(), &DocumentType::EventNotice);

    let updated = fetched.with_content("<p>Edited</p>");
    let saved = store.save_draft(&id("7"), &updated).await.unwrap();
    assert_eq!(backend.draft("7").unwrap()["content"], "<p>Edited</p>");
    assert_eq!(saved.content(), "<p>Edited</p>");
    assert_eq!(saved.updated_at(), Some(&server_time()));
    assert_eq!(saved.kind(), DocumentKind::Draft);

    let listed = store.list_drafts().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].content(), "<p>Edited</p>");

    store.delete_draft(&id("7")).await.unwrap();
    assert_eq!(
        store.fetch_draft(&id("7")).await.unwrap_err(),
        StoreError::NotFound(id("7"))
    );
}

#[tokio::test]
async fn new_draft_is_created_with_server_id() {
    let backend = FakeBackend::default();
    let store = store(&spawn(backend.clone()).await);
    let fresh = Document::blank_draft(DocumentType::EventNotice).with_content("<p>Fair</p>");

    let created = store.create_draft(&fresh).await.unwrap();

    assert_eq!(created.id(), Some(&id("1")));
    assert_eq!(created.kind(), DocumentKind::Draft);
    assert_eq!(backend.draft("1").unwrap()["content"], "<p>Fair</p>");
}

#[tokio::test]
async fn ids_with_reserved_characters_address_their_own_resource() {
    let backend = FakeBackend::default();
    backend.seed_draft("7", "<p>Keep me</p>");
    backend.seed_draft("7#draft ?v=1%", "<p>Delete me</p>");
    let store = store(&spawn(backend.clone()).await);
    let odd = id("7#draft ?v=1%");

    assert_eq!(store.fetch_draft(&odd).await.unwrap().content(), "<p>Delete me</p>");
    store.delete_draft(&odd).await.unwrap();

    assert!(backend.draft("7#draft ?v=1%").is_none());
    assert_eq!(backend.draft("7").unwrap()["content"], "<p>Keep me</p>");
}

#[tokio::test]
async fn server_error_is_reported_with_status() {
    let backend = FakeBackend::default();
    let store = store(&spawn(backend.clone()).await);
    backend.fail_with(StatusCode::INTERNAL_SERVER_ERROR);

    let err = store.list_drafts().await.unwrap_err();

    assert!(
        matches!(err, StoreError::Server { status: 500, .. }),
        "{err:?}"
    );
}

#[tokio::test]
async fn missing_draft_delete_is_not_found() {
    let store = store(&spawn(FakeBackend::default()).await);
    assert_eq!(
        store.delete_draft(&id("nope")).await.unwrap_err(),
        StoreError::NotFound(id("nope"))
    );
}

#[tokio::test]
async fn bearer_token_is_attached_when_configured() {
    let backend = FakeBackend::default();
    let endpoint = spawn(backend.clone()).await;

    store(&endpoint).list_drafts().await.unwrap();
    assert_eq!(backend.authorization(), None);

    let authorized = HttpDocumentStore::new(HttpStoreConfig::new(&endpoint).with_token("s3cret"))
        .unwrap();
    authorized.list_drafts().await.unwrap();
    assert_eq!(backend.authorization().as_deref(), Some("Bearer s3cret"));
}

// =============================================================================
// Templates
// =============================================================================

#[tokio::test]
async fn template_lifecycle_round_trips_through_http() {
    let backend = FakeBackend::default();
    let store = store(&spawn(backend.clone()).await);
    let template = Document::blank_template(DocumentType::HolidayNotice)
        .with_content("<p>Closed on [...]</p>")
        .with_title("Closure");

    let created = store.create_template(&template).await.unwrap();
    let template_id = created.id().cloned().unwrap();
    assert_eq!(template_id, id("1"));
    assert_eq!(created.kind(), DocumentKind::Template);
    assert_eq!(created.title(), Some("Closure"));

    let revised = created.clone().with_content("<p>Closed all week</p>");
    let updated = store.update_template(&template_id, &revised).await.unwrap();
    assert_eq!(updated.updated_at(), Some(&server_time()));
    assert!(updated.is_template());

    let listed = store.list_templates().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].is_template());
    assert_eq!(listed[0].content(), "<p>Closed all week</p>");

    store.delete_template(&template_id).await.unwrap();
    assert!(store.list_templates().await.unwrap().is_empty());
    assert_eq!(
        store.delete_template(&template_id).await.unwrap_err(),
        StoreError::NotFound(template_id)
    );
}

#[tokio::test]
async fn updating_unknown_template_is_not_found() {
    let store = store(&spawn(FakeBackend::default()).await);
    let template = Document::blank_template(DocumentType::Announcement).with_content("<p>x</p>");

    assert_eq!(
        store.update_template(&id("99"), &template).await.unwrap_err(),
        StoreError::NotFound(id("99"))
    );
}

// =============================================================================
// Text reviser
// =============================================================================

#[tokio::test]
async fn reviser_returns_revised_content() {
    let endpoint = spawn(FakeBackend::default()).await;
    let reviser = HttpTextReviser::new(HttpReviserConfig::new(&endpoint)).unwrap();

    let revised = reviser.revise("<p>Long text</p>", "Shorter").await.unwrap();

    assert_eq!(revised, "<p>Shorter</p>");
}

#[tokio::test]
async fn reviser_rejects_malformed_content() {
    let endpoint = spawn(FakeBackend::default()).await;
    let reviser = HttpTextReviser::new(HttpReviserConfig::new(&endpoint)).unwrap();

    let err = reviser.revise("<p>x</p>", "break it").await.unwrap_err();

    assert!(matches!(err, ReviseError::InvalidContent(_)), "{err:?}");
}

#[tokio::test]
async fn reviser_maps_server_errors() {
    let backend = FakeBackend::default();
    let endpoint = spawn(backend.clone()).await;
    backend.fail_with(StatusCode::BAD_GATEWAY);
    let reviser = HttpTextReviser::new(HttpReviserConfig::new(&endpoint)).unwrap();

    let err = reviser.revise("<p>x</p>", "Shorter").await.unwrap_err();

    assert!(
        matches!(err, ReviseError::Server { status: 502, .. }),
        "{err:?}"
    );
}

// =============================================================================
// Session over HTTP
// =============================================================================

#[tokio::test]
async fn session_saves_through_http_store() {
    let backend = FakeBackend::default();
    backend.seed_draft("12", "<p>Before</p>");
    let endpoint = spawn(backend.clone()).await;
    let session = EditorSession::new(
        Arc::new(store(&endpoint)),
        Arc::new(MockTextReviser::new()),
        Arc::new(RecordingNotifier::new()),
        SessionSettings::default(),
    );

    session.bind(SessionIdentity::Draft(id("12"))).await.unwrap();
    session
        .edit(|editor| editor.replace_content("<p>After</p>"))
        .await
        .unwrap()
        .unwrap();
    let outcome = session.save().await.unwrap();

    assert!(matches!(outcome, SaveOutcome::Saved(_)));
    let stored = backend.draft("12").unwrap();
    assert_eq!(stored["content"], "<p>After</p>");
    assert!(stored.get("updatedAt").is_some());
}

#[tokio::test]
async fn session_creates_new_draft_and_adopts_server_copy() {
    let backend = FakeBackend::default();
    let endpoint = spawn(backend.clone()).await;
    let session = EditorSession::new(
        Arc::new(store(&endpoint)),
        Arc::new(MockTextReviser::new()),
        Arc::new(RecordingNotifier::new()),
        SessionSettings::default(),
    );
    let fresh = Document::blank_draft(DocumentType::Announcement).with_content("<p>Draft one</p>");
    session.bind(SessionIdentity::NewDraft(fresh)).await.unwrap();

    session.save().await.unwrap();
    let created = session.snapshot().await.unwrap();
    assert_eq!(created.id(), Some(&id("1")));
    assert_eq!(backend.draft("1").unwrap()["content"], "<p>Draft one</p>");

    session.save().await.unwrap();
    let saved = session.snapshot().await.unwrap();
    assert_eq!(saved.id(), Some(&id("1")));
    assert_eq!(saved.updated_at(), Some(&server_time()));
    assert_eq!(backend.drafts.lock().unwrap().len(), 1);
}

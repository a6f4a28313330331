//! Integration tests for the Smiles Intake API endpoints.
//!
//! These tests verify the full request/response cycle through the HTTP API.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use smiles_intake::api::router;
use smiles_intake::enrichment::{Enricher, GeminiConfig, GeminiEnricher};
use smiles_intake::model::{AiAnalysis, FALLBACK_SUMMARY, UserData};
use smiles_intake::shell::Shell;
use smiles_intake::storage::{RecordStore, SqliteStore};

/// Enricher that always fails, as if the service were unreachable.
struct Unreachable;

#[async_trait]
impl Enricher for Unreachable {
    async fn enhance(&self, _record: &UserData) -> AiAnalysis {
        AiAnalysis::fallback()
    }
}

async fn create_test_server_with(enricher: Arc<dyn Enricher>, store: Arc<SqliteStore>) -> TestServer {
    let shell = Shell::start(enricher, store).await.unwrap();
    TestServer::new(router(Arc::new(shell))).unwrap()
}

async fn create_test_server() -> TestServer {
    let store = Arc::new(SqliteStore::new("sqlite::memory:").await.unwrap());
    create_test_server_with(Arc::new(Unreachable), store).await
}

async fn fill_form(server: &TestServer, operator: &str, locator: &str) {
    let edits = [
        ("operador", json!({ "input": operator })),
        ("tipo", json!({ "toggle": "FF" })),
        ("localizador", json!({ "input": locator })),
        ("dataVoo", json!({ "input": "15032025" })),
        ("bio", json!({ "input": "Bagagem extraviada" })),
    ];
    for (field, edit) in edits {
        server
            .post(&format!("/form/fields/{}", field))
            .json(&edit)
            .await
            .assert_status_ok();
    }
}

fn gemini_reply(text: &str) -> Value {
    json!({
        "candidates": [ { "content": { "parts": [ { "text": text } ] } } ]
    })
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = create_test_server().await;

    let response = server.get("/health").await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_initial_screen_is_entry_form() {
    let server = create_test_server().await;

    let response = server.get("/screen").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["screen"], "entry_form");
    assert_eq!(body["phase"], "IDLE");
    assert_eq!(body["submit"]["label"], "Transmitir Dados");
    assert_eq!(body["fields"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_date_field_is_masked() {
    let server = create_test_server().await;

    let response = server
        .post("/form/fields/dataVoo")
        .json(&json!({ "input": "15-03-2025 extra 99" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["fields"][1]["id"], "dataVoo");
    assert_eq!(body["fields"][1]["value"], "15/03/2025");
}

#[tokio::test]
async fn test_toggle_twice_restores_selection() {
    let server = create_test_server().await;

    for tag in ["FF", "BAG", "FF"] {
        server
            .post("/form/fields/tipo")
            .json(&json!({ "toggle": tag }))
            .await
            .assert_status_ok();
    }

    let body: Value = server.get("/screen").await.json();
    assert_eq!(body["fields"][2]["value"], json!(["BAG"]));
}

#[tokio::test]
async fn test_bad_edits_are_rejected() {
    let server = create_test_server().await;

    server
        .post("/form/fields/tipo")
        .json(&json!({ "toggle": "XYZ" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .post("/form/fields/operador")
        .json(&json!({ "toggle": "FF" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_submit_requires_fields() {
    let server = create_test_server().await;

    let response = server.post("/form/submit").await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json();
    assert_eq!(body["missing"], json!(["Agente", "Data do Voo", "Relato"]));
}

#[tokio::test]
async fn test_submit_with_unreachable_service_succeeds() {
    let server = create_test_server().await;
    fill_form(&server, "Ana", "ABC123").await;

    let response = server.post("/form/submit").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["screen"], "success");
    assert_eq!(body["summary"], FALLBACK_SUMMARY);

    // No edits until reset.
    server
        .post("/form/fields/operador")
        .json(&json!({ "input": "Bia" }))
        .await
        .assert_status(StatusCode::CONFLICT);

    let body: Value = server.post("/form/reset").await.json();
    assert_eq!(body["screen"], "entry_form");
    assert_eq!(body["fields"][0]["value"], "");
}

#[tokio::test]
async fn test_submission_example() {
    let gemini = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(gemini_reply(r#"{"summary":"Caso registrado."}"#)),
        )
        .expect(1)
        .mount(&gemini)
        .await;

    let enricher = GeminiEnricher::new(GeminiConfig {
        model: "test-model".to_string(),
        base_url: gemini.uri(),
        ..GeminiConfig::new("test-key")
    });
    let store = Arc::new(SqliteStore::new("sqlite::memory:").await.unwrap());
    let server = create_test_server_with(Arc::new(enricher), store.clone()).await;

    fill_form(&server, "Ana", "").await;
    let response = server.post("/form/submit").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["screen"], "success");
    assert_eq!(body["quoted_summary"], "\"Caso registrado.\"");

    let stored = store.load().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].operator, "Ana");
    assert_eq!(stored[0].impact_types, vec!["FF".to_string()]);
    assert_eq!(stored[0].flight_date, "15/03/2025");
    assert_eq!(stored[0].narrative, "Bagagem extraviada");
    assert!(!stored[0].id.is_empty());
    assert!(stored[0].timestamp > 0);
}

#[tokio::test]
async fn test_admin_gate() {
    let server = create_test_server().await;

    server
        .get("/admin/records")
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let response = server
        .post("/view/admin")
        .json(&json!({ "password": "wrong" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["alert"], "Erro");

    let body: Value = server.get("/screen").await.json();
    assert_eq!(body["screen"], "entry_form");

    let response = server
        .post("/view/admin")
        .json(&json!({ "password": "jeff123" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["screen"], "admin_list");
    assert_eq!(body["heading"], "FILA DE ATENDIMENTO (0)");

    let body: Value = server.post("/view/entry").await.json();
    assert_eq!(body["screen"], "entry_form");
}

#[tokio::test]
async fn test_full_workflow_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}?mode=rwc", dir.path().join("intake.db").display());

    let store = Arc::new(SqliteStore::new(&url).await.unwrap());
    let server = create_test_server_with(Arc::new(Unreachable), store).await;

    // 1. Register three cases
    for (operator, locator) in [("Ana", "AAA111"), ("Bia", "BBB222"), ("Caio", "CCC333")] {
        fill_form(&server, operator, locator).await;
        server.post("/form/submit").await.assert_status_ok();
        server.post("/form/reset").await.assert_status_ok();
    }

    // 2. List them, newest first
    server
        .post("/view/admin")
        .json(&json!({ "password": "jeff123" }))
        .await
        .assert_status_ok();

    let body: Value = server.get("/admin/records").await.json();
    assert_eq!(body["count"], 3);
    let records = body["records"].as_array().unwrap().clone();
    let operators: Vec<_> = records.iter().map(|r| r["operador"].clone()).collect();
    assert_eq!(operators, vec![json!("Caio"), json!("Bia"), json!("Ana")]);

    let screen: Value = server.get("/screen").await.json();
    assert_eq!(screen["rows"][0]["title"], "CCC333 - Caio");

    // 3. Details of one record
    let id = records[1]["id"].as_str().unwrap();
    let detail: Value = server.get(&format!("/admin/records/{}", id)).await.json();
    assert_eq!(detail["localizador"], "BBB222");

    server
        .get("/admin/records/unknown")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    // 4. Restart against the same database
    let reopened = Arc::new(SqliteStore::new(&url).await.unwrap());
    let restarted = create_test_server_with(Arc::new(Unreachable), reopened).await;
    restarted
        .post("/view/admin")
        .json(&json!({ "password": "jeff123" }))
        .await
        .assert_status_ok();

    let body: Value = restarted.get("/admin/records").await.json();
    assert_eq!(body["records"], json!(records));
}

//! HTTP server & routing integration tests

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::NamedTempFile;
use tower::ServiceExt;

use admit_standardizer::config::Config;
use admit_standardizer::services::MockLlmClient;
use admit_standardizer::{build_router, AppState};

const MOCK_RESPONSE: &str =
    r#"{"standardized_program": "Computer Science", "standardized_university": "Unknown"}"#;

/// Canonical list fixtures plus an AppState wired to a mock model.
/// The temp files must stay alive for the duration of the test.
fn test_state(mock: Arc<MockLlmClient>) -> (AppState, NamedTempFile, NamedTempFile) {
    let mut unis = NamedTempFile::new().unwrap();
    writeln!(
        unis,
        "McGill University\nUniversity of British Columbia\nTemple University"
    )
    .unwrap();

    let mut progs = NamedTempFile::new().unwrap();
    writeln!(progs, "Information Studies\nMathematics").unwrap();

    let config = Config {
        model_source_url: "http://localhost:11434".to_string(),
        model_name: "tinyllama".to_string(),
        n_threads: 2,
        n_ctx: 2048,
        n_gpu_layers: 0,
        canon_universities_path: unis.path().to_path_buf(),
        canon_programs_path: progs.path().to_path_buf(),
        max_workers: 4,
        port: 0,
    };

    (AppState::new(&config, mock), unis, progs)
}

async fn post_standardize(state: AppState, body: &str) -> (StatusCode, Value) {
    let app = build_router(state);
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/standardize")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_check_returns_exact_ok_body() {
    let (state, _unis, _progs) = test_state(Arc::new(MockLlmClient::new(MOCK_RESPONSE)));
    let app = build_router(state);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn standardize_augments_rule_parsable_rows_without_the_model() {
    let mock = Arc::new(MockLlmClient::new(MOCK_RESPONSE));
    let (state, _unis, _progs) = test_state(mock.clone());

    let payload = json!([
        {"program": "Mathematics, University Of British Columbia"},
        {"program": "Information, McG"}
    ]);
    let (status, body) = post_standardize(state, &payload.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["llm-generated-program"], "Mathematics");
    assert_eq!(
        rows[0]["llm-generated-university"],
        "University of British Columbia"
    );
    assert_eq!(rows[1]["llm-generated-program"], "Information Studies");
    assert_eq!(rows[1]["llm-generated-university"], "McGill University");
    assert_eq!(mock.generate_calls(), 0);
}

#[tokio::test]
async fn standardize_accepts_wrapped_rows_object() {
    let (state, _unis, _progs) = test_state(Arc::new(MockLlmClient::new(MOCK_RESPONSE)));

    let payload = json!({"rows": [{"program": "Mathematics, University of British Columbia"}]});
    let (status, body) = post_standardize(state, &payload.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn malformed_body_is_an_empty_row_list_not_an_error() {
    let (state, _unis, _progs) = test_state(Arc::new(MockLlmClient::new(MOCK_RESPONSE)));

    let (status, body) = post_standardize(state, "this is not json {{{").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "rows": [] }));
}

#[tokio::test]
async fn unexpected_json_shapes_also_yield_empty_rows() {
    let (state, _unis, _progs) = test_state(Arc::new(MockLlmClient::new(MOCK_RESPONSE)));

    let (status, body) = post_standardize(state, "\"just a string\"").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "rows": [] }));
}

#[tokio::test]
async fn extra_fields_pass_through_untouched() {
    let (state, _unis, _progs) = test_state(Arc::new(MockLlmClient::new(MOCK_RESPONSE)));

    let payload = json!([{
        "program": "Mathematics, University of British Columbia",
        "status": "Accepted",
        "season": "F24",
        "gpa": 3.9
    }]);
    let (status, body) = post_standardize(state, &payload.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    let row = &body["rows"][0];
    assert_eq!(row["status"], "Accepted");
    assert_eq!(row["season"], "F24");
    assert_eq!(row["gpa"], 3.9);
    assert_eq!(row["program"], "Mathematics, University of British Columbia");
}

#[tokio::test]
async fn mixed_rule_and_fallback_rows_keep_input_order() {
    let mock = Arc::new(MockLlmClient::new(MOCK_RESPONSE));
    let (state, _unis, _progs) = test_state(mock.clone());

    // Rows 1 and 3 have no separator and need the (mock) model.
    let payload = json!([
        {"id": 0, "program": "Mathematics, University of British Columbia"},
        {"id": 1, "program": "Standalone Text Zero"},
        {"id": 2, "program": "Information Studies, McGill University"},
        {"id": 3, "program": "Standalone Text One"},
        {"id": 4, "program": ""}
    ]);
    let (status, body) = post_standardize(state, &payload.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    let rows = body["rows"].as_array().unwrap();
    let ids: Vec<i64> = rows.iter().map(|r| r["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);

    // Fallback rows carry the mock's answer; blank input is sentinel.
    assert_eq!(rows[1]["llm-generated-program"], "Computer Science");
    assert_eq!(rows[3]["llm-generated-program"], "Computer Science");
    assert_eq!(rows[4]["llm-generated-program"], "Unknown");
    assert_eq!(rows[4]["llm-generated-university"], "Unknown");
    assert_eq!(mock.generate_calls(), 2);
}

#[tokio::test]
async fn missing_canonical_files_degrade_instead_of_failing() {
    let config = Config {
        model_source_url: "http://localhost:11434".to_string(),
        model_name: "tinyllama".to_string(),
        n_threads: 2,
        n_ctx: 2048,
        n_gpu_layers: 0,
        canon_universities_path: PathBuf::from("/nonexistent/unis.txt"),
        canon_programs_path: PathBuf::from("/nonexistent/progs.txt"),
        max_workers: 4,
        port: 0,
    };
    let state = AppState::new(&config, Arc::new(MockLlmClient::new(MOCK_RESPONSE)));

    // Keyword splitting still works with empty registries.
    let payload = json!([{"program": "History, Temple University"}]);
    let (status, body) = post_standardize(state, &payload.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"][0]["llm-generated-university"], "Temple University");
}

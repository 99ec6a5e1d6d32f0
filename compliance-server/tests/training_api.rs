//! Learner flow through the HTTP surface

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use compliance_server::{AppState, ErrorResponse, create_router};
use compliance_training::{TrainingEngine, TursoTrainingStore};
use serde_json::{Value, json};
use tempfile::TempDir;

async fn test_server(dir: &TempDir) -> TestServer {
    let store = TursoTrainingStore::new_local(&dir.path().join("training.db"))
        .await
        .unwrap();
    let state = Arc::new(AppState::new(TrainingEngine::new(Arc::new(store))));
    TestServer::new(create_router(state)).unwrap()
}

fn id(value: &Value) -> i64 {
    value["id"].as_i64().unwrap()
}

/// Seed one employee and a policy with two single-question courses.
async fn seed(server: &TestServer) -> (i64, i64, Vec<i64>) {
    let user = server
        .post("/api/users")
        .json(&json!({
            "name": "Ana",
            "email": "ana@example.com",
            "role": "Empleado",
        }))
        .await;
    user.assert_status(StatusCode::CREATED);

    let policy = server
        .post("/api/policies")
        .json(&json!({ "title": "Anti-bribery" }))
        .await;
    policy.assert_status(StatusCode::CREATED);
    let policy_id = id(&policy.json());

    let mut courses = Vec::new();
    for order in 1..=2 {
        let course = server
            .post("/api/training/courses")
            .json(&json!({
                "policy_id": policy_id,
                "title": format!("Module {order}"),
                "description": "Gifts and hospitality",
                "material_type": "pdf",
                "order_in_policy": order,
                "questions": [{
                    "question_text": "May you accept cash gifts?",
                    "options": [
                        { "option_text": "No", "is_correct": true },
                        { "option_text": "Yes", "is_correct": false },
                    ],
                }],
            }))
            .await;
        course.assert_status(StatusCode::CREATED);
        courses.push(id(&course.json()));
    }

    (id(&user.json()), policy_id, courses)
}

#[tokio::test]
async fn learner_view_hides_answer_key() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    let (user, _, courses) = seed(&server).await;

    let response = server
        .get(&format!("/api/training/employee/{user}/course/{}", courses[0]))
        .await;
    response.assert_status_ok();
    let details: Value = response.json();

    let option = &details["questions"][0]["options"][0];
    assert!(option.get("is_correct").is_none());
    assert!(details["user_progress"].is_null());
}

#[tokio::test]
async fn correct_submission_unlocks_next_course() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    let (user, policy, courses) = seed(&server).await;

    let course: Value = server
        .get(&format!("/api/training/courses/{}", courses[0]))
        .await
        .json();
    let question = &course["questions"][0];
    let correct = question["options"]
        .as_array()
        .unwrap()
        .iter()
        .find(|o| o["is_correct"] == json!(true))
        .unwrap();

    let response = server
        .post(&format!(
            "/api/training/employee/{user}/course/{}/submit-answers",
            courses[0]
        ))
        .json(&json!({
            "answers": [{
                "question_id": question["id"],
                "selected_option_id": correct["id"],
            }],
        }))
        .await;
    response.assert_status_ok();
    let result: Value = response.json();
    assert_eq!(result["totalQuestions"], json!(1));
    assert_eq!(result["correctAnswers"], json!(1));
    assert_eq!(result["status"], json!("Completado"));

    let curriculum: Value = server
        .get(&format!("/api/training/employee/{user}/policy/{policy}/courses"))
        .await
        .json();
    assert_eq!(curriculum[0]["action_status"], json!("Hecho"));
    assert_eq!(curriculum[1]["is_locked"], json!(false));
    assert_eq!(curriculum[1]["action_status"], json!("No iniciado"));

    let policies: Value = server
        .get(&format!("/api/training/employee/{user}/policies"))
        .await
        .json();
    assert_eq!(policies[0]["status"], json!("En curso"));
}

#[tokio::test]
async fn empty_submission_is_bad_request() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    let (user, _, courses) = seed(&server).await;

    let response = server
        .post(&format!(
            "/api/training/employee/{user}/course/{}/submit-answers",
            courses[0]
        ))
        .json(&json!({ "answers": [] }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: ErrorResponse = response.json();
    assert_eq!(body.code, "VALIDATION_ERROR");
}

#[tokio::test]
async fn foreign_option_is_rejected() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    let (user, _, courses) = seed(&server).await;

    let first: Value = server
        .get(&format!("/api/training/courses/{}", courses[0]))
        .await
        .json();
    let second: Value = server
        .get(&format!("/api/training/courses/{}", courses[1]))
        .await
        .json();

    let response = server
        .post(&format!(
            "/api/training/employee/{user}/course/{}/submit-answers",
            courses[0]
        ))
        .json(&json!({
            "answers": [{
                "question_id": first["questions"][0]["id"],
                "selected_option_id": second["questions"][0]["options"][0]["id"],
            }],
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn monitor_summary_counts_new_learner_as_not_started() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    let (_, policy, courses) = seed(&server).await;

    let summary: Value = server.get("/api/training/monitor/summary").await.json();
    assert_eq!(summary[0]["policy_id"], json!(policy));
    assert_eq!(summary[0]["total_micro_courses"], json!(2));
    assert_eq!(summary[0]["micro_courses"][0]["not_started_users"], json!(1));

    let detail: Value = server
        .get(&format!("/api/training/monitor/course/{}/detail", courses[0]))
        .await
        .json();
    assert_eq!(detail[0]["user_name"], json!("Ana"));
    assert!(detail[0]["progress_status"].is_null());
}

#[tokio::test]
async fn unknown_learner_is_not_found() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;

    let response = server.get("/api/training/employee/99/policies").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_answers_body_is_validation_error() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    let (user, _, courses) = seed(&server).await;
    let url = format!(
        "/api/training/employee/{user}/course/{}/submit-answers",
        courses[0]
    );

    let wrong_type = server
        .post(&url)
        .json(&json!({
            "answers": [{ "question_id": "first", "selected_option_id": 1 }],
        }))
        .await;
    wrong_type.assert_status(StatusCode::BAD_REQUEST);
    let body: ErrorResponse = wrong_type.json();
    assert_eq!(body.code, "VALIDATION_ERROR");

    let missing_field = server
        .post(&url)
        .json(&json!({ "answers": [{ "question_id": 1 }] }))
        .await;
    missing_field.assert_status(StatusCode::BAD_REQUEST);
    let body: ErrorResponse = missing_field.json();
    assert_eq!(body.code, "VALIDATION_ERROR");
}

#[tokio::test]
async fn duplicate_email_registration_is_bad_request() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    seed(&server).await;

    let response = server
        .post("/api/users")
        .json(&json!({
            "name": "Ana Duplicate",
            "email": "ana@example.com",
            "role": "Empleado",
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: ErrorResponse = response.json();
    assert_eq!(body.code, "VALIDATION_ERROR");
}

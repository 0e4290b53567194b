use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::router::doctor_routes;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

fn create_test_app(mock_server: &MockServer) -> Router {
    doctor_routes(TestConfig::with_store(&mock_server.uri()).to_state())
}

async fn send(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_available_slots_endpoint() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let hospital_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/working_hours"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::working_hours_row(
                &doctor_id.to_string(),
                &hospital_id.to_string(),
                1,
                "09:00:00",
                "12:00:00",
                Some(("10:00:00", "10:30:00")),
            )
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/time_off"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);
    let (status, body) = send(
        app,
        &format!("/{}/available-slots?hospital_id={}&date=2025-06-16", doctor_id, hospital_id),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["doctor_id"], doctor_id.to_string());
    assert_eq!(body["duration_minutes"], 30);
    assert_eq!(body["total_slots"], 5);
    assert_eq!(body["available_slots"][0]["start_time"], "09:00:00");
    assert_eq!(body["available_slots"][0]["end_time"], "09:30:00");
    assert_eq!(body["available_slots"][0]["available"], true);
    assert_eq!(body["available_slots"][2]["start_time"], "10:30:00");
}

#[tokio::test]
async fn test_available_slots_rejects_bad_duration() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(&mock_server);

    let (status, body) = send(
        app,
        &format!(
            "/{}/available-slots?hospital_id={}&date=2025-06-16&duration_minutes=-15",
            Uuid::new_v4(),
            Uuid::new_v4()
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn test_available_slots_requires_date() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(&mock_server);

    let (status, _) = send(
        app,
        &format!("/{}/available-slots?hospital_id={}", Uuid::new_v4(), Uuid::new_v4()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_doctor_not_found() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);
    let (status, body) = send(app, &format!("/{}", Uuid::new_v4())).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Doctor not found");
}

#[tokio::test]
async fn test_get_doctor_found() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let hospital_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_row(
                &doctor_id.to_string(),
                &hospital_id.to_string(),
                "Yilmaz",
                "Cardiology",
            )
        ])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);
    let (status, body) = send(app, &format!("/{}", doctor_id)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["full_name"], "Dr. Test Yilmaz");
    assert_eq!(body["doctor"]["specialty"], "Cardiology");
}

#[tokio::test]
async fn test_search_doctors_passes_filters() {
    let mock_server = MockServer::start().await;
    let hospital_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("hospital_id", format!("eq.{}", hospital_id)))
        .and(query_param("specialty", "eq.Neurology"))
        .and(query_param("is_available", "eq.true"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_row(&Uuid::new_v4().to_string(), &hospital_id.to_string(), "Kaya", "Neurology"),
            MockSupabaseResponses::doctor_row(&Uuid::new_v4().to_string(), &hospital_id.to_string(), "Demir", "Neurology"),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);
    let (status, body) = send(
        app,
        &format!(
            "/search?hospital_id={}&specialty=Neurology&available_only=true&limit=10",
            hospital_id
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
}

#[tokio::test]
async fn test_search_doctors_rejects_oversized_page() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(&mock_server);

    let (status, _) = send(app, "/search?limit=500").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_working_hours_endpoint() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let hospital_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/working_hours"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::working_hours_row(
                &doctor_id.to_string(),
                &hospital_id.to_string(),
                2,
                "08:30:00",
                "16:30:00",
                None,
            )
        ])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);
    let (status, body) = send(
        app,
        &format!("/{}/working-hours?hospital_id={}", doctor_id, hospital_id),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["working_hours"][0]["day_of_week"], 2);
    assert_eq!(body["working_hours"][0]["start_time"], "08:30:00");
}

// libs/doctor-cell/tests/availability_test.rs

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::models::{AvailabilityQueryRequest, DoctorError};
use doctor_cell::services::AvailabilityService;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

// 2025-06-16 is a Monday
const DATE: &str = "2025-06-16";

struct Fixture {
    mock_server: MockServer,
    doctor_id: Uuid,
    hospital_id: Uuid,
}

impl Fixture {
    async fn new() -> Self {
        Self {
            mock_server: MockServer::start().await,
            doctor_id: Uuid::new_v4(),
            hospital_id: Uuid::new_v4(),
        }
    }

    fn service(&self) -> AvailabilityService {
        AvailabilityService::new(&TestConfig::with_store(&self.mock_server.uri()).to_state())
    }

    fn query(&self, duration_minutes: Option<i32>) -> AvailabilityQueryRequest {
        AvailabilityQueryRequest {
            hospital_id: self.hospital_id,
            date: NaiveDate::parse_from_str(DATE, "%Y-%m-%d").unwrap(),
            duration_minutes,
        }
    }

    async fn mount_working_hours(&self, rows: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/working_hours"))
            .and(query_param("doctor_id", format!("eq.{}", self.doctor_id)))
            .and(query_param("hospital_id", format!("eq.{}", self.hospital_id)))
            .and(query_param("day_of_week", "eq.1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows))
            .mount(&self.mock_server)
            .await;
    }

    async fn mount_morning_schedule(&self, break_window: Option<(&str, &str)>) {
        let row = MockSupabaseResponses::working_hours_row(
            &self.doctor_id.to_string(),
            &self.hospital_id.to_string(),
            1,
            "09:00:00",
            "12:00:00",
            break_window,
        );
        self.mount_working_hours(json!([row])).await;
    }

    async fn mount_time_off(&self, rows: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/time_off"))
            .and(query_param("off_date", format!("eq.{}", DATE)))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows))
            .mount(&self.mock_server)
            .await;
    }

    async fn mount_appointments(&self, rows: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/appointments"))
            .and(query_param("appointment_date", format!("eq.{}", DATE)))
            .and(query_param("status", "neq.cancelled"))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows))
            .mount(&self.mock_server)
            .await;
    }

    fn appointment(&self, start: &str, end: &str, status: &str) -> serde_json::Value {
        MockSupabaseResponses::appointment_row(
            &Uuid::new_v4().to_string(),
            &Uuid::new_v4().to_string(),
            &self.doctor_id.to_string(),
            &self.hospital_id.to_string(),
            DATE,
            start,
            end,
            status,
        )
    }
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[tokio::test]
async fn test_slots_for_plain_morning() {
    let fixture = Fixture::new().await;
    fixture.mount_morning_schedule(None).await;
    fixture.mount_time_off(json!([])).await;
    fixture.mount_appointments(json!([])).await;

    let response = fixture
        .service()
        .get_available_slots(fixture.doctor_id, &fixture.query(None), None)
        .await
        .unwrap();

    // falls back to the configured 30 minutes
    assert_eq!(response.duration_minutes, 30);
    assert_eq!(response.total_slots, 6);
    assert_eq!(response.available_slots[0].start_time, t(9, 0));
    assert_eq!(response.available_slots[5].start_time, t(11, 30));
    assert!(response.available_slots.iter().all(|s| s.available));
}

#[tokio::test]
async fn test_break_and_bookings_are_excluded() {
    let fixture = Fixture::new().await;
    fixture.mount_morning_schedule(Some(("10:00:00", "10:30:00"))).await;
    fixture.mount_time_off(json!([])).await;
    fixture
        .mount_appointments(json!([
            fixture.appointment("09:30:00", "10:00:00", "confirmed"),
            // a cancelled row slipping through must not block anything
            fixture.appointment("11:00:00", "11:30:00", "cancelled"),
        ]))
        .await;

    let response = fixture
        .service()
        .get_available_slots(fixture.doctor_id, &fixture.query(Some(30)), None)
        .await
        .unwrap();

    let starts: Vec<NaiveTime> = response.available_slots.iter().map(|s| s.start_time).collect();
    assert_eq!(starts, vec![t(9, 0), t(10, 30), t(11, 0), t(11, 30)]);
}

#[tokio::test]
async fn test_time_off_returns_empty() {
    let fixture = Fixture::new().await;
    fixture.mount_morning_schedule(None).await;
    fixture
        .mount_time_off(json!([MockSupabaseResponses::time_off_row(
            &fixture.doctor_id.to_string(),
            &fixture.hospital_id.to_string(),
            DATE,
        )]))
        .await;
    fixture.mount_appointments(json!([])).await;

    let response = fixture
        .service()
        .get_available_slots(fixture.doctor_id, &fixture.query(Some(30)), None)
        .await
        .unwrap();

    assert!(response.available_slots.is_empty());
    assert_eq!(response.total_slots, 0);
}

#[tokio::test]
async fn test_no_schedule_returns_empty() {
    let fixture = Fixture::new().await;
    fixture.mount_working_hours(json!([])).await;
    fixture.mount_time_off(json!([])).await;
    fixture.mount_appointments(json!([])).await;

    let response = fixture
        .service()
        .get_available_slots(fixture.doctor_id, &fixture.query(None), None)
        .await
        .unwrap();

    assert!(response.available_slots.is_empty());
}

#[tokio::test]
async fn test_longer_duration_drops_partial_tail() {
    let fixture = Fixture::new().await;
    let row = MockSupabaseResponses::working_hours_row(
        &fixture.doctor_id.to_string(),
        &fixture.hospital_id.to_string(),
        1,
        "09:00:00",
        "10:30:00",
        None,
    );
    fixture.mount_working_hours(json!([row])).await;
    fixture.mount_time_off(json!([])).await;
    fixture.mount_appointments(json!([])).await;

    let response = fixture
        .service()
        .get_available_slots(fixture.doctor_id, &fixture.query(Some(45)), None)
        .await
        .unwrap();

    let starts: Vec<NaiveTime> = response.available_slots.iter().map(|s| s.start_time).collect();
    assert_eq!(starts, vec![t(9, 0), t(9, 45)]);
}

#[tokio::test]
async fn test_non_positive_duration_is_rejected_before_fetching() {
    let fixture = Fixture::new().await;

    let result = fixture
        .service()
        .get_available_slots(fixture.doctor_id, &fixture.query(Some(0)), None)
        .await;

    assert_matches!(result, Err(DoctorError::ValidationError(_)));
    let received = fixture.mock_server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty());
}

#[tokio::test]
async fn test_corrupt_schedule_is_reported() {
    let fixture = Fixture::new().await;
    let row = MockSupabaseResponses::working_hours_row(
        &fixture.doctor_id.to_string(),
        &fixture.hospital_id.to_string(),
        1,
        "09:00:00",
        "12:00:00",
        Some(("10:30:00", "10:00:00")),
    );
    fixture.mount_working_hours(json!([row])).await;
    fixture.mount_time_off(json!([])).await;
    fixture.mount_appointments(json!([])).await;

    let result = fixture
        .service()
        .get_available_slots(fixture.doctor_id, &fixture.query(None), None)
        .await;

    assert_matches!(result, Err(DoctorError::InvalidSchedule(_)));
}

#[tokio::test]
async fn test_store_failure_surfaces_as_database_error() {
    let fixture = Fixture::new().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&fixture.mock_server)
        .await;

    let result = fixture
        .service()
        .get_available_slots(fixture.doctor_id, &fixture.query(None), None)
        .await;

    assert_matches!(result, Err(DoctorError::DatabaseError(_)));
}

#[tokio::test]
async fn test_weekly_working_hours() {
    let fixture = Fixture::new().await;
    let doctor_id = fixture.doctor_id.to_string();
    let hospital_id = fixture.hospital_id.to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/working_hours"))
        .and(query_param("order", "day_of_week.asc,start_time.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::working_hours_row(&doctor_id, &hospital_id, 1, "09:00:00", "17:00:00", Some(("12:00:00", "13:00:00"))),
            MockSupabaseResponses::working_hours_row(&doctor_id, &hospital_id, 3, "13:00:00", "18:00:00", None),
        ])))
        .mount(&fixture.mock_server)
        .await;

    let records = fixture
        .service()
        .get_working_hours(fixture.doctor_id, fixture.hospital_id, None)
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].day_of_week, 1);
    assert_eq!(records[0].break_start, Some(t(12, 0)));
    assert_eq!(records[1].break_start, None);
}

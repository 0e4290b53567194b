use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_utils::AppState;

use crate::models::{AvailabilityQueryRequest, DoctorSearchFilters};
use crate::services::{AvailabilityService, DoctorService};

#[derive(Debug, Deserialize)]
pub struct DoctorSearchQuery {
    pub hospital_id: Option<Uuid>,
    pub specialty: Option<String>,
    pub name: Option<String>,
    pub available_only: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl From<DoctorSearchQuery> for DoctorSearchFilters {
    fn from(query: DoctorSearchQuery) -> Self {
        Self {
            hospital_id: query.hospital_id,
            specialty: query.specialty,
            name: query.name,
            available_only: query.available_only,
            limit: query.limit,
            offset: query.offset,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WorkingHoursQuery {
    pub hospital_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub hospital_id: Uuid,
    pub date: NaiveDate,
    pub duration_minutes: Option<i32>,
}

// ==============================================================================
// PUBLIC HANDLERS (NO AUTHENTICATION REQUIRED)
// ==============================================================================

#[axum::debug_handler]
pub async fn search_doctors_public(
    State(state): State<AppState>,
    Query(query): Query<DoctorSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(&state);

    let doctors = doctor_service.search_doctors(query.into(), None).await?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn get_doctor_public(
    State(state): State<AppState>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(&state);

    let doctor = doctor_service.get_doctor(doctor_id, None).await?;

    Ok(Json(json!({
        "doctor": doctor,
        "full_name": doctor.full_name()
    })))
}

#[axum::debug_handler]
pub async fn get_working_hours_public(
    State(state): State<AppState>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<WorkingHoursQuery>,
) -> Result<Json<Value>, AppError> {
    let availability_service = AvailabilityService::new(&state);

    let working_hours = availability_service
        .get_working_hours(doctor_id, query.hospital_id, None)
        .await?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "hospital_id": query.hospital_id,
        "working_hours": working_hours
    })))
}

#[axum::debug_handler]
pub async fn get_available_slots_public(
    State(state): State<AppState>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let availability_service = AvailabilityService::new(&state);

    let request = AvailabilityQueryRequest {
        hospital_id: query.hospital_id,
        date: query.date,
        duration_minutes: query.duration_minutes,
    };

    let slots = availability_service
        .get_available_slots(doctor_id, &request, None)
        .await?;

    Ok(Json(json!(slots)))
}

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use doctor_cell::models::DoctorSearchFilters;
use doctor_cell::services::DoctorService;
use shared_models::error::AppError;
use shared_utils::AppState;

use crate::models::{HospitalError, HospitalSearchFilters};
use crate::services::geo::GeoPoint;
use crate::services::HospitalService;

#[derive(Debug, Deserialize)]
pub struct HospitalSearchQuery {
    pub name: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub specialty: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius_km: Option<f64>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl TryFrom<HospitalSearchQuery> for HospitalSearchFilters {
    type Error = HospitalError;

    fn try_from(query: HospitalSearchQuery) -> Result<Self, Self::Error> {
        let near = match (query.lat, query.lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
            (None, None) => None,
            _ => {
                return Err(HospitalError::ValidationError(
                    "lat and lng must be provided together".to_string(),
                ))
            }
        };

        Ok(Self {
            name: query.name,
            city: query.city,
            district: query.district,
            specialty: query.specialty,
            near,
            radius_km: query.radius_km,
            limit: query.limit,
            offset: query.offset,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct HospitalDoctorsQuery {
    pub specialty: Option<String>,
    pub available_only: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[axum::debug_handler]
pub async fn search_hospitals(
    State(state): State<AppState>,
    Query(query): Query<HospitalSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let filters = HospitalSearchFilters::try_from(query)?;
    let hospitals = HospitalService::new(&state).search_hospitals(filters).await?;

    Ok(Json(json!({
        "hospitals": hospitals,
        "total": hospitals.len()
    })))
}

#[axum::debug_handler]
pub async fn get_hospital(
    State(state): State<AppState>,
    Path(hospital_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let hospital = HospitalService::new(&state).get_hospital(hospital_id).await?;

    Ok(Json(json!({ "hospital": hospital })))
}

/// Doctors practising at a hospital. Unknown hospitals are a 404 rather
/// than an empty list.
#[axum::debug_handler]
pub async fn get_hospital_doctors(
    State(state): State<AppState>,
    Path(hospital_id): Path<Uuid>,
    Query(query): Query<HospitalDoctorsQuery>,
) -> Result<Json<Value>, AppError> {
    HospitalService::new(&state).get_hospital(hospital_id).await?;

    let filters = DoctorSearchFilters {
        hospital_id: Some(hospital_id),
        specialty: query.specialty,
        available_only: query.available_only,
        limit: query.limit,
        offset: query.offset,
        ..Default::default()
    };
    let doctors = DoctorService::new(&state).search_doctors(filters, None).await?;

    Ok(Json(json!({
        "hospital_id": hospital_id,
        "doctors": doctors,
        "total": doctors.len()
    })))
}

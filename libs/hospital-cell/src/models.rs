use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;

use crate::services::geo::GeoPoint;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hospital {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    pub district: Option<String>,
    pub address: String,
    pub phone: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub specialties: Vec<String>,
    pub rating: Option<f32>,
    pub created_at: DateTime<Utc>,
}

impl Hospital {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HospitalSearchResult {
    #[serde(flatten)]
    pub hospital: Hospital,
    pub distance_km: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HospitalSearchFilters {
    pub name: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub specialty: Option<String>,
    pub near: Option<GeoPoint>,
    pub radius_km: Option<f64>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Error)]
pub enum HospitalError {
    #[error("Hospital not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for HospitalError {
    fn from(e: anyhow::Error) -> Self {
        HospitalError::DatabaseError(e.to_string())
    }
}

impl From<HospitalError> for AppError {
    fn from(e: HospitalError) -> Self {
        match e {
            HospitalError::NotFound => AppError::NotFound("Hospital not found".to_string()),
            HospitalError::ValidationError(msg) => AppError::ValidationError(msg),
            HospitalError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

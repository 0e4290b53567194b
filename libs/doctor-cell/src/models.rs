use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc, NaiveTime, NaiveDate};
use thiserror::Error;

use shared_models::error::AppError;

use crate::services::slots::{BookedInterval, CandidateSlot, SlotError, WorkingHours};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub hospital_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub specialty: String,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

impl Doctor {
    pub fn full_name(&self) -> String {
        match &self.title {
            Some(title) => format!("{} {} {}", title, self.first_name, self.last_name),
            None => format!("{} {}", self.first_name, self.last_name),
        }
    }
}

/// One row of `working_hours`: a doctor's schedule at a hospital for a weekday.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkingHoursRecord {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub hospital_id: Uuid,
    pub day_of_week: i32, // 0 = Sunday, 1 = Monday, etc.
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub break_start: Option<NaiveTime>,
    pub break_end: Option<NaiveTime>,
}

impl WorkingHoursRecord {
    pub fn working_hours(&self) -> WorkingHours {
        WorkingHours {
            start_time: self.start_time,
            end_time: self.end_time,
            break_start: self.break_start,
            break_end: self.break_end,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeOffRecord {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub hospital_id: Uuid,
    pub off_date: NaiveDate,
    pub reason: Option<String>,
}

/// The slice of an `appointments` row the availability lookup needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookedAppointmentRow {
    pub id: Uuid,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: String,
}

impl BookedAppointmentRow {
    pub fn interval(&self) -> BookedInterval {
        BookedInterval::new(self.start_time, self.end_time)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityQueryRequest {
    pub hospital_id: Uuid,
    pub date: NaiveDate,
    pub duration_minutes: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableSlotsResponse {
    pub doctor_id: Uuid,
    pub hospital_id: Uuid,
    pub date: NaiveDate,
    pub duration_minutes: i32,
    pub available_slots: Vec<CandidateSlot>,
    pub total_slots: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoctorSearchFilters {
    pub hospital_id: Option<Uuid>,
    pub specialty: Option<String>,
    pub name: Option<String>,
    pub available_only: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Invalid schedule data: {0}")]
    InvalidSchedule(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for DoctorError {
    fn from(e: anyhow::Error) -> Self {
        DoctorError::DatabaseError(e.to_string())
    }
}

impl From<SlotError> for DoctorError {
    fn from(e: SlotError) -> Self {
        match e {
            SlotError::InvalidArgument(msg) => DoctorError::InvalidSchedule(msg),
        }
    }
}

impl From<DoctorError> for AppError {
    fn from(e: DoctorError) -> Self {
        match e {
            DoctorError::NotFound => AppError::NotFound("Doctor not found".to_string()),
            DoctorError::ValidationError(msg) => AppError::ValidationError(msg),
            DoctorError::InvalidSchedule(msg) => {
                AppError::Internal(format!("Invalid schedule data: {}", msg))
            }
            DoctorError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

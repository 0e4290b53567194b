use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use futures::future::try_join3;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::{Direction, Filter, SupabaseClient, TableQuery};
use shared_utils::AppState;

use crate::models::{
    AvailabilityQueryRequest, AvailableSlotsResponse, BookedAppointmentRow, DoctorError,
    TimeOffRecord, WorkingHoursRecord,
};
use crate::services::slots::{generate_slots, BookedInterval};

pub struct AvailabilityService {
    supabase: Arc<SupabaseClient>,
    default_slot_minutes: i32,
}

impl AvailabilityService {
    pub fn new(state: &AppState) -> Self {
        Self::with_client(Arc::clone(&state.supabase), state.default_slot_minutes())
    }

    pub fn with_client(supabase: Arc<SupabaseClient>, default_slot_minutes: i32) -> Self {
        Self {
            supabase,
            default_slot_minutes,
        }
    }

    /// Free slots for a doctor at a hospital on one date.
    pub async fn get_available_slots(
        &self,
        doctor_id: Uuid,
        query: &AvailabilityQueryRequest,
        auth_token: Option<&str>,
    ) -> Result<AvailableSlotsResponse, DoctorError> {
        let duration_minutes = query.duration_minutes.unwrap_or(self.default_slot_minutes);
        if duration_minutes <= 0 {
            return Err(DoctorError::ValidationError(format!(
                "duration_minutes must be positive, got {}",
                duration_minutes
            )));
        }

        debug!(
            "Calculating {}-minute slots for doctor {} at hospital {} on {}",
            duration_minutes, doctor_id, query.hospital_id, query.date
        );

        let (schedule, day_off, booked) = try_join3(
            self.get_working_hours_for_day(doctor_id, query.hospital_id, day_of_week(query.date), auth_token),
            self.has_time_off(doctor_id, query.hospital_id, query.date, auth_token),
            self.get_booked_intervals(doctor_id, query.hospital_id, query.date, auth_token),
        ).await?;

        if day_off {
            debug!("Doctor {} has time off on {}", doctor_id, query.date);
        }

        let working_hours = schedule.as_ref().map(WorkingHoursRecord::working_hours);
        let available_slots = generate_slots(working_hours.as_ref(), &booked, duration_minutes, day_off)
            .map_err(|e| {
                warn!("Rejected schedule data for doctor {}: {}", doctor_id, e);
                DoctorError::from(e)
            })?;

        debug!("Found {} available slots", available_slots.len());

        Ok(AvailableSlotsResponse {
            doctor_id,
            hospital_id: query.hospital_id,
            date: query.date,
            duration_minutes,
            total_slots: available_slots.len(),
            available_slots,
        })
    }

    /// Weekly schedule for a doctor at a hospital, Sunday first.
    pub async fn get_working_hours(
        &self,
        doctor_id: Uuid,
        hospital_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<Vec<WorkingHoursRecord>, DoctorError> {
        debug!("Fetching working hours for doctor {} at hospital {}", doctor_id, hospital_id);

        let query = TableQuery::new("working_hours")
            .filter(Filter::eq("doctor_id", doctor_id))
            .filter(Filter::eq("hospital_id", hospital_id))
            .order("day_of_week", Direction::Asc)
            .order("start_time", Direction::Asc);

        Ok(self.supabase.select(&query, auth_token).await?)
    }

    async fn get_working_hours_for_day(
        &self,
        doctor_id: Uuid,
        hospital_id: Uuid,
        day_of_week: i32,
        auth_token: Option<&str>,
    ) -> Result<Option<WorkingHoursRecord>, DoctorError> {
        let query = TableQuery::new("working_hours")
            .filter(Filter::eq("doctor_id", doctor_id))
            .filter(Filter::eq("hospital_id", hospital_id))
            .filter(Filter::eq("day_of_week", day_of_week))
            .order("start_time", Direction::Asc);

        let mut records: Vec<WorkingHoursRecord> = self.supabase.select(&query, auth_token).await?;

        if records.len() > 1 {
            warn!(
                "Doctor {} has {} working-hours rows for weekday {} at hospital {}, using the earliest",
                doctor_id, records.len(), day_of_week, hospital_id
            );
        }

        Ok(if records.is_empty() { None } else { Some(records.swap_remove(0)) })
    }

    async fn has_time_off(
        &self,
        doctor_id: Uuid,
        hospital_id: Uuid,
        date: NaiveDate,
        auth_token: Option<&str>,
    ) -> Result<bool, DoctorError> {
        let query = TableQuery::new("time_off")
            .filter(Filter::eq("doctor_id", doctor_id))
            .filter(Filter::eq("hospital_id", hospital_id))
            .filter(Filter::eq("off_date", date))
            .limit(1);

        let records: Vec<TimeOffRecord> = self.supabase.select(&query, auth_token).await?;
        Ok(!records.is_empty())
    }

    async fn get_booked_intervals(
        &self,
        doctor_id: Uuid,
        hospital_id: Uuid,
        date: NaiveDate,
        auth_token: Option<&str>,
    ) -> Result<Vec<BookedInterval>, DoctorError> {
        let query = TableQuery::new("appointments")
            .select("id,start_time,end_time,status")
            .filter(Filter::eq("doctor_id", doctor_id))
            .filter(Filter::eq("hospital_id", hospital_id))
            .filter(Filter::eq("appointment_date", date))
            .filter(Filter::neq("status", "cancelled"))
            .order("start_time", Direction::Asc);

        let rows: Vec<BookedAppointmentRow> = self.supabase.select(&query, auth_token).await?;

        Ok(rows.iter()
            .filter(|row| row.status != "cancelled")
            .map(BookedAppointmentRow::interval)
            .collect())
    }
}

/// 0 = Sunday .. 6 = Saturday, the numbering `working_hours` uses.
pub fn day_of_week(date: NaiveDate) -> i32 {
    date.weekday().num_days_from_sunday() as i32
}

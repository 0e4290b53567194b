use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::models::AvailabilityQueryRequest;
use doctor_cell::services::AvailabilityService;
use shared_database::{Direction, Filter, StoreError, SupabaseClient, TableQuery};
use shared_models::auth::User;
use shared_utils::AppState;

use crate::models::{
    Appointment, AppointmentError, AppointmentListQuery, AppointmentStatus, BookAppointmentRequest,
};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

pub struct BookingService {
    supabase: Arc<SupabaseClient>,
    availability: AvailabilityService,
}

impl BookingService {
    pub fn new(state: &AppState) -> Self {
        Self {
            supabase: Arc::clone(&state.supabase),
            availability: AvailabilityService::new(state),
        }
    }

    /// Books a slot for `patient_id`. The requested window must be one the
    /// generator currently offers for that doctor, hospital and date.
    pub async fn book_appointment(
        &self,
        patient_id: Uuid,
        request: BookAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Booking appointment for patient {} with doctor {} on {} at {}",
            patient_id, request.doctor_id, request.date, request.start_time
        );

        let today = Utc::now().date_naive();
        validate_booking_date(request.date, today)?;

        let query = AvailabilityQueryRequest {
            hospital_id: request.hospital_id,
            date: request.date,
            duration_minutes: request.duration_minutes,
        };
        let availability = self
            .availability
            .get_available_slots(request.doctor_id, &query, Some(auth_token))
            .await?;

        let end_time = request.start_time + Duration::minutes(availability.duration_minutes as i64);
        let offered = availability
            .available_slots
            .iter()
            .any(|slot| slot.start_time == request.start_time && slot.end_time == end_time);

        if !offered {
            warn!(
                "Requested slot {}-{} is not offered for doctor {} on {}",
                request.start_time, end_time, request.doctor_id, request.date
            );
            return Err(AppointmentError::SlotNotAvailable);
        }

        let body = json!({
            "patient_id": patient_id,
            "doctor_id": request.doctor_id,
            "hospital_id": request.hospital_id,
            "appointment_date": request.date,
            "start_time": request.start_time,
            "end_time": end_time,
            "status": AppointmentStatus::Pending,
            "notes": request.notes,
        });

        let appointment: Appointment = self
            .supabase
            .insert("appointments", body, Some(auth_token))
            .await
            .map_err(|e| {
                // a concurrent booking won the slot
                if StoreError::is_conflict(&e) {
                    AppointmentError::SlotNotAvailable
                } else {
                    AppointmentError::DatabaseError(e.to_string())
                }
            })?;

        info!("Appointment {} booked for patient {}", appointment.id, patient_id);
        Ok(appointment)
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Fetching appointment: {}", appointment_id);

        let query = TableQuery::new("appointments")
            .filter(Filter::eq("id", appointment_id))
            .limit(1);

        let mut rows: Vec<Appointment> = self.supabase.select(&query, Some(auth_token)).await?;
        if rows.is_empty() {
            return Err(AppointmentError::NotFound);
        }
        Ok(rows.swap_remove(0))
    }

    /// Appointments of one patient, newest first.
    pub async fn list_patient_appointments(
        &self,
        patient_id: Uuid,
        list: AppointmentListQuery,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let limit = list.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if limit == 0 || limit > MAX_PAGE_SIZE {
            return Err(AppointmentError::ValidationError(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        let query = TableQuery::new("appointments")
            .filter(Filter::eq("patient_id", patient_id))
            .filter_opt(list.status.map(|s| Filter::eq("status", s)))
            .order("appointment_date", Direction::Desc)
            .order("start_time", Direction::Desc)
            .limit(limit)
            .offset(list.offset.unwrap_or(0));

        Ok(self.supabase.select(&query, Some(auth_token)).await?)
    }

    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        user: &User,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let current = self.get_appointment(appointment_id, auth_token).await?;

        if !current.is_visible_to(user) {
            return Err(AppointmentError::Unauthorized);
        }

        if !current.status.is_active() {
            return Err(AppointmentError::InvalidStatusTransition(current.status));
        }

        let updated = self
            .set_status(appointment_id, AppointmentStatus::Cancelled, auth_token)
            .await?;
        info!("Appointment {} cancelled by {}", appointment_id, user.id);
        Ok(updated)
    }

    pub async fn confirm_appointment(
        &self,
        appointment_id: Uuid,
        user: &User,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let current = self.get_appointment(appointment_id, auth_token).await?;

        if !current.is_treating_doctor(user) && !user.is_admin() {
            return Err(AppointmentError::Unauthorized);
        }

        if current.status != AppointmentStatus::Pending {
            return Err(AppointmentError::InvalidStatusTransition(current.status));
        }

        let updated = self
            .set_status(appointment_id, AppointmentStatus::Confirmed, auth_token)
            .await?;
        info!("Appointment {} confirmed by {}", appointment_id, user.id);
        Ok(updated)
    }

    async fn set_status(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let query = TableQuery::new("appointments").filter(Filter::eq("id", appointment_id));
        let body = json!({
            "status": status,
            "updated_at": Utc::now().to_rfc3339(),
        });

        let mut rows: Vec<Appointment> = self.supabase.update(&query, body, Some(auth_token)).await?;
        if rows.is_empty() {
            return Err(AppointmentError::NotFound);
        }
        Ok(rows.swap_remove(0))
    }
}

fn validate_booking_date(date: NaiveDate, today: NaiveDate) -> Result<(), AppointmentError> {
    if date < today {
        return Err(AppointmentError::InvalidTime(format!(
            "{} is in the past",
            date
        )));
    }
    Ok(())
}

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use shared_database::{Direction, Filter, SupabaseClient, TableQuery};
use shared_utils::AppState;

use crate::models::{Doctor, DoctorError, DoctorSearchFilters};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

pub struct DoctorService {
    supabase: Arc<SupabaseClient>,
}

impl DoctorService {
    pub fn new(state: &AppState) -> Self {
        Self {
            supabase: Arc::clone(&state.supabase),
        }
    }

    pub async fn get_doctor(&self, doctor_id: Uuid, auth_token: Option<&str>) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor: {}", doctor_id);

        let query = TableQuery::new("doctors")
            .filter(Filter::eq("id", doctor_id))
            .limit(1);

        let mut doctors: Vec<Doctor> = self.supabase.select(&query, auth_token).await?;
        if doctors.is_empty() {
            return Err(DoctorError::NotFound);
        }
        Ok(doctors.swap_remove(0))
    }

    pub async fn search_doctors(
        &self,
        filters: DoctorSearchFilters,
        auth_token: Option<&str>,
    ) -> Result<Vec<Doctor>, DoctorError> {
        let limit = filters.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if limit == 0 || limit > MAX_PAGE_SIZE {
            return Err(DoctorError::ValidationError(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        debug!("Searching doctors with filters: {:?}", filters);

        let query = TableQuery::new("doctors")
            .filter_opt(filters.hospital_id.map(|id| Filter::eq("hospital_id", id)))
            .filter_opt(filters.specialty.map(|s| Filter::eq("specialty", s)))
            .filter_opt(
                filters.name
                    .filter(|n| !n.trim().is_empty())
                    .map(|n| Filter::ilike("last_name", n.trim())),
            )
            .filter_opt(
                filters.available_only
                    .filter(|only| *only)
                    .map(|_| Filter::eq("is_available", true)),
            )
            .order("last_name", Direction::Asc)
            .order("first_name", Direction::Asc)
            .limit(limit)
            .offset(filters.offset.unwrap_or(0));

        Ok(self.supabase.select(&query, auth_token).await?)
    }
}

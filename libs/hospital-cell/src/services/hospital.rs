use std::cmp::Ordering;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use shared_database::{Direction, Filter, SupabaseClient, TableQuery};
use shared_utils::AppState;

use crate::models::{Hospital, HospitalError, HospitalSearchFilters, HospitalSearchResult};
use crate::services::geo::{haversine_km, GeoPoint, EARTH_RADIUS_KM};

const BOX_MARGIN: f64 = 1.001;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;
/// Rows fetched per round trip while collecting distance-search candidates.
pub const GEO_BATCH_SIZE: u32 = 1000;

pub struct HospitalService {
    supabase: Arc<SupabaseClient>,
}

impl HospitalService {
    pub fn new(state: &AppState) -> Self {
        Self {
            supabase: Arc::clone(&state.supabase),
        }
    }

    pub async fn get_hospital(&self, hospital_id: Uuid) -> Result<Hospital, HospitalError> {
        debug!("Fetching hospital: {}", hospital_id);

        let query = TableQuery::new("hospitals")
            .filter(Filter::eq("id", hospital_id))
            .limit(1);

        let mut hospitals: Vec<Hospital> = self.supabase.select(&query, None).await?;
        if hospitals.is_empty() {
            return Err(HospitalError::NotFound);
        }
        Ok(hospitals.swap_remove(0))
    }

    /// Filtered hospital listing. With a reference point the results carry
    /// `distance_km` and come back nearest first.
    pub async fn search_hospitals(
        &self,
        filters: HospitalSearchFilters,
    ) -> Result<Vec<HospitalSearchResult>, HospitalError> {
        validate_filters(&filters)?;
        debug!("Searching hospitals with filters: {:?}", filters);

        let limit = filters.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        let offset = filters.offset.unwrap_or(0);
        let base = build_query(&filters);

        let Some(origin) = filters.near else {
            let query = base
                .order("name", Direction::Asc)
                .limit(limit)
                .offset(offset);
            let hospitals: Vec<Hospital> = self.supabase.select(&query, None).await?;

            return Ok(hospitals
                .into_iter()
                .map(|hospital| HospitalSearchResult { hospital, distance_km: None })
                .collect());
        };

        let base = match filters.radius_km {
            Some(radius) => bounding_box(origin, radius)
                .into_iter()
                .fold(base, |query, filter| query.filter(filter)),
            None => base,
        };
        let hospitals = self.fetch_all(base).await?;
        debug!("Ranking {} hospitals by distance", hospitals.len());

        let mut results: Vec<HospitalSearchResult> = hospitals
            .into_iter()
            .map(|hospital| {
                let distance = haversine_km(origin, hospital.location());
                HospitalSearchResult { hospital, distance_km: Some(distance) }
            })
            .filter(|r| match (filters.radius_km, r.distance_km) {
                (Some(radius), Some(distance)) => distance <= radius,
                _ => true,
            })
            .collect();

        results.sort_by(|a, b| {
            a.distance_km
                .partial_cmp(&b.distance_km)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.hospital.name.cmp(&b.hospital.name))
        });

        Ok(results
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    /// Pages through every row `query` matches; nearest-first ordering needs
    /// the whole candidate set, not a prefix of it.
    async fn fetch_all(&self, query: TableQuery) -> Result<Vec<Hospital>, HospitalError> {
        let query = query.order("name", Direction::Asc).order("id", Direction::Asc);
        let mut hospitals = Vec::new();
        let mut offset = 0;

        loop {
            let page = query.clone().limit(GEO_BATCH_SIZE).offset(offset);
            let batch: Vec<Hospital> = self.supabase.select(&page, None).await?;
            let fetched = batch.len() as u32;
            hospitals.extend(batch);

            if fetched < GEO_BATCH_SIZE {
                return Ok(hospitals);
            }
            offset += GEO_BATCH_SIZE;
        }
    }
}

/// Latitude/longitude range containing every point within `radius_km` of
/// `origin`. Longitude is left open when the circle reaches a pole or the
/// box would cross the antimeridian.
fn bounding_box(origin: GeoPoint, radius_km: f64) -> Vec<Filter> {
    // slight widening so points exactly on the radius survive rounding
    let angular = radius_km * BOX_MARGIN / EARTH_RADIUS_KM;
    let lat_delta = angular.to_degrees();
    let (min_lat, max_lat) = (origin.latitude - lat_delta, origin.latitude + lat_delta);

    let mut filters = vec![
        Filter::gte("latitude", min_lat.max(-90.0)),
        Filter::lte("latitude", max_lat.min(90.0)),
    ];

    if min_lat <= -90.0 || max_lat >= 90.0 {
        return filters;
    }

    let ratio = angular.sin() / origin.latitude.to_radians().cos();
    if ratio < 1.0 {
        let lng_delta = ratio.asin().to_degrees();
        let (min_lng, max_lng) = (origin.longitude - lng_delta, origin.longitude + lng_delta);
        if min_lng >= -180.0 && max_lng <= 180.0 {
            filters.push(Filter::gte("longitude", min_lng));
            filters.push(Filter::lte("longitude", max_lng));
        }
    }

    filters
}

fn validate_filters(filters: &HospitalSearchFilters) -> Result<(), HospitalError> {
    if let Some(limit) = filters.limit {
        if limit == 0 || limit > MAX_PAGE_SIZE {
            return Err(HospitalError::ValidationError(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
    }

    if let Some(point) = filters.near {
        if !point.is_valid() {
            return Err(HospitalError::ValidationError(
                "latitude must be within [-90, 90] and longitude within [-180, 180]".to_string(),
            ));
        }
    }

    match filters.radius_km {
        Some(_) if filters.near.is_none() => Err(HospitalError::ValidationError(
            "radius_km requires a reference point".to_string(),
        )),
        Some(radius) if !(radius > 0.0) => Err(HospitalError::ValidationError(
            "radius_km must be positive".to_string(),
        )),
        _ => Ok(()),
    }
}

fn build_query(filters: &HospitalSearchFilters) -> TableQuery {
    let non_empty = |value: &Option<String>| {
        value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
    };

    TableQuery::new("hospitals")
        .filter_opt(non_empty(&filters.name).map(|n| Filter::ilike("name", n)))
        .filter_opt(non_empty(&filters.city).map(|c| Filter::eq("city", c)))
        .filter_opt(non_empty(&filters.district).map(|d| Filter::eq("district", d)))
        .filter_opt(non_empty(&filters.specialty).map(|s| Filter::contains("specialties", [s])))
}

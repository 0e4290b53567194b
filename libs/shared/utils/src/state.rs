use std::sync::Arc;

use shared_config::AppConfig;
use shared_database::SupabaseClient;

/// Shared request state. The store handle is created here once and handed to
/// every cell; nothing reaches the database through a global.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub supabase: Arc<SupabaseClient>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(&config));
        Self {
            config: Arc::new(config),
            supabase,
        }
    }

    pub fn default_slot_minutes(&self) -> i32 {
        self.config.default_slot_minutes
    }
}

use std::env;
use tracing::warn;

pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_SLOT_MINUTES: i32 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_jwt_secret: String,
    pub server_port: u16,
    pub default_slot_minutes: i32,
    pub cors_allowed_origin: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            server_port: parse_or_default("SERVER_PORT", DEFAULT_SERVER_PORT),
            default_slot_minutes: parse_or_default("DEFAULT_SLOT_MINUTES", DEFAULT_SLOT_MINUTES),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN").ok().filter(|v| !v.is_empty()),
        };

        if config.default_slot_minutes <= 0 {
            warn!(
                "DEFAULT_SLOT_MINUTES must be positive, falling back to {}",
                DEFAULT_SLOT_MINUTES
            );
            config.default_slot_minutes = DEFAULT_SLOT_MINUTES;
        }

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_jwt_secret.is_empty()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            supabase_jwt_secret: String::new(),
            server_port: DEFAULT_SERVER_PORT,
            default_slot_minutes: DEFAULT_SLOT_MINUTES,
            cors_allowed_origin: None,
        }
    }
}

fn parse_or_default<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} has invalid value {:?}, using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

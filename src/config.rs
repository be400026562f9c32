use chrono::FixedOffset;
use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    // Network time sync
    pub time_sources: Vec<String>,
    pub time_sync_interval_secs: u64,
    pub time_fetch_timeout_secs: u64,
    pub max_clock_drift_ms: i64,

    /// Local business timezone as a fixed UTC offset, in hours.
    pub tz_offset_hours: i32,
}

const DEFAULT_TIME_SOURCES: &str = "https://timeapi.io/api/Time/current/zone?timeZone=Asia/Taipei,\
https://worldtimeapi.org/api/timezone/Asia/Taipei,\
https://io.adafruit.com/api/v2/time/ISO-8601";

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            access_token_ttl: env::var("ACCESS_TOKEN_TTL")
                .unwrap_or_else(|_| "900".to_string()) // default 15 min
                .parse()
                .unwrap(),
            refresh_token_ttl: env::var("REFRESH_TOKEN_TTL")
                .unwrap_or_else(|_| "604800".to_string()) // default 7 days
                .parse()
                .unwrap(),

            rate_login_per_min: env::var("RATE_LOGIN_PER_MIN")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap(),
            rate_refresh_per_min: env::var("RATE_REFRESH_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
            rate_protected_per_min: env::var("RATE_PROTECTED_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),

            time_sources: env::var("TIME_SOURCES")
                .unwrap_or_else(|_| DEFAULT_TIME_SOURCES.to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            time_sync_interval_secs: env::var("TIME_SYNC_INTERVAL_SECS")
                .unwrap_or_else(|_| "900".to_string()) // default 15 min
                .parse()
                .unwrap(),
            time_fetch_timeout_secs: env::var("TIME_FETCH_TIMEOUT_SECS")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .unwrap(),
            max_clock_drift_ms: env::var("MAX_CLOCK_DRIFT_MS")
                .unwrap_or_else(|_| "60000".to_string()) // default 1 min
                .parse()
                .unwrap(),

            tz_offset_hours: env::var("TZ_OFFSET_HOURS")
                .unwrap_or_else(|_| "8".to_string())
                .parse()
                .unwrap(),
        }
    }

    pub fn local_tz(&self) -> FixedOffset {
        FixedOffset::east_opt(self.tz_offset_hours * 3600).expect("TZ_OFFSET_HOURS out of range")
    }
}

use crate::model::settings::AppSettings;
use chrono::NaiveDate;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

// Read-mostly master data consulted on every punch / leave computation.
// TTLs are short; admin mutations invalidate eagerly anyway.

static SETTINGS_CACHE: Lazy<Cache<&'static str, AppSettings>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(1)
        .time_to_live(Duration::from_secs(60))
        .build()
});

static HOLIDAY_CACHE: Lazy<Cache<&'static str, Arc<HashSet<NaiveDate>>>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(1)
        .time_to_live(Duration::from_secs(300))
        .build()
});

pub async fn settings(pool: &MySqlPool) -> Result<AppSettings, sqlx::Error> {
    SETTINGS_CACHE
        .try_get_with("settings", async {
            let row = sqlx::query_as::<_, AppSettings>(
                r#"
                SELECT office_lat, office_lng, allowed_radius_m, geofence_enabled
                FROM app_settings
                WHERE id = 1
                "#,
            )
            .fetch_optional(pool)
            .await?;

            Ok(row.unwrap_or_default())
        })
        .await
        .map_err(unwrap_load_error)
}

pub async fn holiday_dates(pool: &MySqlPool) -> Result<Arc<HashSet<NaiveDate>>, sqlx::Error> {
    HOLIDAY_CACHE
        .try_get_with("holidays", async {
            let dates = sqlx::query_scalar::<_, NaiveDate>("SELECT date FROM holidays")
                .fetch_all(pool)
                .await?;

            Ok(Arc::new(dates.into_iter().collect()))
        })
        .await
        .map_err(unwrap_load_error)
}

pub async fn invalidate_settings() {
    SETTINGS_CACHE.invalidate(&"settings").await;
}

pub async fn invalidate_holidays() {
    HOLIDAY_CACHE.invalidate(&"holidays").await;
}

// moka wraps the loader error in an Arc; unshare it so callers see sqlx::Error.
fn unwrap_load_error(e: Arc<sqlx::Error>) -> sqlx::Error {
    Arc::try_unwrap(e).unwrap_or_else(|shared| sqlx::Error::Protocol(shared.to_string()))
}

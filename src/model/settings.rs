use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Single-row application settings, admin-editable at runtime.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "office_lat": 25.0339,
        "office_lng": 121.5645,
        "allowed_radius_m": 100.0,
        "geofence_enabled": true
    })
)]
pub struct AppSettings {
    pub office_lat: f64,
    pub office_lng: f64,
    /// Maximum accepted distance from the office for a check-in, in meters.
    pub allowed_radius_m: f64,
    pub geofence_enabled: bool,
}

impl AppSettings {
    /// Geofencing is effective only when enabled and the office location has
    /// actually been configured.
    pub fn geofence_active(&self) -> bool {
        self.geofence_enabled && (self.office_lat != 0.0 || self.office_lng != 0.0)
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            office_lat: 0.0,
            office_lng: 0.0,
            allowed_radius_m: 100.0,
            geofence_enabled: true,
        }
    }
}

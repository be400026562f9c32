use crate::auth::auth::AuthUser;
use crate::clock::sync as net_clock;
use crate::config::Config;
use actix_web::{HttpResponse, Responder, web};

/// Trusted clock status
#[utoipa::path(
    get,
    path = "/api/v1/clock",
    responses(
        (status = 200, description = "Anchored clock state", body = Object, example = json!({
            "synced": true,
            "now_utc": "2026-01-05T00:27:31.512Z",
            "local_date": "2026-01-05",
            "local_time": "08:27:31",
            "host_drift_ms": -42
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Clock"
)]
pub async fn clock_status(_auth: AuthUser, config: web::Data<Config>) -> impl Responder {
    match net_clock::now_utc() {
        Some(now) => {
            let local = now.with_timezone(&config.local_tz());
            HttpResponse::Ok().json(serde_json::json!({
                "synced": true,
                "now_utc": now.to_rfc3339(),
                "local_date": local.date_naive(),
                "local_time": local.time().format("%H:%M:%S").to_string(),
                "host_drift_ms": net_clock::host_drift_ms(),
            }))
        }
        None => HttpResponse::Ok().json(serde_json::json!({
            "synced": false,
            "now_utc": null,
            "local_date": null,
            "local_time": null,
            "host_drift_ms": null,
        })),
    }
}

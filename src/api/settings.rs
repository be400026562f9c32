use crate::auth::auth::AuthUser;
use crate::model::settings::AppSettings;
use crate::utils::cache;
use actix_web::{HttpResponse, Responder, web};
use sqlx::MySqlPool;

/// Read application settings
#[utoipa::path(
    get,
    path = "/api/v1/settings",
    responses(
        (status = 200, description = "Current settings", body = AppSettings),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Settings"
)]
pub async fn get_settings(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let settings = cache::settings(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to load settings");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(settings))
}

/// Replace application settings (Admin)
#[utoipa::path(
    put,
    path = "/api/v1/settings",
    request_body = AppSettings,
    responses(
        (status = 200, description = "Settings saved", body = AppSettings),
        (status = 400, description = "Validation failure"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Settings"
)]
pub async fn update_settings(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<AppSettings>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    if payload.allowed_radius_m <= 0.0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "allowed_radius_m must be positive"
        })));
    }

    if !(-90.0..=90.0).contains(&payload.office_lat)
        || !(-180.0..=180.0).contains(&payload.office_lng)
    {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Office coordinates out of range"
        })));
    }

    sqlx::query(
        r#"
        INSERT INTO app_settings (id, office_lat, office_lng, allowed_radius_m, geofence_enabled)
        VALUES (1, ?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE
            office_lat = VALUES(office_lat),
            office_lng = VALUES(office_lng),
            allowed_radius_m = VALUES(allowed_radius_m),
            geofence_enabled = VALUES(geofence_enabled)
        "#,
    )
    .bind(payload.office_lat)
    .bind(payload.office_lng)
    .bind(payload.allowed_radius_m)
    .bind(payload.geofence_enabled)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to save settings");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    cache::invalidate_settings().await;

    Ok(HttpResponse::Ok().json(payload.into_inner()))
}

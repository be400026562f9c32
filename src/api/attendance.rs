use crate::auth::auth::AuthUser;
use crate::clock::sync as net_clock;
use crate::config::Config;
use crate::model::attendance::{PunchStatus, PunchType};
use crate::utils::{cache, geo};
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use sqlx::prelude::FromRow;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct PunchRequest {
    #[schema(example = 25.0341)]
    pub lat: f64,
    #[schema(example = 121.5642)]
    pub lng: f64,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AttendanceFilter {
    /// Filter by user ID (admins only; employees always see their own)
    #[schema(example = 42)]
    pub user_id: Option<u64>,
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub start: Option<NaiveDate>,
    #[schema(example = "2026-01-31", value_type = String, format = "date")]
    pub end: Option<NaiveDate>,
    /// Pagination page number (start with 1)
    #[schema(example = 1)]
    pub page: Option<u64>,
    #[schema(example = 20)]
    pub per_page: Option<u64>,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Date(NaiveDate),
}

#[derive(Serialize, Deserialize, FromRow, ToSchema)]
pub struct AttendanceResponse {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 42)]
    pub user_id: u64,
    #[schema(example = "jlin")]
    pub username: String,
    #[schema(example = "Jessica Lin")]
    pub display_name: String,
    #[schema(example = "Engineering")]
    pub department: String,
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "08:27:31", value_type = String)]
    pub time: NaiveTime,
    #[schema(example = "in")]
    pub punch_type: String,
    #[schema(example = "normal")]
    pub status: String,
    pub lat: f64,
    pub lng: f64,
    #[schema(example = 23.4)]
    pub distance_m: f64,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<AttendanceResponse>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

/// Punch in/out with geolocation verification
#[utoipa::path(
    post,
    path = "/api/v1/attendance/punch",
    request_body = PunchRequest,
    responses(
        (status = 200, description = "Punch recorded", body = Object, example = json!({
            "message": "Punched in",
            "punch_type": "in",
            "status": "normal",
            "distance_m": 23.4
        })),
        (status = 400, description = "Too far from office", body = Object, example = json!({
            "message": "Too far from office (412m), check-in refused"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Trusted time unavailable", body = Object, example = json!({
            "message": "Network time not synced, punching is disabled"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn punch(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<PunchRequest>,
) -> actix_web::Result<impl Responder> {
    // Punching runs on the anchored network clock, never the host clock.
    let now = match net_clock::now_utc() {
        Some(now) => now,
        None => {
            return Ok(HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "message": "Network time not synced, punching is disabled"
            })));
        }
    };

    if let Some(drift) = net_clock::host_drift_ms() {
        if drift.abs() > config.max_clock_drift_ms {
            tracing::warn!(drift_ms = drift, "host clock drift exceeds limit");
            return Ok(HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "message": "Host clock differs too much from network time, punching is disabled"
            })));
        }
    }

    let settings = cache::settings(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to load settings");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // Alternate punch direction from the caller's latest record.
    let last_type = sqlx::query_scalar::<_, String>(
        r#"
        SELECT punch_type
        FROM attendance_records
        WHERE user_id = ?
        ORDER BY id DESC
        LIMIT 1
        "#,
    )
    .bind(auth.user_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Failed to fetch last punch");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let punch_type = match last_type.as_deref() {
        Some("in") => PunchType::Out,
        _ => PunchType::In,
    };

    let mut status = PunchStatus::Normal;
    let mut distance_m = 0.0;

    if settings.geofence_active() {
        distance_m = geo::distance_m(
            payload.lat,
            payload.lng,
            settings.office_lat,
            settings.office_lng,
        );

        if distance_m > settings.allowed_radius_m {
            match punch_type {
                // Check-in outside the fence is refused outright
                PunchType::In => {
                    return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                        "message": format!(
                            "Too far from office ({:.0}m), check-in refused",
                            distance_m
                        )
                    })));
                }
                // Check-out is accepted but flagged
                PunchType::Out => status = PunchStatus::OutOfRange,
            }
        }
    }

    let local = now.with_timezone(&config.local_tz());
    let date = local.date_naive();
    let time = local.time();

    sqlx::query(
        r#"
        INSERT INTO attendance_records
            (user_id, date, time, punch_type, status, lat, lng, distance_m)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(auth.user_id)
    .bind(date)
    .bind(time)
    .bind(punch_type.to_string())
    .bind(status.to_string())
    .bind(payload.lat)
    .bind(payload.lng)
    .bind(distance_m)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Punch insert failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": match punch_type {
            PunchType::In => "Punched in",
            PunchType::Out => "Punched out",
        },
        "punch_type": punch_type,
        "status": status,
        "date": date,
        "time": time.format("%H:%M:%S").to_string(),
        "distance_m": distance_m,
    })))
}

/// List attendance records
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(AttendanceFilter),
    responses(
        (status = 200, description = "Paginated attendance list", body = AttendanceListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceFilter>,
) -> actix_web::Result<impl Responder> {
    let per_page = query.per_page.unwrap_or(20).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    // Employees only ever see their own records
    let user_filter = if auth.is_admin() {
        query.user_id
    } else {
        Some(auth.user_id)
    };

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(user_id) = user_filter {
        where_sql.push_str(" AND r.user_id = ?");
        args.push(FilterValue::U64(user_id));
    }

    if let Some(start) = query.start {
        where_sql.push_str(" AND r.date >= ?");
        args.push(FilterValue::Date(start));
    }

    if let Some(end) = query.end {
        where_sql.push_str(" AND r.date <= ?");
        args.push(FilterValue::Date(end));
    }

    let count_sql = format!(
        "SELECT COUNT(*) FROM attendance_records r{}",
        where_sql
    );

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Date(d) => count_q.bind(*d),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count attendance records");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT r.id, r.user_id, u.username, u.display_name, u.department,
               r.date, r.time, r.punch_type, r.status, r.lat, r.lng, r.distance_m
        FROM attendance_records r
        JOIN users u ON u.id = r.user_id
        {}
        ORDER BY r.id DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, AttendanceResponse>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Date(d) => data_q.bind(d),
        };
    }

    let records = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch attendance list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(AttendanceListResponse {
        data: records,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}

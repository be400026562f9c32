use crate::auth::auth::AuthUser;
use crate::model::announcement::{Announcement, AnnouncementCategory};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct AnnouncementBody {
    #[schema(example = "Office closed on Friday")]
    pub title: String,
    #[schema(example = "The office is closed for the company outing.")]
    pub content: String,
    #[schema(example = "general")]
    pub category: AnnouncementCategory,
}

/// List announcements, newest first
#[utoipa::path(
    get,
    path = "/api/v1/announcements",
    responses(
        (status = 200, description = "Announcement list", body = [Announcement]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Announcement"
)]
pub async fn list_announcements(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let rows = sqlx::query_as::<_, Announcement>(
        r#"
        SELECT id, title, content, category, author, created_at
        FROM announcements
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch announcements");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(rows))
}

/// Publish an announcement (Admin)
#[utoipa::path(
    post,
    path = "/api/v1/announcements",
    request_body = AnnouncementBody,
    responses(
        (status = 201, description = "Announcement published"),
        (status = 400, description = "Validation failure"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Announcement"
)]
pub async fn create_announcement(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<AnnouncementBody>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    if payload.title.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Title must not be empty"
        })));
    }

    sqlx::query(
        r#"
        INSERT INTO announcements (title, content, category, author)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(payload.title.trim())
    .bind(&payload.content)
    .bind(payload.category.to_string())
    .bind(&auth.username)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to create announcement");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Announcement published"
    })))
}

/// Edit an announcement (Admin)
#[utoipa::path(
    put,
    path = "/api/v1/announcements/{announcement_id}",
    params(
        ("announcement_id" = u64, Path, description = "Announcement ID")
    ),
    request_body = AnnouncementBody,
    responses(
        (status = 200, description = "Announcement updated"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Announcement not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Announcement"
)]
pub async fn update_announcement(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<AnnouncementBody>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let announcement_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE announcements
        SET title = ?, content = ?, category = ?
        WHERE id = ?
        "#,
    )
    .bind(payload.title.trim())
    .bind(&payload.content)
    .bind(payload.category.to_string())
    .bind(announcement_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, announcement_id, "Failed to update announcement");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Announcement not found"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Announcement updated"
    })))
}

/// Remove an announcement (Admin)
#[utoipa::path(
    delete,
    path = "/api/v1/announcements/{announcement_id}",
    params(
        ("announcement_id" = u64, Path, description = "Announcement ID")
    ),
    responses(
        (status = 200, description = "Announcement removed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Announcement not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Announcement"
)]
pub async fn delete_announcement(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let announcement_id = path.into_inner();

    let result = sqlx::query("DELETE FROM announcements WHERE id = ?")
        .bind(announcement_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, announcement_id, "Failed to delete announcement");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Announcement not found"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Announcement removed"
    })))
}

use crate::{
    api::{
        announcement, attendance, clock_info, employee, holiday, leave_request, overtime_request,
        profile, report, settings,
    },
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(web::resource("/me").route(web::get().to(profile::me)))
            .service(web::resource("/clock").route(web::get().to(clock_info::clock_status)))
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("").route(web::get().to(attendance::list_attendance)),
                    )
                    .service(
                        web::resource("/punch").route(web::post().to(attendance::punch)),
                    ),
            )
            .service(
                web::scope("/leave")
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(leave_request::get_leave))
                            .route(web::delete().to(leave_request::delete_leave)),
                    )
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(leave_request::reject_leave)),
                    )
                    .service(
                        web::resource("/{id}/cancel")
                            .route(web::put().to(leave_request::cancel_leave)),
                    ),
            )
            .service(
                web::scope("/overtime")
                    .service(
                        web::resource("")
                            .route(web::get().to(overtime_request::overtime_list))
                            .route(web::post().to(overtime_request::create_overtime)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(overtime_request::get_overtime))
                            .route(web::put().to(overtime_request::update_overtime))
                            .route(web::delete().to(overtime_request::delete_overtime)),
                    )
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(overtime_request::approve_overtime)),
                    )
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(overtime_request::reject_overtime)),
                    )
                    .service(
                        web::resource("/{id}/cancel")
                            .route(web::put().to(overtime_request::cancel_overtime)),
                    ),
            )
            .service(
                web::scope("/announcements")
                    .service(
                        web::resource("")
                            .route(web::get().to(announcement::list_announcements))
                            .route(web::post().to(announcement::create_announcement)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(announcement::update_announcement))
                            .route(web::delete().to(announcement::delete_announcement)),
                    ),
            )
            .service(
                web::scope("/holidays")
                    .service(
                        web::resource("")
                            .route(web::get().to(holiday::list_holidays))
                            .route(web::post().to(holiday::create_holiday)),
                    )
                    .service(
                        web::resource("/{id}").route(web::delete().to(holiday::delete_holiday)),
                    ),
            )
            .service(
                web::resource("/settings")
                    .route(web::get().to(settings::get_settings))
                    .route(web::put().to(settings::update_settings)),
            )
            .service(
                web::scope("/employees")
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    )
                    .service(
                        web::resource("/{id}/archive")
                            .route(web::put().to(employee::archive_employee)),
                    )
                    .service(
                        web::resource("/{id}/restore")
                            .route(web::put().to(employee::restore_employee)),
                    ),
            )
            .service(
                web::scope("/reports")
                    .service(
                        web::resource("/attendance.csv")
                            .route(web::get().to(report::export_attendance)),
                    )
                    .service(
                        web::resource("/leave.csv").route(web::get().to(report::export_leave)),
                    )
                    .service(
                        web::resource("/overtime.csv")
                            .route(web::get().to(report::export_overtime)),
                    )
                    .service(
                        web::resource("/employees/{id}/leave.csv")
                            .route(web::get().to(report::export_employee_leave)),
                    ),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)
//
// API REQUEST
//  └─ Authorization: Bearer access_token
//
// ACCESS EXPIRED
//  └─ POST /refresh with refresh_token
//       └─ returns new access_token

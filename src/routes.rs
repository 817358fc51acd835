use crate::{
    api::{
        attendance, department, holiday, leave, leave_type, notification, payslip, project,
        time_entry, user,
    },
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    governor::middleware::NoOpMiddleware, Governor, GovernorConfigBuilder, PeerIpKeyExtractor,
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
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
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
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&format!("{}/v1", config.api_prefix))
            .wrap(from_fn(auth_middleware))
            .wrap(protected_limiter)
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("")
                            .route(web::get().to(attendance::list)),
                    )
                    .service(
                        web::resource("/check-in").route(web::post().to(attendance::check_in)),
                    )
                    .service(
                        web::resource("/check-out").route(web::post().to(attendance::check_out)),
                    )
                    .service(
                        web::resource("/manual").route(web::post().to(attendance::create_manual)),
                    )
                    .service(web::resource("/{id}").route(web::put().to(attendance::edit))),
            )
            .service(
                web::scope("/leaves")
                    .service(
                        web::resource("")
                            .route(web::get().to(leave::list))
                            .route(web::post().to(leave::create)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(leave::get))
                            .route(web::put().to(leave::edit)),
                    )
                    .service(
                        web::resource("/{id}/approve").route(web::post().to(leave::approve)),
                    )
                    .service(web::resource("/{id}/reject").route(web::post().to(leave::reject))),
            )
            .service(
                web::scope("/leave-types")
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_type::list))
                            .route(web::post().to(leave_type::create)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(leave_type::update))
                            .route(web::delete().to(leave_type::remove)),
                    ),
            )
            .service(
                web::scope("/time-entries")
                    .service(
                        web::resource("")
                            .route(web::get().to(time_entry::list))
                            .route(web::post().to(time_entry::create)),
                    )
                    .service(
                        web::resource("/bulk-delete")
                            .route(web::post().to(time_entry::bulk_remove)),
                    )
                    .service(
                        web::resource("/report/weekly")
                            .route(web::get().to(time_entry::weekly_report)),
                    )
                    .service(
                        web::resource("/report/summary")
                            .route(web::get().to(time_entry::project_summary)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(time_entry::update))
                            .route(web::delete().to(time_entry::remove)),
                    )
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::post().to(time_entry::approve)),
                    ),
            )
            .service(
                web::scope("/users")
                    .service(web::resource("").route(web::get().to(user::list)))
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(user::get))
                            .route(web::put().to(user::update)),
                    ),
            )
            .service(
                web::scope("/departments")
                    .service(
                        web::resource("")
                            .route(web::get().to(department::list))
                            .route(web::post().to(department::create)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(department::update))
                            .route(web::delete().to(department::remove)),
                    ),
            )
            .service(
                web::scope("/projects")
                    .service(
                        web::resource("")
                            .route(web::get().to(project::list))
                            .route(web::post().to(project::create)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(project::update))
                            .route(web::delete().to(project::remove)),
                    ),
            )
            .service(
                web::scope("/holidays")
                    .service(
                        web::resource("")
                            .route(web::get().to(holiday::list))
                            .route(web::post().to(holiday::create)),
                    )
                    .service(web::resource("/bulk").route(web::post().to(holiday::bulk_import)))
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(holiday::update))
                            .route(web::delete().to(holiday::remove)),
                    ),
            )
            .service(
                web::scope("/payslips")
                    .service(web::resource("").route(web::get().to(payslip::list)))
                    .service(
                        web::resource("/bulk").route(web::post().to(payslip::bulk_upload)),
                    ),
            )
            .service(
                web::scope("/notifications")
                    .service(web::resource("").route(web::get().to(notification::list)))
                    .service(
                        web::resource("/read-all")
                            .route(web::post().to(notification::mark_all_read)),
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

use crate::{
    api::{attendance, dashboard},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap()
    }

    let login_limiter = build_limiter(config.rate_login_per_min);
    let register_limiter = build_limiter(config.rate_register_per_min);
    let refresh_limiter = build_limiter(config.rate_refresh_per_min);
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(Governor::new(&login_limiter))
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(Governor::new(&register_limiter))
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(Governor::new(&refresh_limiter))
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(Governor::new(&login_limiter))
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(Governor::new(&protected_limiter)) // rate limiting
            .service(web::resource("/me").route(web::get().to(handlers::me)))
            .service(
                web::scope("/attendance")
                    // employee
                    .service(
                        web::resource("/checkin").route(web::post().to(attendance::check_in)),
                    )
                    .service(
                        web::resource("/checkout").route(web::post().to(attendance::check_out)),
                    )
                    .service(
                        web::resource("/my-history").route(web::get().to(attendance::my_history)),
                    )
                    .service(
                        web::resource("/my-summary").route(web::get().to(attendance::my_summary)),
                    )
                    .service(
                        web::resource("/today").route(web::get().to(attendance::today_status)),
                    )
                    // manager
                    .service(web::resource("/all").route(web::get().to(attendance::all_records)))
                    .service(
                        web::resource("/employee/{id}")
                            .route(web::get().to(attendance::employee_history)),
                    )
                    .service(
                        web::resource("/summary")
                            .route(web::get().to(attendance::team_summary_view)),
                    )
                    .service(web::resource("/report").route(web::get().to(attendance::report)))
                    .service(web::resource("/export").route(web::get().to(attendance::export_csv)))
                    .service(
                        web::resource("/today-status")
                            .route(web::get().to(attendance::today_team_status)),
                    ),
            )
            .service(
                web::scope("/dashboard")
                    .service(
                        web::resource("/employee")
                            .route(web::get().to(dashboard::employee_dashboard)),
                    )
                    .service(
                        web::resource("/manager")
                            .route(web::get().to(dashboard::manager_dashboard)),
                    ),
            ),
    );
}

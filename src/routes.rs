use crate::{
    api::{attendance, auto_close, payroll},
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
        let requests_per_min = requests_per_min.max(1);
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond((60_000 / u64::from(requests_per_min)).max(1))
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .expect("non-zero period and burst size");
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth").service(
            web::resource("/login")
                .wrap(login_limiter)
                .route(web::post().to(handlers::login)),
        ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(web::resource("").route(web::post().to(attendance::record_event)))
                    // /attendance/note
                    .service(web::resource("/note").route(web::put().to(attendance::update_note)))
                    .service(web::resource("/today").route(web::get().to(attendance::today)))
                    .service(web::resource("/events").route(web::get().to(attendance::events)))
                    .service(web::resource("/presence").route(web::get().to(attendance::presence)))
                    .service(web::resource("/monthly").route(web::get().to(attendance::monthly))),
            )
            .service(web::resource("/balances").route(web::get().to(payroll::list_balances)))
            .service(
                web::scope("/employees/{employee_id}")
                    .service(web::resource("/balance").route(web::get().to(payroll::get_balance)))
                    .service(web::resource("/settle").route(web::post().to(payroll::settle))),
            )
            .service(
                web::scope("/payments")
                    .service(
                        web::resource("")
                            .route(web::get().to(payroll::list_payments))
                            .route(web::post().to(payroll::record_payment)),
                    )
                    .service(
                        web::resource("/summary").route(web::get().to(payroll::payment_summary)),
                    ),
            )
            .service(web::resource("/auto-close").route(web::post().to(auto_close::run_auto_close))),
    );
}

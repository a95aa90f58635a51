use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use wage_ledger::config::Config;
use wage_ledger::db::{bootstrap_manager, init_db};
use wage_ledger::docs::ApiDoc;
use wage_ledger::ledger::LedgerService;
use wage_ledger::ledger::scheduler::AutoCloseScheduler;
use wage_ledger::routes;

#[get("/")]
async fn index() -> impl Responder {
    "Wage ledger is running"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(EnvFilter::new(&config.log_level))
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(timezone = %config.timezone, "Server starting...");

    let pool = init_db(&config.database_url).await?;
    if let Some(pin) = &config.bootstrap_manager_pin {
        bootstrap_manager(&pool, pin).await?;
    }

    let ledger = Arc::new(LedgerService::new(
        pool.clone(),
        config.timezone,
        config.auto_close_at,
    ));

    let shutdown = CancellationToken::new();
    let scheduler = AutoCloseScheduler::new(ledger.clone(), shutdown.clone());
    let scheduler_handle = actix_web::rt::spawn(scheduler.run());

    let server_addr = config.server_addr.clone();
    let ledger_data = Data::from(ledger);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(ledger_data.clone())
            .service(index)
            // auth + protected routes
            .configure(|cfg| routes::configure(cfg, config.clone()))
    })
    .bind(server_addr)?
    .run()
    .await?;

    info!("Server stopped, shutting down background tasks");
    shutdown.cancel();
    let _ = scheduler_handle.await;

    Ok(())
}

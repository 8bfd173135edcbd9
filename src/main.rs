use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http::header, middleware::NormalizePath, web, App, HttpServer};
use anyhow::Context;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use portfolio_site::{
    background_task::{start_github_refresh_task, start_limiter_eviction_task},
    db::postgres::{create_pool, run_migrations, PoolStatus},
    github::client::{GithubClient, RepositorySource},
    graceful_shutdown::shutdown_signal,
    mail::{
        mailer::{DisabledMailer, Mailer},
        smtp::SmtpMailer,
    },
    middlewares::admin::AdminAuth,
    routes::configure_routes,
    settings::AppConfig,
    shared_repos::SharedRepositories,
    AppState,
};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn build_cors(origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers(vec!["X-Cache", "X-Data-Source"])
        .max_age(3600);

    if origins.iter().any(|o| o == "*") {
        return cors.allow_any_origin();
    }
    origins.iter().fold(cors, |cors, origin| cors.allowed_origin(origin))
}

async fn build_mailer(config: &AppConfig) -> Arc<dyn Mailer> {
    match SmtpMailer::from_config(config) {
        Ok(Some(mailer)) => {
            if mailer.verify().await {
                tracing::info!("📧 SMTP connection verified");
            }
            Arc::new(mailer)
        }
        Ok(None) => {
            tracing::warn!("SMTP is not configured; contact messages will only be stored");
            Arc::new(DisabledMailer)
        }
        Err(e) => {
            tracing::error!("Invalid SMTP configuration: {}. Email delivery disabled", e);
            Arc::new(DisabledMailer)
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = match AppConfig::new() {
        Ok(cfg) => cfg,
        Err(e) => {
            init_tracing(false);
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(config.is_production());
    tracing::info!("Loaded configuration: {:?}", config);

    if config.admin_token.is_none() {
        tracing::warn!("ADMIN_TOKEN is not set; admin routes are open");
    }

    let (pool, status) = create_pool(&config)
        .await
        .context("Failed to create database connection pool")?;

    if status == PoolStatus::Connected {
        if let Err(e) = run_migrations(&pool).await {
            tracing::error!("Failed to apply migrations: {}", e);
        }
    }

    let mailer = build_mailer(&config).await;
    let github_source: Arc<dyn RepositorySource> = Arc::new(
        GithubClient::new(&config).context("Failed to build GitHub client")?,
    );

    let app_state = web::Data::new(AppState::new(
        &config,
        SharedRepositories::new(pool),
        mailer,
        github_source,
    ));

    app_state
        .uploads
        .ensure_dir()
        .await
        .with_context(|| format!("Failed to create upload directory {:?}", config.upload_dir))?;

    if config.github_auto_refresh {
        tokio::spawn(start_github_refresh_task(
            app_state.github_handler.clone(),
            config.github_refresh_interval(),
            config.github_refresh_max_interval(),
        ));
    }
    tokio::spawn(start_limiter_eviction_task(app_state.contact_handler.limiter.clone()));

    let server_addr = format!("{}:{}", config.host, config.port);

    tracing::info!(
        "🚀 Starting {} v{} on {}",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    let origins = config.cors_origins();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(AdminAuth)
            .wrap(build_cors(&origins))
            .wrap(NormalizePath::trim())
            .wrap(TracingLogger::default())
            .configure(configure_routes)
    })
    .workers(config.worker_count)
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {server_addr}"))?
    .run();

    tokio::select! {
        res = server => res.context("HTTP server error")?,
        _ = shutdown_signal() => {},
    }

    tracing::info!("Server stopped");
    Ok(())
}

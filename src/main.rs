use std::{process, sync::Arc};

use storefront_menu::{
    application::{error::AppError, menu::MenuService, repos::RecordSource},
    cache::{CacheConfig, MenuCache},
    config,
    infra::{
        db::PostgresRecordSource,
        error::InfraError,
        http::{self, MenuState},
        telemetry,
    },
};
use tokio::sync::oneshot;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let db = init_record_source(&settings)?;
    let source = db
        .clone()
        .map(|db| Arc::new(db) as Arc<dyn RecordSource>);

    let cache = Arc::new(MenuCache::menu());
    let menu = MenuService::new(source, cache, CacheConfig::from(&settings.cache));

    let state = MenuState {
        menu: Arc::new(menu),
        db,
    };

    serve_http(&settings, state).await
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    let database_url = database_url(&settings)?;

    let pool = PostgresRecordSource::connect(database_url, &settings.database)
        .await
        .map_err(InfraError::from)?;

    PostgresRecordSource::run_migrations(&pool)
        .await
        .map_err(InfraError::from)?;

    info!(target = "storefront_menu::migrate", "Menu schema is up to date");
    Ok(())
}

fn init_record_source(
    settings: &config::Settings,
) -> Result<Option<PostgresRecordSource>, AppError> {
    let Some(database_url) = settings.database.url.as_deref() else {
        warn!(
            target = "storefront_menu::serve",
            "Database url is not configured; menu reads will be empty"
        );
        return Ok(None);
    };

    let pool = PostgresRecordSource::connect_lazy(database_url, &settings.database)
        .map_err(InfraError::from)?;
    Ok(Some(PostgresRecordSource::new(pool)))
}

fn database_url(settings: &config::Settings) -> Result<&str, AppError> {
    settings
        .database
        .url
        .as_deref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)
}

async fn serve_http(settings: &config::Settings, state: MenuState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(InfraError::from)?;

    info!(
        target = "storefront_menu::serve",
        addr = %settings.server.addr,
        "Menu service listening"
    );

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, router.into_make_service()).with_graceful_shutdown(
        async move {
            let _ = stop_rx.await;
        },
    );
    let mut server = tokio::spawn(async move { server.await });

    tokio::select! {
        joined = &mut server => return server_result(joined),
        _ = tokio::signal::ctrl_c() => {}
    }

    info!(
        target = "storefront_menu::serve",
        grace_seconds = settings.server.graceful_shutdown.as_secs(),
        "Shutdown requested; draining connections"
    );
    let _ = stop_tx.send(());

    match tokio::time::timeout(settings.server.graceful_shutdown, &mut server).await {
        Ok(joined) => server_result(joined),
        Err(_) => {
            warn!(
                target = "storefront_menu::serve",
                "Graceful shutdown timed out; aborting open connections"
            );
            server.abort();
            Ok(())
        }
    }
}

fn server_result(
    joined: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    joined
        .map_err(|err| AppError::unexpected(format!("server task failed: {err}")))?
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))
}

use medride::config::AppConfig;
use medride::db::init_pool;
use medride::error::AppError;
use medride::routes::create_router;
use medride::services::{
    checkoffs::CheckoffService, dispatch::SqlDispatch, invoices::InvoiceService,
    profile::ProfileService, trips::TripService,
};
use medride::state::AppState;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = AppConfig::from_env()?;
    let db = init_pool(&config.database_url).await?;

    if let Err(err) = sqlx::migrate!("./migrations").run(&db).await {
        error!("migration failed: {err:?}");
        return Err(AppError::Other(err.into()));
    }

    let dispatch = Arc::new(SqlDispatch::new(db.clone()));
    let trips = TripService::new(db.clone(), dispatch);
    let checkoffs = CheckoffService::new(db.clone());
    let invoices = InvoiceService::new(db.clone());
    let profiles = ProfileService::new(db.clone());

    let state = AppState::new(
        config.clone(),
        db.clone(),
        trips,
        checkoffs,
        invoices,
        profiles,
    );

    let app = create_router(state.clone());

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,medride=debug".into());

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}

use axum::{
    extract::{Path, State},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::{
    auth::{self, CurrentDriver},
    error::AppError,
    models::{checkoff::CheckoffForm, driver::ProfileForm},
    state::AppState,
};

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard))
        .route("/trips", get(trips_list))
        .route("/trips/:id", get(trip_detail))
        .route("/trips/:id/accept", post(trip_accept))
        .route("/trips/:id/reject", post(trip_reject))
        .route("/trips/:id/start", post(trip_start))
        .route("/trips/:id/arrive", post(trip_arrive))
        .route("/trips/:id/complete", post(trip_complete))
        .route("/trips/:id/location", post(trip_location))
        .route(
            "/vehicle-checkoff",
            get(checkoff_today).post(checkoff_submit),
        )
        .route("/profile", get(profile_get).post(profile_update))
        .route("/earnings", get(earnings))
        .route("/invoices", get(invoices_list))
        .route("/invoices/:id", get(invoice_detail))
        .route_layer(middleware::from_fn_with_state(state, auth::load_session))
}

async fn dashboard(
    State(state): State<AppState>,
    current: CurrentDriver,
) -> Result<impl IntoResponse, AppError> {
    let driver = current.require_driver()?;
    let current_trips = state.trips.list_current(&driver.id).await?;
    let checkoff = state
        .checkoffs
        .find_for_date(&driver.id, Utc::now().date_naive())
        .await?;
    Ok(Json(json!({
        "username": driver.username,
        "current_trip_count": current_trips.len(),
        "checkoff_complete_today": checkoff.is_some(),
    })))
}

async fn trips_list(
    State(state): State<AppState>,
    current: CurrentDriver,
) -> Result<impl IntoResponse, AppError> {
    let driver = current.require_driver()?;
    let current_trips = state.trips.list_current(&driver.id).await?;
    let completed = state.trips.list_completed(&driver.id).await?;
    let rejected = state.trips.list_rejected(&driver.id).await?;
    Ok(Json(json!({
        "current": current_trips,
        "completed": completed,
        "rejected": rejected,
    })))
}

async fn trip_detail(
    State(state): State<AppState>,
    current: CurrentDriver,
    Path(trip_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let driver = current.require_driver()?;
    let details = state.trips.details(&trip_id, &driver.id).await?;
    Ok(Json(json!({
        "trip": details.trip,
        "client_name": details.client_name(),
        "client_phone": details.client_phone(),
        "client_email": details.client_email(),
        "facility": details.facility,
    })))
}

async fn trip_accept(
    State(state): State<AppState>,
    current: CurrentDriver,
    Path(trip_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let driver = current.require_driver()?;
    let trip = state.trips.accept(&trip_id, &driver.id).await?;
    Ok(Json(trip))
}

async fn trip_reject(
    State(state): State<AppState>,
    current: CurrentDriver,
    Path(trip_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let driver = current.require_driver()?;
    let trip = state.trips.reject(&trip_id, &driver.id).await?;
    Ok(Json(trip))
}

async fn trip_start(
    State(state): State<AppState>,
    current: CurrentDriver,
    Path(trip_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let driver = current.require_driver()?;
    let trip = state.trips.start(&trip_id, &driver.id).await?;
    Ok(Json(trip))
}

async fn trip_arrive(
    State(state): State<AppState>,
    current: CurrentDriver,
    Path(trip_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let driver = current.require_driver()?;
    let trip = state.trips.arrive_pickup(&trip_id, &driver.id).await?;
    Ok(Json(trip))
}

#[derive(Deserialize)]
struct CompleteRequest {
    #[serde(default)]
    feedback: Option<String>,
    signature: String,
}

async fn trip_complete(
    State(state): State<AppState>,
    current: CurrentDriver,
    Path(trip_id): Path<String>,
    Json(body): Json<CompleteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let driver = current.require_driver()?;
    let trip = state
        .trips
        .complete(&trip_id, &driver.id, body.feedback.as_deref(), &body.signature)
        .await?;
    Ok(Json(trip))
}

#[derive(Deserialize)]
struct LocationSample {
    lat: f64,
    lng: f64,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
}

async fn trip_location(
    State(state): State<AppState>,
    current: CurrentDriver,
    Path(trip_id): Path<String>,
    Json(sample): Json<LocationSample>,
) -> Result<impl IntoResponse, AppError> {
    let driver = current.require_driver()?;
    state
        .trips
        .record_location(&trip_id, &driver.id, sample.lat, sample.lng, sample.timestamp)
        .await?;
    Ok(Json(json!({ "ok": true })))
}

async fn checkoff_today(
    State(state): State<AppState>,
    current: CurrentDriver,
) -> Result<impl IntoResponse, AppError> {
    let driver = current.require_driver()?;
    let checkoff = state
        .checkoffs
        .find_for_date(&driver.id, Utc::now().date_naive())
        .await?;
    Ok(Json(json!({ "checkoff": checkoff })))
}

async fn checkoff_submit(
    State(state): State<AppState>,
    current: CurrentDriver,
    Json(form): Json<CheckoffForm>,
) -> Result<impl IntoResponse, AppError> {
    let driver = current.require_driver()?;
    let critical_failures = form.critical_failures();
    let checkoff = state
        .checkoffs
        .upsert(&driver.id, Utc::now().date_naive(), &form)
        .await?;
    Ok(Json(json!({
        "checkoff": checkoff,
        "critical_failures": critical_failures,
    })))
}

async fn profile_get(
    State(state): State<AppState>,
    current: CurrentDriver,
) -> Result<impl IntoResponse, AppError> {
    let driver = current.require_driver()?;
    let profile = state.profiles.get(&driver.id).await?;
    Ok(Json(profile))
}

async fn profile_update(
    State(state): State<AppState>,
    current: CurrentDriver,
    Json(form): Json<ProfileForm>,
) -> Result<impl IntoResponse, AppError> {
    let driver = current.require_driver()?;
    let profile = state.profiles.update(&driver.id, &form).await?;
    Ok(Json(profile))
}

async fn earnings(
    State(state): State<AppState>,
    current: CurrentDriver,
) -> Result<impl IntoResponse, AppError> {
    let driver = current.require_driver()?;
    let summary = state.invoices.earnings_summary(&driver.id).await?;
    Ok(Json(summary))
}

async fn invoices_list(
    State(state): State<AppState>,
    current: CurrentDriver,
) -> Result<impl IntoResponse, AppError> {
    let driver = current.require_driver()?;
    let invoices = state.invoices.list_for_driver(&driver.id).await?;
    Ok(Json(json!({ "invoices": invoices })))
}

async fn invoice_detail(
    State(state): State<AppState>,
    current: CurrentDriver,
    Path(invoice_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let driver = current.require_driver()?;
    let invoice = state.invoices.find_for_driver(&invoice_id, &driver.id).await?;
    Ok(Json(invoice))
}

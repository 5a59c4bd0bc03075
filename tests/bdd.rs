use std::{collections::HashMap, fmt, fs::File, net::SocketAddr, sync::Arc};

use anyhow::Context;
use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use cucumber::{given, then, when, World as _};
use medride::{
    auth::{self, AuthenticatedDriver},
    config::AppConfig,
    db::init_pool,
    error::AppError,
    models::checkoff::CheckoffForm,
    models::driver::ProfileForm,
    models::trip::{Trip, TripStatus},
    services::{
        checkoffs::CheckoffService,
        dispatch::{DispatchRpc, SqlDispatch},
        invoices::InvoiceService,
        profile::ProfileService,
        trips::TripService,
    },
    state::AppState,
};
use tempfile::TempDir;
use uuid::Uuid;

#[derive(Debug, cucumber::World, Default)]
struct PortalWorld {
    state: Option<TestState>,
    drivers: HashMap<String, AuthenticatedDriver>,
    trips: HashMap<String, String>,
    invoices: HashMap<String, String>,
    last: Option<Result<(), String>>,
}

impl PortalWorld {
    fn app(&self) -> &AppState {
        self.state
            .as_ref()
            .expect("state must be initialised first")
            .app()
    }

    fn driver(&self, name: &str) -> &AuthenticatedDriver {
        self.drivers
            .get(name)
            .unwrap_or_else(|| panic!("driver {name} must be registered first"))
    }

    fn trip_id(&self, label: &str) -> &str {
        self.trips
            .get(label)
            .unwrap_or_else(|| panic!("trip {label} must be seeded first"))
    }

    fn record(&mut self, outcome: Result<(), String>) {
        self.last = Some(outcome);
    }

    fn last_outcome(&self) -> &Result<(), String> {
        self.last.as_ref().expect("an action must have run first")
    }
}

struct TestState {
    app: AppState,
    _root: TempDir,
}

impl fmt::Debug for TestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestState").finish()
    }
}

impl TestState {
    async fn new() -> anyhow::Result<Self> {
        let root = TempDir::new().context("create temp dir for bdd world")?;

        let db_path = root.path().join("bdd.sqlite");
        File::create(&db_path)?;
        let database_url = format!("sqlite://{}", db_path.to_string_lossy());

        let config = AppConfig {
            database_url: database_url.clone(),
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            cookie_secret: "bdd-cookie-secret".into(),
            session_ttl_days: 30,
        };

        let db = init_pool(&config.database_url).await?;
        sqlx::migrate!("./migrations").run(&db).await?;

        let dispatch = Arc::new(SqlDispatch::new(db.clone()));
        let trips = TripService::new(db.clone(), dispatch);
        let checkoffs = CheckoffService::new(db.clone());
        let invoices = InvoiceService::new(db.clone());
        let profiles = ProfileService::new(db.clone());

        let app = AppState::new(config, db, trips, checkoffs, invoices, profiles);
        Ok(Self { app, _root: root })
    }

    fn app(&self) -> &AppState {
        &self.app
    }
}

async fn seed_trip(app: &AppState, status: &str, driver_id: Option<&str>) -> String {
    TripStatus::parse(status).unwrap_or_else(|| panic!("unknown trip status {status}"));
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO trips (id, driver_id, status, pickup_time, pickup_address, \
         destination_address, price) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(driver_id)
    .bind(status)
    .bind(Utc::now())
    .bind("12 Main St")
    .bind("St. Mary Dialysis Clinic")
    .bind(45.0)
    .execute(&app.db)
    .await
    .expect("seed trip");
    id
}

async fn fetch_trip(app: &AppState, trip_id: &str) -> Trip {
    sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE id = ?")
        .bind(trip_id)
        .fetch_one(&app.db)
        .await
        .expect("fetch trip")
}

#[given("a fresh application state")]
async fn given_fresh_state(world: &mut PortalWorld) {
    world.state = Some(TestState::new().await.expect("state"));
    world.drivers.clear();
    world.trips.clear();
    world.invoices.clear();
    world.last = None;
}

#[given(regex = r#"^a registered driver \"([^\"]+)\" with password \"([^\"]+)\"$"#)]
async fn given_registered_driver(world: &mut PortalWorld, name: String, password: String) {
    let email = format!("{name}@medride.test");
    let created = auth::register_driver(world.app(), &name, &email, &password)
        .await
        .expect("register driver");
    world.drivers.insert(name, created);
}

#[then(regex = r#"^I can authenticate as \"([^\"]+)\" using password \"([^\"]+)\"$"#)]
async fn then_can_authenticate(world: &mut PortalWorld, identifier: String, password: String) {
    let authed = auth::authenticate_driver(world.app(), &identifier, &password)
        .await
        .expect("authentication");
    assert_eq!(authed.username, identifier);
}

#[then(regex = r#"^authentication as \"([^\"]+)\" using password \"([^\"]+)\" fails$"#)]
async fn then_authentication_fails(world: &mut PortalWorld, identifier: String, password: String) {
    let result = auth::authenticate_driver(world.app(), &identifier, &password).await;
    assert!(result.is_err(), "authentication should have been refused");
}

#[given(regex = r#"^a trip \"([^\"]+)\" in status \"([^\"]+)\" assigned to \"([^\"]+)\"$"#)]
async fn given_assigned_trip(world: &mut PortalWorld, label: String, status: String, name: String) {
    let driver_id = world.driver(&name).id.clone();
    let id = seed_trip(world.app(), &status, Some(&driver_id)).await;
    world.trips.insert(label, id);
}

#[given(regex = r#"^an unassigned trip \"([^\"]+)\" in status \"pending\"$"#)]
async fn given_unassigned_trip(world: &mut PortalWorld, label: String) {
    let id = seed_trip(world.app(), "pending", None).await;
    world.trips.insert(label, id);
}

async fn seed_completed_trip(app: &AppState, driver_id: &str, price: f64, dropoff: DateTime<Utc>) {
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO trips (id, driver_id, status, pickup_time, actual_pickup_time, \
         actual_dropoff_time, pickup_address, destination_address, price) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(driver_id)
    .bind(TripStatus::Completed)
    .bind(dropoff)
    .bind(dropoff)
    .bind(dropoff)
    .bind("12 Main St")
    .bind("St. Mary Dialysis Clinic")
    .bind(price)
    .execute(&app.db)
    .await
    .expect("seed completed trip");
}

fn today_start() -> DateTime<Utc> {
    Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc()
}

#[given(regex = r#"^a completed trip for \"([^\"]+)\" priced ([\d.]+)$"#)]
async fn given_completed_trip(world: &mut PortalWorld, name: String, price: f64) {
    let driver_id = world.driver(&name).id.clone();
    seed_completed_trip(world.app(), &driver_id, price, Utc::now()).await;
}

#[given(
    regex = r#"^a completed trip for \"([^\"]+)\" priced ([\d.]+) dropped off before this week began$"#
)]
async fn given_completed_trip_last_week(world: &mut PortalWorld, name: String, price: f64) {
    let driver_id = world.driver(&name).id.clone();
    let week_start = today_start()
        - Duration::days(i64::from(Utc::now().date_naive().weekday().num_days_from_sunday()));
    seed_completed_trip(world.app(), &driver_id, price, week_start - Duration::hours(1)).await;
}

#[given(
    regex = r#"^a completed trip for \"([^\"]+)\" priced ([\d.]+) dropped off before this month began$"#
)]
async fn given_completed_trip_last_month(world: &mut PortalWorld, name: String, price: f64) {
    let driver_id = world.driver(&name).id.clone();
    let month_start = Utc::now()
        .date_naive()
        .with_day(1)
        .expect("the first of the current month is a valid date")
        .and_time(NaiveTime::MIN)
        .and_utc();
    seed_completed_trip(world.app(), &driver_id, price, month_start - Duration::hours(1)).await;
}

#[when(regex = r#"^the dispatcher assigns trip \"([^\"]+)\" to \"([^\"]+)\"$"#)]
async fn when_dispatcher_assigns(world: &mut PortalWorld, label: String, name: String) {
    let driver_id = world.driver(&name).id.clone();
    let trip_id = world.trip_id(&label).to_string();
    let dispatch = SqlDispatch::new(world.app().db.clone());
    let outcome = dispatch
        .assign_trip_to_driver(&trip_id, &driver_id)
        .await
        .map_err(|err| err.to_string());
    world.record(outcome);
}

#[when(regex = r#"^\"([^\"]+)\" accepts trip \"([^\"]+)\"$"#)]
async fn when_accepts(world: &mut PortalWorld, name: String, label: String) {
    let driver_id = world.driver(&name).id.clone();
    let trip_id = world.trip_id(&label).to_string();
    let outcome = world
        .app()
        .trips
        .accept(&trip_id, &driver_id)
        .await
        .map(|_| ())
        .map_err(|err| err.kind().to_string());
    world.record(outcome);
}

#[when(regex = r#"^\"([^\"]+)\" rejects trip \"([^\"]+)\"$"#)]
async fn when_rejects(world: &mut PortalWorld, name: String, label: String) {
    let driver_id = world.driver(&name).id.clone();
    let trip_id = world.trip_id(&label).to_string();
    let outcome = world
        .app()
        .trips
        .reject(&trip_id, &driver_id)
        .await
        .map(|_| ())
        .map_err(|err| err.kind().to_string());
    world.record(outcome);
}

#[when(regex = r#"^\"([^\"]+)\" starts trip \"([^\"]+)\"$"#)]
async fn when_starts(world: &mut PortalWorld, name: String, label: String) {
    let driver_id = world.driver(&name).id.clone();
    let trip_id = world.trip_id(&label).to_string();
    let outcome = world
        .app()
        .trips
        .start(&trip_id, &driver_id)
        .await
        .map(|_| ())
        .map_err(|err| err.kind().to_string());
    world.record(outcome);
}

#[when(regex = r#"^\"([^\"]+)\" marks pickup arrival on trip \"([^\"]+)\"$"#)]
async fn when_arrives(world: &mut PortalWorld, name: String, label: String) {
    let driver_id = world.driver(&name).id.clone();
    let trip_id = world.trip_id(&label).to_string();
    let outcome = world
        .app()
        .trips
        .arrive_pickup(&trip_id, &driver_id)
        .await
        .map(|_| ())
        .map_err(|err| err.kind().to_string());
    world.record(outcome);
}

#[when(
    regex = r#"^\"([^\"]+)\" completes trip \"([^\"]+)\" with feedback \"([^\"]*)\" and signature \"([^\"]*)\"$"#
)]
async fn when_completes(
    world: &mut PortalWorld,
    name: String,
    label: String,
    feedback: String,
    signature: String,
) {
    let driver_id = world.driver(&name).id.clone();
    let trip_id = world.trip_id(&label).to_string();
    let outcome = world
        .app()
        .trips
        .complete(&trip_id, &driver_id, Some(&feedback), &signature)
        .await
        .map(|_| ())
        .map_err(|err| err.kind().to_string());
    world.record(outcome);
}

#[when(regex = r#"^\"([^\"]+)\" performs \"([^\"]+)\" on trip \"([^\"]+)\"$"#)]
async fn when_performs(world: &mut PortalWorld, name: String, action: String, label: String) {
    let driver_id = world.driver(&name).id.clone();
    let trip_id = world.trip_id(&label).to_string();
    let trips = &world.app().trips;
    let outcome = match action.as_str() {
        "accept" => trips.accept(&trip_id, &driver_id).await.map(|_| ()),
        "reject" => trips.reject(&trip_id, &driver_id).await.map(|_| ()),
        "start" => trips.start(&trip_id, &driver_id).await.map(|_| ()),
        "arrive_pickup" => trips.arrive_pickup(&trip_id, &driver_id).await.map(|_| ()),
        "complete" => trips
            .complete(&trip_id, &driver_id, Some("ok"), "signed")
            .await
            .map(|_| ()),
        other => panic!("unknown lifecycle action {other}"),
    };
    world.record(outcome.map_err(|err| err.kind().to_string()));
}

#[when(
    regex = r#"^a location sample at \((-?[\d.]+), (-?[\d.]+)\) is recorded for trip \"([^\"]+)\" by \"([^\"]+)\"$"#
)]
async fn when_location_sample(
    world: &mut PortalWorld,
    lat: f64,
    lng: f64,
    label: String,
    name: String,
) {
    let driver_id = world.driver(&name).id.clone();
    let trip_id = world.trip_id(&label).to_string();
    let outcome = world
        .app()
        .trips
        .record_location(&trip_id, &driver_id, lat, lng, None)
        .await
        .map_err(|err| err.kind().to_string());
    world.record(outcome);
}

#[then("the action succeeds")]
fn then_action_succeeds(world: &mut PortalWorld) {
    match world.last_outcome() {
        Ok(()) => {}
        Err(kind) => panic!("expected success, got {kind}"),
    }
}

#[then(regex = r#"^the action fails with \"([^\"]+)\"$"#)]
fn then_action_fails(world: &mut PortalWorld, expected: String) {
    match world.last_outcome() {
        Ok(()) => panic!("expected {expected}, but the action succeeded"),
        Err(kind) => assert_eq!(kind, &expected),
    }
}

#[then(regex = r#"^the action outcome is \"([^\"]+)\"$"#)]
fn then_action_outcome(world: &mut PortalWorld, expected: String) {
    match (expected.as_str(), world.last_outcome()) {
        ("ok", Ok(())) => {}
        ("ok", Err(kind)) => panic!("expected success, got {kind}"),
        (_, Ok(())) => panic!("expected {expected}, but the action succeeded"),
        (_, Err(kind)) => assert_eq!(kind, &expected),
    }
}

#[then(regex = r#"^trip \"([^\"]+)\" has status \"([^\"]+)\"$"#)]
async fn then_trip_status(world: &mut PortalWorld, label: String, status: String) {
    let trip = fetch_trip(world.app(), world.trip_id(&label)).await;
    assert_eq!(trip.status.as_str(), status);
}

#[then(regex = r#"^trip \"([^\"]+)\" has a recorded pickup time$"#)]
async fn then_pickup_time_set(world: &mut PortalWorld, label: String) {
    let trip = fetch_trip(world.app(), world.trip_id(&label)).await;
    assert!(trip.actual_pickup_time.is_some());
}

#[then(regex = r#"^trip \"([^\"]+)\" has a recorded dropoff time$"#)]
async fn then_dropoff_time_set(world: &mut PortalWorld, label: String) {
    let trip = fetch_trip(world.app(), world.trip_id(&label)).await;
    assert!(trip.actual_dropoff_time.is_some());
}

#[then(regex = r#"^trip \"([^\"]+)\" has no recorded driver location$"#)]
async fn then_no_driver_location(world: &mut PortalWorld, label: String) {
    let trip = fetch_trip(world.app(), world.trip_id(&label)).await;
    assert!(trip.driver_location().is_none());
}

#[then(regex = r#"^trip \"([^\"]+)\" has driver location \((-?[\d.]+), (-?[\d.]+)\)$"#)]
async fn then_driver_location(world: &mut PortalWorld, label: String, lat: f64, lng: f64) {
    let trip = fetch_trip(world.app(), world.trip_id(&label)).await;
    let location = trip.driver_location().expect("driver location must be set");
    assert!((location.lat - lat).abs() < 1e-9);
    assert!((location.lng - lng).abs() < 1e-9);
}

#[then(regex = r#"^trip \"([^\"]+)\" was rejected by \"([^\"]+)\"$"#)]
async fn then_rejected_by(world: &mut PortalWorld, label: String, name: String) {
    let driver_id = world.driver(&name).id.clone();
    let trip = fetch_trip(world.app(), world.trip_id(&label)).await;
    assert_eq!(trip.status, TripStatus::Rejected);
    assert_eq!(trip.rejected_by_driver_id.as_deref(), Some(driver_id.as_str()));
    assert!(trip.driver_id.is_none(), "rejection releases the assignment");
}

#[when(
    regex = r#"^\"([^\"]+)\" submits a vehicle checkoff with vehicle \"([^\"]+)\" and notes \"([^\"]*)\"$"#
)]
async fn when_submits_checkoff(
    world: &mut PortalWorld,
    name: String,
    vehicle: String,
    notes: String,
) {
    let driver_id = world.driver(&name).id.clone();
    let form = CheckoffForm {
        vehicle_id: Some(vehicle),
        exterior_condition: true,
        tires_condition: true,
        lights_working: true,
        brakes_working: true,
        seatbelts_working: true,
        notes: if notes.is_empty() { None } else { Some(notes) },
        ..CheckoffForm::default()
    };
    world
        .app()
        .checkoffs
        .upsert(&driver_id, Utc::now().date_naive(), &form)
        .await
        .expect("upsert checkoff");
}

#[then(regex = r#"^\"([^\"]+)\" has exactly (\d+) vehicle checkoff records?$"#)]
async fn then_checkoff_count(world: &mut PortalWorld, name: String, expected: i64) {
    let driver_id = world.driver(&name).id.clone();
    let count = world
        .app()
        .checkoffs
        .count_for_driver(&driver_id)
        .await
        .expect("count checkoffs");
    assert_eq!(count, expected);
}

#[then(
    regex = r#"^today's checkoff for \"([^\"]+)\" has vehicle \"([^\"]+)\" and notes \"([^\"]*)\"$"#
)]
async fn then_checkoff_today(world: &mut PortalWorld, name: String, vehicle: String, notes: String) {
    let driver_id = world.driver(&name).id.clone();
    let checkoff = world
        .app()
        .checkoffs
        .find_for_date(&driver_id, Utc::now().date_naive())
        .await
        .expect("load checkoff")
        .expect("a checkoff must exist for today");
    assert_eq!(checkoff.vehicle_id.as_deref(), Some(vehicle.as_str()));
    let expected_notes = if notes.is_empty() { None } else { Some(notes) };
    assert_eq!(checkoff.notes, expected_notes);
}

#[then(
    regex = r#"^the earnings summary for \"([^\"]+)\" shows (\d+) completed trips totalling ([\d.]+)$"#
)]
async fn then_earnings(world: &mut PortalWorld, name: String, count: i64, total: f64) {
    let driver_id = world.driver(&name).id.clone();
    let summary = world
        .app()
        .invoices
        .earnings_summary(&driver_id)
        .await
        .expect("earnings summary");
    assert_eq!(summary.completed_trips, count);
    assert!((summary.total_earnings - total).abs() < 1e-6);
}

#[then(regex = r#"^today's earnings for \"([^\"]+)\" total ([\d.]+)$"#)]
async fn then_today_earnings(world: &mut PortalWorld, name: String, total: f64) {
    let driver_id = world.driver(&name).id.clone();
    let summary = world
        .app()
        .invoices
        .earnings_summary(&driver_id)
        .await
        .expect("earnings summary");
    assert!(
        (summary.today_earnings - total).abs() < 1e-6,
        "today: expected {total}, got {}",
        summary.today_earnings
    );
}

#[then(regex = r#"^this week's earnings for \"([^\"]+)\" total ([\d.]+)$"#)]
async fn then_week_earnings(world: &mut PortalWorld, name: String, total: f64) {
    let driver_id = world.driver(&name).id.clone();
    let summary = world
        .app()
        .invoices
        .earnings_summary(&driver_id)
        .await
        .expect("earnings summary");
    assert!(
        (summary.week_earnings - total).abs() < 1e-6,
        "week: expected {total}, got {}",
        summary.week_earnings
    );
}

#[then(regex = r#"^this month's earnings for \"([^\"]+)\" total ([\d.]+)$"#)]
async fn then_month_earnings(world: &mut PortalWorld, name: String, total: f64) {
    let driver_id = world.driver(&name).id.clone();
    let summary = world
        .app()
        .invoices
        .earnings_summary(&driver_id)
        .await
        .expect("earnings summary");
    assert!(
        (summary.month_earnings - total).abs() < 1e-6,
        "month: expected {total}, got {}",
        summary.month_earnings
    );
}

#[given(regex = r#"^an invoice \"([^\"]+)\" for \"([^\"]+)\" over ([\d.]+)$"#)]
async fn given_invoice(world: &mut PortalWorld, number: String, name: String, amount: f64) {
    let driver_id = world.driver(&name).id.clone();
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO invoices (id, invoice_number, driver_id, amount, status, issued_at) \
         VALUES (?, ?, ?, ?, 'pending', ?)",
    )
    .bind(&id)
    .bind(&number)
    .bind(&driver_id)
    .bind(amount)
    .bind(Utc::now())
    .execute(&world.app().db)
    .await
    .expect("seed invoice");
    world.invoices.insert(number, id);
}

#[then(regex = r#"^\"([^\"]+)\" sees (\d+) invoices?$"#)]
async fn then_invoice_count(world: &mut PortalWorld, name: String, expected: usize) {
    let driver_id = world.driver(&name).id.clone();
    let invoices = world
        .app()
        .invoices
        .list_for_driver(&driver_id)
        .await
        .expect("list invoices");
    assert_eq!(invoices.len(), expected);
}

#[then(regex = r#"^\"([^\"]+)\" can open invoice \"([^\"]+)\" over ([\d.]+)$"#)]
async fn then_invoice_detail(world: &mut PortalWorld, name: String, number: String, amount: f64) {
    let driver_id = world.driver(&name).id.clone();
    let invoice_id = world
        .invoices
        .get(&number)
        .unwrap_or_else(|| panic!("invoice {number} must be seeded first"))
        .clone();
    let invoice = world
        .app()
        .invoices
        .find_for_driver(&invoice_id, &driver_id)
        .await
        .expect("invoice detail");
    assert_eq!(invoice.invoice_number, number);
    assert!((invoice.amount - amount).abs() < 1e-6);
}

#[then(regex = r#"^invoice \"([^\"]+)\" is not visible to \"([^\"]+)\"$"#)]
async fn then_invoice_hidden(world: &mut PortalWorld, number: String, name: String) {
    let driver_id = world.driver(&name).id.clone();
    let invoice_id = world
        .invoices
        .get(&number)
        .unwrap_or_else(|| panic!("invoice {number} must be seeded first"))
        .clone();
    let result = world
        .app()
        .invoices
        .find_for_driver(&invoice_id, &driver_id)
        .await;
    assert!(
        matches!(result, Err(AppError::NotFound)),
        "another driver's invoice must read as not found"
    );
}

#[when(
    regex = r#"^\"([^\"]+)\" updates their profile with phone \"([^\"]+)\" and vehicle \"([^\"]+) ([^\"]+)\"$"#
)]
async fn when_updates_profile(
    world: &mut PortalWorld,
    name: String,
    phone: String,
    make: String,
    model: String,
) {
    let driver_id = world.driver(&name).id.clone();
    let form = ProfileForm {
        first_name: Some("Pat".into()),
        last_name: Some("Reyes".into()),
        phone_number: Some(phone),
        vehicle_make: Some(make),
        vehicle_model: Some(model),
        is_available: true,
        ..ProfileForm::default()
    };
    world
        .app()
        .profiles
        .update(&driver_id, &form)
        .await
        .expect("update profile");
}

#[then(
    regex = r#"^the profile of \"([^\"]+)\" shows phone \"([^\"]+)\" and vehicle \"([^\"]+) ([^\"]+)\"$"#
)]
async fn then_profile_shows(
    world: &mut PortalWorld,
    name: String,
    phone: String,
    make: String,
    model: String,
) {
    let driver_id = world.driver(&name).id.clone();
    let profile = world
        .app()
        .profiles
        .get(&driver_id)
        .await
        .expect("load profile");
    assert_eq!(profile.phone_number.as_deref(), Some(phone.as_str()));
    assert_eq!(profile.vehicle_make.as_deref(), Some(make.as_str()));
    assert_eq!(profile.vehicle_model.as_deref(), Some(model.as_str()));
    assert_eq!(profile.full_name.as_deref(), Some("Pat Reyes"));
    assert!(profile.is_available);
    assert!(profile.updated_at.is_some());
}

#[given(regex = r#"^the stored role of \"([^\"]+)\" becomes \"([^\"]+)\"$"#)]
async fn given_role_corrupted(world: &mut PortalWorld, name: String, role: String) {
    let driver_id = world.driver(&name).id.clone();
    sqlx::query("UPDATE drivers SET role = ? WHERE id = ?")
        .bind(&role)
        .bind(&driver_id)
        .execute(&world.app().db)
        .await
        .expect("rewrite role");
}

#[then(regex = r#"^trip \"([^\"]+)\" is in a terminal state$"#)]
async fn then_trip_terminal(world: &mut PortalWorld, label: String) {
    let trip = fetch_trip(world.app(), world.trip_id(&label)).await;
    assert!(
        trip.status.is_terminal(),
        "{} is not terminal",
        trip.status
    );
}

#[then(regex = r#"^\"([^\"]+)\" sees (\d+) current, (\d+) completed and (\d+) rejected trips$"#)]
async fn then_trip_lists(
    world: &mut PortalWorld,
    name: String,
    current: usize,
    completed: usize,
    rejected: usize,
) {
    let driver_id = world.driver(&name).id.clone();
    let trips = &world.app().trips;
    assert_eq!(trips.list_current(&driver_id).await.expect("current").len(), current);
    assert_eq!(
        trips.list_completed(&driver_id).await.expect("completed").len(),
        completed
    );
    assert_eq!(
        trips.list_rejected(&driver_id).await.expect("rejected").len(),
        rejected
    );
}

#[tokio::main]
async fn main() {
    PortalWorld::cucumber()
        .fail_on_skipped()
        .with_default_cli()
        .run("tests/features")
        .await;
}

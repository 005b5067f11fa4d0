use std::sync::Arc;

use axum::Router;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eventhive::config::Config;
use eventhive::db::{create_pool, init_db, queries, AppState};
use eventhive::email::EmailService;
use eventhive::handlers;
use eventhive::models::{CreateBooking, CreateEvent, CreateTicketType, CreateUser};
use eventhive::storage::HttpObjectStore;

#[derive(Parser, Debug)]
#[command(name = "eventhive")]
#[command(about = "Payment confirmation and ticket issuance service for EventHive")]
struct Cli {
    /// Seed the database with dev data (event, ticket type, attendee, pending booking)
    #[arg(long)]
    seed: bool,
}

/// Seeds a demo event with a pending booking so a locally-signed capture
/// webhook can be exercised end to end. Only runs in dev mode.
fn seed_dev_data(state: &AppState) {
    let conn = state.db.get().expect("Failed to get db connection for seeding");

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM bookings", [], |row| row.get(0))
        .expect("Failed to count bookings");
    if count > 0 {
        tracing::info!("Database already has bookings, skipping seed");
        return;
    }

    tracing::info!("============================================");
    tracing::info!("SEEDING DEV DATA");
    tracing::info!("============================================");

    let event = queries::create_event(
        &conn,
        &CreateEvent {
            title: "EventHive Launch Night".to_string(),
            venue: "Phoenix Hall, Mumbai".to_string(),
            starts_at: chrono::Utc::now().timestamp() + 14 * 86400,
            organizer: "EventHive Demo Org".to_string(),
        },
    )
    .expect("Failed to create dev event");

    let ticket_type = queries::create_ticket_type(
        &conn,
        &event.id,
        &CreateTicketType {
            name: "General".to_string(),
            price: 500.0,
            quota: 200,
        },
    )
    .expect("Failed to create dev ticket type");

    let user = queries::create_user(
        &conn,
        &CreateUser {
            name: "Dev Attendee".to_string(),
            email: Some("attendee@eventhive.local".to_string()),
            phone: None,
        },
    )
    .expect("Failed to create dev user");

    let booking = queries::create_booking(
        &conn,
        &CreateBooking {
            event_id: event.id.clone(),
            ticket_type_id: ticket_type.id.clone(),
            user_id: Some(user.id.clone()),
            quantity: 2,
        },
    )
    .expect("Failed to create dev booking");

    tracing::info!("Event: {} (id: {})", event.title, event.id);
    tracing::info!("Ticket type: {} @ {}", ticket_type.name, ticket_type.price);
    tracing::info!("Attendee: {} <{}>", user.name, "attendee@eventhive.local");
    tracing::info!("Pending booking code: {}", booking.code);
    tracing::info!("============================================");
    tracing::info!(
        "POST a payment.captured webhook with notes.bookingId = \"{}\" to confirm it",
        booking.code
    );
    tracing::info!("============================================");
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eventhive=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }
    if !config.dev_mode && config.webhook_secret == "dev-webhook-secret" {
        tracing::warn!("WEBHOOK_SECRET not set - using the dev default outside dev mode");
    }

    // Create database connection pool and initialize the schema
    let db_pool = create_pool(&config.database_path).expect("Failed to create database pool");
    {
        let conn = db_pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
    }

    // Construct external-service clients once; everything downstream takes
    // them through AppState
    let mailer = Arc::new(EmailService::new(
        config.resend_api_key.clone(),
        config.email_from.clone(),
    ));
    let store = Arc::new(HttpObjectStore::new(
        &config.storage_endpoint,
        &config.storage_bucket,
        config.storage_token.clone(),
    ));

    let state = AppState {
        db: db_pool,
        base_url: config.base_url.clone(),
        webhook_secret: config.webhook_secret.clone(),
        mailer,
        store,
    };

    // Seed dev data if --seed flag is passed (only in dev mode)
    if cli.seed {
        if !config.dev_mode {
            tracing::warn!("--seed flag ignored: not in dev mode (set EVENTHIVE_ENV=dev)");
        } else {
            seed_dev_data(&state);
        }
    }

    // Build the application router
    let app = Router::new()
        .merge(handlers::webhooks::router())
        .merge(handlers::tickets::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start the server
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("EventHive payment service listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}

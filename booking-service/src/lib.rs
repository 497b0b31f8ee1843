pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use axum::middleware::from_fn_with_state;
use axum::{
    routing::{get, patch, post},
    Router,
};
use mongodb::{options::ClientOptions, Client};
use secrecy::ExposeSecret;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use config::Config;
use services::error::AppError;
use services::{BookingRepository, CatalogRepository, Notifier, RazorpayClient};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: mongodb::Database,
    pub config: Config,
    pub repository: BookingRepository,
    pub catalog: CatalogRepository,
    pub razorpay: RazorpayClient,
    pub notifier: Notifier,
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: Config) -> Result<Self, AppError> {
        let mut client_options = ClientOptions::parse(config.database.url.expose_secret())
            .await
            .map_err(|e| {
                tracing::error!("Failed to parse MongoDB connection string: {}", e);
                AppError::Database(e.into())
            })?;
        client_options.app_name = Some("booking-service".to_string());

        let client = Client::with_options(client_options).map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            AppError::Database(e.into())
        })?;
        let db = client.database(&config.database.db_name);

        let repository = BookingRepository::new(&db);
        repository.init_indexes().await.map_err(|e| {
            tracing::error!("Failed to initialize database indexes: {}", e);
            AppError::Database(e)
        })?;

        let catalog = CatalogRepository::new(&db);

        let razorpay = RazorpayClient::new(config.razorpay.clone());
        if razorpay.is_configured() {
            tracing::info!("Razorpay client initialized");
        } else {
            tracing::warn!("Razorpay credentials not configured - checkout will be unavailable");
        }

        let notifier = Notifier::new(config.smtp.clone())?;

        let state = AppState {
            db,
            config: config.clone(),
            repository,
            catalog,
            razorpay,
            notifier,
        };

        // Port 0 = random port, used by the test harness.
        let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Booking service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn db(&self) -> &mongodb::Database {
        &self.state.db
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let state = self.state;

        // Caller-facing routes sit behind bearer auth; health, metrics
        // and the gateway webhook do not.
        let protected = Router::new()
            .route("/bookings", post(handlers::bookings::create_booking))
            .route(
                "/bookings/my-bookings",
                get(handlers::bookings::list_my_bookings),
            )
            .route(
                "/bookings/tutor-bookings",
                get(handlers::bookings::list_tutor_bookings),
            )
            .route("/bookings/:id", get(handlers::bookings::get_booking))
            .route(
                "/bookings/:id/status",
                patch(handlers::bookings::update_status),
            )
            .route(
                "/bookings/:id/payment/order",
                post(handlers::payments::create_payment_order),
            )
            .route("/payments/verify", post(handlers::payments::verify_payment))
            .route_layer(from_fn_with_state(
                state.clone(),
                middleware::auth_middleware,
            ));

        let router = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/metrics", get(handlers::metrics))
            .route("/webhooks/razorpay", post(handlers::payments::webhook))
            .merge(protected)
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");

                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                }),
            )
            .with_state(state);

        axum::serve(self.listener, router).await
    }
}

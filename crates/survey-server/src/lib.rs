//! Survey Server - HTTP API
//!
//! Provides:
//! - The axum router for surveys, responses and results
//! - The bearer-token authorization gate
//! - Configuration, startup and graceful shutdown
//!
//! # Routes
//!
//! | method | path | auth |
//! |---|---|---|
//! | GET | `/` | no |
//! | GET | `/health` | no |
//! | POST, GET | `/api/surveys` | yes |
//! | POST | `/api/surveys/create` | yes |
//! | GET, PUT, DELETE | `/api/surveys/:id` | yes |
//! | POST | `/api/surveys/:id/responses` | yes |
//! | GET | `/api/surveys/:id/results` | yes |
//! | GET | `/api/responses` | yes |

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

pub use auth::AuthenticatedUser;
pub use config::{ConfigError, ServerConfig, StoreBackend};
pub use error::{AppError, ErrorBody, StartupError};
pub use state::{build_state, AppState, StoreHandle};

/// Build the application router over `state`
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route(
            "/api/surveys",
            post(handlers::create_survey).get(handlers::list_surveys),
        )
        .route("/api/surveys/create", post(handlers::create_empty_survey))
        .route(
            "/api/surveys/:id",
            get(handlers::get_survey)
                .put(handlers::update_survey)
                .delete(handlers::delete_survey),
        )
        .route("/api/surveys/:id/responses", post(handlers::submit_response))
        .route("/api/surveys/:id/results", get(handlers::survey_results))
        .route("/api/responses", get(handlers::my_responses))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy for the configured origins
///
/// A `*` entry allows any origin; browsers refuse credentials on wildcard
/// replies, so that mode drops them.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    if origins.iter().any(|origin| origin.trim() == "*") {
        if origins.len() > 1 {
            warn!("`*` in CORS origins allows every origin; other entries are ignored");
        }
        return layer.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` overrides the default `info` filter.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Run the server until `shutdown` resolves, then close the store
///
/// # Errors
/// Startup failures; see [`StartupError`].
pub async fn serve_with_shutdown(
    config: ServerConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), StartupError> {
    info!("Initializing state...");
    let (state, store) = build_state(&config).await?;
    let app = build_router(state, &config.cors_origins);

    let address = config.bind_address();
    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {}", listener.local_addr()?);

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await;

    info!("Server shutting down...");
    store.close().await;
    result.map_err(StartupError::from)
}

/// Run the server until Ctrl+C or SIGTERM
///
/// # Errors
/// Startup failures; see [`StartupError`].
pub async fn serve(config: ServerConfig) -> Result<(), StartupError> {
    serve_with_shutdown(config, shutdown_signal()).await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

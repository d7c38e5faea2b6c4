//! HTTP server implementation for hxdash

use axum::{
    middleware,
    routing::{any, get, put},
    Router,
};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info};

use super::{gate, handlers, response, stream};
use crate::core::{Result, SharedState};

/// Creates the main application router with all routes and middleware
pub fn create_app(state: SharedState) -> Router {
    let static_files = ServeDir::new(&state.config.server.static_dir);

    Router::new()
        // Pages
        .route("/", get(handlers::landing))
        .route("/login", get(handlers::login_page).post(handlers::login))
        .route("/logout", any(handlers::logout))

        // User directory
        .route("/users", get(handlers::list_users).post(handlers::create_user))
        .route("/users/connected", get(stream::connected))
        .route("/users/:id", put(handlers::update_user).delete(handlers::delete_user))

        // Dialog fragments
        .route("/_components/users/new", get(handlers::new_user_dialog))
        .route("/_components/users/update/:id", get(handlers::update_user_dialog))

        // System routes
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))

        .nest_service("/static", static_files)
        .fallback(handlers::not_found)

        // Apply middleware; the first layer listed sees the request first
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::map_response_with_state(
                    state.clone(),
                    response::render_error_views,
                ))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    gate::require_session,
                )),
        )
        .with_state(state)
}

/// Start the HTTP server and serve until a shutdown signal arrives
pub async fn start_server(state: SharedState) -> Result<()> {
    let addr = state.config.server.http_addr;
    info!("Starting hxdash server on {}", addr);

    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Health check available at http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::api::catalog as catalog_handlers;
use super::api::mount as mount_handlers;
use super::api::observer as observer_handlers;
use super::api::paths as path_handlers;
use super::api::pointing as pointing_handlers;
use super::api::tracker as tracker_handlers;
use super::api_doc::ApiDoc;
use super::state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/catalog", get(catalog_handlers::list_catalog))
        .route("/api/ranking", get(catalog_handlers::ranking))
        .route(
            "/api/paths",
            get(path_handlers::list_paths).delete(path_handlers::clear_paths),
        )
        .route(
            "/api/paths/{norad_id}",
            get(path_handlers::get_path).post(path_handlers::plot_path),
        )
        .route(
            "/api/observer",
            get(observer_handlers::get_observer).put(observer_handlers::set_observer),
        )
        .route("/api/mount/devices", get(mount_handlers::list_devices))
        .route("/api/mount/open", post(mount_handlers::open))
        .route("/api/mount/close", post(mount_handlers::close))
        .route("/api/mount/offset", post(mount_handlers::offset))
        .route("/api/mount/reset", post(mount_handlers::reset))
        .route(
            "/api/tracker/start/{norad_id}",
            post(tracker_handlers::start),
        )
        .route("/api/tracker/stop", post(tracker_handlers::stop))
        .route("/api/tracker/status", get(tracker_handlers::status))
        .route("/api/pointing/{norad_id}", get(pointing_handlers::preview))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the API until Ctrl-C.
pub async fn run_server(bind_addr: &str, state: AppState) -> std::io::Result<()> {
    let app = router(state);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}

//! Route configuration.

use crate::handlers;
use crate::preferences::preferences_middleware;
use crate::state::AppState;
use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Health check (intentionally open for load balancers/probes)
        .route("/api/health", get(handlers::health_check))
        // Stamp design endpoints
        .route(
            "/api/stamps",
            get(handlers::list_stamps).post(handlers::create_stamp),
        )
        .route(
            "/api/stamps/{id}",
            get(handlers::get_stamp)
                .put(handlers::update_stamp)
                .delete(handlers::delete_stamp),
        )
        // Instance endpoints: POST interprets the id as the owning stamp,
        // the other verbs as the instance id
        .route(
            "/api/instances/{id}",
            post(handlers::create_instance)
                .get(handlers::get_instance)
                .put(handlers::update_instance)
                .delete(handlers::delete_instance),
        )
        // Storage box endpoints
        .route(
            "/api/boxes",
            get(handlers::list_boxes).post(handlers::create_box),
        )
        .route(
            "/api/boxes/{id}",
            get(handlers::get_box)
                .put(handlers::update_box)
                .delete(handlers::delete_box),
        )
        // Tag endpoints
        .route(
            "/api/tags",
            get(handlers::list_tags).post(handlers::create_tag),
        )
        .route(
            "/api/tags/{id}",
            axum::routing::put(handlers::update_tag).delete(handlers::delete_tag),
        )
        // Stats and preferences
        .route("/api/stats", get(handlers::get_stats))
        .route(
            "/api/preferences",
            get(handlers::get_preferences).post(handlers::save_preferences),
        );

    let view_routes = Router::new()
        // HTML fragments for the gallery/list views
        .route("/views/stamps/{view}", get(handlers::stamps_view))
        .route("/views/stamps/{view}/scroll", get(handlers::stamps_scroll))
        .route("/views/boxes-list", get(handlers::boxes_view))
        .route("/views/default", get(handlers::default_view))
        // HTMX partial updates
        .route(
            "/htmx/stamps/{id}/field/{field}",
            post(handlers::update_stamp_field),
        )
        .route("/htmx/stamps/{id}/tags", post(handlers::add_stamp_tag))
        .route(
            "/htmx/stamps/{id}/tags/{tag}",
            delete(handlers::remove_stamp_tag),
        );

    Router::new()
        .merge(api_routes)
        .merge(view_routes)
        // Every request carries validated preferences as an extension
        .layer(middleware::from_fn(preferences_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

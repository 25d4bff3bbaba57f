pub mod admin;
pub mod auth;
pub mod cases;
pub mod companies;
pub mod extract;
pub mod middleware;
pub mod rest;
pub mod state;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub use middleware::{require_admin, require_auth};
use state::AppState;

/// Builds the API router. CORS, body limits and the Swagger UI are layered on
/// by the binary.
pub fn router(app_state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(rest::health_handler))
        .route("/auth/login", post(auth::login_handler));

    // Admin routes (auth + admin role required)
    let admin_routes = Router::new()
        .route(
            "/admin/users",
            get(admin::list_users_handler)
                .post(admin::add_user_handler)
                .delete(admin::remove_user_handler),
        )
        .route(
            "/admin/cases",
            get(admin::list_cases_handler).post(admin::upload_case_handler),
        )
        .route(
            "/admin/cases/{id}",
            axum::routing::delete(admin::delete_case_handler),
        )
        .route_layer(axum_middleware::from_fn(require_admin));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/cases/similar", post(cases::similar_cases_handler))
        .route("/companies/search", get(companies::company_search_handler))
        .merge(admin_routes)
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state)
}

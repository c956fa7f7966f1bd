// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, catalog, dashboard, optik},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, catalog, dashboard, optik, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .merge(
            Router::new()
                .route("/me", get(auth::me))
                .layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        );

    let catalog_routes = Router::new().route("/", get(catalog::grade_catalog));

    let dashboard_routes = Router::new()
        .route("/", get(dashboard::dashboard))
        .route("/solved", get(dashboard::solved_tests))
        .route("/submissions", get(dashboard::my_submissions))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let optik_routes = Router::new()
        .route(
            "/sheet",
            get(optik::open_sheet).post(optik::open_sheet_with_state),
        )
        // Protected optik routes
        .merge(
            Router::new()
                .route("/submit", post(optik::submit_sheet))
                .layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        );

    let admin_routes = Router::new()
        .route("/stats", get(admin::stats))
        .route("/students", post(admin::create_student))
        .route("/students/temp-password", get(admin::temp_password))
        .route(
            "/categories",
            get(admin::list_categories).post(admin::create_category),
        )
        .route("/tests", post(admin::create_test))
        .route("/tests/answer-key", post(admin::validate_answer_key))
        .route("/slides", post(admin::create_slide))
        .route("/exams", post(admin::create_exam))
        // Auth first, then Admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/catalog", catalog_routes)
        .nest("/api/dashboard", dashboard_routes)
        .nest("/api/optik", optik_routes)
        .nest("/api/admin", admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

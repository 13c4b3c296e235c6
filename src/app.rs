use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::handlers::{self, elevated, protected, public};
use crate::middleware::session_gate;
use crate::state::AppState;

/// Build the full router: API routes, page fallback, then the session gate
/// wrapped around everything.
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    Router::new()
        .route("/health", get(handlers::health))
        .merge(auth_routes())
        .merge(admin_routes())
        .merge(data_routes())
        .merge(listing_routes())
        .fallback(public::pages::page_shell)
        // Global middleware
        .layer(from_fn_with_state(state.clone(), session_gate))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(&config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/api/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/session", get(protected::session::current))
}

fn admin_routes() -> Router<AppState> {
    use elevated::admin;

    Router::new()
        .route("/api/admin/users", get(admin::users))
        .route("/api/admin/approve", post(admin::approve))
        .route("/api/admin/update-role", post(admin::update_role))
}

fn data_routes() -> Router<AppState> {
    use protected::{data, upload};

    Router::new()
        .route("/api/data", get(data::list).post(data::create))
        .route("/api/upload-csv", post(upload::upload))
}

fn listing_routes() -> Router<AppState> {
    use protected::listings;

    Router::new()
        .route("/api/products", get(listings::products))
        .route("/api/consignors", get(listings::consignors))
        .route("/api/consignors/:consignor/data", get(listings::consignor_data))
        .route("/api/importers", get(listings::importers))
        .route("/api/importers/:importer/data", get(listings::importer_data))
        .route("/api/grades", get(listings::grades))
        .route("/api/grades/:grade/importers", get(listings::grade_importers))
}

/// Configured origins get credentialed CORS. With none configured,
/// development stays permissive and other environments send no CORS headers.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return if config.is_development() { CorsLayer::permissive() } else { CorsLayer::new() };
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

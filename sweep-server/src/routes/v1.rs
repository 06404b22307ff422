use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{
    AppState,
    handlers::maintenance::{
        content_types_handler, continue_scan_handler, reset_scan_handler,
        scan_status_handler, start_scan_handler,
    },
    infra::middleware::admin_token_middleware,
    routes::paths::v1::maintenance::relative,
};

/// Create all v1 API routes
pub fn create_v1_router(state: AppState) -> Router<AppState> {
    Router::new().merge(create_maintenance_routes(state))
}

/// Scan control, guarded by the admin token when one is configured.
fn create_maintenance_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(relative::SCAN, post(start_scan_handler))
        .route(relative::CONTINUE, post(continue_scan_handler))
        .route(relative::STATUS, get(scan_status_handler))
        .route(relative::RESET, post(reset_scan_handler))
        .route(relative::CONTENT_TYPES, get(content_types_handler))
        .route_layer(middleware::from_fn_with_state(
            state,
            admin_token_middleware,
        ))
}

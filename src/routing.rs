//! Application router configuration.

use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    AppState, endpoints,
    history::{
        get_history_content, get_history_page, get_history_snapshot, toggle_month_endpoint,
        toggle_year_endpoint,
    },
    index::{get_history_lookup, get_index_page},
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::HISTORY_LOOKUP, get(get_history_lookup))
        .route(endpoints::HISTORY_VIEW, get(get_history_page))
        .route(endpoints::HISTORY_CONTENT, get(get_history_content))
        .route(endpoints::HISTORY_SNAPSHOT, get(get_history_snapshot))
        .route(endpoints::TOGGLE_YEAR, post(toggle_year_endpoint))
        .route(endpoints::TOGGLE_MONTH, post(toggle_month_endpoint))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        )
        .fallback(get_404_not_found)
        .with_state(state)
}

//! The endpoint URIs.
//!
//! For endpoints that take parameters, e.g., '/users/{user_id}/history', use [format_endpoint].

use std::fmt::{Display, Write};

/// The landing page asking for a user ID.
pub const ROOT: &str = "/";
/// The landing page form target, redirects to [HISTORY_VIEW].
pub const HISTORY_LOOKUP: &str = "/history";
/// The page for displaying a user's transaction history.
pub const HISTORY_VIEW: &str = "/users/{user_id}/history";
/// Fetches the transactions and returns the history fragment of one page visit.
pub const HISTORY_CONTENT: &str = "/users/{user_id}/history/views/{view_id}/content";
/// Returns the history fragment of one page visit as it is, without fetching.
pub const HISTORY_SNAPSHOT: &str = "/users/{user_id}/history/views/{view_id}";
/// The route to expand or collapse a year of the history.
pub const TOGGLE_YEAR: &str = "/users/{user_id}/history/views/{view_id}/years/{year}/toggle";
/// The route to expand or collapse a month of the history.
pub const TOGGLE_MONTH: &str =
    "/users/{user_id}/history/views/{view_id}/months/{year}/{month}/toggle";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";

/// Replace the parameters in `endpoint_path`, e.g. `{user_id}`, with `params` in order.
///
/// Parameters without a matching value are left as they are, extra values are ignored.
pub fn format_endpoint(endpoint_path: &str, params: &[&dyn Display]) -> String {
    let mut formatted = String::with_capacity(endpoint_path.len());
    let mut rest = endpoint_path;
    let mut params = params.iter();

    while let Some(start) = rest.find('{') {
        let Some(length) = rest[start..].find('}') else {
            break;
        };
        let Some(param) = params.next() else {
            break;
        };

        formatted.push_str(&rest[..start]);
        // Writing to a `String` never fails.
        let _ = write!(formatted, "{param}");
        rest = &rest[start + length + 1..];
    }

    formatted.push_str(rest);
    formatted
}

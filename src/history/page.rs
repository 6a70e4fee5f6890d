//! Route handlers for the history page.
//!
//! The page handler opens a view session and returns a shell. The content
//! handler fetches and aggregates the transactions, then applies the result
//! only if no newer fetch of the same view has started in the meantime. The
//! snapshot and toggle handlers re-render from the stored aggregation without
//! fetching.

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::Markup;

use crate::{
    AppState, Error,
    api::ApiClient,
    endpoints::{self, format_endpoint},
    timezone::current_local_date,
};

use super::{
    aggregation::{AggregatedHistory, aggregate_dtos},
    expansion::YearMonth,
    format::NumberLocale,
    session::{FetchToken, HistorySession, SessionStore, ViewId, lock_sessions},
    view::{history_content, history_page},
};

/// The state needed for the history page.
#[derive(Debug, Clone)]
pub struct HistoryState {
    /// The client for fetching transactions.
    pub api_client: ApiClient,
    /// The open view sessions.
    pub sessions: SessionStore,
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,
    /// Which separators to format amounts with.
    pub locale: NumberLocale,
}

impl FromRef<AppState> for HistoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api_client: state.api_client.clone(),
            sessions: state.sessions.clone(),
            local_timezone: state.local_timezone.clone(),
            locale: state.locale,
        }
    }
}

/// Whether `user_id` can be used in a URL as is.
///
/// User IDs are GUIDs or numbers, so anything other than ASCII letters,
/// digits, '-' and '_' is rejected.
pub(crate) fn is_valid_user_id(user_id: &str) -> bool {
    !user_id.is_empty()
        && user_id
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_')
}

fn checked_user_id(user_id: String) -> Result<String, Error> {
    if is_valid_user_id(&user_id) {
        Ok(user_id)
    } else {
        tracing::debug!("rejecting malformed user ID {user_id:?}");
        Err(Error::NotFound)
    }
}

fn current_year_month(local_timezone: &str) -> Result<YearMonth, Error> {
    current_local_date(local_timezone).map(YearMonth::from)
}

/// Display the history page for `user_id`.
///
/// Every visit opens a new view session with only the current year and month
/// expanded. Sessions of other visits, e.g. in other tabs, are left alone.
pub async fn get_history_page(
    State(state): State<HistoryState>,
    Path(user_id): Path<String>,
) -> Result<Response, Error> {
    let user_id = checked_user_id(user_id)?;
    let current = current_year_month(&state.local_timezone)?;

    let view_id = lock_sessions(&state.sessions)?.open(HistorySession::new(&user_id, current));
    tracing::debug!("user {user_id} opened view {view_id}");

    Ok(history_page(&user_id, view_id).into_response())
}

/// Fetch, aggregate and render the history of one page visit.
///
/// Fetch and data errors are rendered as an error message in the fragment,
/// not as an error page.
pub async fn get_history_content(
    State(state): State<HistoryState>,
    Path((user_id, view_id)): Path<(String, ViewId)>,
) -> Result<Response, Error> {
    let user_id = checked_user_id(user_id)?;

    let Some(token) = begin_fetch(&state.sessions, &user_id, view_id)? else {
        return Ok(redirect_to_history_page(&user_id));
    };

    let result = state
        .api_client
        .fetch_transactions(&user_id)
        .await
        .and_then(aggregate_dtos);

    if let Err(error) = &result {
        tracing::error!("could not load the history of user {user_id}: {error}");
    }

    match apply_and_render(&state, &user_id, view_id, token, result)? {
        Some(content) => Ok(content.into_response()),
        None => Ok(redirect_to_history_page(&user_id)),
    }
}

fn begin_fetch(
    sessions: &SessionStore,
    user_id: &str,
    view_id: ViewId,
) -> Result<Option<FetchToken>, Error> {
    let mut sessions = lock_sessions(sessions)?;

    Ok(sessions
        .get_mut(view_id, user_id)
        .map(HistorySession::begin_fetch))
}

fn apply_and_render(
    state: &HistoryState,
    user_id: &str,
    view_id: ViewId,
    token: FetchToken,
    result: Result<AggregatedHistory, Error>,
) -> Result<Option<Markup>, Error> {
    let mut sessions = lock_sessions(&state.sessions)?;

    let Some(session) = sessions.get_mut(view_id, user_id) else {
        tracing::debug!("view {view_id} was closed while its transactions were fetched");
        return Ok(None);
    };

    session.apply(token, result);

    // A stale result is dropped, the latest state is rendered instead.
    Ok(Some(history_content(view_id, session, state.locale)))
}

/// Render the history of one page visit as it is, without fetching.
pub async fn get_history_snapshot(
    State(state): State<HistoryState>,
    Path((user_id, view_id)): Path<(String, ViewId)>,
) -> Result<Response, Error> {
    let user_id = checked_user_id(user_id)?;
    let sessions = lock_sessions(&state.sessions)?;

    let Some(session) = sessions.get(view_id, &user_id) else {
        return Ok(redirect_to_history_page(&user_id));
    };

    Ok(history_content(view_id, session, state.locale).into_response())
}

/// Expand or collapse `year` and re-render the history.
pub async fn toggle_year_endpoint(
    State(state): State<HistoryState>,
    Path((user_id, view_id, year)): Path<(String, ViewId, i32)>,
) -> Result<Response, Error> {
    let user_id = checked_user_id(user_id)?;
    let mut sessions = lock_sessions(&state.sessions)?;

    let Some(session) = sessions.get_mut(view_id, &user_id) else {
        return Ok(redirect_to_history_page(&user_id));
    };

    let expanded = session.toggle_year(year);
    tracing::debug!("view {view_id} toggled year {year}, expanded: {expanded}");

    Ok(history_content(view_id, session, state.locale).into_response())
}

/// Expand or collapse `month` of `year` and re-render the history.
pub async fn toggle_month_endpoint(
    State(state): State<HistoryState>,
    Path((user_id, view_id, year, month)): Path<(String, ViewId, i32, u8)>,
) -> Result<Response, Error> {
    let user_id = checked_user_id(user_id)?;
    if !(1..=12).contains(&month) {
        return Err(Error::NotFound);
    }

    let mut sessions = lock_sessions(&state.sessions)?;

    let Some(session) = sessions.get_mut(view_id, &user_id) else {
        return Ok(redirect_to_history_page(&user_id));
    };

    let key = YearMonth::new(year, month);
    let expanded = session.toggle_month(key);
    tracing::debug!("view {view_id} toggled month {key}, expanded: {expanded}");

    Ok(history_content(view_id, session, state.locale).into_response())
}

/// Send the client to the history page to start a new view session.
///
/// **Note**: This redirect is intended to be served as a response to a request initiated by HTMX.
fn redirect_to_history_page(user_id: &str) -> Response {
    (
        HxRedirect(format_endpoint(endpoints::HISTORY_VIEW, &[&user_id])),
        StatusCode::OK,
    )
        .into_response()
}

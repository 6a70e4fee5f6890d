//! View sessions for the history page.
//!
//! Every visit to a history page opens its own session, identified by a
//! [ViewId] that the page carries in its fragment and toggle URLs. A session
//! holds the expansion state and the latest aggregation for that one view, so
//! two tabs showing the same user never change each other's state.
//!
//! Every fetch is tagged with a [FetchToken]; only the result for the most
//! recent token is applied, so a slow response can never overwrite a newer one.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::Error;

use super::{
    aggregation::AggregatedHistory,
    expansion::{ExpansionState, YearMonth},
};

/// How many view sessions are kept before the oldest ones are dropped.
pub const MAX_VIEW_SESSIONS: usize = 1024;

/// Identifies one visit to a history page.
pub type ViewId = u64;

/// Identifies one fetch within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchToken(u64);

/// What the session currently knows about the user's transactions.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryData {
    /// A fetch is in flight.
    Loading,
    /// The most recent fetch succeeded.
    Loaded(AggregatedHistory),
    /// The most recent fetch failed, with a message for the user.
    Failed(String),
}

/// The state behind one history view.
#[derive(Debug, Clone)]
pub struct HistorySession {
    user_id: String,
    generation: u64,
    data: HistoryData,
    expansion: ExpansionState,
}

impl HistorySession {
    /// A new session for `user_id` with only `current` expanded and no data yet.
    pub fn new(user_id: &str, current: YearMonth) -> Self {
        Self {
            user_id: user_id.to_owned(),
            generation: 0,
            data: HistoryData::Loading,
            expansion: ExpansionState::new(current),
        }
    }

    /// Mark a fetch as started and get the token its result must be applied with.
    ///
    /// Any earlier token becomes stale.
    pub fn begin_fetch(&mut self) -> FetchToken {
        self.generation += 1;
        self.data = HistoryData::Loading;
        FetchToken(self.generation)
    }

    /// Store the result of the fetch identified by `token`.
    ///
    /// Returns `false` and leaves the session untouched if a newer fetch has
    /// started since.
    pub fn apply(&mut self, token: FetchToken, result: Result<AggregatedHistory, Error>) -> bool {
        if token.0 != self.generation {
            tracing::debug!(
                "discarding stale fetch result {} (latest is {})",
                token.0,
                self.generation
            );
            return false;
        }

        self.data = match result {
            Ok(history) => HistoryData::Loaded(history),
            Err(error) => HistoryData::Failed(error.user_message()),
        };

        true
    }

    /// See [ExpansionState::toggle_year].
    pub fn toggle_year(&mut self, year: i32) -> bool {
        self.expansion.toggle_year(year)
    }

    /// See [ExpansionState::toggle_month].
    pub fn toggle_month(&mut self, month: YearMonth) -> bool {
        self.expansion.toggle_month(month)
    }

    /// The user whose history this session shows.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The latest applied fetch state.
    pub fn data(&self) -> &HistoryData {
        &self.data
    }

    /// The expanded years and months.
    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }
}

/// The open history views, oldest first.
#[derive(Debug, Default)]
pub struct ViewSessions {
    last_id: ViewId,
    sessions: BTreeMap<ViewId, HistorySession>,
}

impl ViewSessions {
    /// Store `session` under a new view ID and return the ID.
    ///
    /// Drops the oldest sessions once there are more than [MAX_VIEW_SESSIONS].
    pub fn open(&mut self, session: HistorySession) -> ViewId {
        self.last_id += 1;
        self.sessions.insert(self.last_id, session);

        while self.sessions.len() > MAX_VIEW_SESSIONS {
            if let Some((view_id, session)) = self.sessions.pop_first() {
                tracing::debug!("dropping view {view_id} of user {}", session.user_id);
            }
        }

        self.last_id
    }

    /// The session of view `view_id`, if it is still open and shows `user_id`.
    pub fn get(&self, view_id: ViewId, user_id: &str) -> Option<&HistorySession> {
        self.sessions
            .get(&view_id)
            .filter(|session| session.user_id == user_id)
    }

    /// The session of view `view_id`, if it is still open and shows `user_id`,
    /// for in-place updates.
    pub fn get_mut(&mut self, view_id: ViewId, user_id: &str) -> Option<&mut HistorySession> {
        self.sessions
            .get_mut(&view_id)
            .filter(|session| session.user_id == user_id)
    }

    /// The number of open views.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no views are open.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// The open history views, shared between handlers.
pub type SessionStore = Arc<Mutex<ViewSessions>>;

/// Lock `sessions`, logging and mapping a poisoned lock to [Error::SessionLock].
pub fn lock_sessions(sessions: &SessionStore) -> Result<MutexGuard<'_, ViewSessions>, Error> {
    sessions
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire session lock: {error}"))
        .map_err(|_| Error::SessionLock)
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        history::{
            aggregation::AggregatedHistory, expansion::YearMonth, record::DataShapeError,
        },
    };

    use super::{HistoryData, HistorySession, MAX_VIEW_SESSIONS, ViewSessions};

    fn session() -> HistorySession {
        HistorySession::new("u1", YearMonth::new(2024, 1))
    }

    #[test]
    fn applies_latest_fetch() {
        let mut session = session();
        let token = session.begin_fetch();

        assert!(session.apply(token, Ok(AggregatedHistory::default())));
        assert_eq!(
            session.data(),
            &HistoryData::Loaded(AggregatedHistory::default())
        );
    }

    #[test]
    fn discards_superseded_fetch() {
        let mut session = session();
        let old_token = session.begin_fetch();
        let new_token = session.begin_fetch();

        assert!(session.apply(new_token, Err(Error::Fetch("timed out".to_owned()))));
        assert!(!session.apply(old_token, Ok(AggregatedHistory::default())));
        assert!(matches!(session.data(), HistoryData::Failed(_)));
    }

    #[test]
    fn failed_fetch_keeps_message_for_the_user() {
        let mut session = session();
        let token = session.begin_fetch();

        session.apply(
            token,
            Err(Error::DataShape(DataShapeError {
                index: 1,
                field: "value",
                problem: "is missing".to_owned(),
            })),
        );

        match session.data() {
            HistoryData::Failed(message) => {
                assert!(message.contains("transação inválida"), "got {message}");
                assert!(message.contains("value"), "got {message}");
            }
            other => panic!("want failed data, got {other:?}"),
        }
    }

    #[test]
    fn toggles_do_not_touch_data() {
        let mut session = session();
        let token = session.begin_fetch();
        session.apply(token, Ok(AggregatedHistory::default()));
        let before = session.data().clone();

        session.toggle_year(2024);
        session.toggle_month(YearMonth::new(2024, 1));

        assert_eq!(session.data(), &before);
    }

    #[test]
    fn each_view_has_its_own_session() {
        let mut views = ViewSessions::default();
        let first = views.open(session());
        let second = views.open(session());

        views.get_mut(first, "u1").unwrap().toggle_year(2023);

        assert_ne!(first, second);
        assert!(views.get(first, "u1").unwrap().expansion().is_year_expanded(2023));
        assert!(!views.get(second, "u1").unwrap().expansion().is_year_expanded(2023));
    }

    #[test]
    fn view_belongs_to_its_user() {
        let mut views = ViewSessions::default();
        let view_id = views.open(session());

        assert!(views.get(view_id, "u2").is_none());
        assert!(views.get_mut(view_id, "u2").is_none());
        assert!(views.get(view_id + 1, "u1").is_none());
    }

    #[test]
    fn drops_oldest_views_beyond_limit() {
        let mut views = ViewSessions::default();
        let oldest = views.open(session());

        let mut newest = oldest;
        for _ in 0..MAX_VIEW_SESSIONS {
            newest = views.open(session());
        }

        assert_eq!(views.len(), MAX_VIEW_SESSIONS);
        assert!(views.get(oldest, "u1").is_none());
        assert!(views.get(oldest + 1, "u1").is_some());
        assert!(views.get(newest, "u1").is_some());
    }
}

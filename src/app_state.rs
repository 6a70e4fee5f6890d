//! Implements a struct that holds the state of the web server.

use std::sync::{Arc, Mutex};

use crate::{
    Error,
    api::ApiClient,
    history::{NumberLocale, SessionStore, ViewSessions},
    timezone::get_local_offset,
};

/// The state of the web server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The client for the finance API the transactions are fetched from.
    pub api_client: ApiClient,

    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,

    /// Which separators to format amounts with.
    pub locale: NumberLocale,

    /// The open history views, one per visit to a history page.
    pub sessions: SessionStore,
}

impl AppState {
    /// Create a new [AppState] for the finance API at `api_url`.
    ///
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "America/Sao_Paulo".
    ///
    /// # Errors
    /// Returns an error if the timezone is unknown or `api_url` is not a valid base URL.
    pub fn new(api_url: &str, local_timezone: &str, locale: NumberLocale) -> Result<Self, Error> {
        if get_local_offset(local_timezone).is_none() {
            tracing::error!("Invalid timezone {}", local_timezone);
            return Err(Error::InvalidTimezoneError(local_timezone.to_owned()));
        }

        Ok(Self {
            api_client: ApiClient::new(api_url)?,
            local_timezone: local_timezone.to_owned(),
            locale,
            sessions: Arc::new(Mutex::new(ViewSessions::default())),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, history::NumberLocale};

    use super::AppState;

    #[test]
    fn creates_state_with_no_sessions() {
        let state =
            AppState::new("http://localhost:5000", "America/Sao_Paulo", NumberLocale::PtBr)
                .unwrap();

        assert!(state.sessions.lock().unwrap().is_empty());
        assert_eq!(state.locale, NumberLocale::PtBr);
    }

    #[test]
    fn rejects_unknown_timezone() {
        let result = AppState::new("http://localhost:5000", "Nowhere/Land", NumberLocale::PtBr);

        assert_eq!(
            result.unwrap_err(),
            Error::InvalidTimezoneError("Nowhere/Land".to_owned())
        );
    }

    #[test]
    fn rejects_invalid_api_url() {
        let result = AppState::new("localhost", "Etc/UTC", NumberLocale::EnUs);

        assert!(matches!(result, Err(Error::InvalidApiUrl(_))));
    }
}

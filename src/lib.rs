//! Histórico is a web client for a personal finance REST API.
//!
//! It fetches a user's financial transactions from the API, aggregates them
//! into a year → month → category history with running totals, and serves the
//! history as server-rendered HTML pages with HTMX for expanding and
//! collapsing years and months.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::response::{IntoResponse, Response};
use axum_server::Handle;
use tokio::signal;

mod api;
mod app_state;
mod endpoints;
pub mod history;
mod html;
mod index;
mod internal_server_error;
mod logging;
mod not_found;
mod routing;
mod timezone;

#[cfg(test)]
mod test_utils;

pub use api::ApiClient;
pub use app_state::AppState;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;

use crate::{
    history::DataShapeError, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The finance API could not be reached, answered with an error status,
    /// or sent a body that could not be decoded.
    ///
    /// The string describes the failure and is safe to show to the user.
    #[error("could not load transactions from the finance API: {0}")]
    Fetch(String),

    /// A transaction from the API is missing a field or has a value that
    /// cannot be used.
    ///
    /// Aggregation fails as a whole when this happens, no partial history is
    /// shown.
    #[error("the finance API sent a malformed transaction: {0}")]
    DataShape(#[from] DataShapeError),

    /// The configured base URL of the finance API is not a valid base URL.
    #[error("invalid finance API URL \"{0}\"")]
    InvalidApiUrl(String),

    /// The HTTP client for the finance API could not be created.
    #[error("could not create the HTTP client: {0}")]
    HttpClient(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the lock on the history sessions.
    #[error("could not acquire the session lock")]
    SessionLock,

    /// The requested resource was not found.
    #[error("the requested resource could not be found")]
    NotFound,
}

impl Error {
    /// A short explanation of the error in Portuguese, for the history page.
    ///
    /// The English description from [std::fmt::Display] is meant for the logs.
    pub fn user_message(&self) -> String {
        match self {
            Error::Fetch(_) => {
                "Não foi possível acessar a API financeira. Tente novamente mais tarde.".to_owned()
            }
            Error::DataShape(error) => format!(
                "A API financeira enviou uma transação inválida (registro {}, campo \"{}\").",
                error.index, error.field
            ),
            _ => "Ocorreu um erro inesperado.".to_owned(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Configuração de fuso horário inválida",
                fix: &format!(
                    "Não foi possível usar o fuso horário \"{timezone}\". Verifique as \
                    configurações do servidor e use um nome canônico, e.g. \"America/Sao_Paulo\"."
                ),
            }
            .into_response(),
            Error::Fetch(_) => InternalServerError {
                description: "Não foi possível acessar a API financeira",
                fix: "Verifique se a API está no ar e tente novamente.",
            }
            .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

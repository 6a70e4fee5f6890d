//! An async client for the finance API.

use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{Error, history::TransactionDto};

use super::models::{FixedBillDto, LabelDirectory, ListResponse, TransactionalDescriptionDto};

/// How long to wait for the finance API before giving up on a request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches a user's data from the finance API.
///
/// Cloning is cheap, clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

/// The body the API sends alongside an error status, if any.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiClient {
    /// Create a client for the API served at `base_url`, e.g. `https://localhost:44361`.
    ///
    /// # Errors
    /// Returns [Error::InvalidApiUrl] if `base_url` is not an absolute HTTP(S)
    /// URL, or [Error::HttpClient] if the HTTP client cannot be set up.
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let parsed = Url::parse(base_url)
            .inspect_err(|error| tracing::error!("could not parse API URL {base_url}: {error}"))
            .map_err(|_| Error::InvalidApiUrl(base_url.to_owned()))?;

        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::InvalidApiUrl(base_url.to_owned()));
        }

        let http = reqwest::Client::builder()
            .user_agent(format!("historico/{}", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| Error::HttpClient(error.to_string()))?;

        Ok(Self {
            http,
            base_url: parsed,
        })
    }

    /// Fetch every transaction of `user_id`.
    ///
    /// If any transaction only refers to its category or fixed bill by ID, the
    /// label lists are fetched once and the labels filled in.
    ///
    /// # Errors
    /// Returns [Error::Fetch] if any request fails or a body cannot be decoded.
    pub async fn fetch_transactions(&self, user_id: &str) -> Result<Vec<TransactionDto>, Error> {
        let url = self.endpoint(&["api", "Financialtransactions", "user", user_id])?;
        let mut transactions: Vec<TransactionDto> = self.get_list(url).await?;

        if transactions.iter().any(LabelDirectory::needs_labels) {
            tracing::debug!("resolving transaction labels for user {user_id}");

            let (descriptions, fixed_bills) = tokio::try_join!(
                self.fetch_transactional_descriptions(user_id),
                self.fetch_fixed_bills(user_id),
            )?;
            let directory = LabelDirectory::new(descriptions, fixed_bills);

            for transaction in &mut transactions {
                directory.fill(transaction);
            }
        }

        Ok(transactions)
    }

    /// Fetch the transaction categories of `user_id`.
    ///
    /// # Errors
    /// Returns [Error::Fetch] if the request fails or the body cannot be decoded.
    pub async fn fetch_transactional_descriptions(
        &self,
        user_id: &str,
    ) -> Result<Vec<TransactionalDescriptionDto>, Error> {
        let url = self.endpoint(&["api", "TransactionalDescriptions", "user", user_id])?;
        self.get_list(url).await
    }

    /// Fetch the fixed bills of `user_id`.
    ///
    /// # Errors
    /// Returns [Error::Fetch] if the request fails or the body cannot be decoded.
    pub async fn fetch_fixed_bills(&self, user_id: &str) -> Result<Vec<FixedBillDto>, Error> {
        let url = self.endpoint(&["api", "Fixedbills", "user", user_id])?;
        self.get_list(url).await
    }

    /// Append `segments` to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidApiUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    async fn get_list<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, Error> {
        tracing::debug!("GET {url}");

        let response = self
            .http
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .inspect_err(|error| tracing::error!("could not reach {url}: {error}"))
            .map_err(|_| Error::Fetch("could not connect to the server".to_owned()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message);
            tracing::error!("{url} responded with {status}: {message:?}");

            return Err(Error::Fetch(status_message(status, message)));
        }

        response
            .json::<ListResponse<T>>()
            .await
            .map(ListResponse::into_items)
            .inspect_err(|error| tracing::error!("could not decode the body from {url}: {error}"))
            .map_err(|_| {
                Error::Fetch("the server sent a response that could not be read".to_owned())
            })
    }
}

fn status_message(status: StatusCode, message: Option<String>) -> String {
    match message {
        Some(message) => format!("the server responded with {status}: {message}"),
        None => format!("the server responded with {status}"),
    }
}

//! HTTP client for the fixtures feed.
//!
//! One GET per calendar day against the templated feed endpoint, with the
//! school identifier and access key as query parameters and the day as both
//! `startdate` and `enddate`. The response body is the day's fixtures XML.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Client;
use tracing::{debug, instrument};

use super::error::FetchError;
use crate::config::FetcherConfig;
use crate::dates::feed_date;

/// Feed client wrapping a pooled [`reqwest::Client`].
///
/// Create once and share across workers; the underlying client reuses
/// connections between requests.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    endpoint: String,
    school_id: String,
    api_key: String,
    timeout: Duration,
}

impl ApiClient {
    /// Creates a client from engine configuration.
    #[must_use]
    pub fn from_config(config: &FetcherConfig) -> Self {
        Self {
            http: Client::new(),
            endpoint: config.endpoint.clone(),
            school_id: config.school_id.clone(),
            api_key: config.api_key.clone(),
            timeout: config.request_timeout,
        }
    }

    /// Fetches the fixtures document for a single day.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Timeout`] when the request exceeds the
    /// configured timeout, [`FetchError::HttpStatus`] for non-2xx responses,
    /// and [`FetchError::Network`] for transport failures. All are retryable.
    #[instrument(level = "debug", skip(self), fields(date = %date))]
    pub async fn fetch_day(&self, date: NaiveDate) -> Result<String, FetchError> {
        let day = feed_date(date);
        // Context URL for errors and logs; the access key is left out.
        let display_url = format!("{}?ID={}&startdate={day}", self.endpoint, self.school_id);

        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("ID", self.school_id.as_str()),
                ("key", self.api_key.as_str()),
                ("data", "fixtures"),
                ("startdate", day.as_str()),
                ("enddate", day.as_str()),
                ("TS", "1"),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| map_transport_error(&display_url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(&display_url, status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| map_transport_error(&display_url, e))?;

        debug!(bytes = body.len(), "fetched day");
        Ok(body)
    }
}

/// Maps a reqwest error to the fetch taxonomy, distinguishing timeouts.
fn map_transport_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::timeout(url)
    } else {
        FetchError::network(url, error)
    }
}

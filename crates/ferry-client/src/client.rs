//! Client for the upstream ferry operations API.
//!
//! Three feeds: vessel locations, terminal sailing space, and daily route
//! schedules. Retryable failures (connect/reset/timeout errors and
//! 5xx responses) get one retry after a fixed backoff; everything else
//! propagates immediately.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{instrument, warn};

use crate::error::{ApiError, Result};
use crate::types::{
    flatten_schedule, LiveVessel, ScheduleResponseRaw, ScheduleRow, TerminalSpace,
    TerminalSpaceRaw, VesselLocationRaw,
};

const VESSEL_LOCATIONS_URL: &str =
    "https://www.wsdot.wa.gov/ferries/api/vessels/rest/vessellocations";
const TERMINAL_SAILING_SPACE_URL: &str =
    "https://www.wsdot.wa.gov/ferries/api/terminals/rest/terminalsailingspace";
const SCHEDULE_URL: &str = "https://www.wsdot.wa.gov/ferries/api/schedule/rest/scheduletoday";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);
const RETRY_BACKOFF: Duration = Duration::from_millis(500);
const MAX_ATTEMPTS: u32 = 2;

/// Client for the upstream ferry operations API.
#[derive(Clone)]
pub struct UpstreamClient {
    http: Client,
    access_code: String,
    vessel_locations_url: String,
    terminal_sailing_space_url: String,
    schedule_url: String,
}

impl UpstreamClient {
    /// Create a new client against the production upstream. `access_code`
    /// is the process-wide API credential; an empty code is treated the
    /// same as a missing one at call time.
    #[must_use]
    pub fn new(access_code: impl Into<String>) -> Self {
        Self {
            http: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            access_code: access_code.into(),
            vessel_locations_url: VESSEL_LOCATIONS_URL.to_string(),
            terminal_sailing_space_url: TERMINAL_SAILING_SPACE_URL.to_string(),
            schedule_url: SCHEDULE_URL.to_string(),
        }
    }

    /// Create a client pointed at a different base (used by tests to talk
    /// to a local mock server instead of the real upstream).
    #[must_use]
    #[cfg(test)]
    pub(crate) fn with_base_urls(access_code: impl Into<String>, base: &str) -> Self {
        Self {
            http: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            access_code: access_code.into(),
            vessel_locations_url: format!("{base}/vessellocations"),
            terminal_sailing_space_url: format!("{base}/terminalsailingspace"),
            schedule_url: format!("{base}/scheduletoday"),
        }
    }

    /// Every vessel currently on the water.
    #[instrument(skip(self))]
    pub async fn fetch_vessels(&self) -> Result<Vec<LiveVessel>> {
        let url = format!(
            "{}?apiaccesscode={}",
            self.vessel_locations_url, self.access_code
        );
        let raw: Vec<VesselLocationRaw> = self.get_json(&url).await?;
        Ok(raw.into_iter().map(LiveVessel::from).collect())
    }

    /// Per-terminal drive-on availability for imminent departures.
    #[instrument(skip(self))]
    pub async fn fetch_terminal_spaces(&self) -> Result<Vec<TerminalSpace>> {
        let url = format!(
            "{}?apiaccesscode={}",
            self.terminal_sailing_space_url, self.access_code
        );
        let raw: Vec<TerminalSpaceRaw> = self.get_json(&url).await?;
        Ok(raw.into_iter().map(TerminalSpace::from).collect())
    }

    /// Today's scheduled departures for a route, flattened to rows.
    #[instrument(skip(self))]
    pub async fn fetch_schedule(&self, route_id: u32, date_text: &str) -> Result<Vec<ScheduleRow>> {
        let url = format!(
            "{}/{date_text}/{route_id}?apiaccesscode={}",
            self.schedule_url, self.access_code
        );
        let raw: ScheduleResponseRaw = self.get_json(&url).await?;
        Ok(flatten_schedule(raw))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        if self.access_code.is_empty() {
            return Err(ApiError::MissingAccessCode);
        }

        let mut last_err = None;

        for attempt in 1..=MAX_ATTEMPTS {
            match self.get_json_once(url).await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < MAX_ATTEMPTS && err.is_retryable() => {
                    warn!(attempt, url, "retrying after transient upstream error: {err}");
                    tokio::time::sleep(RETRY_BACKOFF).await;
                    last_err = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        // Only reachable if MAX_ATTEMPTS is 0; kept for exhaustiveness.
        Err(last_err.unwrap_or_else(|| ApiError::Timeout(url.to_string())))
    }

    async fn get_json_once<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.http.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(url.to_string())
            } else {
                e.into()
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(ApiError::from)
    }
}

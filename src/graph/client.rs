use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::calendar::{EventTimes, format_instant};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Room mailbox not found: {0}")]
    NotFound(String),
    #[error("Authentication failed")]
    AuthenticationFailed,
}

#[derive(Debug, Deserialize)]
struct GraphDateTime {
    #[serde(rename = "dateTime")]
    date_time: String,
}

#[derive(Debug, Deserialize)]
struct GraphEvent {
    start: GraphDateTime,
    end: GraphDateTime,
}

#[derive(Debug, Deserialize)]
struct CalendarViewResponse {
    value: Option<Vec<GraphEvent>>,
}

/// The calendar collaborator the availability handler talks to.
#[async_trait]
pub trait CalendarApi {
    async fn fetch_calendar_view(
        &self,
        room_email: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<EventTimes>, ApiError>;
}

pub struct GraphClient {
    base_url: String,
    access_token: String,
    client: reqwest::Client,
}

impl GraphClient {
    pub fn new(access_token: String) -> Self {
        Self {
            base_url: "https://graph.microsoft.com".to_string(),
            access_token,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

#[async_trait]
impl CalendarApi for GraphClient {
    async fn fetch_calendar_view(
        &self,
        room_email: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<EventTimes>, ApiError> {
        let url = format!("{}/v1.0/users/{}/calendarView", self.base_url, room_email);
        let start_param = format_instant(start);
        let end_param = format_instant(end);

        tracing::info!("Fetching calendar view for {} from {} to {}", room_email, start_param, end_param);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("startDateTime", start_param.as_str()),
                ("endDateTime", end_param.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();

        if status == 401 {
            tracing::error!("Authentication failed when fetching calendar view");
            return Err(ApiError::AuthenticationFailed);
        }

        if status == 404 {
            tracing::error!("Room mailbox not found: {}", room_email);
            return Err(ApiError::NotFound(room_email.to_string()));
        }

        if !status.is_success() {
            let body = response.text().await?;
            tracing::error!("Failed to fetch calendar view. Status: {}, Body: {}", status, body);
            return Err(ApiError::RequestError(format!("Status {}: {}", status, body)));
        }

        let view: CalendarViewResponse = response.json().await?;

        let events: Vec<EventTimes> = view
            .value
            .unwrap_or_default()
            .into_iter()
            .map(|event| EventTimes {
                start: event.start.date_time,
                end: event.end.date_time,
            })
            .collect();

        tracing::info!("Number of events retrieved: {}", events.len());
        Ok(events)
    }
}

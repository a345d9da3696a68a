use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use super::SharedState;
use crate::calendar::{self, RoomAvailability};
use crate::config::Config;
use crate::graph::{CalendarApi, GraphClient};
use crate::wol;

/// Forwards a panel button press to the attached device, waking the display
/// first. The wake signal and the acknowledgment are both best-effort; only
/// a failed frame write fails the request.
pub async fn handle_button_press(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Response {
    let Ok(button_id) = id.parse::<u32>() else {
        return (StatusCode::BAD_REQUEST, "Invalid button ID").into_response();
    };

    // Make sure the TV is on before the input command reaches it.
    let wol_status = match wol::send_magic_packet(
        &state.config.tv_macaddress,
        &state.config.tv_broadcast_ip,
    ) {
        Ok(()) => "Sent Wake on Lan Signal",
        Err(err) => {
            tracing::warn!("Failed to send wake signal: {}", err);
            "Failed to send Wake on Lan signal"
        }
    };

    let Some(command) = command_for_button(&state.config, button_id) else {
        return (StatusCode::BAD_REQUEST, "Unknown button ID").into_response();
    };

    let send_state = Arc::clone(&state);
    let send_command = command.clone();
    let sent = tokio::task::spawn_blocking(move || {
        let mut guard = send_state
            .serial
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match guard.as_mut() {
            Some(channel) => channel.send(&send_command).map(Some),
            None => Ok(None),
        }
    })
    .await;

    match sent {
        Ok(Ok(Some(_outcome))) => (
            StatusCode::OK,
            format!("Wake on LAN: {}\nSent command: {}", wol_status, command),
        )
            .into_response(),
        Ok(Ok(None)) => {
            tracing::error!("Button press dropped: serial port is not initialized");
            (StatusCode::INTERNAL_SERVER_ERROR, "Serial port not available").into_response()
        }
        Ok(Err(err)) => {
            tracing::error!("Failed to send command {}: {}", command, err);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to send command").into_response()
        }
        Err(err) => {
            tracing::error!("Serial send task failed: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to send command").into_response()
        }
    }
}

/// Buttons 0 and 1 are reserved for power; higher ids address the numbered
/// inputs, which start at `input_1` for button 2.
fn command_for_button(config: &Config, button_id: u32) -> Option<String> {
    let label = match button_id {
        0 => "turn_off".to_string(),
        1 => "turn_on".to_string(),
        id => format!("input_{}", id - 1),
    };
    config.labeled_commands.get(&label).cloned()
}

#[derive(Debug, Serialize)]
pub struct RoomStatusResponse {
    #[serde(rename = "roomEmail")]
    pub room_email: String,
    #[serde(rename = "roomAvailability")]
    pub room_availability: Option<RoomAvailability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Resolves the configured room's availability from the calendar feed.
///
/// Token failures are the caller's problem (500); a calendar-fetch failure
/// still answers 200 with the error recorded next to a null availability, so
/// the panel keeps rendering.
pub async fn check_meeting_status(State(state): State<SharedState>) -> Response {
    tracing::info!("Received request for meeting status");

    let access_token = {
        let mut auth = state.auth.lock().await;
        let Some(authenticator) = auth.as_mut() else {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Graph credentials not configured",
            )
                .into_response();
        };
        match authenticator.get_valid_token().await {
            Ok(token) => token,
            Err(err) => {
                tracing::error!("Failed to get access token: {}", err);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to get access token: {}", err),
                )
                    .into_response();
            }
        }
    };

    let Some((day_start, day_end)) = today_window() else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to compute availability window",
        )
            .into_response();
    };

    let room_email = state.config.meeting_room_email.clone();
    let client = GraphClient::new(access_token);

    let response = match client
        .fetch_calendar_view(&room_email, day_start, day_end)
        .await
    {
        Ok(events) => {
            let verdict =
                calendar::resolve(&events, Utc::now(), calendar::lookahead_horizon());
            tracing::info!("Room availability for {}: {:?}", room_email, verdict);
            RoomStatusResponse {
                room_email,
                room_availability: Some(verdict.into()),
                error: None,
            }
        }
        Err(err) => {
            tracing::error!("Error checking room availability for {}: {}", room_email, err);
            RoomStatusResponse {
                room_email,
                room_availability: None,
                error: Some(err.to_string()),
            }
        }
    };

    Json(response).into_response()
}

/// The calendar fetch window: 01:00 to 23:00 local time today.
fn today_window() -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let today = Local::now().date_naive();
    let start = today
        .and_hms_opt(1, 0, 0)?
        .and_local_timezone(Local)
        .earliest()?;
    let end = today
        .and_hms_opt(23, 0, 0)?
        .and_local_timezone(Local)
        .earliest()?;
    Some((start.with_timezone(&Utc), end.with_timezone(&Utc)))
}

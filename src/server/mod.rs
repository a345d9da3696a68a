pub mod handlers;

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::routing::{get, post};

use crate::config::Config;
use crate::graph::GraphAuthenticator;
use crate::serial::{Channel, PortDevice};

/// Shared per-process state. The serial channel sits behind a mutex because
/// the device tolerates only one in-flight command; the authenticator behind
/// an async mutex so its cached token is reused across requests.
pub struct AppState {
    pub config: Config,
    pub serial: Mutex<Option<Channel<PortDevice>>>,
    pub auth: tokio::sync::Mutex<Option<GraphAuthenticator>>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        config: Config,
        serial: Option<Channel<PortDevice>>,
        auth: Option<GraphAuthenticator>,
    ) -> SharedState {
        Arc::new(Self {
            config,
            serial: Mutex::new(serial),
            auth: tokio::sync::Mutex::new(auth),
        })
    }
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/button/{id}", post(handlers::handle_button_press))
        .route(
            "/api/checkMeetingStatus",
            get(handlers::check_meeting_status),
        )
        .with_state(state)
}

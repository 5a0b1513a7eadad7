pub mod activity;
pub mod billing;
pub mod callbacks;
pub mod channels;
pub mod dispatcher;
pub mod messages;
pub mod organizers;
pub mod state;
pub mod threads;
pub mod tracking;

use axum::{
    Json, Router,
    routing::{get, post},
};

use folio_types::api::HealthResponse;

pub use dispatcher::Dispatcher;
pub use state::{AppState, AppStateInner};

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Every folio route, bound to `state`. Layers are added by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        // Client surfaces
        .route("/clients/{client_id}/activity", get(activity::get_activity))
        .route("/clients/{client_id}/activity/categories", get(activity::get_categories))
        .route("/clients/{client_id}/channels", get(channels::list_channels))
        .route("/clients/{client_id}/channels/{kind}/messages", get(messages::list_messages))
        .route("/clients/{client_id}/threads", get(threads::list_threads))
        .route(
            "/clients/{client_id}/callbacks",
            get(callbacks::list_callbacks).post(callbacks::create_callback),
        )
        .route("/clients/{client_id}/organizers", get(organizers::list_organizers))
        // Email threads
        .route("/threads/{thread_id}/emails", get(threads::list_emails))
        .route("/threads/{thread_id}/read", post(threads::mark_read))
        .route("/threads/{thread_id}/star", post(threads::toggle_star))
        // Messages
        .route("/messages/{message_id}/urgency", post(messages::set_urgency))
        .route("/messages/{message_id}/resolve", post(messages::resolve_message))
        // Callbacks
        .route("/callbacks/{callback_id}/status", post(callbacks::set_status))
        .route("/callbacks/{callback_id}/assign", post(callbacks::reassign))
        // Firm-wide
        .route("/billing/activity", get(billing::get_billing_activity))
        .route("/records/{record_id}/tracking", post(tracking::record_tracking))
        .with_state(state)
}

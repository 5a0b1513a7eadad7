use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::TrackingKind;
use crate::models::{CallbackStatus, ChannelKind, TrackingState, Urgency};

/// Events published on the engine bus after a state change has been committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EngineEvent {
    /// A message's urgency (and possibly its assignee) changed
    UrgencyChanged {
        message_id: Uuid,
        channel_id: Uuid,
        urgency: Urgency,
        assigned_to: Option<String>,
    },

    /// An elevated message was marked resolved
    MessageResolved { message_id: Uuid, channel_id: Uuid },

    /// A callback moved through its lifecycle
    CallbackStatusChanged {
        callback_id: Uuid,
        client_id: Uuid,
        status: CallbackStatus,
        completion_date: Option<NaiveDate>,
    },

    /// A callback was logged
    CallbackCreated { callback_id: Uuid, client_id: Uuid },

    /// A callback was handed to someone else
    CallbackReassigned {
        callback_id: Uuid,
        client_id: Uuid,
        assigned_to: String,
    },

    /// A view/download/open receipt arrived for an invoice or email event
    TrackingRecorded {
        record_id: Uuid,
        kind: TrackingKind,
        tracking: TrackingState,
    },

    /// The settings panel was toggled open or closed
    SettingsToggled { open: bool },

    /// The communication surface switched to another channel kind
    ChannelModeChanged {
        client_id: Uuid,
        kind: ChannelKind,
        selected_channel: Option<Uuid>,
    },

    /// The active filter query changed
    FilterChanged { client_id: Option<Uuid> },
}

impl EngineEvent {
    /// Returns the id of the record this event is about, if any.
    /// Events that return `None` are session-wide.
    pub fn record_id(&self) -> Option<Uuid> {
        match self {
            Self::UrgencyChanged { message_id, .. } => Some(*message_id),
            Self::MessageResolved { message_id, .. } => Some(*message_id),
            Self::CallbackStatusChanged { callback_id, .. } => Some(*callback_id),
            Self::CallbackCreated { callback_id, .. } => Some(*callback_id),
            Self::CallbackReassigned { callback_id, .. } => Some(*callback_id),
            Self::TrackingRecorded { record_id, .. } => Some(*record_id),
            Self::SettingsToggled { .. }
            | Self::ChannelModeChanged { .. }
            | Self::FilterChanged { .. } => None,
        }
    }
}

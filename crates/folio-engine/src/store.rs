//! Read contract the engine consumes.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use folio_types::api::DateRange;
use folio_types::models::{
    ActivityEvent, BillingCategory, CallbackMessage, Channel, ChannelKind, Email, EmailThread,
    Message, Organizer,
};

use crate::error::StoreError;
use crate::filter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingEventFilter {
    pub category: Option<BillingCategory>,
    pub date_range: DateRange,
    /// Clock the date range is measured against, in the firm's offset.
    /// Falls back to the current UTC time.
    pub relative_to: Option<DateTime<FixedOffset>>,
}

impl BillingEventFilter {
    pub fn now(&self) -> DateTime<FixedOffset> {
        self.relative_to.unwrap_or_else(|| Utc::now().fixed_offset())
    }
}

/// Source of truth for client and firm records. Lists come back in
/// insertion order; the engine does its own ordering.
pub trait EventStore: Send + Sync {
    fn list_activity(&self, client_id: Uuid) -> Result<Vec<ActivityEvent>, StoreError>;

    fn list_channels(&self, client_id: Uuid) -> Result<Vec<Channel>, StoreError>;

    fn list_messages(&self, client_id: Uuid, kind: ChannelKind) -> Result<Vec<Message>, StoreError>;

    fn list_email_threads(&self, client_id: Uuid) -> Result<Vec<EmailThread>, StoreError>;

    fn list_emails(&self, thread_id: Uuid) -> Result<Vec<Email>, StoreError>;

    fn list_callbacks(&self, client_id: Uuid) -> Result<Vec<CallbackMessage>, StoreError>;

    fn list_organizers(&self, client_id: Uuid) -> Result<Vec<Organizer>, StoreError>;

    /// Firm-wide, not scoped to a client.
    fn list_billing_events(&self, filter: &BillingEventFilter) -> Result<Vec<ActivityEvent>, StoreError>;
}

/// Store over records held in memory. Useful for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    pub activity: Vec<ActivityEvent>,
    pub channels: Vec<Channel>,
    pub messages: Vec<Message>,
    pub threads: Vec<EmailThread>,
    pub emails: Vec<Email>,
    pub callbacks: Vec<CallbackMessage>,
    pub organizers: Vec<Organizer>,
    pub billing: Vec<ActivityEvent>,
}

impl EventStore for InMemoryStore {
    fn list_activity(&self, client_id: Uuid) -> Result<Vec<ActivityEvent>, StoreError> {
        Ok(self
            .activity
            .iter()
            .filter(|e| e.client_id == Some(client_id))
            .cloned()
            .collect())
    }

    fn list_channels(&self, client_id: Uuid) -> Result<Vec<Channel>, StoreError> {
        Ok(self
            .channels
            .iter()
            .filter(|c| c.client_id == client_id)
            .cloned()
            .collect())
    }

    fn list_messages(&self, client_id: Uuid, kind: ChannelKind) -> Result<Vec<Message>, StoreError> {
        let Some(channel) = self
            .channels
            .iter()
            .find(|c| c.client_id == client_id && c.kind == kind)
        else {
            return Ok(Vec::new());
        };
        Ok(self
            .messages
            .iter()
            .filter(|m| m.channel_id == channel.id)
            .cloned()
            .collect())
    }

    fn list_email_threads(&self, client_id: Uuid) -> Result<Vec<EmailThread>, StoreError> {
        Ok(self
            .threads
            .iter()
            .filter(|t| t.client_id == client_id)
            .cloned()
            .collect())
    }

    fn list_emails(&self, thread_id: Uuid) -> Result<Vec<Email>, StoreError> {
        Ok(self
            .emails
            .iter()
            .filter(|e| e.thread_id == thread_id)
            .cloned()
            .collect())
    }

    fn list_callbacks(&self, client_id: Uuid) -> Result<Vec<CallbackMessage>, StoreError> {
        Ok(self
            .callbacks
            .iter()
            .filter(|c| c.client_id == client_id)
            .cloned()
            .collect())
    }

    fn list_organizers(&self, client_id: Uuid) -> Result<Vec<Organizer>, StoreError> {
        Ok(self
            .organizers
            .iter()
            .filter(|o| o.client_id == client_id)
            .cloned()
            .collect())
    }

    fn list_billing_events(&self, f: &BillingEventFilter) -> Result<Vec<ActivityEvent>, StoreError> {
        let now = f.now();
        Ok(self
            .billing
            .iter()
            .filter(|e| f.category.is_none() || e.billing_category == f.category)
            .filter(|e| filter::date_range_matches(e.timestamp.get(), f.date_range, &now))
            .cloned()
            .collect())
    }
}

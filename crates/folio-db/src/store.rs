//! `EventStore` over SQLite, plus typed single-record lookups.

use rusqlite::Connection;
use serde::de::DeserializeOwned;
use tracing::warn;
use uuid::Uuid;

use folio_engine::StoreError;
use folio_engine::filter;
use folio_engine::store::{BillingEventFilter, EventStore};
use folio_types::models::{
    ActivityEvent, CallbackMessage, Channel, ChannelKind, Email, EmailThread, Message, Organizer,
};

use crate::Database;
use crate::models::PayloadRow;
use crate::queries::{query_payload, write_activity, write_callback, write_message, write_thread};

/// Failure of a read-modify-write: either the store itself, or the caller's
/// update refusing the current record. Nothing is written in both cases.
#[derive(Debug)]
pub enum UpdateError<E> {
    Store(StoreError),
    Rejected(E),
}

fn backend(e: anyhow::Error) -> StoreError {
    StoreError::Backend(format!("{:#}", e))
}

fn decode<T: DeserializeOwned>(row: &PayloadRow) -> Result<T, StoreError> {
    serde_json::from_str(&row.payload).map_err(|e| {
        warn!("Rejecting malformed record '{}': {}", row.id, e);
        StoreError::Malformed(format!("{}: {}", row.id, e))
    })
}

fn decode_all<T: DeserializeOwned>(rows: anyhow::Result<Vec<PayloadRow>>) -> Result<Vec<T>, StoreError> {
    rows.map_err(backend)?.iter().map(decode).collect()
}

fn decode_one<T: DeserializeOwned>(row: anyhow::Result<Option<PayloadRow>>) -> Result<Option<T>, StoreError> {
    row.map_err(backend)?.as_ref().map(decode).transpose()
}

fn rewrite_activity(conn: &Connection, event: &ActivityEvent) -> anyhow::Result<()> {
    write_activity(conn, event).map(|_| ())
}

impl EventStore for Database {
    fn list_activity(&self, client_id: Uuid) -> Result<Vec<ActivityEvent>, StoreError> {
        decode_all(self.get_activity_rows(&client_id.to_string()))
    }

    fn list_channels(&self, client_id: Uuid) -> Result<Vec<Channel>, StoreError> {
        decode_all(self.get_channel_rows(&client_id.to_string()))
    }

    fn list_messages(&self, client_id: Uuid, kind: ChannelKind) -> Result<Vec<Message>, StoreError> {
        decode_all(self.get_message_rows(&client_id.to_string(), kind.as_str()))
    }

    fn list_email_threads(&self, client_id: Uuid) -> Result<Vec<EmailThread>, StoreError> {
        decode_all(self.get_thread_rows(&client_id.to_string()))
    }

    fn list_emails(&self, thread_id: Uuid) -> Result<Vec<Email>, StoreError> {
        decode_all(self.get_email_rows(&thread_id.to_string()))
    }

    fn list_callbacks(&self, client_id: Uuid) -> Result<Vec<CallbackMessage>, StoreError> {
        decode_all(self.get_callback_rows(&client_id.to_string()))
    }

    fn list_organizers(&self, client_id: Uuid) -> Result<Vec<Organizer>, StoreError> {
        decode_all(self.get_organizer_rows(&client_id.to_string()))
    }

    fn list_billing_events(&self, f: &BillingEventFilter) -> Result<Vec<ActivityEvent>, StoreError> {
        let events: Vec<ActivityEvent> = decode_all(self.get_billing_rows(f.category.map(|c| c.as_str())))?;
        let now = f.now();
        Ok(events
            .into_iter()
            .filter(|e| filter::date_range_matches(e.timestamp.get(), f.date_range, &now))
            .collect())
    }
}

impl Database {
    pub fn get_activity(&self, id: Uuid) -> Result<Option<ActivityEvent>, StoreError> {
        decode_one(self.get_activity_row(&id.to_string()))
    }

    pub fn get_channel(&self, id: Uuid) -> Result<Option<Channel>, StoreError> {
        decode_one(self.get_channel_row(&id.to_string()))
    }

    pub fn get_message(&self, id: Uuid) -> Result<Option<Message>, StoreError> {
        decode_one(self.get_message_row(&id.to_string()))
    }

    pub fn get_thread(&self, id: Uuid) -> Result<Option<EmailThread>, StoreError> {
        decode_one(self.get_thread_row(&id.to_string()))
    }

    pub fn get_callback(&self, id: Uuid) -> Result<Option<CallbackMessage>, StoreError> {
        decode_one(self.get_callback_row(&id.to_string()))
    }

    pub fn modify_thread<E>(
        &self,
        id: Uuid,
        f: impl FnOnce(EmailThread) -> Result<EmailThread, E>,
    ) -> Result<Option<EmailThread>, UpdateError<E>> {
        self.modify("SELECT id, payload FROM email_threads WHERE id = ?1", id, write_thread, f)
    }

    pub fn modify_activity<E>(
        &self,
        id: Uuid,
        f: impl FnOnce(ActivityEvent) -> Result<ActivityEvent, E>,
    ) -> Result<Option<ActivityEvent>, UpdateError<E>> {
        self.modify("SELECT id, payload FROM activity WHERE id = ?1", id, rewrite_activity, f)
    }

    pub fn modify_message<E>(
        &self,
        id: Uuid,
        f: impl FnOnce(Message) -> Result<Message, E>,
    ) -> Result<Option<Message>, UpdateError<E>> {
        self.modify("SELECT id, payload FROM messages WHERE id = ?1", id, write_message, f)
    }

    pub fn modify_callback<E>(
        &self,
        id: Uuid,
        f: impl FnOnce(CallbackMessage) -> Result<CallbackMessage, E>,
    ) -> Result<Option<CallbackMessage>, UpdateError<E>> {
        self.modify("SELECT id, payload FROM callbacks WHERE id = ?1", id, write_callback, f)
    }

    /// Reads, updates and writes back one record inside a single transaction,
    /// so a concurrent writer can never be overwritten by a stale copy.
    /// `Ok(None)` when no record has that id.
    fn modify<T, E>(
        &self,
        select: &str,
        id: Uuid,
        write: fn(&Connection, &T) -> anyhow::Result<()>,
        f: impl FnOnce(T) -> Result<T, E>,
    ) -> Result<Option<T>, UpdateError<E>>
    where
        T: DeserializeOwned,
    {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let Some(row) = query_payload(&tx, select, &id.to_string())? else {
                return Ok(Ok(None));
            };
            let current: T = match decode(&row) {
                Ok(current) => current,
                Err(e) => return Ok(Err(UpdateError::Store(e))),
            };
            let next = match f(current) {
                Ok(next) => next,
                Err(e) => return Ok(Err(UpdateError::Rejected(e))),
            };
            write(&tx, &next)?;
            tx.commit()?;
            Ok(Ok(Some(next)))
        })
        .unwrap_or_else(|e| Err(UpdateError::Store(backend(e))))
    }
}

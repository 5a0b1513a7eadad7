use crate::Database;
use crate::models::PayloadRow;
use anyhow::Result;
use rusqlite::Connection;

use folio_engine::thread;
use folio_types::models::{
    ActivityEvent, CallbackMessage, Channel, Email, EmailThread, Message, Organizer,
};

impl Database {
    // -- Activity --

    pub fn insert_activity(&self, event: &ActivityEvent) -> Result<()> {
        self.upsert_activity(event, false)
    }

    /// Firm-wide billing lifecycle event.
    pub fn insert_billing_event(&self, event: &ActivityEvent) -> Result<()> {
        self.upsert_activity(event, true)
    }

    fn upsert_activity(&self, event: &ActivityEvent, is_billing: bool) -> Result<()> {
        let payload = serde_json::to_string(event)?;
        let occurred_at: String = event.timestamp.clone().into();
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO activity (id, client_id, kind, is_billing, billing_category, occurred_at, payload)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(id) DO UPDATE SET payload = excluded.payload",
                rusqlite::params![
                    event.id.to_string(),
                    event.client_id.map(|c| c.to_string()),
                    event.kind.as_str(),
                    is_billing,
                    event.billing_category.map(|c| c.as_str()),
                    occurred_at,
                    payload,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_activity_rows(&self, client_id: &str) -> Result<Vec<PayloadRow>> {
        self.with_conn(|conn| {
            query_payloads(
                conn,
                "SELECT id, payload FROM activity WHERE client_id = ?1 AND is_billing = 0 ORDER BY rowid",
                &[&client_id],
            )
        })
    }

    pub fn get_billing_rows(&self, category: Option<&str>) -> Result<Vec<PayloadRow>> {
        self.with_conn(|conn| {
            query_payloads(
                conn,
                "SELECT id, payload FROM activity
                 WHERE is_billing = 1 AND (?1 IS NULL OR billing_category = ?1)
                 ORDER BY rowid",
                &[&category],
            )
        })
    }

    pub fn get_activity_row(&self, id: &str) -> Result<Option<PayloadRow>> {
        self.with_conn(|conn| query_payload(conn, "SELECT id, payload FROM activity WHERE id = ?1", id))
    }

    // -- Channels & messages --

    pub fn upsert_channel(&self, channel: &Channel) -> Result<()> {
        let payload = serde_json::to_string(channel)?;
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO channels (id, client_id, kind, payload) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET kind = excluded.kind, payload = excluded.payload",
                rusqlite::params![
                    channel.id.to_string(),
                    channel.client_id.to_string(),
                    channel.kind.as_str(),
                    payload,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_channel_rows(&self, client_id: &str) -> Result<Vec<PayloadRow>> {
        self.with_conn(|conn| {
            query_payloads(
                conn,
                "SELECT id, payload FROM channels WHERE client_id = ?1 ORDER BY rowid",
                &[&client_id],
            )
        })
    }

    pub fn get_channel_row(&self, id: &str) -> Result<Option<PayloadRow>> {
        self.with_conn(|conn| query_payload(conn, "SELECT id, payload FROM channels WHERE id = ?1", id))
    }

    pub fn upsert_message(&self, message: &Message) -> Result<()> {
        self.with_conn_mut(|conn| write_message(conn, message))
    }

    /// Messages of every channel of `kind` the client has.
    pub fn get_message_rows(&self, client_id: &str, kind: &str) -> Result<Vec<PayloadRow>> {
        self.with_conn(|conn| {
            query_payloads(
                conn,
                "SELECT m.id, m.payload
                 FROM messages m
                 JOIN channels c ON m.channel_id = c.id
                 WHERE c.client_id = ?1 AND c.kind = ?2
                 ORDER BY m.rowid",
                &[&client_id, &kind],
            )
        })
    }

    pub fn get_message_row(&self, id: &str) -> Result<Option<PayloadRow>> {
        self.with_conn(|conn| query_payload(conn, "SELECT id, payload FROM messages WHERE id = ?1", id))
    }

    // -- Email --

    /// Stores an email and folds it into its thread, creating the thread on
    /// first sight. Returns the recomputed thread.
    pub fn add_email(&self, client_id: uuid::Uuid, email: &Email) -> Result<EmailThread> {
        let payload = serde_json::to_string(email)?;
        let sent_at: String = email.sent_at.clone().into();
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let existing = query_payload(
                &tx,
                "SELECT id, payload FROM email_threads WHERE id = ?1",
                &email.thread_id.to_string(),
            )?;
            let updated = match existing {
                Some(row) => {
                    let current: EmailThread = serde_json::from_str(&row.payload)?;
                    thread::add_email(current, email)
                }
                None => thread::thread_for(client_id, std::slice::from_ref(email))
                    .ok_or_else(|| anyhow::anyhow!("Empty thread for email {}", email.id))?,
            };
            write_thread(&tx, &updated)?;
            tx.execute(
                "INSERT INTO emails (id, thread_id, sent_at, payload) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![email.id.to_string(), email.thread_id.to_string(), sent_at, payload],
            )?;
            tx.commit()?;
            Ok(updated)
        })
    }

    pub fn get_thread_rows(&self, client_id: &str) -> Result<Vec<PayloadRow>> {
        self.with_conn(|conn| {
            query_payloads(
                conn,
                "SELECT id, payload FROM email_threads WHERE client_id = ?1 ORDER BY rowid",
                &[&client_id],
            )
        })
    }

    pub fn get_thread_row(&self, id: &str) -> Result<Option<PayloadRow>> {
        self.with_conn(|conn| query_payload(conn, "SELECT id, payload FROM email_threads WHERE id = ?1", id))
    }

    pub fn get_email_rows(&self, thread_id: &str) -> Result<Vec<PayloadRow>> {
        self.with_conn(|conn| {
            query_payloads(
                conn,
                "SELECT id, payload FROM emails WHERE thread_id = ?1 ORDER BY rowid",
                &[&thread_id],
            )
        })
    }

    // -- Callbacks --

    pub fn upsert_callback(&self, callback: &CallbackMessage) -> Result<()> {
        self.with_conn_mut(|conn| write_callback(conn, callback))
    }

    pub fn get_callback_rows(&self, client_id: &str) -> Result<Vec<PayloadRow>> {
        self.with_conn(|conn| {
            query_payloads(
                conn,
                "SELECT id, payload FROM callbacks WHERE client_id = ?1 ORDER BY rowid",
                &[&client_id],
            )
        })
    }

    pub fn get_callback_row(&self, id: &str) -> Result<Option<PayloadRow>> {
        self.with_conn(|conn| query_payload(conn, "SELECT id, payload FROM callbacks WHERE id = ?1", id))
    }

    // -- Organizers --

    pub fn upsert_organizer(&self, organizer: &Organizer) -> Result<()> {
        let payload = serde_json::to_string(organizer)?;
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO organizers (id, client_id, payload) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET payload = excluded.payload",
                rusqlite::params![organizer.id.to_string(), organizer.client_id.to_string(), payload],
            )?;
            Ok(())
        })
    }

    pub fn get_organizer_rows(&self, client_id: &str) -> Result<Vec<PayloadRow>> {
        self.with_conn(|conn| {
            query_payloads(
                conn,
                "SELECT id, payload FROM organizers WHERE client_id = ?1 ORDER BY rowid",
                &[&client_id],
            )
        })
    }
}

/// Rewrites an existing activity payload; scope and index columns stay as
/// inserted. `false` when no row matched.
pub(crate) fn write_activity(conn: &Connection, event: &ActivityEvent) -> Result<bool> {
    let payload = serde_json::to_string(event)?;
    let n = conn.execute(
        "UPDATE activity SET payload = ?2 WHERE id = ?1",
        rusqlite::params![event.id.to_string(), payload],
    )?;
    Ok(n > 0)
}

pub(crate) fn write_message(conn: &Connection, message: &Message) -> Result<()> {
    let payload = serde_json::to_string(message)?;
    let sent_at: String = message.sent_at.clone().into();
    conn.execute(
        "INSERT INTO messages (id, channel_id, sent_at, payload) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET payload = excluded.payload",
        rusqlite::params![message.id.to_string(), message.channel_id.to_string(), sent_at, payload],
    )?;
    Ok(())
}

pub(crate) fn write_callback(conn: &Connection, callback: &CallbackMessage) -> Result<()> {
    let payload = serde_json::to_string(callback)?;
    conn.execute(
        "INSERT INTO callbacks (id, client_id, status, payload) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET status = excluded.status, payload = excluded.payload",
        rusqlite::params![
            callback.id.to_string(),
            callback.client_id.to_string(),
            callback.status.as_str(),
            payload,
        ],
    )?;
    Ok(())
}

pub(crate) fn write_thread(conn: &Connection, thread: &EmailThread) -> Result<()> {
    let payload = serde_json::to_string(thread)?;
    conn.execute(
        "INSERT INTO email_threads (id, client_id, payload) VALUES (?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET payload = excluded.payload",
        rusqlite::params![thread.id.to_string(), thread.client_id.to_string(), payload],
    )?;
    Ok(())
}

fn query_payloads(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::types::ToSql],
) -> Result<Vec<PayloadRow>> {
    let mut stmt = conn.prepare(sql)?;

    let rows = stmt
        .query_map(params, |row| {
            Ok(PayloadRow {
                id: row.get(0)?,
                payload: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub(crate) fn query_payload(conn: &Connection, sql: &str, id: &str) -> Result<Option<PayloadRow>> {
    let mut stmt = conn.prepare(sql)?;

    let row = stmt
        .query_row([id], |row| {
            Ok(PayloadRow {
                id: row.get(0)?,
                payload: row.get(1)?,
            })
        })
        .optional()?;

    Ok(row)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

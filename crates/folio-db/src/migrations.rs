use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

/// Records are stored whole as JSON in `payload`; the other columns exist
/// for lookups and ordering. Lists come back in `rowid` (insertion) order.
pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS activity (
            id                TEXT PRIMARY KEY,
            client_id         TEXT,
            kind              TEXT NOT NULL,
            is_billing        INTEGER NOT NULL DEFAULT 0,
            billing_category  TEXT,
            occurred_at       TEXT NOT NULL,
            payload           TEXT NOT NULL,
            created_at        TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_activity_client
            ON activity(client_id);

        CREATE INDEX IF NOT EXISTS idx_activity_billing
            ON activity(is_billing, billing_category);

        CREATE TABLE IF NOT EXISTS channels (
            id          TEXT PRIMARY KEY,
            client_id   TEXT NOT NULL,
            kind        TEXT NOT NULL,
            payload     TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_channels_client
            ON channels(client_id, kind);

        CREATE TABLE IF NOT EXISTS messages (
            id          TEXT PRIMARY KEY,
            channel_id  TEXT NOT NULL REFERENCES channels(id),
            sent_at     TEXT NOT NULL,
            payload     TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_messages_channel
            ON messages(channel_id);

        CREATE TABLE IF NOT EXISTS email_threads (
            id          TEXT PRIMARY KEY,
            client_id   TEXT NOT NULL,
            payload     TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_email_threads_client
            ON email_threads(client_id);

        CREATE TABLE IF NOT EXISTS emails (
            id          TEXT PRIMARY KEY,
            thread_id   TEXT NOT NULL REFERENCES email_threads(id),
            sent_at     TEXT NOT NULL,
            payload     TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_emails_thread
            ON emails(thread_id);

        CREATE TABLE IF NOT EXISTS callbacks (
            id          TEXT PRIMARY KEY,
            client_id   TEXT NOT NULL,
            status      TEXT NOT NULL,
            payload     TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_callbacks_client
            ON callbacks(client_id, status);

        CREATE TABLE IF NOT EXISTS organizers (
            id          TEXT PRIMARY KEY,
            client_id   TEXT NOT NULL,
            payload     TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_organizers_client
            ON organizers(client_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::FixedOffset;

const MAX_PAGE_LIMIT: u32 = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    /// Firm-local calendar used for "today" and day buckets.
    pub utc_offset: FixedOffset,
    pub page_limit: u32,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = var("FOLIO_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = var("FOLIO_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("FOLIO_PORT must be a port number")?;
        let db_path = PathBuf::from(var("FOLIO_DB_PATH").unwrap_or_else(|| "folio.db".into()));

        let offset_minutes: i32 = var("FOLIO_UTC_OFFSET_MINUTES")
            .unwrap_or_else(|| "0".into())
            .parse()
            .context("FOLIO_UTC_OFFSET_MINUTES must be a whole number of minutes")?;
        let Some(utc_offset) = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
        else {
            bail!("FOLIO_UTC_OFFSET_MINUTES out of range: {}", offset_minutes);
        };

        let page_limit: u32 = var("FOLIO_PAGE_LIMIT")
            .unwrap_or_else(|| "50".into())
            .parse()
            .context("FOLIO_PAGE_LIMIT must be a positive number")?;
        if page_limit == 0 {
            bail!("FOLIO_PAGE_LIMIT must be at least 1");
        }

        Ok(Self {
            host,
            port,
            db_path,
            utc_offset,
            page_limit: page_limit.min(MAX_PAGE_LIMIT),
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }
}

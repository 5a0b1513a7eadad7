//! Offset pagination behind an opaque cursor.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;

use folio_types::api::Page;

use crate::error::EngineError;

const PREFIX: &str = "off:";

pub fn encode_cursor(offset: usize) -> String {
    B64.encode(format!("{}{}", PREFIX, offset))
}

pub fn decode_cursor(cursor: &str) -> Result<usize, EngineError> {
    let bytes = B64.decode(cursor).map_err(|_| EngineError::InvalidCursor)?;
    let text = String::from_utf8(bytes).map_err(|_| EngineError::InvalidCursor)?;
    text.strip_prefix(PREFIX)
        .and_then(|n| n.parse().ok())
        .ok_or(EngineError::InvalidCursor)
}

/// Cuts one page out of `items`. `limit` of zero is treated as one.
pub fn paginate<T>(items: Vec<T>, cursor: Option<&str>, limit: usize) -> Result<Page<T>, EngineError> {
    let offset = match cursor {
        Some(c) => decode_cursor(c)?,
        None => 0,
    };
    let limit = limit.max(1);
    let total = items.len();
    let end = offset.saturating_add(limit).min(total);
    let next_cursor = (end < total).then(|| encode_cursor(end));
    let items = items.into_iter().skip(offset).take(limit).collect();
    Ok(Page { items, next_cursor })
}

/// Database row types; these map directly to SQLite rows.
/// Every table keeps the whole record as JSON; decoding into folio-types
/// models happens at the store boundary.

pub struct PayloadRow {
    pub id: String,
    pub payload: String,
}

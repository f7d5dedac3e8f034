/// IMAP message sequence number as returned by `SEARCH`.
pub type MessageId = u32;

/// Decoded header triple, before the store assigns it an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmail {
    pub sender: String,
    pub subject: String,
    /// Raw `Date` header text, never parsed.
    pub timestamp: String,
}

/// One row of the `emails` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailRecord {
    pub id: i64,
    pub sender: String,
    pub subject: String,
    pub timestamp: String,
}

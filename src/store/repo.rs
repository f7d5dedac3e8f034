use crate::Result;
use crate::domain::email::EmailRecord;

pub trait EmailRepository {
    /// Create the schema if it does not exist yet. Safe to call every run.
    fn initialize(&self) -> Result<()>;

    /// Insert one record in its own transaction and return its id.
    fn save(&self, sender: &str, subject: &str, timestamp: &str) -> Result<i64>;

    fn list_all(&self) -> Result<Vec<EmailRecord>>;
    fn count(&self) -> Result<u64>;
}

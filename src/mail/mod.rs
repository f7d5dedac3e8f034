pub mod decoders;
pub mod imap_client;

use log::warn;

use crate::Result;
use crate::domain::email::MessageId;

pub use imap_client::ImapMailbox;

/// The IMAP operations the processor needs from a logged-in session.
pub trait Mailbox {
    fn select_inbox(&mut self) -> Result<()>;

    /// Ids of messages without the `\Seen` flag, ascending.
    fn search_unseen(&mut self) -> Result<Vec<MessageId>>;

    /// Full RFC 822 bytes, or `None` if the response carried no body part.
    fn fetch(&mut self, id: MessageId) -> Result<Option<Vec<u8>>>;

    fn mark_seen(&mut self, id: MessageId) -> Result<()>;

    fn logout(&mut self) -> Result<()>;
}

/// Open a session with `connect`, run `f` against it, then log out whatever
/// `f` returned. Logout failures are logged and do not mask `f`'s result.
pub fn with_session<M, C, F, T>(connect: C, f: F) -> Result<T>
where
    M: Mailbox,
    C: FnOnce() -> Result<M>,
    F: FnOnce(&mut M) -> Result<T>,
{
    let mut mailbox = connect()?;
    let result = f(&mut mailbox);
    if let Err(e) = mailbox.logout() {
        warn!("{}", e);
    }
    result
}

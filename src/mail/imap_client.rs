use std::net::TcpStream;

use log::{debug, error, info};
use native_tls::{TlsConnector, TlsStream};

use crate::domain::email::MessageId;
use crate::error::{Error, Result};
use crate::mail::Mailbox;

type TlsSession = imap::Session<TlsStream<TcpStream>>;

/// A logged-in IMAPS session.
pub struct ImapMailbox {
    session: TlsSession,
}

impl ImapMailbox {
    /// Open an implicit-TLS connection and log in with a password.
    pub fn connect(host: &str, port: u16, username: &str, password: &str) -> Result<Self> {
        match Self::connect_and_login(host, port, username, password) {
            Ok(session) => {
                info!("Connected to {}:{} as {}", host, port, username);
                Ok(Self { session })
            }
            Err(e) => {
                error!("Failed to connect to email server: {}", e);
                Err(Error::Connection(e))
            }
        }
    }

    fn connect_and_login(
        host: &str,
        port: u16,
        username: &str,
        password: &str,
    ) -> imap::error::Result<TlsSession> {
        let tls = TlsConnector::builder().build()?;
        let client = imap::connect((host, port), host, &tls)?;
        client.login(username, password).map_err(|(e, _client)| e)
    }
}

impl Mailbox for ImapMailbox {
    fn select_inbox(&mut self) -> Result<()> {
        let mailbox = self
            .session
            .select("INBOX")
            .map_err(|e| Error::Processing(format!("failed to select INBOX: {e}")))?;
        debug!("INBOX has {} messages", mailbox.exists);
        Ok(())
    }

    fn search_unseen(&mut self) -> Result<Vec<MessageId>> {
        let mut ids: Vec<MessageId> = self
            .session
            .search("UNSEEN")
            .map_err(|e| Error::Processing(format!("UNSEEN search failed: {e}")))?
            .into_iter()
            .collect();
        // The crate hands back a set; restore server (ascending) order.
        ids.sort_unstable();
        Ok(ids)
    }

    fn fetch(&mut self, id: MessageId) -> Result<Option<Vec<u8>>> {
        let fetches = self
            .session
            .fetch(id.to_string(), "RFC822")
            .map_err(|source| Error::Fetch { id, source })?;
        Ok(fetches.iter().find_map(|f| f.body()).map(|b| b.to_vec()))
    }

    fn mark_seen(&mut self, id: MessageId) -> Result<()> {
        self.session
            .store(id.to_string(), "+FLAGS (\\Seen)")
            .map_err(|e| {
                Error::Processing(format!("failed to flag email ID {id} as seen: {e}"))
            })?;
        Ok(())
    }

    fn logout(&mut self) -> Result<()> {
        self.session
            .logout()
            .map_err(|e| Error::Processing(format!("logout failed: {e}")))
    }
}

//! Copy sender, subject and date of unread IMAP messages into SQLite and
//! flag them as read on the server.

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod mail;
pub mod processor;
pub mod store;

pub use error::{Error, Result};

use log::info;

use crate::config::Config;
use crate::mail::{ImapMailbox, with_session};
use crate::processor::{ProcessReport, process};
use crate::store::EmailRepository;

/// Connect to the configured mailbox, run one processing pass and log out.
///
/// The store must already be initialized.
pub fn run<R>(cfg: &Config, store: &R) -> Result<ProcessReport>
where
    R: EmailRepository + ?Sized,
{
    let connect = || {
        ImapMailbox::connect(&cfg.imap_host, cfg.imap_port, &cfg.username, &cfg.password)
    };
    let report = with_session(connect, |mailbox| process(mailbox, store))?;
    if !report.is_empty() {
        info!("Run finished: {}", report);
    }
    Ok(report)
}

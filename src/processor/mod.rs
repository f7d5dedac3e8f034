//! One pass over the unseen messages of a mailbox.
//!
//! Each message is fetched, decoded, saved and then flagged `\Seen`, in that
//! order. A message is only flagged once its row is committed, so a failed
//! flag leads to a duplicate row on the next run rather than a lost one.

use std::fmt;

use log::{error, info, warn};

use crate::Result;
use crate::domain::email::MessageId;
use crate::mail::Mailbox;
use crate::mail::decoders::decode_headers;
use crate::store::repo::EmailRepository;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Stored { record_id: i64 },
    /// Fetch succeeded but carried no message body; flagged anyway.
    NoBody,
    FetchFailed(String),
    DecodeFailed(String),
    StoreFailed(String),
    /// Flag update failed. `record_id` is set when a row was already
    /// committed for the message.
    MarkSeenFailed {
        record_id: Option<i64>,
        reason: String,
    },
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        !matches!(self, Outcome::Stored { .. } | Outcome::NoBody)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessReport {
    pub results: Vec<(MessageId, Outcome)>,
}

impl ProcessReport {
    pub fn stored(&self) -> usize {
        self.results
            .iter()
            .filter(|(_, o)| matches!(o, Outcome::Stored { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|(_, o)| o.is_failure()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl fmt::Display for ProcessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} unseen, {} stored, {} failed",
            self.results.len(),
            self.stored(),
            self.failed()
        )
    }
}

/// Process every unseen message in the inbox.
///
/// Only a failure to select the inbox is returned as an error. Search
/// failures end the pass with an empty report; per-message failures are
/// logged and recorded in the report.
pub fn process<M, R>(mailbox: &mut M, store: &R) -> Result<ProcessReport>
where
    M: Mailbox + ?Sized,
    R: EmailRepository + ?Sized,
{
    mailbox.select_inbox()?;

    let ids = match mailbox.search_unseen() {
        Ok(ids) => ids,
        Err(e) => {
            info!("No unread emails found ({})", e);
            return Ok(ProcessReport::default());
        }
    };
    if ids.is_empty() {
        info!("No unread emails found.");
        return Ok(ProcessReport::default());
    }

    let mut report = ProcessReport::default();
    for id in ids {
        let outcome = process_one(mailbox, store, id);
        report.results.push((id, outcome));
    }
    Ok(report)
}

fn process_one<M, R>(mailbox: &mut M, store: &R, id: MessageId) -> Outcome
where
    M: Mailbox + ?Sized,
    R: EmailRepository + ?Sized,
{
    let raw = match mailbox.fetch(id) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            warn!("Email ID {} returned no message body", id);
            return match mailbox.mark_seen(id) {
                Ok(()) => Outcome::NoBody,
                Err(e) => {
                    error!("{}", e);
                    Outcome::MarkSeenFailed {
                        record_id: None,
                        reason: e.to_string(),
                    }
                }
            };
        }
        Err(e) => {
            error!("{}", e);
            return Outcome::FetchFailed(e.to_string());
        }
    };

    let email = match decode_headers(&raw) {
        Ok(email) => email,
        Err(e) => {
            error!("Email ID {}: {}", id, e);
            return Outcome::DecodeFailed(e.to_string());
        }
    };

    let record_id = match store.save(&email.sender, &email.subject, &email.timestamp) {
        Ok(record_id) => record_id,
        Err(e) => {
            error!("Email ID {} not saved, leaving it unseen: {}", id, e);
            return Outcome::StoreFailed(e.to_string());
        }
    };
    info!(
        "Processed email from: {}, Subject: {}",
        email.sender, email.subject
    );

    match mailbox.mark_seen(id) {
        Ok(()) => Outcome::Stored { record_id },
        Err(e) => {
            error!(
                "Email ID {} saved as record {} but not flagged; it will be stored again next run: {}",
                id, record_id, e
            );
            Outcome::MarkSeenFailed {
                record_id: Some(record_id),
                reason: e.to_string(),
            }
        }
    }
}

//! Delivers subscriber digests over chat and email.
//!
//! `Notifier` renders each digest for Slack and email and hands the messages
//! to the channel clients. A rejected chat post is written to the failure log
//! and does not stop the email; every other delivery failure is returned to
//! the caller.
pub mod email;
pub mod failure_log;
pub mod manager;
pub mod slack;
pub mod stdout;

pub use manager::Notifier;
pub use stdout::StdoutNotifier;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("`{0}` must be configured to send notifications")]
    MissingSetting(&'static str),
    #[error("chat webhook request failed")]
    Chat(#[source] reqwest::Error),
    #[error("invalid email address {address:?}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },
    #[error("failed to build email message")]
    Message(#[source] lettre::error::Error),
    #[error("SMTP delivery failed")]
    Smtp(#[source] lettre::transport::smtp::Error),
}

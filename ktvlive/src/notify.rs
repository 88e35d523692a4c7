//! Failure notification
//!
//! Every soft-failing operation reports exactly one [`FailureNotice`] through
//! a [`FailureNotifier`] when its round trip fails. Successful calls, including
//! ones whose payload is empty or negative, never notify.

use crate::error::Error;
use std::fmt;
use std::sync::{Arc, Mutex};

/// The remote operation a notice refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `GET /channels`
    FetchDirectory,
    /// `GET /channels/{channel_id}`
    FetchChannel,
    /// `GET /channels/{channel_id}/jikkyo`
    LocateJikkyoGateway,
    /// `POST /channels/{channel_id}/jikkyo/comment`
    SubmitComment,
}

impl Operation {
    /// Generic user-facing failure sentence
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::FetchDirectory | Operation::FetchChannel => {
                "Failed to retrieve channel information."
            }
            Operation::LocateJikkyoGateway => {
                "Failed to retrieve the Jikkyo connection information."
            }
            Operation::SubmitComment => "Failed to send the comment.",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::FetchDirectory => "fetch_directory",
            Operation::FetchChannel => "fetch_channel",
            Operation::LocateJikkyoGateway => "locate_jikkyo_gateway",
            Operation::SubmitComment => "submit_comment",
        };
        f.write_str(name)
    }
}

/// A failed round trip, ready to be shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureNotice {
    pub operation: Operation,
    pub message: String,
}

impl FailureNotice {
    /// Build the notice for `operation` failing with `error`
    ///
    /// The message is the operation's generic sentence followed by the
    /// cause, e.g. `Failed to send the comment. (HTTP Error 500 / boom)`.
    pub fn from_error(operation: Operation, error: &Error) -> Self {
        let cause = match error {
            Error::Api {
                status,
                detail: Some(detail),
            } => format!("HTTP Error {status} / {detail}"),
            Error::Api {
                status,
                detail: None,
            } => format!("HTTP Error {status}"),
            Error::Http(err) if err.is_timeout() => "request timed out".to_string(),
            Error::Http(err) if err.is_connect() => "could not connect to the server".to_string(),
            other => other.to_string(),
        };

        Self {
            operation,
            message: format!("{} ({})", operation.failure_message(), cause),
        }
    }
}

/// Receives failure notices from the gateway
pub trait FailureNotifier: Send + Sync {
    fn notify(&self, notice: &FailureNotice);
}

impl<N: FailureNotifier + ?Sized> FailureNotifier for Arc<N> {
    fn notify(&self, notice: &FailureNotice) {
        (**self).notify(notice)
    }
}

/// Logs notices with `tracing` at warn level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl FailureNotifier for TracingNotifier {
    fn notify(&self, notice: &FailureNotice) {
        tracing::warn!(operation = %notice.operation, "{}", notice.message);
    }
}

/// Keeps every notice in memory
///
/// Clones share the same buffer, so a UI can hand one clone to the gateway
/// and drain the other.
#[derive(Debug, Clone, Default)]
pub struct CollectingNotifier {
    notices: Arc<Mutex<Vec<FailureNotice>>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the notices received so far
    pub fn notices(&self) -> Vec<FailureNotice> {
        match self.notices.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Remove and return the notices received so far
    pub fn drain(&self) -> Vec<FailureNotice> {
        match self.notices.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn len(&self) -> usize {
        self.notices().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FailureNotifier for CollectingNotifier {
    fn notify(&self, notice: &FailureNotice) {
        match self.notices.lock() {
            Ok(mut guard) => guard.push(notice.clone()),
            Err(poisoned) => poisoned.into_inner().push(notice.clone()),
        }
    }
}

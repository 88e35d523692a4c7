//! Soft-failure front end for UIs
//!
//! [`ChannelsGateway`] wraps a [`ChannelsClient`] and never hands an error to
//! its caller. Each call yields a [`FetchOutcome`]: `Success` with the payload
//! (which may itself say "nothing available" or "rejected"), or `Failed`
//! after exactly one notice went to the configured [`FailureNotifier`].

use crate::channel_id::ChannelRef;
use crate::client::ChannelsClient;
use crate::error::Result;
use crate::models::{
    ChannelDirectory, CommentResult, CommentSubmission, JikkyoGatewayInfo, LiveChannel,
};
use crate::notify::{FailureNotice, FailureNotifier, Operation, TracingNotifier};
use std::fmt;
use std::sync::Arc;

/// Result of a soft-failing round trip
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    /// The round trip completed; the payload is whatever the server said
    Success(T),
    /// The round trip failed and the failure was already notified
    Failed,
}

impl<T> FetchOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed)
    }

    /// Payload, dropping the distinction between failure kinds
    pub fn ok(self) -> Option<T> {
        match self {
            FetchOutcome::Success(value) => Some(value),
            FetchOutcome::Failed => None,
        }
    }

    pub fn as_ref(&self) -> FetchOutcome<&T> {
        match self {
            FetchOutcome::Success(value) => FetchOutcome::Success(value),
            FetchOutcome::Failed => FetchOutcome::Failed,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> FetchOutcome<U> {
        match self {
            FetchOutcome::Success(value) => FetchOutcome::Success(f(value)),
            FetchOutcome::Failed => FetchOutcome::Failed,
        }
    }
}

/// Channel API access with the null-and-notify failure contract
#[derive(Clone)]
pub struct ChannelsGateway {
    client: ChannelsClient,
    notifier: Arc<dyn FailureNotifier>,
}

impl fmt::Debug for ChannelsGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelsGateway")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl ChannelsGateway {
    /// Gateway that reports failures through `tracing`
    pub fn new(client: ChannelsClient) -> Self {
        Self::with_notifier(client, TracingNotifier)
    }

    /// Gateway that reports failures to `notifier`
    pub fn with_notifier(client: ChannelsClient, notifier: impl FailureNotifier + 'static) -> Self {
        Self {
            client,
            notifier: Arc::new(notifier),
        }
    }

    pub fn client(&self) -> &ChannelsClient {
        &self.client
    }

    /// Grouped channel directory
    pub async fn fetch_directory(&self) -> FetchOutcome<ChannelDirectory> {
        self.settle(Operation::FetchDirectory, self.client.fetch_directory().await)
    }

    /// One channel, by canonical id or display id
    ///
    /// Kept for compatibility; UIs normally read channels from the directory.
    pub async fn fetch_channel(&self, channel: impl Into<ChannelRef>) -> FetchOutcome<LiveChannel> {
        self.settle(Operation::FetchChannel, self.client.fetch_channel(channel).await)
    }

    /// Jikkyo endpoint for a channel
    ///
    /// `Success` with `websocket_url == None` means no commentary right now
    /// and does not notify.
    pub async fn locate_jikkyo_gateway(
        &self,
        channel: impl Into<ChannelRef>,
    ) -> FetchOutcome<JikkyoGatewayInfo> {
        self.settle(
            Operation::LocateJikkyoGateway,
            self.client.locate_jikkyo_gateway(channel).await,
        )
    }

    /// Submit a comment
    ///
    /// A server-side rejection comes back as `Success` with
    /// `is_success == false` and does not notify.
    pub async fn submit_comment(
        &self,
        channel: impl Into<ChannelRef>,
        comment: &CommentSubmission,
    ) -> FetchOutcome<CommentResult> {
        self.settle(
            Operation::SubmitComment,
            self.client.submit_comment(channel, comment).await,
        )
    }

    fn settle<T>(&self, operation: Operation, result: Result<T>) -> FetchOutcome<T> {
        match result {
            Ok(value) => FetchOutcome::Success(value),
            Err(err) => {
                tracing::debug!(%operation, error = %err, "Request failed");
                self.notifier
                    .notify(&FailureNotice::from_error(operation, &err));
                FetchOutcome::Failed
            }
        }
    }
}

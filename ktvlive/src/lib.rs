//! Live channel directory and Jikkyo comment gateway client
//!
//! This crate talks to a TV streaming server's channel API: it fetches the
//! grouped list of broadcast channels with their live viewing state, resolves
//! the real-time commentary (Jikkyo) endpoint of a channel, and relays
//! comments to it.
//!
//! # Layers
//!
//! - [`ChannelsClient`]: one method per endpoint, returning [`Result`].
//! - [`ChannelsGateway`]: the same operations for UI code. Failures become
//!   [`FetchOutcome::Failed`] plus one [`FailureNotice`]; nothing is thrown.
//!
//! # Example
//!
//! ```no_run
//! use ktvlive::{ChannelsClient, ChannelsGateway, CollectingNotifier, FetchOutcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let notifier = CollectingNotifier::new();
//!     let gateway = ChannelsGateway::with_notifier(ChannelsClient::new().await?, notifier.clone());
//!
//!     match gateway.fetch_directory().await {
//!         FetchOutcome::Success(directory) => {
//!             for (channel_type, channels) in directory.buckets() {
//!                 println!("{}: {} channels", channel_type.label(), channels.len());
//!             }
//!         }
//!         FetchOutcome::Failed => {
//!             for notice in notifier.drain() {
//!                 eprintln!("{}", notice.message);
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Channel identifiers
//!
//! Per-channel operations accept anything convertible into [`ChannelRef`]:
//! the canonical `NID<network_id>-SID<service_id>` id or the short
//! `display_channel_id` (`gr011`).
//!
//! # Configuration
//!
//! [`ChannelsConfigExt`] reads the API base URL, timeout and User-Agent from
//! `ktvconfig`, and [`logging::init_logging`] sets up `tracing` from the same
//! file.

pub mod channel_id;
pub mod channel_type;
pub mod client;
pub mod config_ext;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod models;
pub mod notify;

// Re-exports
pub use channel_id::{ChannelId, ChannelRef};
pub use channel_type::{ChannelGroup, ChannelType};
pub use client::{ChannelsClient, ClientBuilder};
pub use config_ext::ChannelsConfigExt;
pub use error::{Error, Result};
pub use gateway::{ChannelsGateway, FetchOutcome};
pub use models::{
    Channel, ChannelDirectory, CommentPosition, CommentResult, CommentSize, CommentSubmission,
    Genre, JikkyoGatewayInfo, LiveChannel, LiveChannelSlot, Program, SessionScope,
};
pub use notify::{CollectingNotifier, FailureNotice, FailureNotifier, Operation, TracingNotifier};

//! Data models for the channel API
//!
//! This module contains the structures exchanged with the channel API:
//! channels and their live viewing state, the grouped directory, program
//! metadata, and the Jikkyo gateway and comment payloads.

use crate::channel_id::{ChannelId, ChannelRef};
use crate::channel_type::ChannelType;
use crate::error::{Error, Result};
use chrono::{DateTime, FixedOffset, TimeZone};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;
use std::ops::Deref;

// ============================================================================
// Channels
// ============================================================================

/// One tunable broadcast service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Canonical identifier, `NID<network_id>-SID<service_id>`
    pub id: String,
    /// Short human-facing code (e.g., "gr011", "bs101")
    pub display_channel_id: String,
    pub network_id: u32,
    pub service_id: u32,
    pub transport_stream_id: Option<u32>,
    /// Remote-control key number (terrestrial only)
    pub remocon_id: u32,
    /// Display channel number, `"---"` while unknown
    pub channel_number: String,
    #[serde(rename = "type")]
    pub channel_type: ChannelType,
    pub name: String,
    /// Forces a particular Jikkyo community for ambiguous channels
    pub jikkyo_force: Option<i64>,
    pub is_subchannel: bool,
    pub is_radiochannel: bool,
    pub is_watchable: bool,
}

impl Channel {
    /// Identifier derived from the network/service pair
    pub fn canonical_id(&self) -> ChannelId {
        ChannelId::new(self.network_id, self.service_id)
    }

    /// Whether `id` is exactly the canonical rendering of the numeric pair
    pub fn has_canonical_id(&self) -> bool {
        self.id == self.canonical_id().to_string()
    }
}

/// A channel plus the live viewing state computed at fetch time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveChannel {
    #[serde(flatten)]
    pub channel: Channel,
    /// Whether the UI should list this channel
    pub is_display: bool,
    /// Concurrent viewers when the snapshot was taken
    pub viewer_count: u64,
    pub program_present: Option<Program>,
    pub program_following: Option<Program>,
}

impl Deref for LiveChannel {
    type Target = Channel;

    fn deref(&self) -> &Channel {
        &self.channel
    }
}

impl LiveChannel {
    /// Display name used while channel data is loading
    pub const PLACEHOLDER_NAME: &'static str = "取得中…";

    /// Loading-state stand-in with the same shape as fetched data
    ///
    /// Prefer [`LiveChannelSlot::Pending`] in state that can hold real data;
    /// this value is only meant for rendering.
    pub fn placeholder() -> Self {
        Self {
            channel: Channel {
                id: ChannelId::new(0, 0).to_string(),
                display_channel_id: "gr000".to_string(),
                network_id: 0,
                service_id: 0,
                transport_stream_id: Some(0),
                remocon_id: 0,
                channel_number: "---".to_string(),
                channel_type: ChannelType::Terrestrial,
                name: Self::PLACEHOLDER_NAME.to_string(),
                jikkyo_force: None,
                is_subchannel: false,
                is_radiochannel: false,
                is_watchable: true,
            },
            is_display: true,
            viewer_count: 0,
            program_present: None,
            program_following: None,
        }
    }
}

/// Live channel state held by a UI before and after the fetch completes
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LiveChannelSlot {
    /// Nothing fetched yet
    #[default]
    Pending,
    /// Real data from the backend
    Loaded(LiveChannel),
}

impl LiveChannelSlot {
    pub fn is_pending(&self) -> bool {
        matches!(self, LiveChannelSlot::Pending)
    }

    /// Fetched data only; never the placeholder
    pub fn loaded(&self) -> Option<&LiveChannel> {
        match self {
            LiveChannelSlot::Pending => None,
            LiveChannelSlot::Loaded(channel) => Some(channel),
        }
    }

    /// Something renderable: the fetched channel or the placeholder
    pub fn for_display(&self) -> Cow<'_, LiveChannel> {
        match self {
            LiveChannelSlot::Pending => Cow::Owned(LiveChannel::placeholder()),
            LiveChannelSlot::Loaded(channel) => Cow::Borrowed(channel),
        }
    }
}

impl From<LiveChannel> for LiveChannelSlot {
    fn from(value: LiveChannel) -> Self {
        LiveChannelSlot::Loaded(value)
    }
}

// ============================================================================
// Programs
// ============================================================================

/// Genre classification of a program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub major: String,
    pub middle: String,
}

/// A broadcast program slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: String,
    pub channel_id: String,
    pub network_id: u32,
    pub service_id: u32,
    pub event_id: u32,
    pub title: String,
    pub description: String,
    /// Heading → text sections of the extended description, in broadcast order
    #[serde(default)]
    pub detail: IndexMap<String, String>,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    /// Duration in seconds
    pub duration: f64,
    pub is_free: bool,
    #[serde(default)]
    pub genres: Vec<Genre>,
    pub video_type: Option<String>,
    pub video_codec: Option<String>,
    pub video_resolution: Option<String>,
    pub primary_audio_type: String,
    pub primary_audio_language: String,
    pub primary_audio_sampling_rate: String,
    pub secondary_audio_type: Option<String>,
    pub secondary_audio_language: Option<String>,
    pub secondary_audio_sampling_rate: Option<String>,
}

impl Program {
    /// Whether `instant` falls inside `[start_time, end_time)`
    pub fn is_airing_at<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> bool {
        let instant = instant.fixed_offset();
        self.start_time <= instant && instant < self.end_time
    }
}

// ============================================================================
// Directory
// ============================================================================

/// All known channels partitioned by type
///
/// Order inside each bucket is the server's and is preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelDirectory {
    #[serde(rename = "GR")]
    pub terrestrial: Vec<LiveChannel>,
    #[serde(rename = "BS")]
    pub bs: Vec<LiveChannel>,
    #[serde(rename = "CS")]
    pub cs: Vec<LiveChannel>,
    #[serde(rename = "CATV")]
    pub catv: Vec<LiveChannel>,
    #[serde(rename = "SKY")]
    pub sky: Vec<LiveChannel>,
    #[serde(rename = "STARDIGIO")]
    pub stardigio: Vec<LiveChannel>,
}

impl ChannelDirectory {
    /// Channels of one type
    pub fn bucket(&self, channel_type: ChannelType) -> &[LiveChannel] {
        match channel_type {
            ChannelType::Terrestrial => &self.terrestrial,
            ChannelType::Bs => &self.bs,
            ChannelType::Cs => &self.cs,
            ChannelType::Catv => &self.catv,
            ChannelType::Sky => &self.sky,
            ChannelType::StarDigio => &self.stardigio,
        }
    }

    /// Non-empty buckets in directory order
    pub fn buckets(&self) -> impl Iterator<Item = (ChannelType, &[LiveChannel])> {
        ChannelType::ALL
            .into_iter()
            .map(move |t| (t, self.bucket(t)))
            .filter(|(_, channels)| !channels.is_empty())
    }

    /// Every channel, bucket by bucket, in server order
    pub fn iter(&self) -> impl Iterator<Item = &LiveChannel> {
        ChannelType::ALL
            .into_iter()
            .flat_map(move |t| self.bucket(t).iter())
    }

    pub fn len(&self) -> usize {
        ChannelType::ALL.iter().map(|t| self.bucket(*t).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look a channel up by canonical or display id
    pub fn find(&self, channel: impl Into<ChannelRef>) -> Option<&LiveChannel> {
        let channel = channel.into();
        self.iter().find(|c| channel.matches(c))
    }

    /// Check the partition invariants
    ///
    /// Every channel must sit in the bucket of its own type, carry a
    /// canonical id, and appear only once across the directory.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.len());

        for channel_type in ChannelType::ALL {
            for channel in self.bucket(channel_type) {
                if channel.channel_type != channel_type {
                    return Err(Error::contract(format!(
                        "channel {} of type {} listed under {}",
                        channel.id, channel.channel_type, channel_type
                    )));
                }
                if !channel.has_canonical_id() {
                    return Err(Error::contract(format!(
                        "channel id {} does not match {}",
                        channel.id,
                        channel.canonical_id()
                    )));
                }
                if !seen.insert(channel.id.as_str()) {
                    return Err(Error::contract(format!(
                        "channel {} listed more than once",
                        channel.id
                    )));
                }
            }
        }

        Ok(())
    }
}

// ============================================================================
// Jikkyo
// ============================================================================

/// Where to connect for a channel's live commentary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JikkyoGatewayInfo {
    /// `None` when no commentary is available right now
    pub websocket_url: Option<String>,
    /// Endpoint dedicated to this channel rather than a shared community
    pub is_nxjikkyo_exclusive: bool,
}

/// Whether a gateway connection may be reused for other channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionScope {
    /// Dedicated to the requested channel only
    Exclusive,
    /// Community endpoint, may be shared
    Shared,
}

impl JikkyoGatewayInfo {
    pub fn is_available(&self) -> bool {
        self.websocket_url.is_some()
    }

    pub fn session_scope(&self) -> SessionScope {
        if self.is_nxjikkyo_exclusive {
            SessionScope::Exclusive
        } else {
            SessionScope::Shared
        }
    }
}

/// On-screen placement of a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentPosition {
    Top,
    /// Scrolls from right to left
    #[default]
    Right,
    Bottom,
}

/// Display size of a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentSize {
    Big,
    #[default]
    Medium,
    Small,
}

/// Outbound Jikkyo comment
///
/// Nothing is validated locally: an empty `text` or an out-of-range `vpos`
/// is sent as-is and rejected by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentSubmission {
    pub text: String,
    /// Display color, e.g. `#FFFFFF`
    pub color: String,
    pub position: CommentPosition,
    pub size: CommentSize,
    /// Offset on the commentary clock, in centiseconds
    pub vpos: u64,
}

impl CommentSubmission {
    /// White, medium, scrolling comment
    pub fn new(text: impl Into<String>, vpos: u64) -> Self {
        Self {
            text: text.into(),
            color: "#FFFFFF".to_string(),
            position: CommentPosition::default(),
            size: CommentSize::default(),
            vpos,
        }
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn position(mut self, position: CommentPosition) -> Self {
        self.position = position;
        self
    }

    pub fn size(mut self, size: CommentSize) -> Self {
        self.size = size;
        self
    }
}

/// Server verdict on a submitted comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentResult {
    pub is_success: bool,
    pub detail: String,
}

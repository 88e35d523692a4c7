//! Channel identifiers
//!
//! A channel is canonically addressed by its network/service pair rendered as
//! `NID<network_id>-SID<service_id>`. The backend also accepts the short
//! `display_channel_id` (`gr011`, `bs101`) wherever a channel id is expected;
//! [`ChannelRef`] carries either form.

use crate::error::{Error, Result};
use crate::models::Channel;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Canonical channel identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId {
    pub network_id: u32,
    pub service_id: u32,
}

impl ChannelId {
    pub fn new(network_id: u32, service_id: u32) -> Self {
        Self {
            network_id,
            service_id,
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NID{}-SID{}", self.network_id, self.service_id)
    }
}

impl FromStr for ChannelId {
    type Err = Error;

    /// Parses the exact canonical form; leading zeros or signs are rejected
    /// so that parsing and formatting round-trip.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidChannelId(s.to_string());

        let rest = s.strip_prefix("NID").ok_or_else(invalid)?;
        let (nid, sid) = rest.split_once("-SID").ok_or_else(invalid)?;
        let id = ChannelId::new(
            parse_number(nid).ok_or_else(invalid)?,
            parse_number(sid).ok_or_else(invalid)?,
        );

        if id.to_string() != s {
            return Err(invalid());
        }
        Ok(id)
    }
}

fn parse_number(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

impl Serialize for ChannelId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ChannelId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Argument accepted by the per-channel endpoints
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChannelRef {
    /// Canonical `NID..-SID..` identifier
    Id(ChannelId),
    /// `display_channel_id` form (`gr011`)
    Display(String),
}

impl ChannelRef {
    /// Classify a raw identifier string
    ///
    /// Anything that is not a canonical id is passed through as a display id;
    /// the backend is the one to reject unknown values.
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<ChannelId>() {
            Ok(id) => ChannelRef::Id(id),
            Err(_) => ChannelRef::Display(raw.to_string()),
        }
    }

    /// Value placed in the `/channels/{channel_id}` path segment
    pub fn as_path_segment(&self) -> String {
        match self {
            ChannelRef::Id(id) => id.to_string(),
            ChannelRef::Display(display) => display.clone(),
        }
    }

    /// Whether `channel` is the one this reference designates
    pub fn matches(&self, channel: &Channel) -> bool {
        match self {
            ChannelRef::Id(id) => channel.canonical_id() == *id,
            ChannelRef::Display(display) => channel.display_channel_id == *display,
        }
    }
}

impl fmt::Display for ChannelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelRef::Id(id) => fmt::Display::fmt(id, f),
            ChannelRef::Display(display) => f.write_str(display),
        }
    }
}

impl From<&str> for ChannelRef {
    fn from(value: &str) -> Self {
        ChannelRef::parse(value)
    }
}

impl From<String> for ChannelRef {
    fn from(value: String) -> Self {
        ChannelRef::parse(&value)
    }
}

impl From<&String> for ChannelRef {
    fn from(value: &String) -> Self {
        ChannelRef::parse(value)
    }
}

impl From<ChannelId> for ChannelRef {
    fn from(value: ChannelId) -> Self {
        ChannelRef::Id(value)
    }
}

impl From<&Channel> for ChannelRef {
    fn from(value: &Channel) -> Self {
        ChannelRef::Id(value.canonical_id())
    }
}

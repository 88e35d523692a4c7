//! Channel type taxonomy
//!
//! The backend classifies every channel into one of six closed categories.
//! The UI additionally groups user-favorited channels under a synthetic
//! "pinned" tab, which is modelled separately by [`ChannelGroup`] so it can
//! never be carried by a fetched channel.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Broadcast category of a channel
///
/// Deserialization rejects any tag outside this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChannelType {
    /// Terrestrial digital
    #[serde(rename = "GR")]
    Terrestrial,
    /// BS satellite
    #[serde(rename = "BS")]
    Bs,
    /// CS (110° CS) satellite
    #[serde(rename = "CS")]
    Cs,
    /// Cable television
    #[serde(rename = "CATV")]
    Catv,
    /// SKY PerfecTV! premium satellite
    #[serde(rename = "SKY")]
    Sky,
    /// StarDigio audio-only service
    #[serde(rename = "STARDIGIO")]
    StarDigio,
}

impl ChannelType {
    /// All channel types in directory order
    pub const ALL: [ChannelType; 6] = [
        ChannelType::Terrestrial,
        ChannelType::Bs,
        ChannelType::Cs,
        ChannelType::Catv,
        ChannelType::Sky,
        ChannelType::StarDigio,
    ];

    /// Machine tag used on the wire (`GR`, `BS`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelType::Terrestrial => "GR",
            ChannelType::Bs => "BS",
            ChannelType::Cs => "CS",
            ChannelType::Catv => "CATV",
            ChannelType::Sky => "SKY",
            ChannelType::StarDigio => "STARDIGIO",
        }
    }

    /// Human-facing label
    pub fn label(&self) -> &'static str {
        match self {
            ChannelType::Terrestrial => "地デジ",
            ChannelType::Bs => "BS",
            ChannelType::Cs => "CS",
            ChannelType::Catv => "CATV",
            ChannelType::Sky => "SKY",
            ChannelType::StarDigio => "StarDigio",
        }
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ChannelType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::UnknownChannelType(s.to_string()))
    }
}

/// UI grouping of channels: the pinned pseudo-group plus one group per type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelGroup {
    /// Channels the user pinned; not a backend channel type
    Pinned,
    /// Channels of one broadcast type
    Type(ChannelType),
}

impl ChannelGroup {
    /// Machine tag (`PINNED` or the type tag)
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelGroup::Pinned => "PINNED",
            ChannelGroup::Type(t) => t.as_str(),
        }
    }

    /// Human-facing label
    pub fn label(&self) -> &'static str {
        match self {
            ChannelGroup::Pinned => "ピン留め",
            ChannelGroup::Type(t) => t.label(),
        }
    }

    /// The broadcast type behind this group, `None` for pinned
    pub fn channel_type(&self) -> Option<ChannelType> {
        match self {
            ChannelGroup::Pinned => None,
            ChannelGroup::Type(t) => Some(*t),
        }
    }
}

impl From<ChannelType> for ChannelGroup {
    fn from(value: ChannelType) -> Self {
        ChannelGroup::Type(value)
    }
}

impl FromStr for ChannelGroup {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == "PINNED" {
            return Ok(ChannelGroup::Pinned);
        }
        s.parse().map(ChannelGroup::Type)
    }
}

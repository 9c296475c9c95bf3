//! Permission bitsets.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{BitAnd, BitOr};

use crate::snowflake::U64Visitor;

/// A 64-bit permission set, transmitted as a decimal string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Permissions(pub u64);

impl Permissions {
    /// The empty set.
    pub const NONE: Self = Self(0);
    /// Create instant invite.
    pub const CREATE_INSTANT_INVITE: Self = Self(1 << 0);
    /// Administrator; implies every other permission.
    pub const ADMINISTRATOR: Self = Self(1 << 3);
    /// Manage channels.
    pub const MANAGE_CHANNELS: Self = Self(1 << 4);
    /// View a channel.
    pub const VIEW_CHANNEL: Self = Self(1 << 10);
    /// Send messages.
    pub const SEND_MESSAGES: Self = Self(1 << 11);
    /// Manage roles.
    pub const MANAGE_ROLES: Self = Self(1 << 28);

    /// Raw bits.
    #[inline]
    pub fn bits(self) -> u64 {
        self.0
    }

    /// True when every bit of `other` is set in `self`.
    #[inline]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True when no bit is set.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Permissions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for Permissions {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl Serialize for Permissions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_any(U64Visitor("a permission bitset"))
            .map(Self)
    }
}

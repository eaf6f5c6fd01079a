use serde::{Deserialize, Serialize};
use std::fmt;

/// Идентификатор сессии: комната + фид издателя.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
pub struct SessionId {
    pub room: String,
    pub feed: String,
}

impl SessionId {
    pub fn new(room: impl Into<String>, feed: impl Into<String>) -> Self {
        Self {
            room: room.into(),
            feed: feed.into(),
        }
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.Feed.{}", self.room, self.feed)
    }
}

/// Состояние переговоров сессии.
///
/// `Idle -> Joining -> Negotiating -> Connected -> Closed`, плюс терминальное `Failed`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
pub enum SessionState {
    Idle,
    Joining,
    Negotiating,
    Connected,
    Closed,
    Failed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Failed)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Joining => "joining",
            Self::Negotiating => "negotiating",
            Self::Connected => "connected",
            Self::Closed => "closed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

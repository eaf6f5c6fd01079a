use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }
}

/// Один ICE-кандидат в формате trickle-сообщения.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(rename = "sdpMid")]
    pub sdp_mid: Option<String>,
    #[serde(rename = "sdpMLineIndex")]
    pub sdp_m_line_index: Option<u16>,
}

impl IceCandidate {
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mid: None,
            sdp_m_line_index: None,
        }
    }
}

/// Содержимое trickle: либо очередной кандидат, либо признак окончания сбора.
///
/// На проводе окончание выглядит как `{"completed": true}`.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(try_from = "TrickleWire", into = "TrickleWire")]
pub enum Trickle {
    Candidate(IceCandidate),
    Completed,
}

impl Trickle {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl From<IceCandidate> for Trickle {
    fn from(candidate: IceCandidate) -> Self {
        Self::Candidate(candidate)
    }
}

#[derive(Serialize, Deserialize)]
struct TrickleWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    candidate: Option<String>,
    #[serde(rename = "sdpMid", default, skip_serializing_if = "Option::is_none")]
    sdp_mid: Option<String>,
    #[serde(rename = "sdpMLineIndex", default, skip_serializing_if = "Option::is_none")]
    sdp_m_line_index: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completed: Option<bool>,
}

impl TryFrom<TrickleWire> for Trickle {
    type Error = String;

    fn try_from(wire: TrickleWire) -> Result<Self, Self::Error> {
        if wire.completed == Some(true) {
            return Ok(Self::Completed);
        }
        match wire.candidate {
            Some(candidate) => Ok(Self::Candidate(IceCandidate {
                candidate,
                sdp_mid: wire.sdp_mid,
                sdp_m_line_index: wire.sdp_m_line_index,
            })),
            None => Err("trickle carries neither a candidate nor completed=true".to_owned()),
        }
    }
}

impl From<Trickle> for TrickleWire {
    fn from(trickle: Trickle) -> Self {
        match trickle {
            Trickle::Candidate(c) => Self {
                candidate: Some(c.candidate),
                sdp_mid: c.sdp_mid,
                sdp_m_line_index: c.sdp_m_line_index,
                completed: None,
            },
            Trickle::Completed => Self {
                candidate: None,
                sdp_mid: None,
                sdp_m_line_index: None,
                completed: Some(true),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SdpType {
    Offer,
    Answer,
    Pranswer,
    Rollback,
}

/// SDP, приложенный к сигнальному сообщению.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Jsep {
    #[serde(rename = "type")]
    pub sdp_type: SdpType,
    pub sdp: String,
}

impl Jsep {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            sdp_type: SdpType::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            sdp_type: SdpType::Answer,
            sdp: sdp.into(),
        }
    }
}

/// Результат команды `join`: сервер присылает SDP Offer подписчику.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct JoinResponse {
    #[serde(default)]
    pub jsep: Option<Jsep>,
}

impl JoinResponse {
    pub fn with_offer(sdp: impl Into<String>) -> Self {
        Self {
            jsep: Some(Jsep::offer(sdp)),
        }
    }
}

/// Асинхронные события, которые сигнальный канал присылает сессии.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum SignalEvent {
    Trickle(Trickle),
    Hangup { reason: Option<String> },
    WebrtcUp,
}

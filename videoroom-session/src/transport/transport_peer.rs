use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use videoroom_core::{MediaKind, SessionId, Trickle};

use crate::transport::capabilities::CodecSet;
use crate::transport::transport_config::TransportConfig;
use crate::transport::transport_event::TransportEvent;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TransceiverDirection {
    SendRecv,
    SendOnly,
    RecvOnly,
    Inactive,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PeerState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

impl fmt::Display for PeerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// RTP пакет входящего трека.
#[derive(Debug, Clone)]
pub struct MediaPacket {
    pub ssrc: u32,
    pub sequence_number: u16,
    pub timestamp: u32,
    pub payload: Bytes,
}

/// Источник RTCP отчетов (sender или receiver).
#[async_trait]
pub trait FeedbackSource: Send + Sync {
    /// Блокируется до следующего RTCP отчета и возвращает число пакетов в нем.
    async fn read_feedback(&self) -> Result<usize>;
}

#[async_trait]
pub trait RemoteTrack: Send + Sync {
    fn kind(&self) -> MediaKind;

    fn ssrc(&self) -> u32;

    fn payload_type(&self) -> u8;

    async fn read_packet(&self) -> Result<MediaPacket>;
}

#[async_trait]
pub trait Transceiver: Send + Sync {
    fn kind(&self) -> MediaKind;

    fn direction(&self) -> TransceiverDirection;

    /// RTCP со стороны отправителя. `None`, если отправителя нет.
    async fn feedback(&self) -> Option<Arc<dyn FeedbackSource>>;
}

/// Куда применяются удаленные trickle-кандидаты.
#[async_trait]
pub trait CandidateSink: Send + Sync {
    /// `Trickle::Completed` применяется как конец кандидатов.
    async fn add_ice_candidate(&self, trickle: Trickle) -> Result<()>;
}

/// Локальный конец WebRTC соединения.
#[async_trait]
pub trait TransportPeer: CandidateSink {
    async fn set_remote_description(&self, offer_sdp: String) -> Result<()>;

    async fn add_transceiver(
        &self,
        kind: MediaKind,
        direction: TransceiverDirection,
    ) -> Result<Arc<dyn Transceiver>>;

    async fn create_answer(&self) -> Result<String>;

    async fn set_local_description(&self, answer_sdp: String) -> Result<()>;

    fn connection_state(&self) -> PeerState;

    async fn close(&self) -> Result<()>;
}

/// Создает `TransportPeer` под параметры конкретного offer.
/// Все события пира должны уходить в `events`.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn create(
        &self,
        id: &SessionId,
        config: &TransportConfig,
        codecs: &CodecSet,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn TransportPeer>>;
}

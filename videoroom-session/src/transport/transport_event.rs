use std::sync::Arc;
use videoroom_core::Trickle;

use crate::transport::transport_peer::{FeedbackSource, PeerState, RemoteTrack};

/// События, которые транспорт генерирует для сессии.
pub enum TransportEvent {
    /// Найден локальный ICE-кандидат (или сбор завершен), его нужно отправить через Signaling.
    LocalCandidate(Trickle),

    /// Изменилось состояние PeerConnection.
    ConnectionState(PeerState),

    /// Пришел входящий медиа-трек.
    InboundTrack {
        track: Arc<dyn RemoteTrack>,
        receiver: Arc<dyn FeedbackSource>,
    },
}

use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{info, warn};
use videoroom_core::{MediaKind, SessionId, SessionState, SignalEvent, Trickle};

use crate::bridge::{TRICKLE_QUEUE_DEPTH, TrickleConsumer, TrickleProducer, trickle_bridge};
use crate::cancel::CancelToken;
use crate::drain::FeedbackStats;
use crate::error::{SessionError, SessionResult};
use crate::session::options::{SessionOptions, SubscriberOption};
use crate::signaling::SignalingChannel;
use crate::transport::{Transceiver, TransportEvent, TransportFactory, TransportPeer};

/// Изменяемое состояние сессии. Меняется только под `Shared::core`.
pub(crate) struct SessionCore {
    pub(crate) state: SessionState,
    pub(crate) peer: Option<Arc<dyn TransportPeer>>,
    pub(crate) transceivers: Vec<Arc<dyn Transceiver>>,
    pub(crate) options: SessionOptions,
    pub(crate) trickle_rx: Option<TrickleConsumer>,
    /// `join` был отправлен, значит на Leave нужен `leave`.
    pub(crate) joined: bool,
    pub(crate) left: bool,
    pub(crate) sender_drains_started: bool,
}

impl SessionCore {
    pub(crate) fn transition(&mut self, id: &SessionId, next: SessionState) {
        info!("Session {}: {} -> {}", id, self.state, next);
        self.state = next;
    }
}

pub(crate) struct Shared {
    pub(crate) id: SessionId,
    pub(crate) signaling: Arc<dyn SignalingChannel>,
    pub(crate) factory: Arc<dyn TransportFactory>,
    pub(crate) core: Mutex<SessionCore>,
    pub(crate) trickle_tx: TrickleProducer,
    /// Кандидаты из цикла событий для `forward_trickles`.
    pub(crate) trickle_hop: mpsc::UnboundedSender<Trickle>,
    pub(crate) transport_tx: mpsc::Sender<TransportEvent>,
    pub(crate) cancel: CancelToken,
    pub(crate) stats: Arc<FeedbackStats>,
}

/// Подписчик на один фид комнаты: переговоры offer/answer, trickle ICE
/// и поддержание транспорта после подключения.
///
/// Дешево клонируется; все клоны указывают на одну сессию.
#[derive(Clone)]
pub struct Subscriber {
    pub(crate) shared: Arc<Shared>,
}

impl Subscriber {
    /// Создает сессию в состоянии `Idle` и запускает ее цикл событий.
    /// Должен вызываться внутри tokio runtime.
    ///
    /// `signal_rx` — события сигнального канала (`trickle`, `hangup`, `webrtc-up`).
    pub fn new(
        id: SessionId,
        signaling: Arc<dyn SignalingChannel>,
        signal_rx: mpsc::Receiver<SignalEvent>,
        factory: Arc<dyn TransportFactory>,
    ) -> Self {
        let (transport_tx, transport_rx) = mpsc::channel(256);
        let (trickle_tx, trickle_rx) = trickle_bridge(TRICKLE_QUEUE_DEPTH);
        let (trickle_hop, hop_rx) = mpsc::unbounded_channel();

        let subscriber = Self {
            shared: Arc::new(Shared {
                id,
                signaling,
                factory,
                core: Mutex::new(SessionCore {
                    state: SessionState::Idle,
                    peer: None,
                    transceivers: Vec::new(),
                    options: SessionOptions::default(),
                    trickle_rx: Some(trickle_rx),
                    joined: false,
                    left: false,
                    sender_drains_started: false,
                }),
                trickle_tx,
                trickle_hop,
                transport_tx,
                cancel: CancelToken::new(),
                stats: Arc::new(FeedbackStats::default()),
            }),
        };

        tokio::spawn(subscriber.clone().forward_trickles(hop_rx));
        tokio::spawn(subscriber.clone().run(signal_rx, transport_rx));
        subscriber
    }

    pub fn id(&self) -> &SessionId {
        &self.shared.id
    }

    pub async fn state(&self) -> SessionState {
        self.shared.core.lock().await.state
    }

    /// Токен отмены сессии. Отмена прерывает `start` и останавливает все фоновые циклы.
    pub fn cancel_token(&self) -> CancelToken {
        self.shared.cancel.clone()
    }

    pub fn feedback_stats(&self) -> Arc<FeedbackStats> {
        self.shared.stats.clone()
    }

    /// Число работающих RTCP drain-циклов.
    pub fn active_drains(&self) -> usize {
        self.shared.stats.active_feedback_drains()
    }

    /// Сколько раз drain-циклы прочитали RTCP с начала сессии.
    pub fn feedback_reports(&self) -> u64 {
        self.shared.stats.reports()
    }

    pub async fn transceiver_kinds(&self) -> Vec<MediaKind> {
        let core = self.shared.core.lock().await;
        core.transceivers.iter().map(|t| t.kind()).collect()
    }

    pub async fn set_option(&self, option: SubscriberOption) -> SessionResult<()> {
        self.set_options([option]).await
    }

    /// Обработчики треков и конфигурация транспорта. Только до `start`.
    pub async fn set_options(
        &self,
        options: impl IntoIterator<Item = SubscriberOption>,
    ) -> SessionResult<()> {
        let mut core = self.shared.core.lock().await;
        if core.state != SessionState::Idle {
            return Err(SessionError::InvalidState {
                op: "set_option",
                state: core.state,
            });
        }
        for option in options {
            core.options.apply(option);
        }
        Ok(())
    }

    pub(crate) async fn close_peer(&self, peer: Arc<dyn TransportPeer>) {
        if let Err(e) = peer.close().await {
            warn!("Failed to close transport for {}: {:#}", self.shared.id, e);
        }
    }
}

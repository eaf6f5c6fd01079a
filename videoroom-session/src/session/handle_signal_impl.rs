use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use videoroom_core::{SessionState, SignalEvent, Trickle};

use crate::drain::spawn_feedback_drain;
use crate::session::subscriber::{SessionCore, Subscriber};
use crate::transport::TransportEvent;

impl Subscriber {
    /// Цикл событий сессии: сигнальный канал и транспорт.
    /// Работает, пока сессия не отменена (Leave, hangup, отказ транспорта).
    pub(crate) async fn run(
        self,
        mut signal_rx: mpsc::Receiver<SignalEvent>,
        mut transport_rx: mpsc::Receiver<TransportEvent>,
    ) {
        let cancel = self.shared.cancel.clone();
        let mut signal_open = true;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,

                evt = signal_rx.recv(), if signal_open => match evt {
                    Some(e) => self.handle_signal(e).await,
                    None => {
                        debug!("Signal channel closed for {}", self.shared.id);
                        signal_open = false;
                    }
                },

                evt = transport_rx.recv() => match evt {
                    Some(e) => self.handle_transport_event(e).await,
                    None => break,
                },
            }
        }

        debug!("Event loop for {} finished", self.shared.id);
    }

    /// Перекладывает удаленных кандидатов из цикла событий в очередь.
    /// Только эта задача может ждать на заполненной очереди, цикл событий не блокируется.
    pub(crate) async fn forward_trickles(self, mut hop_rx: mpsc::UnboundedReceiver<Trickle>) {
        let cancel = self.shared.cancel.clone();

        loop {
            let trickle = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                next = hop_rx.recv() => match next {
                    Some(t) => t,
                    None => break,
                },
            };
            self.on_trickle(trickle).await;
        }

        debug!("Trickle forwarder for {} finished", self.shared.id);
    }

    pub(crate) async fn handle_signal(&self, event: SignalEvent) {
        let s = &self.shared;
        match event {
            SignalEvent::Trickle(trickle) => {
                if s.trickle_hop.send(trickle).is_err() {
                    debug!("Remote candidate for {} dropped: forwarder stopped", s.id);
                }
            }
            SignalEvent::Hangup { reason } => self.on_hangup(reason).await,
            SignalEvent::WebrtcUp => self.on_webrtc_up().await,
        }
    }

    /// Удаленный кандидат. Lock сессии не берется: кандидаты до появления
    /// транспорта копятся в очереди.
    pub async fn on_trickle(&self, trickle: Trickle) {
        let s = &self.shared;
        if let Err(e) = s.trickle_tx.push(trickle, &s.cancel).await {
            debug!("Remote candidate for {} dropped: {}", s.id, e);
        }
    }

    /// Сервер закрыл PeerConnection.
    pub async fn on_hangup(&self, reason: Option<String>) {
        let s = &self.shared;
        info!(
            "Hangup for {}: {}",
            s.id,
            reason.as_deref().unwrap_or("no reason")
        );

        let peer = {
            let mut core = s.core.lock().await;
            core.trickle_rx = None;
            if core.state != SessionState::Closed {
                core.transition(&s.id, SessionState::Closed);
            }
            core.peer.take()
        };

        s.cancel.cancel();
        if let Some(peer) = peer {
            self.close_peer(peer).await;
        }
    }

    /// Сервер подтвердил, что медиа пошло.
    pub async fn on_webrtc_up(&self) {
        let mut core = self.shared.core.lock().await;
        self.mark_connected(&mut core, "webrtc-up").await;
    }

    /// Переход в `Connected` и однократный запуск RTCP drain-циклов отправителей.
    pub(crate) async fn mark_connected(&self, core: &mut SessionCore, trigger: &str) {
        let s = &self.shared;
        match core.state {
            SessionState::Negotiating => core.transition(&s.id, SessionState::Connected),
            SessionState::Connected => {}
            state => {
                warn!("Ignoring {} for {} in state {}", trigger, s.id, state);
                return;
            }
        }

        if core.sender_drains_started {
            return;
        }
        core.sender_drains_started = true;

        for (i, transceiver) in core.transceivers.iter().enumerate() {
            let Some(source) = transceiver.feedback().await else {
                continue;
            };
            spawn_feedback_drain(
                format!("{} {} sender #{}", s.id, transceiver.kind(), i),
                source,
                s.cancel.clone(),
                s.stats.clone(),
            );
        }

        info!(
            "Subscriber {} connected ({}), {} feedback drains running",
            s.id,
            trigger,
            s.stats.active_feedback_drains()
        );
    }
}

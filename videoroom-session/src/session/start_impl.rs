use tracing::{error, info};
use videoroom_core::{JoinOptions, JoinResponse, Jsep, MediaKind, SdpType, SessionState};

use crate::error::{SessionError, SessionResult};
use crate::session::subscriber::{SessionCore, Subscriber};
use crate::transport::{CodecSet, PeerState, TransceiverDirection};

impl Subscriber {
    /// Начать получать фид с сервера.
    ///
    /// `join` -> remote offer -> транспорт -> recv-only трансиверы -> answer -> `start`.
    /// По умолчанию запрашиваются аудио и видео; `JoinOptions` позволяет отключить
    /// любой из них или добавить произвольные поля запроса.
    ///
    /// Успешный возврат оставляет сессию в `Negotiating`: `Connected` наступит по
    /// `webrtc-up` (или сразу, если транспорт уже подключен).
    pub async fn start(&self, options: JoinOptions) -> SessionResult<()> {
        let s = &self.shared;

        {
            let mut core = s.core.lock().await;
            if core.state != SessionState::Idle {
                return Err(SessionError::InvalidState {
                    op: "start",
                    state: core.state,
                });
            }
            core.joined = true;
            core.transition(&s.id, SessionState::Joining);
        }

        let joined = tokio::select! {
            biased;
            _ = s.cancel.cancelled() => {
                return Err(self.fail(SessionError::Cancelled("join")).await);
            }
            res = s.signaling.join(&s.id, &options) => res,
        };
        let response = match joined {
            Ok(response) => response,
            Err(e) => return Err(self.fail(SessionError::signaling("join", e)).await),
        };
        let offer = match remote_offer(response) {
            Ok(offer) => offer,
            Err(e) => return Err(self.fail(e).await),
        };
        info!("Offer from server for {}: {} bytes", s.id, offer.len());

        let negotiated = {
            let mut core = s.core.lock().await;
            // Leave или hangup пришли, пока ждали join
            if core.state != SessionState::Joining {
                return Err(SessionError::Cancelled("join"));
            }
            let res = self.negotiate(&mut core, offer, &options).await;
            if res.is_ok() {
                core.transition(&s.id, SessionState::Negotiating);
            }
            res
        };
        let answer = match negotiated {
            Ok(answer) => answer,
            Err(e) => return Err(self.fail(e).await),
        };

        let started = tokio::select! {
            biased;
            _ = s.cancel.cancelled() => {
                return Err(self.fail(SessionError::Cancelled("start")).await);
            }
            res = s.signaling.start(Jsep::answer(answer), true) => res,
        };
        if let Err(e) = started {
            return Err(self.fail(SessionError::signaling("start", e)).await);
        }

        let mut core = s.core.lock().await;
        // webrtc-up может успеть прийти раньше, чем мы снова взяли lock
        if !matches!(
            core.state,
            SessionState::Negotiating | SessionState::Connected
        ) {
            return Err(SessionError::Cancelled("start"));
        }
        let (Some(peer), Some(consumer)) = (core.peer.clone(), core.trickle_rx.take()) else {
            return Err(SessionError::Cancelled("start"));
        };

        tokio::spawn(consumer.run(s.id.clone(), peer.clone(), s.cancel.clone()));

        if peer.connection_state() == PeerState::Connected {
            self.mark_connected(&mut core, "transport already connected")
                .await;
        }

        info!("Subscriber {} started", s.id);
        Ok(())
    }

    /// Создает транспорт под offer и готовит answer. Вызывается под lock сессии,
    /// транспорт сохраняется в `core` сразу, чтобы его закрыл `fail`.
    async fn negotiate(
        &self,
        core: &mut SessionCore,
        offer: String,
        options: &JoinOptions,
    ) -> SessionResult<String> {
        let s = &self.shared;

        let codecs = CodecSet::from_offer(&offer);
        if codecs.is_default() {
            info!("Using default codec set for {}", s.id);
        }

        let peer = s
            .factory
            .create(
                &s.id,
                &core.options.transport,
                &codecs,
                s.transport_tx.clone(),
            )
            .await
            .map_err(|e| SessionError::transport("create_peer", e))?;
        core.peer = Some(peer.clone());

        peer.set_remote_description(offer)
            .await
            .map_err(|e| SessionError::transport("set_remote_description", e))?;

        for kind in options.media_kinds() {
            let transceiver = peer
                .add_transceiver(kind, TransceiverDirection::RecvOnly)
                .await
                .map_err(|e| SessionError::transport(add_transceiver_op(kind), e))?;
            core.transceivers.push(transceiver);
        }

        let answer = peer
            .create_answer()
            .await
            .map_err(|e| SessionError::transport("create_answer", e))?;
        if answer.trim().is_empty() {
            return Err(SessionError::Negotiation(
                "transport produced an empty answer".to_owned(),
            ));
        }

        peer.set_local_description(answer.clone())
            .await
            .map_err(|e| SessionError::transport("set_local_description", e))?;

        info!("Answer for {}: {} bytes", s.id, answer.len());
        Ok(answer)
    }

    /// Переводит сессию в `Failed` (если она еще не завершена), отменяет ее
    /// и закрывает транспорт. После этого цикл событий завершается.
    pub(crate) async fn fail(&self, err: SessionError) -> SessionError {
        let s = &self.shared;

        let peer = {
            let mut core = s.core.lock().await;
            if !core.state.is_terminal() {
                core.transition(&s.id, SessionState::Failed);
            }
            core.trickle_rx = None;
            core.peer.take()
        };
        s.cancel.cancel();

        match &err {
            SessionError::Cancelled(op) => info!("Subscriber {} cancelled during {}", s.id, op),
            _ => error!("Subscriber {} failed to start: {}", s.id, err),
        }

        if let Some(peer) = peer {
            self.close_peer(peer).await;
        }
        err
    }
}

fn remote_offer(response: JoinResponse) -> SessionResult<String> {
    let Some(jsep) = response.jsep else {
        return Err(SessionError::Negotiation(
            "join response carries no SDP offer".to_owned(),
        ));
    };
    if jsep.sdp_type != SdpType::Offer {
        return Err(SessionError::Negotiation(format!(
            "join response carries {:?} instead of an offer",
            jsep.sdp_type
        )));
    }
    if !jsep.sdp.trim_start().starts_with("v=") {
        return Err(SessionError::Negotiation(
            "join response offer is not an SDP document".to_owned(),
        ));
    }
    Ok(jsep.sdp)
}

fn add_transceiver_op(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Audio => "add_transceiver(audio)",
        MediaKind::Video => "add_transceiver(video)",
    }
}

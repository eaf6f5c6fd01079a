use std::sync::Arc;
use tracing::{debug, error, info};
use videoroom_core::SessionState;

use crate::bridge::forward_local_candidate;
use crate::drain::{spawn_feedback_drain, spawn_track_drain};
use crate::session::options::TrackContext;
use crate::session::subscriber::Subscriber;
use crate::transport::{FeedbackSource, PeerState, RemoteTrack, TransportEvent};

impl Subscriber {
    pub(crate) async fn handle_transport_event(&self, event: TransportEvent) {
        match event {
            TransportEvent::LocalCandidate(trickle) => {
                let s = &self.shared;
                if s.cancel.is_cancelled() {
                    return;
                }
                forward_local_candidate(s.signaling.as_ref(), &s.id, trickle).await;
            }

            TransportEvent::ConnectionState(state) => self.on_connection_state(state).await,

            TransportEvent::InboundTrack { track, receiver } => {
                self.on_inbound_track(track, receiver).await
            }
        }
    }

    async fn on_connection_state(&self, state: PeerState) {
        let s = &self.shared;
        match state {
            PeerState::Connected => {
                let mut core = s.core.lock().await;
                if core.peer.is_some() {
                    self.mark_connected(&mut core, "transport connected").await;
                }
            }

            PeerState::Failed => {
                let peer = {
                    let mut core = s.core.lock().await;
                    if core.state.is_terminal() {
                        return;
                    }
                    core.transition(&s.id, SessionState::Failed);
                    core.trickle_rx = None;
                    core.peer.take()
                };

                error!("Transport for {} failed", s.id);
                s.cancel.cancel();
                if let Some(peer) = peer {
                    self.close_peer(peer).await;
                }
            }

            other => debug!("Transport state for {}: {}", s.id, other),
        }
    }

    async fn on_inbound_track(
        &self,
        track: Arc<dyn RemoteTrack>,
        receiver: Arc<dyn FeedbackSource>,
    ) {
        let s = &self.shared;
        let kind = track.kind();

        let (handler, peer) = {
            let core = s.core.lock().await;
            if core.state.is_terminal() {
                debug!("Ignoring {} track for closed session {}", kind, s.id);
                return;
            }
            (core.options.track_handler(kind), core.peer.clone())
        };

        info!(
            "onTrack {} {} SSRC {} PT {}",
            s.id,
            kind,
            track.ssrc(),
            track.payload_type()
        );

        spawn_feedback_drain(
            format!("{} {} receiver", s.id, kind),
            receiver.clone(),
            s.cancel.clone(),
            s.stats.clone(),
        );

        match (handler, peer) {
            (Some(handler), Some(peer)) => {
                let ctx = TrackContext {
                    session_id: s.id.clone(),
                    cancel: s.cancel.clone(),
                    peer,
                    track,
                    receiver,
                };
                tokio::spawn(async move { handler.on_track(ctx).await });
            }
            _ => {
                spawn_track_drain(
                    format!("{} {} track", s.id, kind),
                    track,
                    s.cancel.clone(),
                    s.stats.clone(),
                );
            }
        }
    }
}

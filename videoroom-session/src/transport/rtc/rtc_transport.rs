use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use videoroom_core::{IceCandidate, IceServerConfig, MediaKind, SessionId, Trickle};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::setting_engine::SettingEngine;
use webrtc::ice::udp_network::{EphemeralUDP, UDPNetwork};
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;
use webrtc::rtp_transceiver::{RTCRtpTransceiver, RTCRtpTransceiverInit};
use webrtc::track::track_remote::TrackRemote;

use crate::transport::capabilities::CodecSet;
use crate::transport::rtc::media_engine::{codec_type, media_engine_for};
use crate::transport::rtc::rtc_media::{RtcReceiverFeedback, RtcRemoteTrack, RtcTransceiver};
use crate::transport::transport_config::TransportConfig;
use crate::transport::transport_event::TransportEvent;
use crate::transport::transport_peer::{
    CandidateSink, PeerState, Transceiver, TransceiverDirection, TransportPeer,
};

pub struct RtcTransport {
    pub id: SessionId,
    pub peer_connection: Arc<RTCPeerConnection>,
}

impl RtcTransport {
    /// Инициализация нового WebRTC соединения.
    /// event_tx — канал, в который транспорт будет "выплевывать" события для цикла сессии.
    pub async fn new(
        id: SessionId,
        config: &TransportConfig,
        codecs: &CodecSet,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Self> {
        // 1. MediaEngine: кодеки из offer сервера (или стандартный набор)
        let mut m = media_engine_for(codecs)?;
        // 2. Интерцепторы (NACK, RTCP отчеты)
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        // 3. Диапазон UDP портов для ICE
        let mut setting = SettingEngine::default();
        if let Some(range) = config.port_range {
            let ephemeral = EphemeralUDP::new(range.min, range.max)
                .context("Invalid ephemeral UDP port range")?;
            setting.set_udp_network(UDPNetwork::Ephemeral(ephemeral));
        }

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .with_setting_engine(setting)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config.ice_servers.iter().map(rtc_ice_server).collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        // A. Состояние соединения
        let state_tx = event_tx.clone();
        let id_state = id.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                let id = id_state.clone();

                Box::pin(async move {
                    info!("PeerConnectionState for {}: {}", id, s);
                    let _ = tx.send(TransportEvent::ConnectionState(peer_state(s))).await;
                })
            },
        ));

        let id_ice_state = id.clone();
        peer_connection.on_ice_connection_state_change(Box::new(
            move |s: RTCIceConnectionState| {
                info!("ICEConnectionState for {}: {}", id_ice_state, s);
                Box::pin(async {})
            },
        ));

        // B. Trickle ICE: локальные кандидаты уходят на сервер через сессию
        let ice_tx = event_tx.clone();
        let id_ice = id.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            let id = id_ice.clone();

            Box::pin(async move {
                let trickle = match c {
                    Some(candidate) => match candidate.to_json() {
                        Ok(init) => Trickle::Candidate(IceCandidate {
                            candidate: init.candidate,
                            sdp_mid: init.sdp_mid,
                            sdp_m_line_index: init.sdp_mline_index,
                        }),
                        Err(e) => {
                            warn!("Failed to serialize local candidate for {}: {}", id, e);
                            return;
                        }
                    },
                    None => Trickle::Completed,
                };
                let _ = tx.send(TransportEvent::LocalCandidate(trickle)).await;
            })
        }));

        // C. Входящие треки. Только пересылаем, читать будет сессия в своей задаче.
        let track_tx = event_tx.clone();
        let id_track = id.clone();
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let tx = track_tx.clone();
                let id = id_track.clone();

                Box::pin(async move {
                    let Some(kind) = media_kind(track.kind()) else {
                        warn!("Ignoring track of unspecified kind for {}", id);
                        return;
                    };
                    debug!("Remote {} track arrived for {}", kind, id);
                    let event = TransportEvent::InboundTrack {
                        track: Arc::new(RtcRemoteTrack::new(kind, track)),
                        receiver: Arc::new(RtcReceiverFeedback::new(receiver)),
                    };
                    let _ = tx.send(event).await;
                })
            },
        ));

        Ok(Self {
            id,
            peer_connection,
        })
    }
}

#[async_trait]
impl CandidateSink for RtcTransport {
    /// Добавить удаленного ICE-кандидата (Trickle ICE)
    async fn add_ice_candidate(&self, trickle: Trickle) -> Result<()> {
        let init = match trickle {
            Trickle::Candidate(c) => RTCIceCandidateInit {
                candidate: c.candidate,
                sdp_mid: c.sdp_mid,
                sdp_mline_index: c.sdp_m_line_index,
                ..Default::default()
            },
            // пустой кандидат = end-of-candidates
            Trickle::Completed => RTCIceCandidateInit::default(),
        };
        self.peer_connection.add_ice_candidate(init).await?;
        Ok(())
    }
}

#[async_trait]
impl TransportPeer for RtcTransport {
    /// Применить удаленный SDP Offer (полученный от сервера)
    async fn set_remote_description(&self, offer_sdp: String) -> Result<()> {
        let desc = RTCSessionDescription::offer(offer_sdp)?;
        self.peer_connection.set_remote_description(desc).await?;
        Ok(())
    }

    async fn add_transceiver(
        &self,
        kind: MediaKind,
        direction: TransceiverDirection,
    ) -> Result<Arc<dyn Transceiver>> {
        let init = RTCRtpTransceiverInit {
            direction: rtc_direction(direction),
            send_encodings: vec![],
        };
        let transceiver = self
            .peer_connection
            .add_transceiver_from_kind(codec_type(kind), Some(init))
            .await?;
        Ok(Arc::new(RtcTransceiver::new(kind, direction, transceiver)))
    }

    async fn create_answer(&self) -> Result<String> {
        let answer = self.peer_connection.create_answer(None).await?;
        Ok(answer.sdp)
    }

    async fn set_local_description(&self, answer_sdp: String) -> Result<()> {
        let desc = RTCSessionDescription::answer(answer_sdp)?;
        self.peer_connection.set_local_description(desc).await?;
        Ok(())
    }

    fn connection_state(&self) -> PeerState {
        peer_state(self.peer_connection.connection_state())
    }

    /// Закрыть WebRTC соединение
    async fn close(&self) -> Result<()> {
        self.peer_connection.close().await?;
        Ok(())
    }
}

fn rtc_ice_server(server: &IceServerConfig) -> RTCIceServer {
    RTCIceServer {
        urls: server.urls.clone(),
        username: server.username.clone().unwrap_or_default(),
        credential: server.credential.clone().unwrap_or_default(),
        ..Default::default()
    }
}

fn rtc_direction(direction: TransceiverDirection) -> RTCRtpTransceiverDirection {
    match direction {
        TransceiverDirection::SendRecv => RTCRtpTransceiverDirection::Sendrecv,
        TransceiverDirection::SendOnly => RTCRtpTransceiverDirection::Sendonly,
        TransceiverDirection::RecvOnly => RTCRtpTransceiverDirection::Recvonly,
        TransceiverDirection::Inactive => RTCRtpTransceiverDirection::Inactive,
    }
}

fn media_kind(kind: RTPCodecType) -> Option<MediaKind> {
    match kind {
        RTPCodecType::Audio => Some(MediaKind::Audio),
        RTPCodecType::Video => Some(MediaKind::Video),
        _ => None,
    }
}

fn peer_state(state: RTCPeerConnectionState) -> PeerState {
    match state {
        RTCPeerConnectionState::Connecting => PeerState::Connecting,
        RTCPeerConnectionState::Connected => PeerState::Connected,
        RTCPeerConnectionState::Disconnected => PeerState::Disconnected,
        RTCPeerConnectionState::Failed => PeerState::Failed,
        RTCPeerConnectionState::Closed => PeerState::Closed,
        _ => PeerState::New,
    }
}

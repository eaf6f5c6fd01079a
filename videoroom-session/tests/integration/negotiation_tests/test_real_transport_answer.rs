use std::sync::Arc;
use tokio::sync::mpsc;
use videoroom_core::{JoinOptions, SessionId, SessionState};
use videoroom_session::{RtcTransportFactory, Subscriber, SubscriberOption, TransportConfig};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::rtp_transceiver::RTCRtpTransceiverInit;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;

use crate::integration::init_tracing;
use crate::utils::{JoinBehavior, MockSignaling};

/// A webrtc-rs peer playing the server side: sends one audio and one video track.
async fn offering_peer() -> (Arc<RTCPeerConnection>, String) {
    let mut m = MediaEngine::default();
    m.register_default_codecs()
        .expect("Failed to register codecs");
    let registry = register_default_interceptors(Registry::new(), &mut m)
        .expect("Failed to register interceptors");
    let api = APIBuilder::new()
        .with_media_engine(m)
        .with_interceptor_registry(registry)
        .build();

    let pc = Arc::new(
        api.new_peer_connection(RTCConfiguration::default())
            .await
            .expect("Failed to create offering peer"),
    );

    for kind in [RTPCodecType::Audio, RTPCodecType::Video] {
        pc.add_transceiver_from_kind(
            kind,
            Some(RTCRtpTransceiverInit {
                direction: RTCRtpTransceiverDirection::Sendonly,
                send_encodings: vec![],
            }),
        )
        .await
        .expect("Failed to add transceiver");
    }

    let offer = pc.create_offer(None).await.expect("Failed to create offer");
    pc.set_local_description(offer.clone())
        .await
        .expect("Failed to set local offer");

    (pc, offer.sdp)
}

#[tokio::test]
async fn test_real_transport_answers_both_sections() {
    init_tracing();

    let (offerer, offer_sdp) = offering_peer().await;

    let signaling = MockSignaling::new(JoinBehavior::Offer(offer_sdp));
    let (_signal_tx, signal_rx) = mpsc::channel(8);
    let subscriber = Subscriber::new(
        SessionId::new("1234", "7"),
        signaling.clone(),
        signal_rx,
        Arc::new(RtcTransportFactory),
    );
    subscriber
        .set_option(SubscriberOption::Transport(TransportConfig::local()))
        .await
        .expect("Failed to set transport option");

    subscriber
        .start(JoinOptions::default())
        .await
        .expect("start against a real transport failed");

    assert_eq!(subscriber.state().await, SessionState::Negotiating);

    let answer = signaling
        .last_answer()
        .await
        .expect("start carried no answer");
    assert!(answer.sdp.starts_with("v=0"));
    assert_eq!(answer.sdp.matches("\nm=").count(), 2);
    assert!(answer.sdp.contains("m=audio"));
    assert!(answer.sdp.contains("m=video"));

    subscriber.leave().await.expect("leave failed");
    assert_eq!(subscriber.state().await, SessionState::Closed);

    offerer.close().await.expect("Failed to close offering peer");
}

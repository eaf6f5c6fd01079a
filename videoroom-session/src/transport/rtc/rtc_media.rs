use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use videoroom_core::MediaKind;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::rtp_transceiver::rtp_sender::RTCRtpSender;
use webrtc::track::track_remote::TrackRemote;

use crate::transport::transport_peer::{
    FeedbackSource, MediaPacket, RemoteTrack, Transceiver, TransceiverDirection,
};

pub struct RtcTransceiver {
    kind: MediaKind,
    direction: TransceiverDirection,
    inner: Arc<RTCRtpTransceiver>,
}

impl RtcTransceiver {
    pub fn new(
        kind: MediaKind,
        direction: TransceiverDirection,
        inner: Arc<RTCRtpTransceiver>,
    ) -> Self {
        Self {
            kind,
            direction,
            inner,
        }
    }
}

#[async_trait]
impl Transceiver for RtcTransceiver {
    fn kind(&self) -> MediaKind {
        self.kind
    }

    fn direction(&self) -> TransceiverDirection {
        self.direction
    }

    async fn feedback(&self) -> Option<Arc<dyn FeedbackSource>> {
        let sender = self.inner.sender().await;
        Some(Arc::new(RtcSenderFeedback::new(sender)))
    }
}

/// RTCP отчеты (RR) на стороне RTCRtpSender.
pub struct RtcSenderFeedback {
    sender: Arc<RTCRtpSender>,
}

impl RtcSenderFeedback {
    pub fn new(sender: Arc<RTCRtpSender>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl FeedbackSource for RtcSenderFeedback {
    async fn read_feedback(&self) -> Result<usize> {
        let (packets, _) = self.sender.read_rtcp().await?;
        Ok(packets.len())
    }
}

pub struct RtcReceiverFeedback {
    receiver: Arc<RTCRtpReceiver>,
}

impl RtcReceiverFeedback {
    pub fn new(receiver: Arc<RTCRtpReceiver>) -> Self {
        Self { receiver }
    }
}

#[async_trait]
impl FeedbackSource for RtcReceiverFeedback {
    async fn read_feedback(&self) -> Result<usize> {
        let (packets, _) = self.receiver.read_rtcp().await?;
        Ok(packets.len())
    }
}

pub struct RtcRemoteTrack {
    kind: MediaKind,
    track: Arc<TrackRemote>,
}

impl RtcRemoteTrack {
    pub fn new(kind: MediaKind, track: Arc<TrackRemote>) -> Self {
        Self { kind, track }
    }

    pub fn inner(&self) -> &Arc<TrackRemote> {
        &self.track
    }
}

#[async_trait]
impl RemoteTrack for RtcRemoteTrack {
    fn kind(&self) -> MediaKind {
        self.kind
    }

    fn ssrc(&self) -> u32 {
        self.track.ssrc()
    }

    fn payload_type(&self) -> u8 {
        self.track.payload_type()
    }

    async fn read_packet(&self) -> Result<MediaPacket> {
        let (packet, _) = self.track.read_rtp().await?;
        Ok(MediaPacket {
            ssrc: packet.header.ssrc,
            sequence_number: packet.header.sequence_number,
            timestamp: packet.header.timestamp,
            payload: packet.payload,
        })
    }
}

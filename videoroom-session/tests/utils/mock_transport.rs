use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{Mutex, mpsc};
use videoroom_core::{MediaKind, SessionId, Trickle};
use videoroom_session::{
    CandidateSink, CodecSet, FeedbackSource, MediaPacket, PeerState, RemoteTrack, Transceiver,
    TransceiverDirection, TransportConfig, TransportEvent, TransportFactory, TransportPeer,
};

use crate::utils::MOCK_ANSWER;

/// Feedback source that never yields a report; only cancellation ends its drain.
pub struct SilentFeedback;

#[async_trait]
impl FeedbackSource for SilentFeedback {
    async fn read_feedback(&self) -> Result<usize> {
        std::future::pending().await
    }
}

pub struct MockTransceiver {
    kind: MediaKind,
    direction: TransceiverDirection,
}

#[async_trait]
impl Transceiver for MockTransceiver {
    fn kind(&self) -> MediaKind {
        self.kind
    }

    fn direction(&self) -> TransceiverDirection {
        self.direction
    }

    async fn feedback(&self) -> Option<Arc<dyn FeedbackSource>> {
        Some(Arc::new(SilentFeedback))
    }
}

/// Inbound track that stays silent until the session tears it down.
pub struct MockTrack {
    pub kind: MediaKind,
    pub ssrc: u32,
}

#[async_trait]
impl RemoteTrack for MockTrack {
    fn kind(&self) -> MediaKind {
        self.kind
    }

    fn ssrc(&self) -> u32 {
        self.ssrc
    }

    fn payload_type(&self) -> u8 {
        match self.kind {
            MediaKind::Audio => 111,
            MediaKind::Video => 96,
        }
    }

    async fn read_packet(&self) -> Result<MediaPacket> {
        std::future::pending().await
    }
}

/// Mock TransportPeer that records operations and applied candidates.
pub struct MockPeer {
    events: mpsc::Sender<TransportEvent>,
    reject_candidate: Option<String>,
    state: StdMutex<PeerState>,
    ops: Mutex<Vec<String>>,
    applied: Mutex<Vec<Trickle>>,
    closes: AtomicUsize,
}

impl MockPeer {
    /// Inject an event as if the transport produced it.
    pub async fn emit(&self, event: TransportEvent) {
        if let TransportEvent::ConnectionState(state) = &event {
            if let Ok(mut current) = self.state.lock() {
                *current = *state;
            }
        }
        self.events
            .send(event)
            .await
            .expect("session event loop is gone");
    }

    pub async fn ops(&self) -> Vec<String> {
        self.ops.lock().await.clone()
    }

    pub async fn applied(&self) -> Vec<Trickle> {
        self.applied.lock().await.clone()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    async fn record(&self, op: impl Into<String>) {
        self.ops.lock().await.push(op.into());
    }
}

#[async_trait]
impl CandidateSink for MockPeer {
    async fn add_ice_candidate(&self, trickle: Trickle) -> Result<()> {
        if let (Some(bad), Trickle::Candidate(c)) = (&self.reject_candidate, &trickle) {
            if &c.candidate == bad {
                bail!("malformed candidate: {}", c.candidate);
            }
        }
        self.applied.lock().await.push(trickle);
        Ok(())
    }
}

#[async_trait]
impl TransportPeer for MockPeer {
    async fn set_remote_description(&self, offer_sdp: String) -> Result<()> {
        self.record(format!("set_remote_description({})", offer_sdp.len()))
            .await;
        Ok(())
    }

    async fn add_transceiver(
        &self,
        kind: MediaKind,
        direction: TransceiverDirection,
    ) -> Result<Arc<dyn Transceiver>> {
        self.record(format!("add_transceiver({})", kind)).await;
        Ok(Arc::new(MockTransceiver { kind, direction }))
    }

    async fn create_answer(&self) -> Result<String> {
        self.record("create_answer").await;
        Ok(MOCK_ANSWER.to_owned())
    }

    async fn set_local_description(&self, answer_sdp: String) -> Result<()> {
        self.record(format!("set_local_description({})", answer_sdp.len()))
            .await;
        Ok(())
    }

    fn connection_state(&self) -> PeerState {
        self.state.lock().map(|s| *s).unwrap_or(PeerState::Failed)
    }

    async fn close(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut state) = self.state.lock() {
            *state = PeerState::Closed;
        }
        Ok(())
    }
}

/// Mock TransportFactory that keeps every peer it creates.
#[derive(Default)]
pub struct MockTransportFactory {
    reject_candidate: Option<String>,
    fail_create: bool,
    peers: Mutex<Vec<Arc<MockPeer>>>,
    configs: Mutex<Vec<TransportConfig>>,
}

impl MockTransportFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Peers from this factory fail to apply the candidate with this text.
    pub fn rejecting_candidate(candidate: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reject_candidate: Some(candidate.into()),
            ..Self::default()
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail_create: true,
            ..Self::default()
        })
    }

    pub async fn created(&self) -> usize {
        self.peers.lock().await.len()
    }

    pub async fn peer(&self) -> Arc<MockPeer> {
        self.peers
            .lock()
            .await
            .last()
            .cloned()
            .expect("no transport was created")
    }

    pub async fn last_config(&self) -> Option<TransportConfig> {
        self.configs.lock().await.last().cloned()
    }
}

#[async_trait]
impl TransportFactory for MockTransportFactory {
    async fn create(
        &self,
        _id: &SessionId,
        config: &TransportConfig,
        _codecs: &CodecSet,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn TransportPeer>> {
        if self.fail_create {
            return Err(anyhow!("no free UDP ports"));
        }

        let peer = Arc::new(MockPeer {
            events,
            reject_candidate: self.reject_candidate.clone(),
            state: StdMutex::new(PeerState::New),
            ops: Mutex::new(Vec::new()),
            applied: Mutex::new(Vec::new()),
            closes: AtomicUsize::new(0),
        });
        self.peers.lock().await.push(peer.clone());
        self.configs.lock().await.push(config.clone());
        Ok(peer as Arc<dyn TransportPeer>)
    }
}

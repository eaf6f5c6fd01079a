use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use videoroom_core::SessionId;

use crate::transport::capabilities::CodecSet;
use crate::transport::rtc::rtc_transport::RtcTransport;
use crate::transport::transport_config::TransportConfig;
use crate::transport::transport_event::TransportEvent;
use crate::transport::transport_peer::{TransportFactory, TransportPeer};

/// Фабрика настоящих WebRTC соединений (webrtc-rs).
#[derive(Debug, Clone, Default)]
pub struct RtcTransportFactory;

#[async_trait]
impl TransportFactory for RtcTransportFactory {
    async fn create(
        &self,
        id: &SessionId,
        config: &TransportConfig,
        codecs: &CodecSet,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn TransportPeer>> {
        let transport = RtcTransport::new(id.clone(), config, codecs, events).await?;
        Ok(Arc::new(transport))
    }
}

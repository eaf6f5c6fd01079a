use async_trait::async_trait;
use std::sync::Arc;
use videoroom_core::{MediaKind, SessionId};

use crate::cancel::CancelToken;
use crate::transport::{FeedbackSource, RemoteTrack, TransportConfig, TransportPeer};

/// Все, что получает пользовательский обработчик входящего трека.
#[derive(Clone)]
pub struct TrackContext {
    pub session_id: SessionId,
    /// Отменяется при Leave / hangup. Обработчик должен на него смотреть.
    pub cancel: CancelToken,
    pub peer: Arc<dyn TransportPeer>,
    pub track: Arc<dyn RemoteTrack>,
    pub receiver: Arc<dyn FeedbackSource>,
}

/// Пользовательская обработка входящего аудио или видео трека.
///
/// Если обработчик для вида медиа не задан, сессия сама вычитывает трек,
/// чтобы транспорт не встал.
#[async_trait]
pub trait TrackHandler: Send + Sync + 'static {
    async fn on_track(&self, ctx: TrackContext);
}

pub enum SubscriberOption {
    AudioTrack(Arc<dyn TrackHandler>),
    VideoTrack(Arc<dyn TrackHandler>),
    Transport(TransportConfig),
}

#[derive(Clone, Default)]
pub(crate) struct SessionOptions {
    pub(crate) audio_track: Option<Arc<dyn TrackHandler>>,
    pub(crate) video_track: Option<Arc<dyn TrackHandler>>,
    pub(crate) transport: TransportConfig,
}

impl SessionOptions {
    pub(crate) fn apply(&mut self, option: SubscriberOption) {
        match option {
            SubscriberOption::AudioTrack(handler) => self.audio_track = Some(handler),
            SubscriberOption::VideoTrack(handler) => self.video_track = Some(handler),
            SubscriberOption::Transport(config) => self.transport = config,
        }
    }

    pub(crate) fn track_handler(&self, kind: MediaKind) -> Option<Arc<dyn TrackHandler>> {
        match kind {
            MediaKind::Audio => self.audio_track.clone(),
            MediaKind::Video => self.video_track.clone(),
        }
    }
}

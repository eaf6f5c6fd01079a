use anyhow::Result;
use async_trait::async_trait;
use videoroom_core::{JoinOptions, JoinResponse, Jsep, SessionId, Trickle};

/// Трейт, который должна реализовать внешняя система (клиент сигнального сервера),
/// чтобы сессия могла отправлять ему команды.
///
/// Асинхронные события (`trickle`, `hangup`, `webrtc-up`) идут в обратную сторону
/// через канал `SignalEvent`, который передается в `Subscriber::new`.
#[async_trait]
pub trait SignalingChannel: Send + Sync {
    /// Подписаться на фид. Ответ должен содержать SDP Offer.
    async fn join(&self, id: &SessionId, options: &JoinOptions) -> Result<JoinResponse>;

    /// Отправить локальный SDP Answer и запустить поток.
    async fn start(&self, answer: Jsep, media_enabled: bool) -> Result<()>;

    /// Покинуть фид.
    async fn leave(&self) -> Result<()>;

    /// Переслать локального ICE кандидата (или признак окончания сбора).
    async fn trickle(&self, trickle: Trickle) -> Result<()>;
}

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use videoroom_core::{SessionId, Trickle};

use crate::cancel::CancelToken;
use crate::error::{SessionError, TrickleError};
use crate::signaling::SignalingChannel;
use crate::transport::CandidateSink;

/// Кандидаты приходят равномерно, а не пачками, так что глубины 8 хватает.
pub const TRICKLE_QUEUE_DEPTH: usize = 8;

/// Ограниченная упорядоченная очередь удаленных кандидатов.
///
/// Производитель (сигнальный канал) может писать до того, как появится транспорт;
/// потребитель запускается после отправки answer. При переполнении `push` ждет.
pub fn trickle_bridge(depth: usize) -> (TrickleProducer, TrickleConsumer) {
    let (tx, rx) = mpsc::channel(depth);
    (TrickleProducer { tx }, TrickleConsumer { rx })
}

#[derive(Clone, Debug)]
pub struct TrickleProducer {
    tx: mpsc::Sender<Trickle>,
}

impl TrickleProducer {
    /// Поставить кандидата в очередь. Никогда не отбрасывает молча:
    /// либо кандидат принят, либо возвращается ошибка.
    pub async fn push(&self, trickle: Trickle, cancel: &CancelToken) -> Result<(), TrickleError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TrickleError::Cancelled),
            sent = self.tx.send(trickle) => sent.map_err(|_| TrickleError::Closed),
        }
    }
}

#[derive(Debug)]
pub struct TrickleConsumer {
    rx: mpsc::Receiver<Trickle>,
}

impl TrickleConsumer {
    pub async fn next(&mut self) -> Option<Trickle> {
        self.rx.recv().await
    }

    /// Применяет кандидатов в порядке поступления, пока не сработает отмена.
    /// Ошибка одного кандидата логируется и не прерывает цикл.
    /// Возвращает число успешно примененных кандидатов.
    pub async fn run<S>(mut self, id: SessionId, sink: Arc<S>, cancel: CancelToken) -> usize
    where
        S: CandidateSink + ?Sized + 'static,
    {
        debug!("Remote candidate consumer started for {}", id);
        let mut applied = 0;

        loop {
            let trickle = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                next = self.rx.recv() => match next {
                    Some(t) => t,
                    None => break,
                },
            };

            match sink.add_ice_candidate(trickle).await {
                Ok(()) => applied += 1,
                Err(e) => {
                    let err = SessionError::Candidate { cause: e };
                    warn!("{}: {}", id, err);
                }
            }
        }

        debug!(
            "Remote candidate consumer for {} exited after {} candidates",
            id, applied
        );
        applied
    }
}

/// Переслать локального кандидата серверу командой `trickle`.
pub async fn forward_local_candidate(
    signaling: &dyn SignalingChannel,
    id: &SessionId,
    trickle: Trickle,
) {
    if trickle.is_completed() {
        debug!("Local ICE gathering complete for {}, sending trickle completed", id);
    } else {
        debug!("Forwarding local candidate for {}", id);
    }

    if let Err(e) = signaling.trickle(trickle).await {
        warn!("{}: {}", id, SessionError::signaling("trickle", e));
    }
}

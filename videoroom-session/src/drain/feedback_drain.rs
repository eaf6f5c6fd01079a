use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::cancel::CancelToken;
use crate::error::SessionError;
use crate::transport::{FeedbackSource, RemoteTrack};

/// Счетчики drain-циклов одной сессии.
#[derive(Debug, Default)]
pub struct FeedbackStats {
    active_feedback: AtomicUsize,
    active_tracks: AtomicUsize,
    reports: AtomicU64,
    rtcp_packets: AtomicU64,
    media_packets: AtomicU64,
}

impl FeedbackStats {
    /// Сколько RTCP drain-циклов сейчас работает.
    pub fn active_feedback_drains(&self) -> usize {
        self.active_feedback.load(Ordering::SeqCst)
    }

    /// Сколько треков сейчас вычитывается "вхолостую".
    pub fn active_track_drains(&self) -> usize {
        self.active_tracks.load(Ordering::SeqCst)
    }

    pub fn reports(&self) -> u64 {
        self.reports.load(Ordering::Relaxed)
    }

    pub fn rtcp_packets(&self) -> u64 {
        self.rtcp_packets.load(Ordering::Relaxed)
    }

    pub fn media_packets(&self) -> u64 {
        self.media_packets.load(Ordering::Relaxed)
    }
}

struct ActiveGuard<'a>(&'a AtomicUsize);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Запускает цикл чтения RTCP. Выходит по отмене или по ошибке чтения
/// (обычно канал закрыт при завершении), ошибку наружу не отдает.
pub fn spawn_feedback_drain(
    label: String,
    source: Arc<dyn FeedbackSource>,
    cancel: CancelToken,
    stats: Arc<FeedbackStats>,
) -> JoinHandle<()> {
    // counted before spawn so the caller sees it immediately
    stats.active_feedback.fetch_add(1, Ordering::SeqCst);

    tokio::spawn(async move {
        let _active = ActiveGuard(&stats.active_feedback);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("{} feedback drain cancelled", label);
                    break;
                }
                read = source.read_feedback() => match read {
                    Ok(packets) => {
                        stats.reports.fetch_add(1, Ordering::Relaxed);
                        stats.rtcp_packets.fetch_add(packets as u64, Ordering::Relaxed);
                    }
                    Err(e) => {
                        let err = SessionError::FeedbackRead { cause: e };
                        debug!("{} feedback drain stopped: {}", label, err);
                        break;
                    }
                },
            }
        }
    })
}

/// Вычитывает и выбрасывает RTP трека, для которого нет пользовательского обработчика.
pub fn spawn_track_drain(
    label: String,
    track: Arc<dyn RemoteTrack>,
    cancel: CancelToken,
    stats: Arc<FeedbackStats>,
) -> JoinHandle<()> {
    stats.active_tracks.fetch_add(1, Ordering::SeqCst);

    tokio::spawn(async move {
        let _active = ActiveGuard(&stats.active_tracks);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                read = track.read_packet() => match read {
                    Ok(_) => {
                        stats.media_packets.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => {
                        debug!("{} track ended: {:#}", label, e);
                        break;
                    }
                },
            }
        }
    })
}

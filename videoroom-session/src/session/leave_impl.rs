use tracing::{info, warn};
use videoroom_core::SessionState;

use crate::error::{SessionError, SessionResult};
use crate::session::subscriber::Subscriber;

impl Subscriber {
    /// Завершить сессию: закрыть транспорт, остановить фоновые циклы и,
    /// если `join` уже отправлялся, сообщить серверу командой `leave`.
    ///
    /// Повторный вызов ничего не делает.
    pub async fn leave(&self) -> SessionResult<()> {
        let s = &self.shared;

        let (peer, joined) = {
            let mut core = s.core.lock().await;
            if core.left {
                return Ok(());
            }
            core.left = true;
            core.trickle_rx = None;
            if core.state != SessionState::Closed {
                core.transition(&s.id, SessionState::Closed);
            }
            (core.peer.take(), core.joined)
        };

        s.cancel.cancel();
        if let Some(peer) = peer {
            self.close_peer(peer).await;
        }

        if !joined {
            info!("Subscriber {} left before join", s.id);
            return Ok(());
        }

        if let Err(e) = s.signaling.leave().await {
            let err = SessionError::signaling("leave", e);
            warn!("{}: {}", s.id, err);
            return Err(err);
        }

        info!("Subscriber {} left", s.id);
        Ok(())
    }
}

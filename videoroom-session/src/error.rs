use thiserror::Error;
use videoroom_core::SessionState;

/// Ошибки сессии. `op` называет подоперацию, на которой всё сломалось.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("signaling {op} failed: {cause:#}")]
    Signaling {
        op: &'static str,
        cause: anyhow::Error,
    },

    #[error("negotiation failed: {0}")]
    Negotiation(String),

    #[error("transport {op} failed: {cause:#}")]
    Transport {
        op: &'static str,
        cause: anyhow::Error,
    },

    /// Не удалось применить один удаленный кандидат. Только логируется.
    #[error("failed to apply remote candidate: {cause:#}")]
    Candidate { cause: anyhow::Error },

    /// Чтение RTCP в drain-цикле. Только логируется.
    #[error("feedback read failed: {cause:#}")]
    FeedbackRead { cause: anyhow::Error },

    #[error("{op} is not allowed in state {state}")]
    InvalidState {
        op: &'static str,
        state: SessionState,
    },

    #[error("session cancelled during {0}")]
    Cancelled(&'static str),
}

impl SessionError {
    pub(crate) fn signaling(op: &'static str, cause: anyhow::Error) -> Self {
        Self::Signaling { op, cause }
    }

    pub(crate) fn transport(op: &'static str, cause: anyhow::Error) -> Self {
        Self::Transport { op, cause }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrickleError {
    #[error("trickle queue is closed")]
    Closed,

    #[error("trickle push cancelled")]
    Cancelled,
}

pub type SessionResult<T> = Result<T, SessionError>;

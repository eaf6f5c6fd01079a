use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use videoroom_core::{JoinOptions, JoinResponse, Jsep, SessionId, Trickle};
use videoroom_session::SignalingChannel;

use crate::utils::SERVER_OFFER;

/// A command the session sent to the signaling server.
#[derive(Debug, Clone)]
pub enum SignalCall {
    Join { id: SessionId, options: JoinOptions },
    Start { answer: Jsep, media_enabled: bool },
    Leave,
    Trickle(Trickle),
}

/// How the mock server answers `join`.
#[derive(Debug, Clone)]
pub enum JoinBehavior {
    /// Respond with an offer carrying this SDP.
    Offer(String),
    /// Respond without jsep.
    NoOffer,
    /// Fail with this message.
    Fail(String),
    /// Never respond.
    Hang,
}

impl Default for JoinBehavior {
    fn default() -> Self {
        Self::Offer(SERVER_OFFER.to_owned())
    }
}

/// Mock SignalingChannel that records every command.
pub struct MockSignaling {
    join: JoinBehavior,
    fail_start: bool,
    fail_leave: bool,
    calls: Mutex<Vec<SignalCall>>,
}

impl MockSignaling {
    pub fn new(join: JoinBehavior) -> Arc<Self> {
        Arc::new(Self {
            join,
            fail_start: false,
            fail_leave: false,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Server that rejects `start` and `leave`.
    pub fn failing_commands() -> Arc<Self> {
        Arc::new(Self {
            join: JoinBehavior::default(),
            fail_start: true,
            fail_leave: true,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub async fn calls(&self) -> Vec<SignalCall> {
        self.calls.lock().await.clone()
    }

    pub async fn join_count(&self) -> usize {
        self.count(|c| matches!(c, SignalCall::Join { .. })).await
    }

    pub async fn start_count(&self) -> usize {
        self.count(|c| matches!(c, SignalCall::Start { .. })).await
    }

    pub async fn leave_count(&self) -> usize {
        self.count(|c| matches!(c, SignalCall::Leave)).await
    }

    /// The answer sent with the last `start`.
    pub async fn last_answer(&self) -> Option<Jsep> {
        self.calls.lock().await.iter().rev().find_map(|c| match c {
            SignalCall::Start { answer, .. } => Some(answer.clone()),
            _ => None,
        })
    }

    pub async fn trickles(&self) -> Vec<Trickle> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|c| match c {
                SignalCall::Trickle(t) => Some(t.clone()),
                _ => None,
            })
            .collect()
    }

    async fn count(&self, pred: impl Fn(&SignalCall) -> bool) -> usize {
        self.calls.lock().await.iter().filter(|c| pred(c)).count()
    }

    async fn record(&self, call: SignalCall) {
        self.calls.lock().await.push(call);
    }
}

#[async_trait]
impl SignalingChannel for MockSignaling {
    async fn join(&self, id: &SessionId, options: &JoinOptions) -> Result<JoinResponse> {
        self.record(SignalCall::Join {
            id: id.clone(),
            options: options.clone(),
        })
        .await;

        match &self.join {
            JoinBehavior::Offer(sdp) => Ok(JoinResponse::with_offer(sdp.clone())),
            JoinBehavior::NoOffer => Ok(JoinResponse::default()),
            JoinBehavior::Fail(msg) => Err(anyhow!("{}", msg)),
            JoinBehavior::Hang => std::future::pending().await,
        }
    }

    async fn start(&self, answer: Jsep, media_enabled: bool) -> Result<()> {
        self.record(SignalCall::Start {
            answer,
            media_enabled,
        })
        .await;

        if self.fail_start {
            return Err(anyhow!("start rejected"));
        }
        Ok(())
    }

    async fn leave(&self) -> Result<()> {
        self.record(SignalCall::Leave).await;

        if self.fail_leave {
            return Err(anyhow!("leave rejected"));
        }
        Ok(())
    }

    async fn trickle(&self, trickle: Trickle) -> Result<()> {
        self.record(SignalCall::Trickle(trickle)).await;
        Ok(())
    }
}

use dashmap::DashMap;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};
use videoroom_core::SessionId;

use crate::error::SessionError;
use crate::session::Subscriber;

/// Живые подписчики процесса, по одному на `SessionId`.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<SessionId, Subscriber>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Регистрирует подписчика. Если под этим id уже была другая сессия,
    /// она завершается через `leave`. Повторная регистрация той же сессии
    /// (любого ее клона) ничего не завершает.
    pub async fn insert(&self, subscriber: Subscriber) {
        let id = subscriber.id().clone();
        let shared = subscriber.shared.clone();
        let replaced = self.sessions.insert(id.clone(), subscriber);

        if let Some(old) = replaced {
            if Arc::ptr_eq(&old.shared, &shared) {
                return;
            }
            info!("Replacing existing subscriber {}", id);
            if let Err(e) = old.leave().await {
                warn!("Replaced subscriber {} did not leave cleanly: {}", id, e);
            }
        }
    }

    pub fn get(&self, id: &SessionId) -> Option<Subscriber> {
        self.sessions.get(id).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, id: &SessionId) -> Option<Subscriber> {
        self.sessions.remove(id).map(|(_, subscriber)| subscriber)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn ids(&self) -> Vec<SessionId> {
        self.sessions.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Убирает подписчика из реестра и завершает его.
    /// `Ok` и для неизвестного id.
    pub async fn leave(&self, id: &SessionId) -> Result<(), SessionError> {
        match self.remove(id) {
            Some(subscriber) => subscriber.leave().await,
            None => Ok(()),
        }
    }

    /// Завершает все сессии параллельно. Возвращает ошибки тех, кто ушел не чисто.
    pub async fn leave_all(&self) -> Vec<(SessionId, SessionError)> {
        // snapshot first: no shard lock may be held across an await
        let subscribers: Vec<Subscriber> = self
            .sessions
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        self.sessions.clear();

        info!("Leaving {} sessions", subscribers.len());

        let results = join_all(subscribers.iter().map(|s| async move {
            s.leave().await.map_err(|e| (s.id().clone(), e))
        }))
        .await;

        results.into_iter().filter_map(Result::err).collect()
    }
}

use std::{collections::HashMap, sync::Arc, time::Duration};

use teloxide::types::{ChatId, UserId};
use tokio::{sync::Mutex, time::Instant};

use crate::flow::Pending;

pub(crate) const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(15 * 60);

/// A flow belongs to one user in one chat, so two members of a group can
/// record expenses at the same time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct SessionKey {
    pub chat_id: ChatId,
    pub user_id: UserId,
}

impl SessionKey {
    pub(crate) fn new(chat_id: ChatId, user_id: UserId) -> Self {
        Self { chat_id, user_id }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Session {
    pub pending: Option<Pending>,
}

impl Session {
    fn is_idle(&self) -> bool {
        self.pending.is_none()
    }
}

#[derive(Debug)]
struct Slot {
    session: Session,
    touched_at: Instant,
}

/// Sessions with an open flow.
///
/// Idle sessions are dropped right away; sessions untouched for longer than
/// the ttl are evicted on the next access, so abandoned flows do not pile up.
#[derive(Clone, Debug)]
pub(crate) struct SessionStore {
    ttl: Duration,
    inner: Arc<Mutex<HashMap<SessionKey, Slot>>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub(crate) async fn get(&self, key: SessionKey) -> Session {
        let mut guard = self.inner.lock().await;
        self.evict_expired(&mut guard);
        guard
            .get(&key)
            .map(|slot| slot.session.clone())
            .unwrap_or_default()
    }

    pub(crate) async fn update<F>(&self, key: SessionKey, f: F) -> Session
    where
        F: FnOnce(&mut Session),
    {
        let mut guard = self.inner.lock().await;
        self.evict_expired(&mut guard);

        let slot = guard.entry(key).or_insert_with(|| Slot {
            session: Session::default(),
            touched_at: Instant::now(),
        });
        f(&mut slot.session);
        slot.touched_at = Instant::now();

        let session = slot.session.clone();
        if session.is_idle() {
            guard.remove(&key);
        }
        session
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        let mut guard = self.inner.lock().await;
        self.evict_expired(&mut guard);
        guard.len()
    }

    fn evict_expired(&self, sessions: &mut HashMap<SessionKey, Slot>) {
        let before = sessions.len();
        sessions.retain(|_, slot| slot.touched_at.elapsed() < self.ttl);
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!("evicted {evicted} abandoned sessions");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(chat: i64, user: u64) -> SessionKey {
        SessionKey::new(ChatId(chat), UserId(user))
    }

    #[tokio::test]
    async fn missing_session_is_idle() {
        let store = SessionStore::default();
        assert_eq!(store.get(key(1, 1)).await, Session::default());
    }

    #[tokio::test]
    async fn sessions_are_per_user_and_chat() {
        let store = SessionStore::default();
        store
            .update(key(1, 10), |s| s.pending = Some(Pending::ExpenseAmount))
            .await;
        store
            .update(key(1, 20), |s| s.pending = Some(Pending::IncomeAmount))
            .await;

        assert_eq!(
            store.get(key(1, 10)).await.pending,
            Some(Pending::ExpenseAmount)
        );
        assert_eq!(
            store.get(key(1, 20)).await.pending,
            Some(Pending::IncomeAmount)
        );
        assert_eq!(store.get(key(2, 10)).await.pending, None);
    }

    #[tokio::test]
    async fn clearing_the_flow_drops_the_session() {
        let store = SessionStore::default();
        store
            .update(key(1, 1), |s| s.pending = Some(Pending::ExpenseAmount))
            .await;
        assert_eq!(store.len().await, 1);

        store.update(key(1, 1), |s| s.pending = None).await;
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_flows_expire() {
        let store = SessionStore::new(Duration::from_secs(60));
        store
            .update(key(1, 1), |s| s.pending = Some(Pending::IncomeAmount))
            .await;

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(
            store.get(key(1, 1)).await.pending,
            Some(Pending::IncomeAmount)
        );

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(store.get(key(1, 1)).await.pending, None);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn touching_a_session_extends_it() {
        let store = SessionStore::new(Duration::from_secs(60));
        store
            .update(key(1, 1), |s| s.pending = Some(Pending::ExpenseAmount))
            .await;

        tokio::time::advance(Duration::from_secs(50)).await;
        store
            .update(key(1, 1), |s| {
                s.pending = Some(Pending::ExpenseCategory {
                    raw_amount: "5".to_string(),
                })
            })
            .await;

        tokio::time::advance(Duration::from_secs(50)).await;
        assert!(store.get(key(1, 1)).await.pending.is_some());
    }
}

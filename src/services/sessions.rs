//! In-process session store
//!
//! Sessions live only in memory: created at login, destroyed at logout and at
//! account deletion, gone after a restart. Tokens are 32 random bytes,
//! hex-encoded.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::RngCore;
use tokio::sync::RwLock;

use crate::models::user::{Session, User};

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_hours: u64) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::hours(ttl_hours as i64),
        }
    }

    fn generate_token() -> String {
        let mut bytes = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Open a session for an authenticated user and return it
    pub async fn open(&self, user: &User) -> Session {
        let session = Session {
            token: Self::generate_token(),
            user_id: user.user_id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: Utc::now(),
        };

        self.sessions
            .write()
            .await
            .insert(session.token.clone(), session.clone());

        session
    }

    /// Resolve a token to its session, expiring stale ones on the way
    pub async fn resolve(&self, token: &str) -> Option<Session> {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                Some(session) if Utc::now() - session.created_at < self.ttl => {
                    return Some(session.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: drop it
        self.sessions.write().await.remove(token);
        None
    }

    /// Destroy a single session (logout)
    pub async fn close(&self, token: &str) {
        self.sessions.write().await.remove(token);
    }

    /// Destroy every session belonging to a user (account deletion)
    pub async fn close_for_user(&self, user_id: i32) {
        self.sessions
            .write()
            .await
            .retain(|_, session| session.user_id != user_id);
    }

    /// Propagate profile changes into the user's live sessions
    pub async fn refresh_user(&self, user: &User) {
        let mut sessions = self.sessions.write().await;
        for session in sessions.values_mut() {
            if session.user_id == user.user_id {
                session.name = user.name.clone();
                session.email = user.email.clone();
                session.role = user.role;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;

    fn test_user(id: i32) -> User {
        User {
            user_id: id,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "x".to_string(),
            role: Role::Member,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn open_then_resolve() {
        let store = SessionStore::new(1);
        let session = store.open(&test_user(1)).await;
        let resolved = store.resolve(&session.token).await.unwrap();
        assert_eq!(resolved.user_id, 1);
        assert_eq!(resolved.role, Role::Member);
    }

    #[tokio::test]
    async fn tokens_are_unique() {
        let store = SessionStore::new(1);
        let a = store.open(&test_user(1)).await;
        let b = store.open(&test_user(1)).await;
        assert_ne!(a.token, b.token);
    }

    #[tokio::test]
    async fn close_destroys_session() {
        let store = SessionStore::new(1);
        let session = store.open(&test_user(1)).await;
        store.close(&session.token).await;
        assert!(store.resolve(&session.token).await.is_none());
    }

    #[tokio::test]
    async fn close_for_user_destroys_all_their_sessions() {
        let store = SessionStore::new(1);
        let a = store.open(&test_user(1)).await;
        let b = store.open(&test_user(1)).await;
        let other = store.open(&test_user(2)).await;

        store.close_for_user(1).await;

        assert!(store.resolve(&a.token).await.is_none());
        assert!(store.resolve(&b.token).await.is_none());
        assert!(store.resolve(&other.token).await.is_some());
    }

    #[tokio::test]
    async fn expired_sessions_do_not_resolve() {
        let store = SessionStore::new(0);
        let session = store.open(&test_user(1)).await;
        assert!(store.resolve(&session.token).await.is_none());
    }

    #[tokio::test]
    async fn refresh_updates_live_sessions() {
        let store = SessionStore::new(1);
        let session = store.open(&test_user(1)).await;

        let mut updated = test_user(1);
        updated.name = "Ada Lovelace".to_string();
        store.refresh_user(&updated).await;

        let resolved = store.resolve(&session.token).await.unwrap();
        assert_eq!(resolved.name, "Ada Lovelace");
    }
}

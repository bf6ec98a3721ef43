//! In-memory store with the same semantics as the Postgres backend,
//! including the duplicate-username conflict and session expiry. Used by the
//! test suite; also handy for local hacking without a database.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{NewUser, SessionStore, SessionToken, StoreError, User, UserStore};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    sessions: RwLock<HashMap<Vec<u8>, (SessionToken, Instant)>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        // Uniqueness check and insert under one write lock, matching the
        // single-statement atomicity of the database backend.
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict);
        }
        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            password_hash: user.password_hash,
            display_name: user.display_name,
            secret: None,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn set_secret(&self, id: Uuid, secret: &str) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.secret = Some(secret.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn users_with_secrets(&self) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().filter(|u| u.secret.is_some()).cloned().collect())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create(
        &self,
        token_hash: &[u8],
        session: SessionToken,
        ttl_seconds: i64,
    ) -> Result<(), StoreError> {
        let ttl = Duration::from_secs(u64::try_from(ttl_seconds).unwrap_or(0));
        let mut sessions = self.sessions.write().await;
        sessions.insert(token_hash.to_vec(), (session, Instant::now() + ttl));
        Ok(())
    }

    async fn find(&self, token_hash: &[u8]) -> Result<Option<SessionToken>, StoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(token_hash)
            .filter(|(_, expires_at)| *expires_at > Instant::now())
            .map(|(session, _)| session.clone()))
    }

    async fn delete(&self, token_hash: &[u8]) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token_hash);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: None,
            display_name: None,
        }
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let store = MemoryStore::new();
        store.insert(new_user("alice")).await.expect("first insert");

        let err = store.insert(new_user("alice")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict));

        // Exactly one record survives.
        let found = store.find_by_username("alice").await.unwrap();
        assert!(found.is_some());
        let all = store.users.read().await;
        assert_eq!(all.iter().filter(|u| u.username == "alice").count(), 1);
    }

    #[tokio::test]
    async fn set_secret_overwrites_and_reports_missing_users() {
        let store = MemoryStore::new();
        let user = store.insert(new_user("bob")).await.unwrap();

        assert!(store.set_secret(user.id, "first").await.unwrap());
        assert!(store.set_secret(user.id, "second").await.unwrap());

        let found = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(found.secret.as_deref(), Some("second"));

        assert!(!store.set_secret(Uuid::new_v4(), "ghost").await.unwrap());
    }

    #[tokio::test]
    async fn users_with_secrets_excludes_silent_users() {
        let store = MemoryStore::new();
        let talker = store.insert(new_user("talker")).await.unwrap();
        store.insert(new_user("lurker")).await.unwrap();
        store.set_secret(talker.id, "psst").await.unwrap();

        let listed = store.users_with_secrets().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].username, "talker");
    }

    #[tokio::test]
    async fn expired_sessions_are_not_returned() {
        let store = MemoryStore::new();
        let session = SessionToken {
            user_id: Uuid::new_v4(),
            username: "carol".to_string(),
        };

        store.create(b"hash", session.clone(), 0).await.unwrap();
        assert!(store.find(b"hash").await.unwrap().is_none());

        store.create(b"hash", session.clone(), 3600).await.unwrap();
        assert_eq!(store.find(b"hash").await.unwrap(), Some(session));

        store.delete(b"hash").await.unwrap();
        assert!(store.find(b"hash").await.unwrap().is_none());
        // Deleting again is a no-op, not an error.
        store.delete(b"hash").await.unwrap();
    }
}

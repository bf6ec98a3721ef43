//! Local password strategy: Argon2id registration and verification.
//!
//! Hashes are PHC-format strings (`$argon2id$v=19$...`) with a fresh salt
//! per user; the plaintext never reaches the store.

use anyhow::anyhow;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use once_cell::sync::Lazy;

use super::AuthError;
use crate::store::{NewUser, StoreError, User, UserStore};

// Verified against on the unknown-username path so a miss costs roughly the
// same as a mismatch.
static DUMMY_HASH: Lazy<String> =
    Lazy::new(|| hash_password("confide-dummy-password").unwrap_or_default());

/// Hash a password with Argon2id and a per-user random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthError::Internal(anyhow!("failed to hash password: {err}")))
}

/// Verify a password against a stored PHC-format hash.
/// Returns `Ok(false)` on mismatch, `Err` only when the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|err| AuthError::Internal(anyhow!("invalid stored password hash: {err}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Create a local account. A taken username fails with [`AuthError::Conflict`].
pub async fn register(
    users: &dyn UserStore,
    username: &str,
    password: &str,
) -> Result<User, AuthError> {
    let password_hash = hash_password(password)?;

    match users
        .insert(NewUser {
            username: username.to_string(),
            password_hash: Some(password_hash),
            display_name: None,
        })
        .await
    {
        Ok(user) => Ok(user),
        Err(StoreError::Conflict) => Err(AuthError::Conflict),
        Err(err) => Err(err.into()),
    }
}

/// Authenticate a local account. Unknown usernames, OAuth-origin accounts
/// without a password, and wrong passwords all fail with the same
/// [`AuthError::Unauthorized`].
pub async fn authenticate(
    users: &dyn UserStore,
    username: &str,
    password: &str,
) -> Result<User, AuthError> {
    match users.find_by_username(username).await? {
        Some(user) => match user.password_hash.as_deref() {
            Some(hash) if verify_password(password, hash)? => Ok(user),
            Some(_) => Err(AuthError::Unauthorized),
            None => {
                // OAuth-origin record: burn a verification anyway.
                let _ = verify_password(password, &DUMMY_HASH);
                Err(AuthError::Unauthorized)
            }
        },
        None => {
            let _ = verify_password(password, &DUMMY_HASH);
            Err(AuthError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn hash_then_verify_round_trips() {
        let hash = hash_password("hunter2").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }

    #[test]
    fn salts_differ_per_hash() {
        let one = hash_password("same").unwrap();
        let two = hash_password("same").unwrap();
        assert_ne!(one, two);
    }

    #[tokio::test]
    async fn register_then_authenticate_succeeds() {
        let store = MemoryStore::new();
        let registered = register(&store, "alice", "correct horse").await.unwrap();
        assert_eq!(registered.username, "alice");
        assert!(registered.secret.is_none());
        assert!(registered.display_name.is_none());

        let authenticated = authenticate(&store, "alice", "correct horse").await.unwrap();
        assert_eq!(authenticated.id, registered.id);
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let store = MemoryStore::new();
        register(&store, "alice", "pw-one").await.unwrap();

        let err = register(&store, "alice", "pw-two").await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict));
    }

    #[tokio::test]
    async fn bad_credentials_are_indistinguishable() {
        let store = MemoryStore::new();
        register(&store, "alice", "right").await.unwrap();

        let wrong_password = authenticate(&store, "alice", "wrong").await.unwrap_err();
        let unknown_user = authenticate(&store, "nobody", "whatever").await.unwrap_err();

        assert!(matches!(wrong_password, AuthError::Unauthorized));
        assert!(matches!(unknown_user, AuthError::Unauthorized));
    }

    #[tokio::test]
    async fn oauth_origin_accounts_never_password_authenticate() {
        let store = MemoryStore::new();
        store
            .insert(NewUser {
                username: "109876543210".to_string(),
                password_hash: None,
                display_name: Some("Google User".to_string()),
            })
            .await
            .unwrap();

        let err = authenticate(&store, "109876543210", "anything").await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }
}

//! Identity resolver: the single seam between "a strategy succeeded" and
//! "a canonical user record exists".

use tracing::debug;

use super::{
    password,
    providers::{CodeExchanger, Provider, ProviderProfile},
    AuthError,
};
use crate::store::{NewUser, StoreError, User, UserStore};

/// Everything a login attempt can present, one variant per strategy.
#[derive(Debug)]
pub enum Credentials {
    Local { username: String, password: String },
    OAuth { provider: Provider, code: String },
}

/// Resolve credentials to the canonical user. Session establishment never
/// needs to know which variant produced the result.
pub async fn resolve(
    credentials: Credentials,
    users: &dyn UserStore,
    exchanger: &dyn CodeExchanger,
) -> Result<User, AuthError> {
    match credentials {
        Credentials::Local { username, password } => {
            password::authenticate(users, &username, &password).await
        }
        Credentials::OAuth { provider, code } => {
            let profile = exchanger.exchange(provider, &code).await?;
            resolve_profile(users, &profile).await
        }
    }
}

/// Find or create the user for a provider profile.
///
/// The username is the provider-issued profile id, not an email: the same
/// person arriving via Google and Facebook owns two distinct records.
///
/// Two near-simultaneous callbacks for a never-seen id may both miss the
/// lookup and race on the insert; the loser hits the unique constraint and
/// answers with a retried lookup instead of surfacing the conflict.
pub async fn resolve_profile(
    users: &dyn UserStore,
    profile: &ProviderProfile,
) -> Result<User, AuthError> {
    if let Some(user) = users.find_by_username(&profile.provider_id).await? {
        return Ok(user);
    }

    match users
        .insert(NewUser {
            username: profile.provider_id.clone(),
            password_hash: None,
            display_name: profile.display_name.clone(),
        })
        .await
    {
        Ok(user) => Ok(user),
        Err(StoreError::Conflict) => {
            debug!(
                provider_id = %profile.provider_id,
                "lost find-or-create race, retrying lookup"
            );
            users
                .find_by_username(&profile.provider_id)
                .await?
                .ok_or(AuthError::NotFound)
        }
        Err(err) => Err(err.into()),
    }
}

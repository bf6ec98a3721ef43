//! OAuth2 providers: endpoint wiring and the authorization-code exchange.
//!
//! The exchange itself sits behind [`CodeExchanger`] so the callback route
//! can be tested without talking to Google or Facebook.

use async_trait::async_trait;
use oauth2::{
    basic::BasicClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken,
    EndpointNotSet, EndpointSet, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use secrecy::ExposeSecret;
use serde::Deserialize;
use url::Url;

use super::{state::AuthConfig, AuthError};

/// The closed set of supported OAuth providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Google,
    Facebook,
}

impl Provider {
    /// Path segment used in `/auth/{slug}` routes and callback URLs.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Facebook => "facebook",
        }
    }

    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "google" => Some(Self::Google),
            "facebook" => Some(Self::Facebook),
            _ => None,
        }
    }

    fn auth_url(self) -> &'static str {
        match self {
            Self::Google => "https://accounts.google.com/o/oauth2/v2/auth",
            Self::Facebook => "https://www.facebook.com/v19.0/dialog/oauth",
        }
    }

    fn token_url(self) -> &'static str {
        match self {
            Self::Google => "https://oauth2.googleapis.com/token",
            Self::Facebook => "https://graph.facebook.com/v19.0/oauth/access_token",
        }
    }

    fn userinfo_url(self) -> &'static str {
        match self {
            Self::Google => "https://www.googleapis.com/oauth2/v2/userinfo",
            Self::Facebook => "https://graph.facebook.com/v19.0/me?fields=id,name",
        }
    }

    fn scope(self) -> &'static str {
        match self {
            Self::Google => "profile",
            Self::Facebook => "public_profile",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// Third-party identity data returned after the exchange. `provider_id`
/// becomes the local username; there is no email-based linking.
#[derive(Debug, Clone)]
pub struct ProviderProfile {
    pub provider_id: String,
    pub display_name: Option<String>,
}

/// Userinfo payload shared by both providers (Google returns extra fields
/// that are ignored).
#[derive(Debug, Deserialize)]
struct UserInfo {
    id: String,
    name: Option<String>,
}

/// Provider-facing side of the OAuth strategy.
#[async_trait]
pub trait CodeExchanger: Send + Sync {
    /// Authorization URL to redirect the browser to, carrying `state`.
    fn authorize_url(&self, provider: Provider, state: &str) -> Result<Url, AuthError>;

    /// Exchange the callback code for a provider profile.
    async fn exchange(&self, provider: Provider, code: &str) -> Result<ProviderProfile, AuthError>;
}

/// OAuth client type with auth and token endpoints set.
type ConfiguredClient = oauth2::Client<
    oauth2::basic::BasicErrorResponse,
    oauth2::basic::BasicTokenResponse,
    oauth2::basic::BasicTokenIntrospectionResponse,
    oauth2::StandardRevocableToken,
    oauth2::basic::BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

/// Real exchanger backed by the `oauth2` crate and `reqwest`.
pub struct OAuthClient {
    config: AuthConfig,
    http: reqwest::Client,
}

impl OAuthClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: AuthConfig) -> Result<Self, AuthError> {
        // Redirects must stay disabled to prevent SSRF via the token endpoint.
        let http = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(crate::APP_USER_AGENT)
            .build()
            .map_err(|err| AuthError::Internal(err.into()))?;
        Ok(Self { config, http })
    }

    fn client(&self, provider: Provider) -> Result<ConfiguredClient, AuthError> {
        let credentials = self
            .config
            .provider(provider)
            .ok_or_else(|| AuthError::AuthFailure(format!("{provider} is not configured")))?;

        let auth_url = AuthUrl::new(provider.auth_url().to_string())
            .map_err(|err| AuthError::Internal(err.into()))?;
        let token_url = TokenUrl::new(provider.token_url().to_string())
            .map_err(|err| AuthError::Internal(err.into()))?;
        let redirect_url = RedirectUrl::new(self.config.callback_url(provider))
            .map_err(|err| AuthError::Internal(err.into()))?;

        Ok(BasicClient::new(ClientId::new(credentials.client_id.clone()))
            .set_client_secret(ClientSecret::new(
                credentials.client_secret.expose_secret().to_string(),
            ))
            .set_auth_uri(auth_url)
            .set_token_uri(token_url)
            .set_redirect_uri(redirect_url))
    }
}

#[async_trait]
impl CodeExchanger for OAuthClient {
    fn authorize_url(&self, provider: Provider, state: &str) -> Result<Url, AuthError> {
        let client = self.client(provider)?;
        let state = state.to_string();
        let (url, _csrf) = client
            .authorize_url(move || CsrfToken::new(state.clone()))
            .add_scope(Scope::new(provider.scope().to_string()))
            .url();
        Ok(url)
    }

    async fn exchange(&self, provider: Provider, code: &str) -> Result<ProviderProfile, AuthError> {
        let client = self.client(provider)?;

        let token = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http)
            .await
            .map_err(|err| AuthError::AuthFailure(format!("token exchange failed: {err}")))?;

        let info: UserInfo = self
            .http
            .get(provider.userinfo_url())
            .bearer_auth(token.access_token().secret())
            .send()
            .await
            .map_err(|err| AuthError::AuthFailure(format!("userinfo request failed: {err}")))?
            .json()
            .await
            .map_err(|err| AuthError::AuthFailure(format!("invalid userinfo payload: {err}")))?;

        Ok(ProviderProfile {
            provider_id: info.id,
            display_name: info.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::handlers::auth::state::ProviderCredentials;

    fn configured() -> OAuthClient {
        let config = AuthConfig::new("http://localhost:3000".to_string())
            .with_google(ProviderCredentials::new("google-id", "google-secret"))
            .with_facebook(ProviderCredentials::new("facebook-id", "facebook-secret"));
        OAuthClient::new(config).unwrap()
    }

    #[test]
    fn provider_slugs_round_trip() {
        for provider in [Provider::Google, Provider::Facebook] {
            assert_eq!(Provider::from_slug(provider.slug()), Some(provider));
        }
        assert_eq!(Provider::from_slug("github"), None);
    }

    #[test]
    fn authorize_url_carries_state_and_redirect() {
        let client = configured();
        let url = client.authorize_url(Provider::Google, "st4te").unwrap();

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert!(pairs.contains(&("state".to_string(), "st4te".to_string())));
        assert!(pairs.contains(&("client_id".to_string(), "google-id".to_string())));
        assert!(pairs.contains(&(
            "redirect_uri".to_string(),
            "http://localhost:3000/auth/google/secrets".to_string()
        )));
        assert!(pairs.contains(&("scope".to_string(), "profile".to_string())));
    }

    #[test]
    fn unconfigured_provider_fails_closed() {
        let config = AuthConfig::new("http://localhost:3000".to_string());
        let client = OAuthClient::new(config).unwrap();

        let err = client.authorize_url(Provider::Facebook, "state").unwrap_err();
        assert!(matches!(err, AuthError::AuthFailure(_)));
    }
}

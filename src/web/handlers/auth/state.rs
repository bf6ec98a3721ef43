//! Immutable gateway configuration, built once at startup.

use secrecy::SecretString;

use super::providers::Provider;

const DEFAULT_SESSION_TTL_SECONDS: i64 = 12 * 60 * 60;

/// OAuth client credentials for one provider.
#[derive(Clone)]
pub struct ProviderCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

impl ProviderCredentials {
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
        }
    }
}

impl std::fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

/// Everything the handlers need to know, constructed once from the CLI and
/// passed by reference. No ambient lookups from business logic.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    public_base_url: String,
    session_ttl_seconds: i64,
    session_cookie_secure: bool,
    google: Option<ProviderCredentials>,
    facebook: Option<ProviderCredentials>,
}

impl AuthConfig {
    #[must_use]
    pub fn new(public_base_url: String) -> Self {
        Self {
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            session_cookie_secure: false,
            google: None,
            facebook: None,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.session_cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn with_google(mut self, credentials: ProviderCredentials) -> Self {
        self.google = Some(credentials);
        self
    }

    #[must_use]
    pub fn with_facebook(mut self, credentials: ProviderCredentials) -> Self {
        self.facebook = Some(credentials);
        self
    }

    #[must_use]
    pub fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.session_cookie_secure
    }

    /// Credentials for a provider, `None` when it is not configured.
    #[must_use]
    pub fn provider(&self, provider: Provider) -> Option<&ProviderCredentials> {
        match provider {
            Provider::Google => self.google.as_ref(),
            Provider::Facebook => self.facebook.as_ref(),
        }
    }

    #[must_use]
    pub fn provider_enabled(&self, provider: Provider) -> bool {
        self.provider(provider).is_some()
    }

    /// Callback URL registered with the provider, derived from the public
    /// base URL: `{base}/auth/{provider}/secrets`.
    #[must_use]
    pub fn callback_url(&self, provider: Provider) -> String {
        format!("{}/auth/{}/secrets", self.public_base_url, provider.slug())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_url_strips_trailing_slash() {
        let config = AuthConfig::new("http://localhost:3000/".to_string());
        assert_eq!(
            config.callback_url(Provider::Google),
            "http://localhost:3000/auth/google/secrets"
        );
        assert_eq!(
            config.callback_url(Provider::Facebook),
            "http://localhost:3000/auth/facebook/secrets"
        );
    }

    #[test]
    fn providers_disabled_until_configured() {
        let config = AuthConfig::new("http://localhost:3000".to_string());
        assert!(!config.provider_enabled(Provider::Google));

        let config = config.with_google(ProviderCredentials::new("id", "secret"));
        assert!(config.provider_enabled(Provider::Google));
        assert!(!config.provider_enabled(Provider::Facebook));
    }

    #[test]
    fn debug_masks_client_secret() {
        let credentials = ProviderCredentials::new("id", "very-secret");
        let output = format!("{credentials:?}");
        assert!(!output.contains("very-secret"));
        assert!(output.contains("***"));
    }
}

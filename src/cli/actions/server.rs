use crate::{
    cli::commands::oauth::ProviderArgs,
    store::Stores,
    web,
    web::handlers::auth::{
        providers::{CodeExchanger, OAuthClient},
        state::{AuthConfig, ProviderCredentials},
    },
};
use anyhow::{anyhow, Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub public_url: String,
    pub session_ttl_seconds: i64,
    pub secure_cookies: bool,
    pub google: Option<ProviderArgs>,
    pub facebook: Option<ProviderArgs>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if configuration is invalid, the database is
/// unreachable, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    Url::parse(&args.public_url)
        .with_context(|| format!("Invalid public URL: {}", args.public_url))?;

    let mut config = AuthConfig::new(args.public_url)
        .with_session_ttl_seconds(args.session_ttl_seconds)
        .with_secure_cookies(args.secure_cookies);

    if let Some(google) = args.google {
        config = config.with_google(ProviderCredentials::new(
            google.client_id,
            google.client_secret,
        ));
    }
    if let Some(facebook) = args.facebook {
        config = config.with_facebook(ProviderCredentials::new(
            facebook.client_id,
            facebook.client_secret,
        ));
    }

    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&args.dsn)
        .await
        .context("Failed to connect to database")?;

    let exchanger: Arc<dyn CodeExchanger> = Arc::new(
        OAuthClient::new(config.clone())
            .map_err(|err| anyhow!("Failed to build OAuth client: {err}"))?,
    );

    web::new(args.port, Stores::postgres(pool), Arc::new(config), exchanger).await
}

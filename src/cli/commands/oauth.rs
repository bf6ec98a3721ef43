//! OAuth provider arguments. A provider whose id and secret are both set is
//! enabled; anything less leaves it switched off.

use anyhow::{anyhow, Result};
use clap::{Arg, Command};

pub const ARG_GOOGLE_CLIENT_ID: &str = "google-client-id";
pub const ARG_GOOGLE_CLIENT_SECRET: &str = "google-client-secret";
pub const ARG_FACEBOOK_CLIENT_ID: &str = "facebook-client-id";
pub const ARG_FACEBOOK_CLIENT_SECRET: &str = "facebook-client-secret";

pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_GOOGLE_CLIENT_ID)
                .long(ARG_GOOGLE_CLIENT_ID)
                .help("Google OAuth2 client id")
                .env("CONFIDE_GOOGLE_CLIENT_ID"),
        )
        .arg(
            Arg::new(ARG_GOOGLE_CLIENT_SECRET)
                .long(ARG_GOOGLE_CLIENT_SECRET)
                .help("Google OAuth2 client secret")
                .env("CONFIDE_GOOGLE_CLIENT_SECRET"),
        )
        .arg(
            Arg::new(ARG_FACEBOOK_CLIENT_ID)
                .long(ARG_FACEBOOK_CLIENT_ID)
                .help("Facebook OAuth2 client id")
                .env("CONFIDE_FACEBOOK_CLIENT_ID"),
        )
        .arg(
            Arg::new(ARG_FACEBOOK_CLIENT_SECRET)
                .long(ARG_FACEBOOK_CLIENT_SECRET)
                .help("Facebook OAuth2 client secret")
                .env("CONFIDE_FACEBOOK_CLIENT_SECRET"),
        )
}

/// Parsed credentials for one provider, or `None` when unconfigured.
#[derive(Debug, Clone)]
pub struct ProviderArgs {
    pub client_id: String,
    pub client_secret: String,
}

fn parse_provider(
    matches: &clap::ArgMatches,
    id_arg: &str,
    secret_arg: &str,
) -> Result<Option<ProviderArgs>> {
    let id = matches.get_one::<String>(id_arg).cloned();
    let secret = matches.get_one::<String>(secret_arg).cloned();

    match (id, secret) {
        (Some(client_id), Some(client_secret)) => Ok(Some(ProviderArgs {
            client_id,
            client_secret,
        })),
        (None, None) => Ok(None),
        // Half a credential pair is a deployment mistake, not a disabled provider.
        (Some(_), None) => Err(anyhow!("--{id_arg} given without --{secret_arg}")),
        (None, Some(_)) => Err(anyhow!("--{secret_arg} given without --{id_arg}")),
    }
}

pub fn parse_google(matches: &clap::ArgMatches) -> Result<Option<ProviderArgs>> {
    parse_provider(matches, ARG_GOOGLE_CLIENT_ID, ARG_GOOGLE_CLIENT_SECRET)
}

pub fn parse_facebook(matches: &clap::ArgMatches) -> Result<Option<ProviderArgs>> {
    parse_provider(matches, ARG_FACEBOOK_CLIENT_ID, ARG_FACEBOOK_CLIENT_SECRET)
}

//! Map validated CLI matches to an action.

use crate::cli::{
    actions::{server::Args, Action},
    commands::oauth,
};
use anyhow::{Context, Result};

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(3000);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;
    let public_url = matches
        .get_one::<String>("public-url")
        .cloned()
        .unwrap_or_else(|| "http://localhost:3000".to_string());
    let session_ttl_seconds = matches
        .get_one::<i64>("session-ttl-seconds")
        .copied()
        .unwrap_or(43200);
    let secure_cookies = matches.get_flag("secure-cookies");

    let google = oauth::parse_google(matches)?;
    let facebook = oauth::parse_facebook(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        public_url,
        session_ttl_seconds,
        secure_cookies,
        google,
        facebook,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;

    #[test]
    fn builds_a_server_action_from_flags() {
        let matches = commands::new().get_matches_from(vec![
            "confide",
            "--port",
            "8080",
            "--dsn",
            "postgres://user@localhost:5432/confide",
            "--public-url",
            "https://confide.example",
            "--secure-cookies",
            "--google-client-id",
            "gid",
            "--google-client-secret",
            "gsecret",
        ]);

        let Action::Server(args) = handler(&matches).unwrap();
        assert_eq!(args.port, 8080);
        assert_eq!(args.dsn, "postgres://user@localhost:5432/confide");
        assert_eq!(args.public_url, "https://confide.example");
        assert!(args.secure_cookies);
        assert!(args.google.is_some());
        assert!(args.facebook.is_none());
    }
}

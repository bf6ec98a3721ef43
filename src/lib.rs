//! # Confide
//!
//! `confide` is a small authentication gateway in front of one protected
//! resource: an anonymous secrets board. Visitors sign in with a local
//! username/password or through Google or Facebook OAuth2; every strategy
//! resolves to a single canonical user record. Authenticated users may
//! submit one secret, overwritten wholesale on each submission, and the
//! board lists every submitted secret without attribution.
//!
//! ## Identity model
//!
//! - Local accounts are keyed by the username chosen at registration and
//!   store an Argon2id password hash.
//! - OAuth accounts reuse the provider-issued profile id as their username.
//!   The same person signing in with Google and Facebook therefore owns two
//!   distinct records; there is no cross-provider merge.
//!
//! ## Sessions
//!
//! Sessions are server-side rows keyed by the SHA-256 hash of an opaque
//! cookie token. The row carries only `{id, username}` and is trusted
//! verbatim for its lifetime: a user renamed or deleted out-of-band keeps
//! authenticating under the old identity until the session expires. This is
//! a deliberate trust boundary, not an oversight.

pub mod cli;
pub mod store;
pub mod web;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}

//! Server-rendered pages, built as plain HTML strings.
//!
//! Rendering is deliberately unremarkable: a shared layout, one function per
//! view, and escaping for anything user-supplied.

use crate::store::User;

/// Escape user-supplied text for HTML body and attribute contexts.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - Confide</title>
    <style>
        body {{ font-family: sans-serif; max-width: 40rem; margin: 3rem auto; padding: 0 1rem; color: #222; }}
        nav a {{ margin-right: 1rem; }}
        form {{ margin: 1.5rem 0; }}
        label {{ display: block; margin-top: 0.75rem; }}
        input[type=text], input[type=password] {{ width: 100%; padding: 0.4rem; }}
        button {{ margin-top: 1rem; padding: 0.4rem 1.2rem; }}
        blockquote {{ border-left: 3px solid #999; margin: 1rem 0; padding: 0.5rem 1rem; font-style: italic; }}
        .providers a {{ display: inline-block; margin-right: 1rem; }}
    </style>
</head>
<body>
    <nav>
        <a href="/">Home</a>
        <a href="/secrets">Secrets</a>
        <a href="/submit">Submit</a>
        <a href="/login">Login</a>
        <a href="/register">Register</a>
        <a href="/logout">Logout</a>
    </nav>
    {content}
</body>
</html>
"#
    )
}

fn provider_links(google: bool, facebook: bool) -> String {
    let mut links = String::new();
    if google {
        links.push_str(r#"<a href="/auth/google">Sign in with Google</a>"#);
    }
    if facebook {
        links.push_str(r#"<a href="/auth/facebook">Sign in with Facebook</a>"#);
    }
    if links.is_empty() {
        String::new()
    } else {
        format!(r#"<div class="providers"><h2>Or</h2>{links}</div>"#)
    }
}

pub fn home_page() -> String {
    layout(
        "Home",
        r#"<h1>Confide</h1>
    <p>Share a secret with the world, anonymously. Read everyone else's.</p>
    <p><a href="/register">Register</a> or <a href="/login">log in</a> to submit yours.</p>"#,
    )
}

pub fn login_page(google: bool, facebook: bool) -> String {
    let content = format!(
        r#"<h1>Login</h1>
    <form action="/login" method="post">
        <label for="username">Username</label>
        <input type="text" id="username" name="username" autocomplete="username">
        <label for="password">Password</label>
        <input type="password" id="password" name="password" autocomplete="current-password">
        <button type="submit">Login</button>
    </form>
    {providers}"#,
        providers = provider_links(google, facebook)
    );
    layout("Login", &content)
}

pub fn register_page(google: bool, facebook: bool) -> String {
    let content = format!(
        r#"<h1>Register</h1>
    <form action="/register" method="post">
        <label for="username">Username</label>
        <input type="text" id="username" name="username" autocomplete="username">
        <label for="password">Password</label>
        <input type="password" id="password" name="password" autocomplete="new-password">
        <button type="submit">Register</button>
    </form>
    {providers}"#,
        providers = provider_links(google, facebook)
    );
    layout("Register", &content)
}

pub fn submit_page(username: &str) -> String {
    let content = format!(
        r#"<h1>Submit a secret</h1>
    <p>Signed in as {username}. Whatever you write replaces your previous secret.</p>
    <form action="/submit" method="post">
        <label for="secret">Your secret</label>
        <input type="text" id="secret" name="secret" placeholder="What's your secret?">
        <button type="submit">Submit</button>
    </form>"#,
        username = escape(username)
    );
    layout("Submit", &content)
}

/// The board: every submitted secret, unattributed.
pub fn secrets_page(users_with_secrets: &[User]) -> String {
    let mut quotes = String::new();
    for user in users_with_secrets {
        if let Some(secret) = &user.secret {
            quotes.push_str(&format!("<blockquote>{}</blockquote>\n", escape(secret)));
        }
    }
    if quotes.is_empty() {
        quotes.push_str("<p>No secrets yet. Be the first.</p>");
    }
    let content = format!("<h1>You've made it to the secrets page</h1>\n{quotes}");
    layout("Secrets", &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user_with_secret(secret: Option<&str>) -> User {
        User {
            id: Uuid::new_v4(),
            username: "someone".to_string(),
            password_hash: None,
            display_name: None,
            secret: secret.map(ToString::to_string),
        }
    }

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(
            escape(r#"<script>alert("x&y')</script>"#),
            "&lt;script&gt;alert(&quot;x&amp;y&#39;)&lt;/script&gt;"
        );
    }

    #[test]
    fn secrets_page_lists_only_submitted_secrets() {
        let users = vec![user_with_secret(Some("i sing in the shower"))];
        let page = secrets_page(&users);
        assert!(page.contains("i sing in the shower"));

        let empty = secrets_page(&[]);
        assert!(empty.contains("No secrets yet"));
    }

    #[test]
    fn secrets_page_escapes_user_content() {
        let users = vec![user_with_secret(Some("<img src=x>"))];
        let page = secrets_page(&users);
        assert!(!page.contains("<img src=x>"));
        assert!(page.contains("&lt;img src=x&gt;"));
    }

    #[test]
    fn login_page_links_only_configured_providers() {
        let both = login_page(true, true);
        assert!(both.contains("/auth/google"));
        assert!(both.contains("/auth/facebook"));

        let google_only = login_page(true, false);
        assert!(google_only.contains("/auth/google"));
        assert!(!google_only.contains("/auth/facebook"));

        let neither = login_page(false, false);
        assert!(!neither.contains("/auth/"));
    }
}

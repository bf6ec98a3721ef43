//! Form payloads for the authentication routes.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Query parameters on the provider callback. `error` is set when the user
/// denied the consent screen.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    #[serde(default)]
    pub secret: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forms_decode_urlencoded_payloads() {
        let form: RegisterForm =
            serde_urlencoded_from_str("username=alice&password=p%40ss").unwrap();
        assert_eq!(form.username, "alice");
        assert_eq!(form.password, "p@ss");

        let form: SubmitForm = serde_urlencoded_from_str("secret=shh").unwrap();
        assert_eq!(form.secret, "shh");

        // Missing secret decodes to an empty submission, not an error.
        let form: SubmitForm = serde_urlencoded_from_str("").unwrap();
        assert_eq!(form.secret, "");
    }

    #[test]
    fn callback_query_tolerates_partial_parameters() {
        let query: CallbackQuery = serde_urlencoded_from_str("error=access_denied").unwrap();
        assert!(query.code.is_none());
        assert!(query.state.is_none());
        assert_eq!(query.error.as_deref(), Some("access_denied"));
    }

    // axum's Form/Query use this format under the hood.
    fn serde_urlencoded_from_str<T: serde::de::DeserializeOwned>(
        input: &str,
    ) -> Result<T, serde_urlencoded::de::Error> {
        serde_urlencoded::from_str(input)
    }
}

use secrecy::{ExposeSecret, SecretString};

/// Factory-default web admin username.
pub const DEFAULT_USERNAME: &str = "admin";
/// Factory-default web admin password.
pub const DEFAULT_PASSWORD: &str = "gocoax";

/// HTTP Basic credentials for the adapter's web admin.
///
/// Sent on every request; the adapter keeps no session, so there is
/// nothing to log in to or refresh.
#[derive(Debug, Clone)]
pub struct BasicCredentials {
    username: String,
    password: SecretString,
}

impl BasicCredentials {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Attach the credentials to an outgoing request.
    pub(crate) fn apply(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.basic_auth(&self.username, Some(self.password.expose_secret()))
    }
}

impl Default for BasicCredentials {
    fn default() -> Self {
        Self::new(
            DEFAULT_USERNAME,
            SecretString::from(DEFAULT_PASSWORD.to_owned()),
        )
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Authentication for the Reddit API.
//!
//! Reddit requires OAuth for every authenticated endpoint. Register a
//! "script" application at <https://www.reddit.com/prefs/apps> and store
//! its client ID and secret in `$REDDIT_CLIENT_ID` and
//! `$REDDIT_CLIENT_SECRET`. Then either store a refresh token in
//! `$REDDIT_REFRESH_TOKEN` (preferred), or your account's username and
//! password in `$REDDIT_USERNAME` and `$REDDIT_PASSWORD`.

use std::env;
use thiserror::Error;

/// The way in which an access token is obtained from Reddit.
#[derive(Clone, Debug, PartialEq)]
pub enum Grant {
    /// Exchange a long-lived refresh token for an access token.
    RefreshToken(String),

    /// Log in directly with a username and password. Only works for
    /// "script" applications.
    Password {
        /// Reddit username.
        username: String,
        /// Reddit password.
        password: String,
    },
}

impl Grant {
    /// The form body sent to the access token endpoint.
    pub fn form(&self) -> Vec<(&'static str, String)> {
        match self {
            Grant::RefreshToken(token) => vec![
                ("grant_type", "refresh_token".to_string()),
                ("refresh_token", token.to_string()),
            ],
            Grant::Password { username, password } => vec![
                ("grant_type", "password".to_string()),
                ("username", username.to_string()),
                ("password", password.to_string()),
            ],
        }
    }
}

/// OAuth credentials for a Reddit application.
#[derive(Clone)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
    grant: Grant,
    user_agent: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never leak secrets into logs.
        let grant = match self.grant {
            Grant::RefreshToken(_) => "refresh_token",
            Grant::Password { .. } => "password",
        };
        write!(
            f,
            "Credentials {{ client_id = {}, grant = {} }}",
            self.client_id, grant
        )
    }
}

impl Credentials {
    /// Creates a new set of credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>, grant: Grant) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            grant,
            user_agent: None,
        }
    }

    /// Overrides the user agent sent with every request.
    pub fn with_user_agent(self, user_agent: impl Into<String>) -> Self {
        let user_agent = Some(user_agent.into());
        Self { user_agent, ..self }
    }

    /// Retrieves credentials from the environment.
    ///
    /// A refresh token takes precedence over a username and password if
    /// both are present.
    ///
    /// Returns an error if the client ID or secret is missing, or if
    /// neither kind of grant can be built from the environment.
    pub fn from_env() -> CredentialsResult {
        let client_id = required("REDDIT_CLIENT_ID")?;
        let client_secret = required("REDDIT_CLIENT_SECRET")?;

        let grant = if let Some(token) = optional("REDDIT_REFRESH_TOKEN")? {
            Grant::RefreshToken(token)
        } else {
            match (optional("REDDIT_USERNAME")?, optional("REDDIT_PASSWORD")?) {
                (Some(username), Some(password)) => Grant::Password { username, password },
                _ => return Err(CredentialsError::MissingGrant),
            }
        };

        let credentials = Self::new(client_id, client_secret, grant);
        Ok(match optional("REDDIT_USER_AGENT")? {
            Some(user_agent) => credentials.with_user_agent(user_agent),
            None => credentials,
        })
    }

    /// The application's client ID.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// The application's client secret.
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// How an access token is obtained.
    pub fn grant(&self) -> &Grant {
        &self.grant
    }

    /// A custom user agent, if one was configured.
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }
}

fn required(envvar: &'static str) -> Result<String, CredentialsError> {
    optional(envvar)?.ok_or(CredentialsError::Missing(envvar))
}

fn optional(envvar: &'static str) -> Result<Option<String>, CredentialsError> {
    match env::var(envvar) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(CredentialsError::EnvError(envvar, err)),
    }
}

/// Standard result type for [`Credentials`] creation.
pub type CredentialsResult = Result<Credentials, CredentialsError>;

/// Indicates an error when reading credentials.
#[derive(Debug, Error)]
pub enum CredentialsError {
    /// A required environment variable is not set.
    #[error("Missing credentials: ${0} is not set")]
    Missing(&'static str),

    /// Neither a refresh token nor a username and password are available.
    #[error(
        "Missing credentials: set $REDDIT_REFRESH_TOKEN, or both $REDDIT_USERNAME and $REDDIT_PASSWORD"
    )]
    MissingGrant,

    /// An environment variable could not be read.
    #[error("Environment error reading ${0}: {1}")]
    EnvError(&'static str, #[source] env::VarError),
}

// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! HTTPS connector for the Reddit API.
//!
//! Service structures in this module provide a low-level way to interact
//! with the Reddit API over HTTPS, essentially a specialized HTTPS client
//! specifically for Reddit. Services return raw response bodies; parsing
//! is left to the [client](crate::reddit::client).

use crate::clock::{Clock, DateTime, SystemClock, TimeDelta, Utc};
use crate::reddit::auth::Credentials;
use hypertyper::{HTTPClient, HTTPClientFactory, HTTPError};
use log::{debug, info};
use reqwest::{RequestBuilder, Response, header};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;

/// Endpoint that exchanges OAuth grants for bearer tokens.
const TOKEN_URI: &str = "https://www.reddit.com/api/v1/access_token";

/// Base URI for all authenticated API requests.
const API_BASE: &str = "https://oauth.reddit.com";

/// Tokens are refreshed this many seconds before Reddit says they expire.
const EXPIRY_MARGIN: i64 = 60;

/// Query string or form parameters sent with a request.
pub type Params<'a> = [(&'a str, String)];

/// The result of a service request.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Indicates an error communicating with the Reddit API.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// An error from the underlying HTTP connection.
    #[error("{0}")]
    Http(#[from] HTTPError),

    /// Reddit refused to issue an access token.
    #[error("Authentication failed: {0}")]
    Auth(String),
}

/// A service for retrieving information from the Reddit API.
///
/// Using this trait, clients can implement different ways of connecting
/// to the Reddit API, such as an actual connector for production code,
/// and a mocked connector for testing purposes.
pub trait Service: Send + Sync {
    /// Performs a GET request to the API `resource` (an absolute path such
    /// as `/r/all/new`) with the given query `params` and returns the raw
    /// response body.
    fn get_resource(
        &self,
        resource: &str,
        params: &Params<'_>,
    ) -> impl Future<Output = ServiceResult<String>> + Send;

    /// Performs a POST request to the API `resource` with the given
    /// form-encoded `form` and returns the raw response body.
    fn post_resource(
        &self,
        resource: &str,
        form: &Params<'_>,
    ) -> impl Future<Output = ServiceResult<String>> + Send;
}

/// A bearer token issued by Reddit.
#[derive(Clone, Debug)]
pub struct Token {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl Token {
    /// Creates a token that Reddit says will expire in `expires_in` seconds.
    pub fn new<C: Clock>(access_token: impl Into<String>, expires_in: i64, clock: &C) -> Self {
        let lifetime =
            TimeDelta::try_seconds(expires_in - EXPIRY_MARGIN).unwrap_or_else(TimeDelta::zero);
        Self {
            access_token: access_token.into(),
            expires_at: clock.now() + lifetime,
        }
    }

    /// The raw token sent in the `Authorization` header.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// True if the token should no longer be used.
    pub fn is_expired<C: Clock>(&self, clock: &C) -> bool {
        clock.now() >= self.expires_at
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TokenResponse {
    Issued {
        access_token: String,
        expires_in: i64,
    },
    Refused {
        error: serde_json::Value,
    },
}

/// A service that contacts the Reddit API directly to retrieve information.
///
/// The service authenticates lazily: no token is requested until the first
/// API call, and a cached token is reused until shortly before it expires.
pub struct RedditService {
    client: HTTPClient,
    credentials: Credentials,
    token: Mutex<Option<Token>>,
    clock: SystemClock,
}

impl RedditService {
    /// Creates a new Reddit service that authenticates with `credentials`.
    pub fn new(credentials: Credentials) -> Self {
        let factory = HTTPClientFactory::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        let client = factory.create();
        Self {
            client,
            credentials,
            token: Mutex::new(None),
            clock: SystemClock,
        }
    }

    fn uri(&self, resource: &str) -> String {
        format!("{API_BASE}{resource}")
    }

    fn with_user_agent(&self, request: RequestBuilder) -> RequestBuilder {
        match self.credentials.user_agent() {
            Some(user_agent) => request.header(header::USER_AGENT, user_agent),
            None => request,
        }
    }

    async fn access_token(&self) -> ServiceResult<String> {
        let mut token = self.token.lock().await;
        if let Some(token) = token.as_ref().filter(|t| !t.is_expired(&self.clock)) {
            return Ok(token.access_token().to_string());
        }
        let fresh = self.authenticate().await?;
        let access_token = fresh.access_token().to_string();
        *token = Some(fresh);
        Ok(access_token)
    }

    async fn authenticate(&self) -> ServiceResult<Token> {
        info!("requesting access token for client {}", self.credentials.client_id());
        let request = self
            .client
            .post(TOKEN_URI)
            .basic_auth(
                self.credentials.client_id(),
                Some(self.credentials.client_secret()),
            )
            .form(&self.credentials.grant().form());
        let resp = self
            .with_user_agent(request)
            .send()
            .await
            .map_err(HTTPError::from)?;
        let body = Self::read_json(resp).await?;

        match serde_json::from_str::<TokenResponse>(&body) {
            Ok(TokenResponse::Issued {
                access_token,
                expires_in,
            }) => Ok(Token::new(access_token, expires_in, &self.clock)),
            Ok(TokenResponse::Refused { error }) => {
                let reason = error.as_str().map(String::from).unwrap_or(error.to_string());
                Err(ServiceError::Auth(reason))
            }
            Err(err) => Err(ServiceError::Auth(format!("unreadable token response: {err}"))),
        }
    }

    async fn read_json(resp: Response) -> ServiceResult<String> {
        if !resp.status().is_success() {
            return Err(HTTPError::Http(resp.status()).into());
        }

        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .ok_or(HTTPError::MissingContentType)?
            .to_str()
            .map_err(HTTPError::from)?
            .to_string();
        if !content_type.starts_with("application/json") {
            Err(HTTPError::UnexpectedContentType(content_type).into())
        } else {
            Ok(resp.text().await.map_err(HTTPError::from)?)
        }
    }
}

impl Service for RedditService {
    async fn get_resource(&self, resource: &str, params: &Params<'_>) -> ServiceResult<String> {
        let token = self.access_token().await?;
        let uri = self.uri(resource);
        debug!("GET {uri} {params:?}");
        let request = self.client.get(&uri).bearer_auth(token).query(params);
        let resp = self
            .with_user_agent(request)
            .send()
            .await
            .map_err(HTTPError::from)?;
        Self::read_json(resp).await
    }

    async fn post_resource(&self, resource: &str, form: &Params<'_>) -> ServiceResult<String> {
        let token = self.access_token().await?;
        let uri = self.uri(resource);
        debug!("POST {uri} {form:?}");
        let request = self.client.post(&uri).bearer_auth(token).form(form);
        let resp = self
            .with_user_agent(request)
            .send()
            .await
            .map_err(HTTPError::from)?;
        Self::read_json(resp).await
    }
}

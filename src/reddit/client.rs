// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Clients for reading data from the Reddit API.

use crate::reddit::auth::{Credentials, CredentialsError};
use crate::reddit::service::{RedditService, Service, ServiceError};
use crate::reddit::thing::{
    Account, Comment, Listing, Message, Multireddit, Submission, Subreddit, Thing, Thread,
};
use log::debug;
use std::fmt;
use thiserror::Error;
use tokio::sync::OnceCell;

/// A client error.
#[derive(Debug, Error)]
pub enum Error {
    /// Credentials could not be loaded.
    #[error("{0}")]
    Credentials(#[from] CredentialsError),

    /// An error from the underlying HTTP service.
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// An error parsing data.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A username, subreddit, or post ID that Reddit would not accept.
    #[error("Invalid {kind}: '{value}'")]
    InvalidName {
        /// What the value was supposed to name.
        kind: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// The result of a client operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Checks that `value` can stand as one segment of an API path.
///
/// Reddit usernames, subreddit names, and IDs only use ASCII letters,
/// digits, `_`, and `-`.
fn path_segment<'a>(kind: &'static str, value: &'a str) -> Result<&'a str> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(value)
    } else {
        Err(Error::InvalidName {
            kind,
            value: value.to_string(),
        })
    }
}

/// Like [`path_segment`], but also accepts `+`-joined subreddits such as
/// `rust+programming`.
fn subreddit_segment(value: &str) -> Result<&str> {
    for part in value.split('+') {
        path_segment("subreddit", part).map_err(|_| Error::InvalidName {
            kind: "subreddit",
            value: value.to_string(),
        })?;
    }
    Ok(value)
}

/// Identifies a multireddit (custom feed) by its owner and name.
///
/// Feed names can be written as:
///
/// - `name` or `/me/name`: one of your own multireddits
/// - `user/name`: another Redditor's multireddit
/// - `/user/<user>/m/<name>` or `u/<user>/m/<name>`: a multireddit path
///
/// # Examples
///
/// ```
/// use reddit_companion::reddit::client::FeedName;
///
/// assert_eq!(FeedName::parse("thought_garden"), FeedName::Mine("thought_garden".into()));
/// assert_eq!(FeedName::parse("/me/thought_garden"), FeedName::Mine("thought_garden".into()));
/// assert_eq!(
///     FeedName::parse("mipadi/programming"),
///     FeedName::User { username: "mipadi".into(), name: "programming".into() },
/// );
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum FeedName {
    /// A multireddit owned by the authenticated user.
    Mine(String),

    /// A multireddit owned by another Redditor.
    User {
        /// The owner's username.
        username: String,
        /// The multireddit's name.
        name: String,
    },
}

impl FeedName {
    /// Parses a user-supplied feed name.
    pub fn parse(feed: &str) -> Self {
        let parts: Vec<&str> = feed.split('/').filter(|s| !s.is_empty()).collect();
        match parts.as_slice() {
            [name] | ["me", name] => FeedName::Mine(name.to_string()),
            ["user" | "u", username, "m", name] | [username, name] => FeedName::User {
                username: username.to_string(),
                name: name.to_string(),
            },
            _ => FeedName::Mine(feed.trim().to_string()),
        }
    }

    /// The multireddit's name, without its owner.
    pub fn name(&self) -> &str {
        match self {
            FeedName::Mine(name) => name,
            FeedName::User { name, .. } => name,
        }
    }
}

impl fmt::Display for FeedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedName::Mine(name) => write!(f, "{name}"),
            FeedName::User { username, name } => write!(f, "{username}/{name}"),
        }
    }
}

/// A read-only client for the Reddit API.
///
/// `Reddit` performs one bounded request per operation (never more than
/// `limit` items) and parses the response into [things](crate::reddit::thing).
/// The authenticated user's name is fetched once and cached.
pub struct Reddit<S: Service = RedditService> {
    service: S,
    username: OnceCell<String>,
}

impl<S: Service> fmt::Debug for Reddit<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reddit {{ username = {:?} }}", self.username.get())
    }
}

impl Reddit<RedditService> {
    /// Creates a new client that authenticates with credentials from the
    /// environment.
    ///
    /// Returns an [`enum@Error`] if the credentials are incomplete.
    pub fn from_env() -> Result<Self> {
        let credentials = Credentials::from_env()?;
        debug!("loaded {credentials:?}");
        Ok(Self::new(RedditService::new(credentials)))
    }
}

impl<S: Service> Reddit<S> {
    /// Creates a new client that uses `service` to talk to Reddit.
    pub fn new(service: S) -> Self {
        Self {
            service,
            username: OnceCell::new(),
        }
    }

    /// The underlying service.
    pub fn service(&self) -> &S {
        &self.service
    }

    async fn listing(&self, resource: &str, params: &[(&str, String)]) -> Result<Listing> {
        let data = self.service.get_resource(resource, params).await?;
        Ok(Listing::parse(&data)?)
    }

    async fn limited(&self, resource: &str, limit: u32) -> Result<Listing> {
        // Reddit treats limit=0 as "use the default page size".
        if limit == 0 {
            return Ok(Listing::default());
        }
        self.listing(resource, &[("limit", limit.to_string())]).await
    }

    async fn newest(&self, resource: &str, limit: u32) -> Result<Listing> {
        if limit == 0 {
            return Ok(Listing::default());
        }
        let params = [("sort", "new".to_string()), ("limit", limit.to_string())];
        self.listing(resource, &params).await
    }

    /// The authenticated account.
    pub async fn me(&self) -> Result<Account> {
        let data = self.service.get_resource("/api/v1/me", &[]).await?;
        Ok(Account::parse(&data)?)
    }

    /// The authenticated user's name, fetched once and cached.
    pub async fn username(&self) -> Result<&str> {
        let username = self
            .username
            .get_or_try_init(|| async { self.me().await.map(|me| me.name().to_string()) })
            .await?;
        Ok(username)
    }

    /// The authenticated user's multireddits.
    pub async fn my_multireddits(&self) -> Result<Vec<Multireddit>> {
        let data = self.service.get_resource("/api/multi/mine", &[]).await?;
        Ok(Multireddit::parse_all(&data)?)
    }

    /// Another Redditor's public multireddits.
    pub async fn user_multireddits(&self, username: &str) -> Result<Vec<Multireddit>> {
        let username = path_segment("username", username)?;
        let resource = format!("/api/multi/user/{username}");
        let data = self.service.get_resource(&resource, &[]).await?;
        Ok(Multireddit::parse_all(&data)?)
    }

    /// Finds a multireddit by name, case-insensitively.
    ///
    /// Returns `None` if the owner has no multireddit with that name.
    pub async fn find_multireddit(&self, feed: &FeedName) -> Result<Option<Multireddit>> {
        let multis = match feed {
            FeedName::Mine(_) => self.my_multireddits().await?,
            FeedName::User { username, .. } => self.user_multireddits(username).await?,
        };
        Ok(multis
            .into_iter()
            .find(|multi| multi.name().eq_ignore_ascii_case(feed.name())))
    }

    /// "Hot" posts in a multireddit.
    pub async fn multireddit_hot(&self, multi: &Multireddit, limit: u32) -> Result<Vec<Submission>> {
        let resource = format!("{}/hot", multi.path().trim_end_matches('/'));
        Ok(self.limited(&resource, limit).await?.submissions())
    }

    /// "Hot" posts on the authenticated user's front page.
    pub async fn front_page_hot(&self, limit: u32) -> Result<Vec<Submission>> {
        Ok(self.limited("/hot", limit).await?.submissions())
    }

    /// "Hot" posts in a subreddit.
    pub async fn subreddit_hot(&self, subreddit: &str, limit: u32) -> Result<Vec<Submission>> {
        let subreddit = subreddit_segment(subreddit)?;
        let resource = format!("/r/{subreddit}/hot");
        Ok(self.limited(&resource, limit).await?.submissions())
    }

    /// The newest posts in a subreddit. `all` is a valid subreddit.
    pub async fn subreddit_new(&self, subreddit: &str, limit: u32) -> Result<Vec<Submission>> {
        let subreddit = subreddit_segment(subreddit)?;
        let resource = format!("/r/{subreddit}/new");
        Ok(self.limited(&resource, limit).await?.submissions())
    }

    /// A submission and its loaded comments.
    pub async fn submission(&self, id: &str) -> Result<Thread> {
        let id = path_segment("post ID", id.trim().trim_start_matches("t3_"))?;
        let resource = format!("/comments/{id}");
        let data = self.service.get_resource(&resource, &[]).await?;
        Ok(Thread::parse(&data)?)
    }

    /// A Redditor's most recent submissions, newest first.
    pub async fn user_submissions(&self, username: &str, limit: u32) -> Result<Vec<Submission>> {
        let username = path_segment("username", username)?;
        let resource = format!("/user/{username}/submitted");
        Ok(self.newest(&resource, limit).await?.submissions())
    }

    /// A Redditor's most recent comments, newest first.
    pub async fn user_comments(&self, username: &str, limit: u32) -> Result<Vec<Comment>> {
        let username = path_segment("username", username)?;
        let resource = format!("/user/{username}/comments");
        Ok(self.newest(&resource, limit).await?.comments())
    }

    /// Unread private messages and comment notifications.
    pub async fn unread_messages(&self, limit: u32) -> Result<Vec<Message>> {
        Ok(self.limited("/message/unread", limit).await?.messages())
    }

    /// Marks messages read, given their fullnames.
    pub async fn mark_read(&self, fullnames: &[&str]) -> Result<()> {
        if fullnames.is_empty() {
            return Ok(());
        }
        let form = [("id", fullnames.join(","))];
        self.service.post_resource("/api/read_message", &form).await?;
        Ok(())
    }

    /// Submissions and comments the authenticated user has saved.
    pub async fn saved(&self, limit: u32) -> Result<Vec<Thing>> {
        let resource = format!("/user/{}/saved", self.username().await?);
        Ok(self.limited(&resource, limit).await?.things())
    }

    /// Submissions the authenticated user has upvoted.
    pub async fn upvoted(&self, limit: u32) -> Result<Vec<Submission>> {
        let resource = format!("/user/{}/upvoted", self.username().await?);
        Ok(self.limited(&resource, limit).await?.submissions())
    }

    /// Subreddits the authenticated user subscribes to.
    pub async fn subscriptions(&self, limit: u32) -> Result<Vec<Subreddit>> {
        let listing = self.limited("/subreddits/mine/subscriber", limit).await?;
        Ok(listing.subreddits())
    }
}

#[cfg(test)]
mod tests {
    mod feed_name {
        use crate::reddit::client::FeedName;

        #[test]
        fn it_parses_a_bare_name() {
            assert_eq!(FeedName::parse("zen"), FeedName::Mine("zen".to_string()));
        }

        #[test]
        fn it_parses_my_feeds() {
            assert_eq!(FeedName::parse("/me/zen"), FeedName::Mine("zen".to_string()));
            assert_eq!(FeedName::parse("me/zen"), FeedName::Mine("zen".to_string()));
        }

        #[test]
        fn it_parses_other_users_feeds() {
            let expected = FeedName::User {
                username: "mipadi".to_string(),
                name: "zen".to_string(),
            };
            assert_eq!(FeedName::parse("mipadi/zen"), expected);
            assert_eq!(FeedName::parse("/user/mipadi/m/zen"), expected);
            assert_eq!(FeedName::parse("u/mipadi/m/zen/"), expected);
        }

        #[test]
        fn it_keeps_unrecognized_names_intact() {
            let feed = FeedName::parse("a/b/c");
            assert_eq!(feed, FeedName::Mine("a/b/c".to_string()));
        }

        #[test]
        fn it_displays_itself() {
            assert_eq!(FeedName::parse("/me/zen").to_string(), "zen");
            assert_eq!(FeedName::parse("mipadi/zen").to_string(), "mipadi/zen");
        }
    }

    mod reddit {
        use crate::reddit::client::{Error, FeedName};
        use crate::reddit::Reddit;
        use crate::reddit::service::ServiceError;

        #[tokio::test]
        async fn it_returns_the_current_username() {
            let reddit = Reddit::test();
            assert_eq!(reddit.username().await.unwrap(), "test_user");
        }

        #[tokio::test]
        async fn it_caches_the_current_username() {
            let reddit = Reddit::test();
            reddit.username().await.unwrap();
            reddit.username().await.unwrap();
            assert_eq!(reddit.service().requests(), vec!["GET /api/v1/me"]);
        }

        #[tokio::test]
        async fn it_finds_my_multireddits() {
            let reddit = Reddit::test();
            let multi = reddit
                .find_multireddit(&FeedName::parse("Thought_Garden"))
                .await
                .unwrap()
                .unwrap();
            assert_eq!(multi.name(), "thought_garden");
        }

        #[tokio::test]
        async fn it_finds_other_users_multireddits() {
            let reddit = Reddit::test();
            let multi = reddit
                .find_multireddit(&FeedName::parse("spez/announcements"))
                .await
                .unwrap()
                .unwrap();
            assert_eq!(multi.path(), "/user/spez/m/announcements");
            assert_eq!(reddit.service().requests(), vec!["GET /api/multi/user/spez"]);
        }

        #[tokio::test]
        async fn it_does_not_find_missing_multireddits() {
            let reddit = Reddit::test();
            let multi = reddit
                .find_multireddit(&FeedName::parse("nope"))
                .await
                .unwrap();
            assert!(multi.is_none());
        }

        #[tokio::test]
        async fn it_sends_limits() {
            let reddit = Reddit::test();
            let posts = reddit.subreddit_new("all", 20).await.unwrap();
            assert_eq!(posts.len(), 2);
            assert_eq!(reddit.service().requests(), vec!["GET /r/all/new?limit=20"]);
        }

        #[tokio::test]
        async fn it_sorts_user_listings_by_newest() {
            let reddit = Reddit::test();
            reddit.user_comments("test_user", 10).await.unwrap();
            assert_eq!(
                reddit.service().requests(),
                vec!["GET /user/test_user/comments?sort=new&limit=10"]
            );
        }

        #[tokio::test]
        async fn it_does_not_request_empty_pages() {
            let reddit = Reddit::test();
            let posts = reddit.front_page_hot(0).await.unwrap();
            assert!(posts.is_empty());
            assert!(reddit.service().requests().is_empty());
        }

        #[tokio::test]
        async fn it_strips_fullname_prefixes_from_submission_ids() {
            let reddit = Reddit::test();
            let thread = reddit.submission("t3_1o2a1b").await.unwrap();
            assert_eq!(thread.submission().id(), "1o2a1b");
            assert_eq!(reddit.service().requests(), vec!["GET /comments/1o2a1b"]);
        }

        #[tokio::test]
        async fn it_rejects_post_ids_that_escape_their_path() {
            let reddit = Reddit::test();
            let err = reddit.submission("../api/v1/me").await.unwrap_err();
            assert!(matches!(err, Error::InvalidName { kind: "post ID", .. }));
            assert_eq!(err.to_string(), "Invalid post ID: '../api/v1/me'");
            assert!(reddit.service().requests().is_empty());
        }

        #[tokio::test]
        async fn it_rejects_subreddits_with_query_characters() {
            let reddit = Reddit::test();
            for name in ["rust?x", "a#b", "rust/../all", ""] {
                let err = reddit.subreddit_hot(name, 10).await.unwrap_err();
                assert!(matches!(err, Error::InvalidName { kind: "subreddit", .. }), "{name}");
            }
            assert!(reddit.service().requests().is_empty());
        }

        #[tokio::test]
        async fn it_accepts_combined_subreddits() {
            let reddit = Reddit::test();
            let _ = reddit.subreddit_new("rust+golang", 5).await;
            assert_eq!(reddit.service().requests(), vec!["GET /r/rust+golang/new?limit=5"]);
        }

        #[tokio::test]
        async fn it_rejects_invalid_usernames() {
            let reddit = Reddit::test();
            let err = reddit.user_multireddits("spez?x=1").await.unwrap_err();
            assert_eq!(err.to_string(), "Invalid username: 'spez?x=1'");
            assert!(reddit.service().requests().is_empty());
        }

        #[tokio::test]
        async fn it_marks_messages_read_in_one_request() {
            let reddit = Reddit::test();
            reddit.mark_read(&["t4_a", "t1_b"]).await.unwrap();
            assert_eq!(
                reddit.service().requests(),
                vec!["POST /api/read_message?id=t4_a,t1_b"]
            );
        }

        #[tokio::test]
        async fn it_skips_marking_nothing_read() {
            let reddit = Reddit::test();
            reddit.mark_read(&[]).await.unwrap();
            assert!(reddit.service().requests().is_empty());
        }

        #[tokio::test]
        async fn it_returns_service_errors() {
            let reddit = Reddit::test();
            let err = reddit.submission("doesnotexist").await.unwrap_err();
            assert!(matches!(err, Error::Service(ServiceError::Http(_))));
        }

        #[tokio::test]
        async fn it_returns_authentication_errors() {
            let reddit = Reddit::test_unauthorized();
            let err = reddit.me().await.unwrap_err();
            assert!(matches!(err, Error::Service(ServiceError::Auth(_))));
            assert_eq!(err.to_string(), "Service error: Authentication failed: invalid_grant");
        }
    }
}

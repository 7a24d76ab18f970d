// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! A "thing" in the Reddit sense.
//!
//! Historically in the Reddit API and its old source code, a "Thing" was
//! any element of the Reddit system: users, posts, comments, etc. This
//! module encapsulates that idea and provides an easy way to more or less
//! work with JSON data from the Reddit API.
//!
//! Everything here is read-only: things are parsed from a response,
//! formatted, and dropped.

use crate::clock::HasAge;
use crate::text::convert_html_entities;
use serde::de::{self, Deserializer};
use serde::Deserialize;

/// The result of parsing a Reddit API response.
pub type ParseResult<T> = Result<T, serde_json::Error>;

/// Display name used when an author has deleted their account.
const DELETED: &str = "[deleted]";

/// Base URI for permalinks.
const PERMALINK_BASE: &str = "https://reddit.com";

/// A page of things returned by a Reddit API listing endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct Listing {
    #[serde(default)]
    data: ListingData,
}

#[derive(Debug, Default, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Thing>,
}

/// Any kind of Reddit object that can appear in a [`Listing`].
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum Thing {
    /// A comment.
    #[serde(rename = "t1")]
    Comment(Comment),

    /// A link or self post.
    #[serde(rename = "t3")]
    Submission(Submission),

    /// A private message.
    #[serde(rename = "t4")]
    Message(Message),

    /// A subreddit.
    #[serde(rename = "t5")]
    Subreddit(Subreddit),

    /// A stub standing in for comments that were not loaded.
    #[serde(rename = "more")]
    More(More),
}

/// A Reddit post.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Submission {
    id: String,
    title: String,
    subreddit: String,
    score: i64,
    author: Option<String>,
    url: String,
    permalink: String,
    selftext: String,
    num_comments: u64,
    upvote_ratio: f64,
    view_count: Option<u64>,
    created_utc: f64,
}

/// A Reddit comment.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Comment {
    name: String,
    author: Option<String>,
    score: i64,
    body: String,
    subreddit: String,
    permalink: String,
    link_title: Option<String>,
    subject: Option<String>,
    created_utc: f64,
    #[serde(deserialize_with = "deserialize_replies")]
    replies: Vec<Comment>,
}

/// A private message, or an inbox notification about a comment.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Message {
    name: String,
    author: Option<String>,
    subject: String,
    body: String,
    created_utc: f64,
}

/// A subreddit.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Subreddit {
    display_name: String,
    title: String,
    subscribers: Option<u64>,
    public_description: String,
}

/// Placeholder for comments that Reddit did not include in a response.
///
/// These are always discarded; loading them would require additional
/// requests for every stub.
#[derive(Debug, Default, Deserialize)]
pub struct More {}

/// A multireddit, or "custom feed": a named collection of subreddits.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Multireddit {
    name: String,
    path: String,
}

#[derive(Debug, Deserialize)]
struct LabeledMulti {
    data: Multireddit,
}

/// The currently authenticated Reddit account.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Account {
    name: String,
}

/// A submission together with its comment forest, as returned by
/// `/comments/<id>`.
#[derive(Debug)]
pub struct Thread {
    submission: Submission,
    comments: Vec<Comment>,
}

fn deserialize_replies<'de, D>(deserializer: D) -> Result<Vec<Comment>, D::Error>
where
    D: Deserializer<'de>,
{
    // Reddit sends an empty string instead of an empty listing when a
    // comment has no replies.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Replies {
        Listing(Listing),
        Empty(String),
    }

    Ok(match Option::<Replies>::deserialize(deserializer)? {
        Some(Replies::Listing(listing)) => listing.comments(),
        Some(Replies::Empty(_)) | None => vec![],
    })
}

fn author_or_deleted(author: &Option<String>) -> &str {
    author.as_deref().unwrap_or(DELETED)
}

fn permalink(path: &str) -> String {
    format!("{PERMALINK_BASE}{path}")
}

impl Listing {
    /// Parses a text response from a Reddit listing endpoint.
    pub fn parse(data: &str) -> ParseResult<Self> {
        serde_json::from_str(data)
    }

    /// All things in the listing, in order.
    pub fn things(self) -> Vec<Thing> {
        self.data.children
    }

    /// Only the submissions in the listing.
    pub fn submissions(self) -> Vec<Submission> {
        self.things()
            .into_iter()
            .filter_map(|thing| match thing {
                Thing::Submission(submission) => Some(submission),
                _ => None,
            })
            .collect()
    }

    /// Only the comments in the listing; [`More`] stubs are dropped.
    pub fn comments(self) -> Vec<Comment> {
        self.things()
            .into_iter()
            .filter_map(|thing| match thing {
                Thing::Comment(comment) => Some(comment),
                _ => None,
            })
            .collect()
    }

    /// Private messages and comment notifications, as found in the inbox.
    pub fn messages(self) -> Vec<Message> {
        self.things()
            .into_iter()
            .filter_map(|thing| match thing {
                Thing::Message(message) => Some(message),
                Thing::Comment(comment) => Some(Message::from(comment)),
                _ => None,
            })
            .collect()
    }

    /// Only the subreddits in the listing.
    pub fn subreddits(self) -> Vec<Subreddit> {
        self.things()
            .into_iter()
            .filter_map(|thing| match thing {
                Thing::Subreddit(subreddit) => Some(subreddit),
                _ => None,
            })
            .collect()
    }
}

impl Submission {
    /// The submission's ID, without the `t3_` prefix.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The submission's title, with HTML entities decoded.
    pub fn title(&self) -> String {
        convert_html_entities(&self.title)
    }

    /// The subreddit the submission was posted to, without the `r/` prefix.
    pub fn subreddit(&self) -> &str {
        &self.subreddit
    }

    /// The submission's score.
    pub fn score(&self) -> i64 {
        self.score
    }

    /// The submitter's username, or `[deleted]`.
    pub fn author(&self) -> &str {
        author_or_deleted(&self.author)
    }

    /// The URL the submission links to. For self posts, this is the
    /// submission's own URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The full URL of the submission on Reddit.
    pub fn link(&self) -> String {
        permalink(&self.permalink)
    }

    /// The body of a self post, with HTML entities decoded. Empty for
    /// link posts.
    pub fn selftext(&self) -> String {
        convert_html_entities(&self.selftext)
    }

    /// Number of comments on the submission.
    pub fn num_comments(&self) -> u64 {
        self.num_comments
    }

    /// Fraction of votes that are upvotes, between 0 and 1.
    pub fn upvote_ratio(&self) -> f64 {
        self.upvote_ratio
    }

    /// Number of views, if Reddit reports it (usually it does not).
    pub fn view_count(&self) -> Option<u64> {
        self.view_count
    }
}

impl HasAge for Submission {
    fn created_timestamp(&self) -> f64 {
        self.created_utc
    }
}

impl Comment {
    /// The commenter's username, or `[deleted]`.
    pub fn author(&self) -> &str {
        author_or_deleted(&self.author)
    }

    /// The comment's score.
    pub fn score(&self) -> i64 {
        self.score
    }

    /// The comment's Markdown body, with HTML entities decoded.
    pub fn body(&self) -> String {
        convert_html_entities(&self.body)
    }

    /// The subreddit the comment was posted in.
    pub fn subreddit(&self) -> &str {
        &self.subreddit
    }

    /// The full URL of the comment on Reddit.
    pub fn link(&self) -> String {
        permalink(&self.permalink)
    }

    /// Title of the submission the comment belongs to, when Reddit
    /// includes it (user and inbox listings do, threads do not).
    pub fn link_title(&self) -> Option<String> {
        self.link_title.as_deref().map(convert_html_entities)
    }

    /// Direct replies to this comment that were loaded with it.
    pub fn replies(&self) -> &[Comment] {
        &self.replies
    }
}

impl From<Comment> for Message {
    /// Inbox listings report replies to your comments and posts as
    /// comments rather than messages.
    fn from(comment: Comment) -> Self {
        let subject = comment
            .subject
            .clone()
            .or_else(|| comment.link_title())
            .unwrap_or_else(|| "comment reply".to_string());
        Self {
            name: comment.name,
            author: comment.author,
            subject,
            body: comment.body,
            created_utc: comment.created_utc,
        }
    }
}

impl Message {
    /// The message's fullname, e.g., `t4_abc123`. This is the identifier
    /// used to mark the message read.
    pub fn fullname(&self) -> &str {
        &self.name
    }

    /// The sender's username, or `[deleted]`. System messages have no sender.
    pub fn author(&self) -> &str {
        author_or_deleted(&self.author)
    }

    /// The message subject, with HTML entities decoded.
    pub fn subject(&self) -> String {
        convert_html_entities(&self.subject)
    }

    /// The message body, with HTML entities decoded.
    pub fn body(&self) -> String {
        convert_html_entities(&self.body)
    }
}

impl HasAge for Message {
    fn created_timestamp(&self) -> f64 {
        self.created_utc
    }
}

impl Subreddit {
    /// The subreddit's name, without the `r/` prefix.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// The subreddit's title, with HTML entities decoded.
    pub fn title(&self) -> String {
        convert_html_entities(&self.title)
    }

    /// Number of subscribers, if known.
    pub fn subscribers(&self) -> Option<u64> {
        self.subscribers
    }

    /// The subreddit's short public description, with HTML entities decoded.
    pub fn description(&self) -> String {
        convert_html_entities(&self.public_description)
    }
}

impl Multireddit {
    /// Parses the response of `/api/multi/mine` or `/api/multi/user/<user>`.
    pub fn parse_all(data: &str) -> ParseResult<Vec<Self>> {
        let multis: Vec<LabeledMulti> = serde_json::from_str(data)?;
        Ok(multis.into_iter().map(|multi| multi.data).collect())
    }

    /// The multireddit's short name, as used in its URL.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The multireddit's path, e.g., `/user/mipadi/m/programming`.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Account {
    /// Parses the response of `/api/v1/me`.
    pub fn parse(data: &str) -> ParseResult<Self> {
        serde_json::from_str(data)
    }

    /// The account's username.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Thread {
    /// Parses the response of `/comments/<id>`, which is a pair of
    /// listings: the first holds the submission, the second its comments.
    ///
    /// [`More`] stubs are removed from the comment forest at every level.
    pub fn parse(data: &str) -> ParseResult<Self> {
        let (post, comments): (Listing, Listing) = serde_json::from_str(data)?;
        let submission = post
            .submissions()
            .into_iter()
            .next()
            .ok_or_else(|| {
                <serde_json::Error as de::Error>::custom("thread does not contain a submission")
            })?;
        let comments = comments.comments();
        Ok(Self {
            submission,
            comments,
        })
    }

    /// The submission at the top of the thread.
    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    /// Top-level comments, in the order Reddit returned them.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::load_data;

    mod listing {
        use super::*;

        #[test]
        fn it_parses_submissions() {
            let listing = Listing::parse(&load_data("r_all_new")).unwrap();
            let posts = listing.submissions();
            assert_eq!(posts.len(), 2);
            assert_eq!(posts[0].id(), "1o2a1b");
        }

        #[test]
        fn it_parses_an_empty_listing() {
            let listing = Listing::parse(r#"{"kind": "Listing", "data": {"children": []}}"#).unwrap();
            assert!(listing.things().is_empty());
        }

        #[test]
        fn it_separates_mixed_things() {
            let listing = Listing::parse(&load_data("user_test_user_saved")).unwrap();
            let things = listing.things();
            assert_eq!(things.len(), 2);
            assert!(matches!(things[0], Thing::Submission(_)));
            assert!(matches!(things[1], Thing::Comment(_)));
        }

        #[test]
        fn it_treats_inbox_comments_as_messages() {
            let messages = Listing::parse(&load_data("message_unread")).unwrap().messages();
            assert_eq!(messages.len(), 2);
            assert_eq!(messages[0].fullname(), "t4_2abcde");
            assert_eq!(messages[1].fullname(), "t1_nq1r2s3");
            assert_eq!(messages[1].subject(), "comment reply");
        }

        #[test]
        fn it_parses_subreddits() {
            let subs = Listing::parse(&load_data("subreddits_mine_subscriber"))
                .unwrap()
                .subreddits();
            assert_eq!(subs.len(), 2);
            assert_eq!(subs[0].display_name(), "rust");
            assert_eq!(subs[0].subscribers(), Some(356000));
        }

        #[test]
        fn it_fails_on_garbage() {
            assert!(Listing::parse("<html>Too Many Requests</html>").is_err());
        }
    }

    mod submission {
        use super::*;

        #[test]
        fn it_decodes_html_entities_in_titles() {
            let json = r#"{"title": "Tips &amp; tricks for &lt;Option&gt;"}"#;
            let post: Submission = serde_json::from_str(json).unwrap();
            assert_eq!(post.title(), "Tips & tricks for <Option>");
        }

        #[test]
        fn it_reports_deleted_authors() {
            let json = r#"{"title": "Gone", "author": null}"#;
            let post: Submission = serde_json::from_str(json).unwrap();
            assert_eq!(post.author(), "[deleted]");
        }

        #[test]
        fn it_builds_a_link_from_its_permalink() {
            let json = r#"{"permalink": "/r/rust/comments/abc/title/"}"#;
            let post: Submission = serde_json::from_str(json).unwrap();
            assert_eq!(post.link(), "https://reddit.com/r/rust/comments/abc/title/");
        }

        #[test]
        fn it_defaults_missing_view_counts() {
            let json = r#"{"view_count": null, "upvote_ratio": 0.97}"#;
            let post: Submission = serde_json::from_str(json).unwrap();
            assert_eq!(post.view_count(), None);
            assert_eq!(post.upvote_ratio(), 0.97);
        }
    }

    mod thread {
        use super::*;

        #[test]
        fn it_parses_a_submission_and_its_comments() {
            let thread = Thread::parse(&load_data("comments_1o2a1b")).unwrap();
            assert_eq!(thread.submission().id(), "1o2a1b");
            assert_eq!(thread.comments().len(), 3);
        }

        #[test]
        fn it_parses_nested_replies() {
            let thread = Thread::parse(&load_data("comments_1o2a1b")).unwrap();
            let first = &thread.comments()[0];
            assert_eq!(first.author(), "ferris");
            assert_eq!(first.replies().len(), 2);
            assert_eq!(first.replies()[0].replies().len(), 1);
            assert!(first.replies()[0].replies()[0].replies().is_empty());
        }

        #[test]
        fn it_removes_more_comments_stubs() {
            let thread = Thread::parse(&load_data("comments_1o2a1b")).unwrap();
            let ids: Vec<_> = thread.comments().iter().map(|c| c.name.as_str()).collect();
            assert_eq!(ids, vec!["t1_c1", "t1_c2", "t1_c3"]);
        }

        #[test]
        fn it_fails_without_a_submission() {
            let json = r#"[{"kind": "Listing", "data": {"children": []}},
                           {"kind": "Listing", "data": {"children": []}}]"#;
            let err = Thread::parse(json).unwrap_err();
            assert!(err.to_string().contains("does not contain a submission"));
        }
    }

    mod multireddit {
        use super::*;

        #[test]
        fn it_parses_multireddits() {
            let multis = Multireddit::parse_all(&load_data("api_multi_mine")).unwrap();
            assert_eq!(multis.len(), 2);
            assert_eq!(multis[0].name(), "thought_garden");
            assert_eq!(multis[0].path(), "/user/test_user/m/thought_garden");
        }
    }

    mod account {
        use super::*;

        #[test]
        fn it_parses_the_current_account() {
            let account = Account::parse(&load_data("api_v1_me")).unwrap();
            assert_eq!(account.name(), "test_user");
        }
    }
}

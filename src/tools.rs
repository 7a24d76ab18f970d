// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Operations exposed to agents.
//!
//! Each tool makes a bounded number of requests through a [`Reddit`] client
//! and renders the result as plain text. Tools return typed errors; callers
//! decide how to present them.

use crate::reddit::Reddit;
use crate::reddit::client::{FeedName, Result};
use crate::reddit::service::Service;
use crate::reddit::thing::{Comment, Thing};
use crate::view::{Layout, ViewOptions, Viewable};
use log::{debug, info};

/// Posts fetched by `get_custom_feed` when no limit is given.
pub const DEFAULT_FEED_LIMIT: u32 = 10;

/// Posts fetched per feed by `read_custom_feeds` when no limit is given.
pub const DEFAULT_LIMIT_PER_FEED: u32 = 5;

/// Posts fetched by `read_new_posts` when no limit is given.
pub const DEFAULT_NEW_POSTS_LIMIT: u32 = 20;

/// Posts fetched by `get_home_feed` when no limit is given.
pub const DEFAULT_HOME_LIMIT: u32 = 10;

/// Posts fetched by `get_subreddit_posts` when no limit is given.
pub const DEFAULT_SUBREDDIT_LIMIT: u32 = 10;

/// Top-level comments shown by `get_post_comments` when no limit is given.
pub const DEFAULT_COMMENTS_LIMIT: u32 = 10;

/// Items fetched by `get_user_activity` when no limit is given, split
/// evenly between posts and comments.
pub const DEFAULT_ACTIVITY_LIMIT: u32 = 20;

/// Recent posts analyzed by `get_post_engagement` when no limit is given.
pub const DEFAULT_ENGAGEMENT_LIMIT: u32 = 5;

/// Messages fetched by `get_unread_messages` when no limit is given.
pub const DEFAULT_MESSAGES_LIMIT: u32 = 10;

/// Items fetched by `get_saved_items` when no limit is given.
pub const DEFAULT_SAVED_LIMIT: u32 = 10;

/// Posts fetched by `get_upvoted_posts` when no limit is given.
pub const DEFAULT_UPVOTED_LIMIT: u32 = 10;

/// Subreddits fetched by `get_subscriptions` when no limit is given.
pub const DEFAULT_SUBSCRIPTIONS_LIMIT: u32 = 25;

/// Comment trees shown for a single post's engagement.
const ENGAGEMENT_COMMENTS: usize = 10;

/// Comment trees shown per post in a recent-posts engagement report.
const ENGAGEMENT_TOP_COMMENTS: usize = 3;

/// Joins a header and rendered items with newlines, or returns `empty`
/// if there are no items.
fn section<T: Viewable>(header: &str, items: &[T], opts: &ViewOptions, empty: &str) -> String {
    if items.is_empty() {
        return empty.to_string();
    }
    std::iter::once(header.to_string())
        .chain(items.iter().map(|item| item.view(opts)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn comment_trees(comments: &[Comment], limit: usize, reply_limit: usize) -> String {
    let opts = ViewOptions::build()
        .layout(Layout::Thread)
        .reply_limit(reply_limit)
        .build();
    comments
        .iter()
        .take(limit)
        .map(|comment| comment.view(&opts))
        .collect()
}

/// Posts from one of the user's custom feeds (multireddits).
///
/// `feed_name` may name one of the authenticated user's feeds (`zen` or
/// `/me/zen`) or another Redditor's (`mipadi/zen`).
pub async fn get_custom_feed<S: Service>(
    reddit: &Reddit<S>,
    feed_name: &str,
    limit: u32,
) -> Result<String> {
    let feed = FeedName::parse(feed_name);
    let Some(multi) = reddit.find_multireddit(&feed).await? else {
        info!("no multireddit named {feed}");
        return Ok(format!("Multireddit '{feed_name}' not found"));
    };

    let posts = reddit.multireddit_hot(&multi, limit).await?;
    if posts.is_empty() {
        return Ok("No posts found".to_string());
    }
    let opts = ViewOptions::layout(Layout::Feed);
    Ok(posts
        .iter()
        .map(|post| post.view(&opts))
        .collect::<Vec<_>>()
        .join("\n\n"))
}

/// Posts from every one of the user's custom feeds.
///
/// Feeds without posts keep their header unless no feed has any posts.
pub async fn read_custom_feeds<S: Service>(reddit: &Reddit<S>, limit_per_feed: u32) -> Result<String> {
    let multis = reddit.my_multireddits().await?;
    if multis.is_empty() {
        return Ok("No custom feeds found".to_string());
    }

    let opts = ViewOptions::layout(Layout::Feed);
    let mut parts = vec![];
    let mut found = false;
    for multi in &multis {
        debug!("reading feed {}", multi.name());
        parts.push(format!("\n=== Posts from feed: {} ===\n", multi.name()));
        let posts = reddit.multireddit_hot(multi, limit_per_feed).await?;
        found |= !posts.is_empty();
        parts.extend(posts.iter().map(|post| post.view(&opts)));
    }
    if !found {
        return Ok("No posts found".to_string());
    }
    Ok(parts.join("\n"))
}

/// The newest posts across all of Reddit.
pub async fn read_new_posts<S: Service>(reddit: &Reddit<S>, limit: u32) -> Result<String> {
    let posts = reddit.subreddit_new("all", limit).await?;
    Ok(section(
        "\n=== Latest Posts ===\n",
        &posts,
        &ViewOptions::layout(Layout::Feed),
        "No posts found",
    ))
}

/// Hot posts on the user's front page.
pub async fn get_home_feed<S: Service>(reddit: &Reddit<S>, limit: u32) -> Result<String> {
    let posts = reddit.front_page_hot(limit).await?;
    Ok(section(
        "\n=== Home Feed ===\n",
        &posts,
        &ViewOptions::layout(Layout::Feed),
        "No posts found",
    ))
}

/// Hot posts in a single subreddit. A leading `r/` is ignored.
pub async fn get_subreddit_posts<S: Service>(
    reddit: &Reddit<S>,
    subreddit: &str,
    limit: u32,
) -> Result<String> {
    let subreddit = subreddit.trim().trim_start_matches('/').trim_start_matches("r/");
    let posts = reddit.subreddit_hot(subreddit, limit).await?;
    Ok(section(
        &format!("\n=== Hot in r/{subreddit} ===\n"),
        &posts,
        &ViewOptions::layout(Layout::Feed),
        "No posts found",
    ))
}

/// A post, its body, and its first `limit` comment trees.
pub async fn get_post_comments<S: Service>(
    reddit: &Reddit<S>,
    post_id: &str,
    limit: u32,
) -> Result<String> {
    let thread = reddit.submission(post_id).await?;
    let post = thread.submission();

    let mut content = post.view(&ViewOptions::layout(Layout::Detail));
    let selftext = post.selftext();
    if !selftext.is_empty() {
        content += &format!("\nContent:\n{selftext}\n");
    }
    content += "\nComments:\n";
    content += &comment_trees(thread.comments(), limit as usize, limit as usize);
    Ok(content)
}

/// The user's newest posts and comments, `limit / 2` of each.
pub async fn get_user_activity<S: Service>(reddit: &Reddit<S>, limit: u32) -> Result<String> {
    let username = reddit.username().await?;
    let posts = reddit.user_submissions(username, limit / 2).await?;
    let comments = reddit.user_comments(username, limit / 2).await?;
    if posts.is_empty() && comments.is_empty() {
        return Ok("No recent activity found".to_string());
    }

    let opts = ViewOptions::layout(Layout::Activity);
    let mut parts = vec![
        "\n=== Your Recent Activity ===\n".to_string(),
        "\nRecent Posts:\n".to_string(),
    ];
    parts.extend(posts.iter().map(|post| post.view(&opts)));
    parts.push("\nRecent Comments:\n".to_string());
    parts.extend(comments.iter().map(|comment| comment.view(&opts)));
    Ok(parts.join("\n"))
}

/// Engagement metrics for one post, or for the user's `limit` newest posts
/// when no (or an empty) `post_id` is given.
pub async fn get_post_engagement<S: Service>(
    reddit: &Reddit<S>,
    post_id: Option<&str>,
    limit: u32,
) -> Result<String> {
    let metrics = ViewOptions::layout(Layout::Engagement);

    if let Some(post_id) = post_id.map(str::trim).filter(|id| !id.is_empty()) {
        let thread = reddit.submission(post_id).await?;
        let mut content = String::from("\n=== Post Engagement Metrics ===\n");
        content += &thread.submission().view(&metrics);
        content += "\nRecent Comments:\n";
        content += &comment_trees(thread.comments(), ENGAGEMENT_COMMENTS, ENGAGEMENT_COMMENTS);
        return Ok(content);
    }

    let username = reddit.username().await?;
    let posts = reddit.user_submissions(username, limit).await?;
    if posts.is_empty() {
        return Ok("No recent posts found".to_string());
    }

    let mut content = String::from("\n=== Recent Posts Engagement ===\n");
    for post in &posts {
        let thread = reddit.submission(post.id()).await?;
        content += "\n";
        content += &post.view(&metrics);
        content += "\nTop Comments:\n";
        content += &comment_trees(
            thread.comments(),
            ENGAGEMENT_TOP_COMMENTS,
            ENGAGEMENT_TOP_COMMENTS,
        );
        content += "\n---\n";
    }
    Ok(content)
}

/// Unread messages and notifications, optionally marking them read.
///
/// Messages are marked read in a single request, after they have been
/// formatted, so a failure to mark them leaves them unread.
pub async fn get_unread_messages<S: Service>(
    reddit: &Reddit<S>,
    limit: u32,
    mark_read: bool,
) -> Result<String> {
    let messages = reddit.unread_messages(limit).await?;
    let content = section(
        "\n=== Unread Messages ===\n",
        &messages,
        &ViewOptions::default(),
        "No unread messages",
    );

    if mark_read {
        let fullnames: Vec<&str> = messages.iter().map(|msg| msg.fullname()).collect();
        reddit.mark_read(&fullnames).await?;
    }
    Ok(content)
}

/// Posts and comments the user has saved.
pub async fn get_saved_items<S: Service>(reddit: &Reddit<S>, limit: u32) -> Result<String> {
    let things = reddit.saved(limit).await?;
    if things.is_empty() {
        return Ok("No saved items found".to_string());
    }

    let mut parts = vec!["\n=== Saved Items ===\n".to_string()];
    for thing in &things {
        let layout = match thing {
            Thing::Comment(_) => Layout::Activity,
            _ => Layout::Feed,
        };
        let view = thing.view(&ViewOptions::layout(layout));
        if !view.is_empty() {
            parts.push(view);
        }
    }
    Ok(parts.join("\n"))
}

/// Posts the user has upvoted.
pub async fn get_upvoted_posts<S: Service>(reddit: &Reddit<S>, limit: u32) -> Result<String> {
    let posts = reddit.upvoted(limit).await?;
    Ok(section(
        "\n=== Upvoted Posts ===\n",
        &posts,
        &ViewOptions::layout(Layout::Feed),
        "No upvoted posts found",
    ))
}

/// Subreddits the user subscribes to.
pub async fn get_subscriptions<S: Service>(reddit: &Reddit<S>, limit: u32) -> Result<String> {
    let subs = reddit.subscriptions(limit).await?;
    Ok(section(
        "\n=== Subscribed Subreddits ===\n",
        &subs,
        &ViewOptions::default(),
        "No subscriptions found",
    ))
}

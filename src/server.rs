// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! MCP server exposing the Reddit [tools](crate::tools).
//!
//! The server speaks MCP over stdio, so stdout carries protocol frames
//! only; everything else is logged to stderr.

use crate::reddit::Reddit;
use crate::reddit::client::Result as RedditResult;
use crate::reddit::service::{RedditService, Service};
use crate::tools;
use log::{error, info};
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, ErrorData as McpError, Implementation, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router,
    transport::stdio,
};
use schemars::JsonSchema;
use serde::Deserialize;
use thiserror::Error as ThisError;
use tokio::sync::OnceCell;

/// An error that stops the server.
#[derive(Debug, ThisError)]
pub enum ServeError {
    /// The MCP handshake with the client failed.
    #[error("Could not start MCP server: {0}")]
    Initialize(String),

    /// The server task ended abnormally.
    #[error("MCP server stopped unexpectedly: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Parameters for the get_custom_feed tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CustomFeedParams {
    #[schemars(description = "Name of the custom feed, e.g. thought_garden, or user/name for another user's feed")]
    pub feed_name: String,

    #[schemars(description = "Number of posts to fetch (default: 10)")]
    pub limit: Option<u32>,
}

/// Parameters for the read_custom_feeds tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CustomFeedsParams {
    #[schemars(description = "Number of posts to fetch from each feed (default: 5)")]
    pub limit_per_feed: Option<u32>,
}

/// Parameters for tools that only take a limit.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct LimitParams {
    #[schemars(description = "Number of items to fetch (the default depends on the tool, see its description)")]
    pub limit: Option<u32>,
}

/// Parameters for the get_subreddit_posts tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SubredditParams {
    #[schemars(description = "Subreddit name, with or without the r/ prefix")]
    pub subreddit: String,

    #[schemars(description = "Number of posts to fetch (default: 10)")]
    pub limit: Option<u32>,
}

/// Parameters for the get_post_comments tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct PostCommentsParams {
    #[schemars(description = "Reddit post ID, e.g. 1o2a1b")]
    pub post_id: String,

    #[schemars(description = "Number of top-level comments to fetch (default: 10)")]
    pub limit: Option<u32>,
}

/// Parameters for the get_post_engagement tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct EngagementParams {
    #[schemars(description = "Reddit post ID. If not provided, reports on your recent posts")]
    pub post_id: Option<String>,

    #[schemars(description = "Number of recent posts to analyze if post_id is not provided (default: 5)")]
    pub limit: Option<u32>,
}

/// Parameters for the get_unread_messages tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UnreadMessagesParams {
    #[schemars(description = "Number of messages to fetch (default: 10)")]
    pub limit: Option<u32>,

    #[schemars(description = "Mark the returned messages as read (default: true)")]
    pub mark_read: Option<bool>,
}

/// Builds the Reddit client used by a [`RedditServer`].
pub type Connector<S> = fn() -> RedditResult<Reddit<S>>;

/// The Reddit MCP server.
///
/// The Reddit client is built on the first tool call and shared by every
/// later call. If building it fails (e.g., credentials are missing), the
/// next call tries again.
pub struct RedditServer<S: Service = RedditService> {
    reddit: OnceCell<Reddit<S>>,
    connect: Connector<S>,
    tool_router: ToolRouter<Self>,
}

impl RedditServer {
    /// Creates a new server. No credentials are read until a tool is called.
    pub fn new() -> Self {
        Self::with_connector(Reddit::from_env)
    }
}

impl<S: Service + 'static> RedditServer<S> {
    /// Creates a new server whose client is built by `connect` on the
    /// first tool call.
    pub fn with_connector(connect: Connector<S>) -> Self {
        Self {
            reddit: OnceCell::new(),
            connect,
            tool_router: Self::tool_router(),
        }
    }

    async fn reddit(&self) -> RedditResult<&Reddit<S>> {
        self.reddit
            .get_or_try_init(|| async { (self.connect)() })
            .await
    }
}

impl Default for RedditServer {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts the outcome of a tool into an MCP result.
///
/// Tool failures are reported to the agent as text flagged as an error,
/// not as protocol errors.
fn respond(result: RedditResult<String>) -> std::result::Result<CallToolResult, McpError> {
    match result {
        Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
        Err(err) => {
            error!("An error occurred: {err}");
            Ok(CallToolResult::error(vec![Content::text(format!(
                "An error occurred: {err}"
            ))]))
        }
    }
}

#[tool_router]
impl<S: Service + 'static> RedditServer<S> {
    #[tool(description = "Get posts from a custom feed (multireddit)")]
    async fn get_custom_feed(
        &self,
        Parameters(params): Parameters<CustomFeedParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let limit = params.limit.unwrap_or(tools::DEFAULT_FEED_LIMIT);
        let result = match self.reddit().await {
            Ok(reddit) => tools::get_custom_feed(reddit, &params.feed_name, limit).await,
            Err(err) => Err(err),
        };
        respond(result)
    }

    #[tool(description = "Get posts from all custom feeds (multireddits)")]
    async fn read_custom_feeds(
        &self,
        Parameters(params): Parameters<CustomFeedsParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let limit = params.limit_per_feed.unwrap_or(tools::DEFAULT_LIMIT_PER_FEED);
        let result = match self.reddit().await {
            Ok(reddit) => tools::read_custom_feeds(reddit, limit).await,
            Err(err) => Err(err),
        };
        respond(result)
    }

    #[tool(description = "Get the latest posts from all of Reddit (default limit: 20)")]
    async fn read_new_posts(
        &self,
        Parameters(params): Parameters<LimitParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let limit = params.limit.unwrap_or(tools::DEFAULT_NEW_POSTS_LIMIT);
        let result = match self.reddit().await {
            Ok(reddit) => tools::read_new_posts(reddit, limit).await,
            Err(err) => Err(err),
        };
        respond(result)
    }

    #[tool(description = "Get hot posts from your home feed (default limit: 10)")]
    async fn get_home_feed(
        &self,
        Parameters(params): Parameters<LimitParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let limit = params.limit.unwrap_or(tools::DEFAULT_HOME_LIMIT);
        let result = match self.reddit().await {
            Ok(reddit) => tools::get_home_feed(reddit, limit).await,
            Err(err) => Err(err),
        };
        respond(result)
    }

    #[tool(description = "Get hot posts from a subreddit")]
    async fn get_subreddit_posts(
        &self,
        Parameters(params): Parameters<SubredditParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let limit = params.limit.unwrap_or(tools::DEFAULT_SUBREDDIT_LIMIT);
        let result = match self.reddit().await {
            Ok(reddit) => tools::get_subreddit_posts(reddit, &params.subreddit, limit).await,
            Err(err) => Err(err),
        };
        respond(result)
    }

    #[tool(description = "Get a post's content and its comments")]
    async fn get_post_comments(
        &self,
        Parameters(params): Parameters<PostCommentsParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let limit = params.limit.unwrap_or(tools::DEFAULT_COMMENTS_LIMIT);
        let result = match self.reddit().await {
            Ok(reddit) => tools::get_post_comments(reddit, &params.post_id, limit).await,
            Err(err) => Err(err),
        };
        respond(result)
    }

    #[tool(description = "Get your recent activity, including posts and comments (default limit: 20)")]
    async fn get_user_activity(
        &self,
        Parameters(params): Parameters<LimitParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let limit = params.limit.unwrap_or(tools::DEFAULT_ACTIVITY_LIMIT);
        let result = match self.reddit().await {
            Ok(reddit) => tools::get_user_activity(reddit, limit).await,
            Err(err) => Err(err),
        };
        respond(result)
    }

    #[tool(description = "Get engagement metrics for a post, or for your recent posts")]
    async fn get_post_engagement(
        &self,
        Parameters(params): Parameters<EngagementParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let limit = params.limit.unwrap_or(tools::DEFAULT_ENGAGEMENT_LIMIT);
        let result = match self.reddit().await {
            Ok(reddit) => {
                tools::get_post_engagement(reddit, params.post_id.as_deref(), limit).await
            }
            Err(err) => Err(err),
        };
        respond(result)
    }

    #[tool(description = "Get unread messages and notifications, marking them read by default")]
    async fn get_unread_messages(
        &self,
        Parameters(params): Parameters<UnreadMessagesParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let limit = params.limit.unwrap_or(tools::DEFAULT_MESSAGES_LIMIT);
        let mark_read = params.mark_read.unwrap_or(true);
        let result = match self.reddit().await {
            Ok(reddit) => tools::get_unread_messages(reddit, limit, mark_read).await,
            Err(err) => Err(err),
        };
        respond(result)
    }

    #[tool(description = "Get your saved posts and comments (default limit: 10)")]
    async fn get_saved_items(
        &self,
        Parameters(params): Parameters<LimitParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let limit = params.limit.unwrap_or(tools::DEFAULT_SAVED_LIMIT);
        let result = match self.reddit().await {
            Ok(reddit) => tools::get_saved_items(reddit, limit).await,
            Err(err) => Err(err),
        };
        respond(result)
    }

    #[tool(description = "Get posts you have upvoted (default limit: 10)")]
    async fn get_upvoted_posts(
        &self,
        Parameters(params): Parameters<LimitParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let limit = params.limit.unwrap_or(tools::DEFAULT_UPVOTED_LIMIT);
        let result = match self.reddit().await {
            Ok(reddit) => tools::get_upvoted_posts(reddit, limit).await,
            Err(err) => Err(err),
        };
        respond(result)
    }

    #[tool(description = "Get the subreddits you subscribe to (default limit: 25)")]
    async fn get_subscriptions(
        &self,
        Parameters(params): Parameters<LimitParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let limit = params.limit.unwrap_or(tools::DEFAULT_SUBSCRIPTIONS_LIMIT);
        let result = match self.reddit().await {
            Ok(reddit) => tools::get_subscriptions(reddit, limit).await,
            Err(err) => Err(err),
        };
        respond(result)
    }
}

#[tool_handler]
impl<S: Service + 'static> ServerHandler for RedditServer<S> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Read-only access to your Reddit account. Use these tools to browse \
                 custom feeds, new and hot posts, comment threads, your own activity \
                 and its engagement, your inbox, saved and upvoted items, and your \
                 subscriptions. Results are plain text."
                    .to_string(),
            ),
        }
    }
}

/// Runs the MCP server on stdio until the client disconnects.
pub async fn serve() -> std::result::Result<(), ServeError> {
    info!("starting MCP server on stdio");
    let service = RedditServer::new()
        .serve(stdio())
        .await
        .map_err(|err| ServeError::Initialize(err.to_string()))?;
    let reason = service.waiting().await?;
    info!("MCP server stopped: {reason:?}");
    Ok(())
}

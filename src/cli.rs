//! Drives the command-line program.
//!
//! With no subcommand (or `serve`), the program runs the MCP server on
//! stdio. Every other subcommand runs a single tool and prints its output,
//! which is handy for checking credentials and output without an agent.

use crate::conf;
use crate::reddit::Reddit;
use crate::reddit::client::Result;
use crate::server;
use crate::tools;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use log::debug;
use std::path::PathBuf;
use std::process;

/// Prints `message` to stderr and exits with `error_code`.
pub fn die(error_code: i32, message: &str) -> ! {
    eprintln!("{}", message);
    process::exit(error_code);
}

/// Program configuration.
#[derive(Debug, Parser)]
#[command(version)]
#[command(about = "Exposes your Reddit feeds, posts, and inbox to AI agents over MCP", long_about = None)]
pub struct Config {
    #[command(flatten)]
    verbosity: Verbosity<WarnLevel>,

    /// Load environment variables from this file instead of ./.env
    #[arg(long, global = true, value_name = "PATH")]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Config {
    /// How much to log.
    pub fn verbosity(&self) -> Verbosity<WarnLevel> {
        self.verbosity
    }

    /// The file environment variables should be loaded from, if not `.env`.
    pub fn env_file(&self) -> Option<&PathBuf> {
        self.env_file.as_ref()
    }

    fn subcommand(&self) -> &Command {
        self.command.as_ref().unwrap_or(&Command::Serve)
    }
}

#[derive(Debug, PartialEq, Subcommand)]
enum Command {
    /// Run the MCP server on stdio (the default)
    Serve,

    #[command(flatten)]
    Tool(ToolCommand),
}

#[derive(Debug, PartialEq, Subcommand)]
enum ToolCommand {
    /// Show posts from a custom feed
    Feed {
        /// Feed name, e.g. thought_garden or user/name
        feed_name: String,

        /// Number of posts to fetch
        #[arg(short = 'n', long, default_value_t = tools::DEFAULT_FEED_LIMIT)]
        limit: u32,
    },

    /// Show posts from all of your custom feeds
    Feeds {
        /// Number of posts to fetch from each feed
        #[arg(short = 'n', long, default_value_t = tools::DEFAULT_LIMIT_PER_FEED)]
        limit_per_feed: u32,
    },

    /// Show the newest posts on Reddit
    New {
        /// Number of posts to fetch
        #[arg(short = 'n', long, default_value_t = tools::DEFAULT_NEW_POSTS_LIMIT)]
        limit: u32,
    },

    /// Show your home feed
    Home {
        /// Number of posts to fetch
        #[arg(short = 'n', long, default_value_t = tools::DEFAULT_HOME_LIMIT)]
        limit: u32,
    },

    /// Show hot posts in a subreddit
    #[clap(alias = "r")]
    Subreddit {
        /// Subreddit name
        subreddit: String,

        /// Number of posts to fetch
        #[arg(short = 'n', long, default_value_t = tools::DEFAULT_SUBREDDIT_LIMIT)]
        limit: u32,
    },

    /// Show a post and its comments
    Post {
        /// Reddit post ID
        post_id: String,

        /// Number of top-level comments to show
        #[arg(short = 'n', long, default_value_t = tools::DEFAULT_COMMENTS_LIMIT)]
        limit: u32,
    },

    /// Show your recent posts and comments
    Activity {
        /// Number of items to fetch
        #[arg(short = 'n', long, default_value_t = tools::DEFAULT_ACTIVITY_LIMIT)]
        limit: u32,
    },

    /// Show engagement metrics for a post, or for your recent posts
    Engagement {
        /// Reddit post ID
        post_id: Option<String>,

        /// Number of recent posts to analyze
        #[arg(short = 'n', long, default_value_t = tools::DEFAULT_ENGAGEMENT_LIMIT)]
        limit: u32,
    },

    /// Show unread messages
    Inbox {
        /// Number of messages to fetch
        #[arg(short = 'n', long, default_value_t = tools::DEFAULT_MESSAGES_LIMIT)]
        limit: u32,

        /// Leave messages unread
        #[arg(long, default_value_t = false)]
        keep_unread: bool,
    },

    /// Show your saved posts and comments
    Saved {
        /// Number of items to fetch
        #[arg(short = 'n', long, default_value_t = tools::DEFAULT_SAVED_LIMIT)]
        limit: u32,
    },

    /// Show posts you have upvoted
    Upvoted {
        /// Number of posts to fetch
        #[arg(short = 'n', long, default_value_t = tools::DEFAULT_UPVOTED_LIMIT)]
        limit: u32,
    },

    /// Show the subreddits you subscribe to
    Subscriptions {
        /// Number of subreddits to fetch
        #[arg(short = 'n', long, default_value_t = tools::DEFAULT_SUBSCRIPTIONS_LIMIT)]
        limit: u32,
    },
}

/// Runs the command-line program.
///
/// Errors are printed to stderr and end the process with status 1.
pub async fn run(config: Config) {
    env_logger::Builder::new()
        .filter_level(config.verbosity().log_level_filter())
        .init();

    if let Err(err) = conf::load_env(config.env_file().map(PathBuf::as_path)) {
        die(1, &err.to_string());
    }

    debug!("running {:?}", config.subcommand());
    match config.subcommand() {
        Command::Serve => {
            if let Err(err) = server::serve().await {
                die(1, &err.to_string());
            }
        }
        Command::Tool(command) => match run_tool(command).await {
            Ok(output) => println!("{output}"),
            Err(err) => die(1, &err.to_string()),
        },
    }
}

async fn run_tool(command: &ToolCommand) -> Result<String> {
    let reddit = Reddit::from_env()?;
    match command {
        ToolCommand::Feed { feed_name, limit } => {
            tools::get_custom_feed(&reddit, feed_name, *limit).await
        }
        ToolCommand::Feeds { limit_per_feed } => {
            tools::read_custom_feeds(&reddit, *limit_per_feed).await
        }
        ToolCommand::New { limit } => tools::read_new_posts(&reddit, *limit).await,
        ToolCommand::Home { limit } => tools::get_home_feed(&reddit, *limit).await,
        ToolCommand::Subreddit { subreddit, limit } => {
            tools::get_subreddit_posts(&reddit, subreddit, *limit).await
        }
        ToolCommand::Post { post_id, limit } => {
            tools::get_post_comments(&reddit, post_id, *limit).await
        }
        ToolCommand::Activity { limit } => tools::get_user_activity(&reddit, *limit).await,
        ToolCommand::Engagement { post_id, limit } => {
            tools::get_post_engagement(&reddit, post_id.as_deref(), *limit).await
        }
        ToolCommand::Inbox { limit, keep_unread } => {
            tools::get_unread_messages(&reddit, *limit, !keep_unread).await
        }
        ToolCommand::Saved { limit } => tools::get_saved_items(&reddit, *limit).await,
        ToolCommand::Upvoted { limit } => tools::get_upvoted_posts(&reddit, *limit).await,
        ToolCommand::Subscriptions { limit } => tools::get_subscriptions(&reddit, *limit).await,
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! reddit-companion exposes your Reddit account to AI agents over the
//! [Model Context Protocol]. It runs as an MCP server on stdio and offers
//! read-only tools for your custom feeds, new and hot posts, comment
//! threads, your own posts and comments, your inbox, and your saved and
//! upvoted items. Every tool answers with plain text.
//!
//! # Examples
//!
//! Run the MCP server (this is what an agent's configuration should
//! launch):
//!
//! ```bash
//! reddit-companion
//! ```
//!
//! Run a single tool from the terminal, e.g. to check your credentials:
//!
//! ```bash
//! reddit-companion feed thought_garden
//! reddit-companion post 1o2a1b -n 5
//! reddit-companion inbox --keep-unread
//! ```
//!
//! Get usage and help for the tool:
//!
//! ```bash
//! reddit-companion --help
//! ```
//!
//! # Reddit API Setup
//!
//! reddit-companion authenticates as a Reddit "script" or "web" app. To
//! enable access:
//!
//! 1. [Create an app] and note its client ID and secret.
//! 2. Set `$REDDIT_CLIENT_ID` and `$REDDIT_CLIENT_SECRET`.
//! 3. Set either `$REDDIT_REFRESH_TOKEN`, or both `$REDDIT_USERNAME` and
//!    `$REDDIT_PASSWORD`. A refresh token is used if both are present.
//! 4. Optionally set `$REDDIT_USER_AGENT`; Reddit asks that it identify
//!    your app and your username.
//!
//! Variables may also be placed in a `.env` file in the working directory,
//! or in any file passed with `--env-file`.
//!
//! # License
//!
//! reddit-companion is licensed under the terms of the [Apache License 2.0].
//! Please see the LICENSE file accompanying this source code or visit the
//! previous link for more information on licensing.
//!
//! [Apache License 2.0]: https://www.apache.org/licenses/LICENSE-2.0
//! [Create an app]: https://www.reddit.com/prefs/apps
//! [Model Context Protocol]: https://modelcontextprotocol.io

pub mod cli;
pub mod clock;
pub mod conf;
pub mod reddit;
pub mod server;
pub mod text;
pub mod tools;
pub mod view;

#[cfg(test)]
mod test_utils;

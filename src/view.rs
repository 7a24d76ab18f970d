//! Renders Reddit things as plain text for AI agents.
//!
//! Every template is fixed: one field per line, in a stable order, so that
//! agents (and tests) can rely on the shape of the output.

use crate::clock::HasAge;
use crate::reddit::thing::{Comment, Message, Submission, Subreddit, Thing};
use crate::text::excerpt;
use indoc::formatdoc;

/// Comments are cut to this many characters in activity summaries.
const COMMENT_EXCERPT_LEN: usize = 200;

/// Shape of the text produced for a thing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Layout {
    /// A post as it appears in a feed listing, followed by a `---` separator.
    #[default]
    Feed,

    /// A post at the top of its own thread; no separator.
    Detail,

    /// A compact summary of a user's own post or comment.
    Activity,

    /// Voting and view metrics for a post.
    Engagement,

    /// A comment and its replies, indented by depth.
    Thread,
}

/// View renderer options.
#[derive(Clone, Copy, Debug, Default)]
pub struct ViewOptions {
    layout: Layout,
    depth: usize,
    reply_limit: Option<usize>,
}

impl ViewOptions {
    /// Incrementally builds a new set of view options.
    ///
    /// # Examples
    ///
    /// ```
    /// use reddit_companion::view::{Layout, ViewOptions};
    /// let opts = ViewOptions::build().layout(Layout::Thread).reply_limit(3).build();
    /// ```
    pub fn build() -> ViewOptionsBuilder {
        ViewOptionsBuilder::default()
    }

    /// Options for rendering a thing with the given layout.
    pub fn layout(layout: Layout) -> Self {
        Self::build().layout(layout).build()
    }

    /// The options used to render the replies of a comment.
    fn nested(&self) -> Self {
        Self {
            depth: self.depth + 1,
            ..*self
        }
    }

    fn indent(&self) -> String {
        "  ".repeat(self.depth)
    }
}

/// A builder for view options.
///
/// You probably don't want to use this directly; call [`ViewOptions::build()`]
/// and construct it incrementally instead.
#[derive(Debug, Default)]
#[must_use]
pub struct ViewOptionsBuilder {
    layout: Layout,
    depth: usize,
    reply_limit: Option<usize>,
}

impl ViewOptionsBuilder {
    /// Sets the layout.
    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Sets the starting indentation depth for comment trees.
    pub fn depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Renders at most `limit` replies at each level of a comment tree.
    pub fn reply_limit(mut self, limit: usize) -> Self {
        self.reply_limit = Some(limit);
        self
    }

    /// Finalizes the [`ViewOptions`].
    pub fn build(self) -> ViewOptions {
        ViewOptions {
            layout: self.layout,
            depth: self.depth,
            reply_limit: self.reply_limit,
        }
    }
}

/// Marks an item that can be converted into text for an agent to read.
pub trait Viewable {
    /// Converts the item into a string.
    fn view(&self, opts: &ViewOptions) -> String;
}

impl Viewable for Submission {
    fn view(&self, opts: &ViewOptions) -> String {
        match opts.layout {
            Layout::Feed => formatdoc! {"
                Title: {}
                Subreddit: r/{}
                Score: {}
                Author: {}
                URL: {}
                Link: {}
                ---",
                self.title(),
                self.subreddit(),
                self.score(),
                self.author(),
                self.url(),
                self.link(),
            },
            Layout::Detail | Layout::Thread => formatdoc! {"
                Title: {}
                Subreddit: r/{}
                Score: {}
                Author: {}
                URL: {}
                Link: {}
                ",
                self.title(),
                self.subreddit(),
                self.score(),
                self.author(),
                self.url(),
                self.link(),
            },
            Layout::Activity => formatdoc! {"
                Title: {}
                Subreddit: r/{}
                Score: {}
                Comments: {}
                Link: {}
                ---",
                self.title(),
                self.subreddit(),
                self.score(),
                self.num_comments(),
                self.link(),
            },
            Layout::Engagement => formatdoc! {"
                Title: {}
                Subreddit: r/{}
                Score: {}
                Upvote Ratio: {:.1}%
                Total Comments: {}
                Views: {}
                Created: {}
                Link: {}
                ",
                self.title(),
                self.subreddit(),
                self.score(),
                self.upvote_ratio() * 100.0,
                self.num_comments(),
                self.view_count()
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "N/A".to_string()),
                self.created_display(),
                self.link(),
            },
        }
    }
}

impl Viewable for Comment {
    fn view(&self, opts: &ViewOptions) -> String {
        match opts.layout {
            Layout::Thread => view_tree(self, opts),
            _ => formatdoc! {"
                Subreddit: r/{}
                Score: {}
                Comment: {}...
                Link: {}
                ---",
                self.subreddit(),
                self.score(),
                excerpt(&self.body(), COMMENT_EXCERPT_LEN),
                self.link(),
            },
        }
    }
}

/// Depth-first walk of a comment and its replies.
///
/// Reply trees are acyclic, so no visited set is kept.
fn view_tree(comment: &Comment, opts: &ViewOptions) -> String {
    let indent = opts.indent();
    let body = comment
        .body()
        .split('\n')
        .map(|line| format!("{indent}  {line}"))
        .collect::<Vec<_>>()
        .join("\n");

    let mut s = format!(
        "{indent}* Author: {}\n{indent}  Score: {}\n{body}\n",
        comment.author(),
        comment.score(),
    );

    let nested = opts.nested();
    let limit = opts.reply_limit.unwrap_or(usize::MAX);
    for reply in comment.replies().iter().take(limit) {
        s += &reply.view(&nested);
    }
    s
}

impl Viewable for Message {
    fn view(&self, _: &ViewOptions) -> String {
        formatdoc! {"
            From: {}
            Subject: {}
            Body: {}
            Created: {}
            ---",
            self.author(),
            self.subject(),
            self.body(),
            self.created_display(),
        }
    }
}

impl Viewable for Subreddit {
    fn view(&self, _: &ViewOptions) -> String {
        formatdoc! {"
            r/{}
            Title: {}
            Subscribers: {}
            Description: {}
            ---",
            self.display_name(),
            self.title(),
            self.subscribers()
                .map(|n| n.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            self.description(),
        }
    }
}

impl Viewable for Thing {
    fn view(&self, opts: &ViewOptions) -> String {
        match self {
            Thing::Comment(comment) => comment.view(opts),
            Thing::Submission(submission) => submission.view(opts),
            Thing::Message(message) => message.view(opts),
            Thing::Subreddit(subreddit) => subreddit.view(opts),
            Thing::More(_) => String::new(),
        }
    }
}

//! Inclusion tags for the comment thread and the Disqus widgets.
//!
//! Each tag validates its arguments and builds a flat context for a
//! host-owned HTML fragment. Rendering the fragment is the host's job; see
//! [`FragmentRenderer`].

use serde::Serialize;

use disqus_config::Settings;

use crate::context::RenderContext;
use crate::error::BoxError;
use crate::params::{self, AvatarSize, Color, Tab};
use crate::setter::config_block;
use crate::token::ResolvedArgs;

const DEFAULT_NUM_ITEMS: u32 = 5;
const DEFAULT_EXCERPT_LENGTH: u32 = 200;

/// The inclusion tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Widget {
    /// Comment thread.
    ShowComments,
    /// Rewrites `#disqus_thread` links into reply counts.
    NumReplies,
    /// Combination widget (people / recent / popular tabs).
    Combination,
    /// Recent comments widget.
    RecentComments,
    /// Popular threads widget.
    PopularThreads,
    /// Top commenters widget.
    TopCommenters,
}

impl Widget {
    /// Every inclusion tag.
    pub const ALL: [Self; 6] = [
        Self::ShowComments,
        Self::NumReplies,
        Self::Combination,
        Self::RecentComments,
        Self::PopularThreads,
        Self::TopCommenters,
    ];

    /// Template tag name.
    #[must_use]
    pub fn tag_name(self) -> &'static str {
        match self {
            Self::ShowComments => "disqus_show_comments",
            Self::NumReplies => "disqus_num_replies",
            Self::Combination => "disqus_combination_widget",
            Self::RecentComments => "disqus_recent_comments_widget",
            Self::PopularThreads => "disqus_popular_threads_widget",
            Self::TopCommenters => "disqus_top_commenters_widget",
        }
    }

    /// Host fragment rendered with this tag's context.
    #[must_use]
    pub fn template_name(self) -> &'static str {
        match self {
            Self::ShowComments => "disqus/show_comments.html",
            Self::NumReplies => "disqus/num_replies.html",
            Self::Combination => "disqus/combo_widget.html",
            Self::RecentComments => "disqus/recent_comments_widget.html",
            Self::PopularThreads => "disqus/popular_threads_widget.html",
            Self::TopCommenters => "disqus/top_commenters_widget.html",
        }
    }

    /// Parameter names in positional order.
    #[must_use]
    pub fn params(self) -> &'static [&'static str] {
        match self {
            Self::ShowComments | Self::NumReplies => &["shortname"],
            Self::Combination => &[
                "shortname",
                "num_items",
                "hide_mods",
                "color",
                "default_tab",
                "excerpt_length",
            ],
            Self::RecentComments => &[
                "shortname",
                "num_items",
                "hide_avatars",
                "avatar_size",
                "excerpt_length",
            ],
            Self::PopularThreads => &["shortname", "num_items"],
            Self::TopCommenters => &[
                "shortname",
                "num_items",
                "hide_mods",
                "hide_avatars",
                "avatar_size",
            ],
        }
    }

    /// Find the widget for a tag name.
    #[must_use]
    pub fn from_tag_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|widget| widget.tag_name() == name)
    }

    /// Build the fragment context from resolved arguments.
    #[must_use]
    pub fn context(
        self,
        args: &ResolvedArgs,
        ctx: &RenderContext,
        settings: &Settings,
    ) -> WidgetContext {
        match self {
            Self::ShowComments | Self::NumReplies => {
                WidgetContext::Comments(CommentsContext::new(args, ctx, settings))
            }
            Self::Combination => WidgetContext::Combination(CombinationContext::new(args, settings)),
            Self::RecentComments => {
                WidgetContext::RecentComments(RecentCommentsContext::new(args, settings))
            }
            Self::PopularThreads => {
                WidgetContext::PopularThreads(PopularThreadsContext::new(args, settings))
            }
            Self::TopCommenters => {
                WidgetContext::TopCommenters(TopCommentersContext::new(args, settings))
            }
        }
    }
}

/// Context for the comment thread and the reply-count rewriter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentsContext {
    pub shortname: String,
    /// Output of [`config_block`] for the current render.
    pub config: String,
}

impl CommentsContext {
    #[must_use]
    pub fn new(args: &ResolvedArgs, ctx: &RenderContext, settings: &Settings) -> Self {
        Self {
            shortname: params::shortname(settings, args.get("shortname")),
            config: config_block(ctx),
        }
    }
}

/// Context for the combination widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinationContext {
    pub shortname: String,
    pub num_items: u32,
    pub hide_mods: u8,
    pub color: Color,
    pub default_tab: Tab,
    pub excerpt_length: u32,
}

impl CombinationContext {
    #[must_use]
    pub fn new(args: &ResolvedArgs, settings: &Settings) -> Self {
        Self {
            shortname: params::shortname(settings, args.get("shortname")),
            num_items: params::count(args.get("num_items"), DEFAULT_NUM_ITEMS),
            hide_mods: params::flag(args.get("hide_mods")),
            color: Color::resolve(args.get("color")),
            default_tab: Tab::resolve(args.get("default_tab")),
            excerpt_length: params::count(args.get("excerpt_length"), DEFAULT_EXCERPT_LENGTH),
        }
    }
}

/// Context for the recent comments widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentCommentsContext {
    pub shortname: String,
    pub num_items: u32,
    pub hide_avatars: u8,
    /// Avatar size in pixels.
    pub avatar_size: u32,
    pub excerpt_length: u32,
}

impl RecentCommentsContext {
    #[must_use]
    pub fn new(args: &ResolvedArgs, settings: &Settings) -> Self {
        Self {
            shortname: params::shortname(settings, args.get("shortname")),
            num_items: params::count(args.get("num_items"), DEFAULT_NUM_ITEMS),
            hide_avatars: params::flag(args.get("hide_avatars")),
            avatar_size: AvatarSize::resolve(args.get("avatar_size")).pixels(),
            excerpt_length: params::count(args.get("excerpt_length"), DEFAULT_EXCERPT_LENGTH),
        }
    }
}

/// Context for the popular threads widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopularThreadsContext {
    pub shortname: String,
    pub num_items: u32,
}

impl PopularThreadsContext {
    #[must_use]
    pub fn new(args: &ResolvedArgs, settings: &Settings) -> Self {
        Self {
            shortname: params::shortname(settings, args.get("shortname")),
            num_items: params::count(args.get("num_items"), DEFAULT_NUM_ITEMS),
        }
    }
}

/// Context for the top commenters widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopCommentersContext {
    pub shortname: String,
    pub num_items: u32,
    pub hide_mods: u8,
    pub hide_avatars: u8,
    /// Avatar size in pixels.
    pub avatar_size: u32,
}

impl TopCommentersContext {
    #[must_use]
    pub fn new(args: &ResolvedArgs, settings: &Settings) -> Self {
        Self {
            shortname: params::shortname(settings, args.get("shortname")),
            num_items: params::count(args.get("num_items"), DEFAULT_NUM_ITEMS),
            hide_mods: params::flag(args.get("hide_mods")),
            hide_avatars: params::flag(args.get("hide_avatars")),
            avatar_size: AvatarSize::resolve(args.get("avatar_size")).pixels(),
        }
    }
}

/// Fragment context of any inclusion tag.
///
/// Serializes as the inner context's flat mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum WidgetContext {
    Comments(CommentsContext),
    Combination(CombinationContext),
    RecentComments(RecentCommentsContext),
    PopularThreads(PopularThreadsContext),
    TopCommenters(TopCommentersContext),
}

/// Renders the host-owned HTML fragment of an inclusion tag.
///
/// Implemented for closures, and for `minijinja::Environment` with the
/// `minijinja` feature.
///
/// # Example
///
/// ```
/// use disqus_tags::{BoxError, FragmentRenderer, WidgetContext};
///
/// let renderer = |template: &str, _ctx: &WidgetContext| {
///     Ok::<_, BoxError>(format!("<!-- {template} -->"))
/// };
/// # let ctx = disqus_tags::WidgetContext::PopularThreads(disqus_tags::PopularThreadsContext {
/// #     shortname: String::new(),
/// #     num_items: 5,
/// # });
/// assert_eq!(
///     renderer.render_fragment("disqus/popular_threads_widget.html", &ctx).unwrap(),
///     "<!-- disqus/popular_threads_widget.html -->"
/// );
/// ```
pub trait FragmentRenderer {
    /// Render `template` with `context`.
    ///
    /// # Errors
    ///
    /// Returns the host's error when the fragment is missing or fails to render.
    fn render_fragment(&self, template: &str, context: &WidgetContext) -> Result<String, BoxError>;
}

impl<F> FragmentRenderer for F
where
    F: Fn(&str, &WidgetContext) -> Result<String, BoxError>,
{
    fn render_fragment(&self, template: &str, context: &WidgetContext) -> Result<String, BoxError> {
        self(template, context)
    }
}

//! Template tags for embedding Disqus comment threads and widgets.
//!
//! This crate provides the Disqus tag library for server-rendered pages:
//!
//! - **Setter tags** ([`SetterTag`]): `set_disqus_developer`,
//!   `set_disqus_identifier`, `set_disqus_url` and `set_disqus_title` store a
//!   value in the [`RenderContext`]; [`config_block`] serializes them into
//!   the `var` lines the embed script reads.
//! - **Inclusion tags** ([`Widget`]): the comment thread, the reply-count
//!   rewriter and four widgets. Each validates its parameters and hands a
//!   flat [`WidgetContext`] to a host [`FragmentRenderer`].
//! - **Developer snippet** ([`disqus_dev`]): enables Disqus developer mode
//!   when the host runs in debug mode.
//!
//! Process-wide settings come from the `disqus-config` crate.
//!
//! # Architecture
//!
//! Templates go through two phases:
//!
//! 1. **Compile** ([`Template::compile`]): tag arguments are split into
//!    [`Token`]s. A setter without arguments fails here, before any render.
//! 2. **Render** ([`Template::render`]): tags run once each in document
//!    order against a context owned by that render. Variables that are not
//!    in the context resolve to their literal text; invalid widget
//!    parameters fall back to defaults. Neither is an error.
//!
//! # Example
//!
//! ```
//! use disqus_config::Settings;
//! use disqus_tags::{BoxError, RenderContext, RenderEnv, Template, WidgetContext};
//! use serde_json::json;
//!
//! let template = Template::compile(concat!(
//!     "{% set_disqus_identifier post.slug %}",
//!     "{% set_disqus_url 'http://example.com/' post.slug '/' %}",
//!     "{% disqus_recent_comments_widget 'myblog' avatar_size='large' %}",
//! ))
//! .unwrap();
//!
//! let settings = Settings::default();
//! let fragments = |_: &str, ctx: &WidgetContext| -> Result<String, BoxError> {
//!     Ok(serde_json::to_string(ctx)?)
//! };
//! let env = RenderEnv::new(&settings, &fragments);
//!
//! let mut ctx = RenderContext::from_value(json!({ "post": { "slug": "hello" } })).unwrap();
//! let html = template.render(&mut ctx, &env).unwrap();
//!
//! assert!(html.contains(r#""avatar_size":48"#));
//! assert_eq!(ctx.lookup_string("disqus_url"), Some("http://example.com/hello/".to_owned()));
//! ```

mod context;
mod dev;
mod error;
#[cfg(feature = "minijinja")]
mod jinja;
mod params;
mod setter;
mod template;
mod token;
mod widgets;

pub use context::{RenderContext, stringify};
pub use dev::{SiteLookup, disqus_dev};
pub use error::{BoxError, TagError};
pub use params::{AvatarSize, Color, Tab, count, flag, is_truthy, shortname};
pub use setter::{ConfigVar, SetterTag, config_block};
pub use template::{DEV_TAG, RenderEnv, Template};
pub use token::{ResolvedArgs, TagArgs, Token, split_contents};
pub use widgets::{
    CombinationContext, CommentsContext, FragmentRenderer, PopularThreadsContext,
    RecentCommentsContext, TopCommentersContext, Widget, WidgetContext,
};

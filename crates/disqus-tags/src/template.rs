//! Compile and render templates containing Disqus tags.
//!
//! [`Template::compile`] finds `{% ... %}` tags in a template source and
//! keeps the ones this library owns as nodes. Everything else, including
//! tags of the host's own template language, stays in the output verbatim.
//! Tag syntax errors are reported at compile time with their line number,
//! so a broken template never starts rendering.

use disqus_config::Settings;

use crate::TagError;
use crate::context::RenderContext;
use crate::dev::{SiteLookup, disqus_dev};
use crate::setter::{ConfigVar, SetterTag};
use crate::token::{TagArgs, split_contents};
use crate::widgets::{FragmentRenderer, Widget};

const TAG_START: &str = "{%";
const TAG_END: &str = "%}";

/// Tag name of the developer-mode snippet.
pub const DEV_TAG: &str = "disqus_dev";

/// Compiled template node.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Text(String),
    Setter(SetterTag),
    Widget { widget: Widget, args: TagArgs },
    Dev,
}

/// Read-only inputs shared by every render.
pub struct RenderEnv<'a> {
    /// Process-wide settings.
    pub settings: &'a Settings,
    /// Current site for the developer snippet.
    pub site: &'a dyn SiteLookup,
    /// Renders inclusion tag fragments.
    pub fragments: &'a dyn FragmentRenderer,
}

impl<'a> RenderEnv<'a> {
    /// Create an environment whose site is `settings.site`.
    #[must_use]
    pub fn new(settings: &'a Settings, fragments: &'a dyn FragmentRenderer) -> Self {
        Self {
            settings,
            site: &settings.site,
            fragments,
        }
    }

    /// Use a host-provided site lookup.
    #[must_use]
    pub fn with_site(mut self, site: &'a dyn SiteLookup) -> Self {
        self.site = site;
        self
    }
}

/// A template compiled once and rendered any number of times.
///
/// # Example
///
/// ```
/// use disqus_config::Settings;
/// use disqus_tags::{BoxError, RenderContext, RenderEnv, Template, WidgetContext};
///
/// let template = Template::compile(
///     "{% set_disqus_identifier post_id %}<main>{% disqus_show_comments 'myblog' %}</main>",
/// )
/// .unwrap();
///
/// let settings = Settings::default();
/// let fragments = |name: &str, ctx: &WidgetContext| -> Result<String, BoxError> {
///     Ok(format!("[{name} {}]", serde_json::to_string(ctx)?))
/// };
/// let env = RenderEnv::new(&settings, &fragments);
///
/// let mut ctx = RenderContext::new();
/// ctx.insert("post_id", 7);
/// let html = template.render(&mut ctx, &env).unwrap();
///
/// assert_eq!(
///     html,
///     r#"<main>[disqus/show_comments.html {"shortname":"myblog","config":"\tvar disqus_identifier = \"7\";"}]</main>"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    /// Compile a template source.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::UnclosedTag`] for a `{%` without `%}`, or
    /// [`TagError::Template`] wrapping the tag error and its line when a
    /// Disqus tag is malformed.
    pub fn compile(source: &str) -> Result<Self, TagError> {
        let mut nodes = Vec::new();
        let mut text = String::new();
        let mut rest = source;

        while let Some(start) = rest.find(TAG_START) {
            let line = line_number(source, source.len() - rest.len() + start);
            let after_start = &rest[start + TAG_START.len()..];
            let end = after_start
                .find(TAG_END)
                .ok_or(TagError::UnclosedTag { line })?;
            let raw_len = start + TAG_START.len() + end + TAG_END.len();

            text.push_str(&rest[..start]);
            match compile_tag(&after_start[..end]).map_err(|e| e.at_line(line))? {
                Some(node) => {
                    if !text.is_empty() {
                        nodes.push(Node::Text(std::mem::take(&mut text)));
                    }
                    nodes.push(node);
                }
                None => text.push_str(&rest[start..raw_len]),
            }

            rest = &rest[raw_len..];
        }

        text.push_str(rest);
        if !text.is_empty() {
            nodes.push(Node::Text(text));
        }

        tracing::debug!(nodes = nodes.len(), "Compiled template");
        Ok(Self { nodes })
    }

    /// Render the template, evaluating tags once each in document order.
    ///
    /// Setter tags write into `ctx` and produce no output. Inclusion tags
    /// see every setter that precedes them.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::Fragment`] when the host fails to render a fragment.
    pub fn render(&self, ctx: &mut RenderContext, env: &RenderEnv<'_>) -> Result<String, TagError> {
        let mut output = String::new();

        for node in &self.nodes {
            match node {
                Node::Text(text) => output.push_str(text),
                Node::Setter(tag) => output.push_str(&tag.render(ctx)),
                Node::Widget { widget, args } => {
                    let resolved = args.resolve(widget.params(), ctx);
                    let context = widget.context(&resolved, ctx, env.settings);
                    let template = widget.template_name();
                    let html = env
                        .fragments
                        .render_fragment(template, &context)
                        .map_err(|source| TagError::Fragment {
                            template: template.to_owned(),
                            source,
                        })?;
                    output.push_str(&html);
                }
                Node::Dev => output.push_str(&disqus_dev(env.settings, env.site)),
            }
        }

        Ok(output)
    }
}

/// Compile the contents of one `{% ... %}` tag.
///
/// Returns `None` for tags that do not belong to this library.
fn compile_tag(contents: &str) -> Result<Option<Node>, TagError> {
    let bits = split_contents(contents);
    let Some((name, args)) = bits.split_first() else {
        return Ok(None);
    };

    if let Some(var) = ConfigVar::from_tag_name(name) {
        return SetterTag::parse(var, args).map(|tag| Some(Node::Setter(tag)));
    }

    if let Some(widget) = Widget::from_tag_name(name) {
        let args = TagArgs::parse(args);
        args.check(name, widget.params())?;
        return Ok(Some(Node::Widget { widget, args }));
    }

    if *name == DEV_TAG {
        if !args.is_empty() {
            return Err(TagError::TooManyArguments {
                tag: DEV_TAG.to_owned(),
                max: 0,
            });
        }
        return Ok(Some(Node::Dev));
    }

    Ok(None)
}

/// 1-based line number of a byte offset.
fn line_number(source: &str, offset: usize) -> usize {
    source[..offset].matches('\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::widgets::WidgetContext;
    use pretty_assertions::assert_eq;

    fn echo(template: &str, ctx: &WidgetContext) -> Result<String, BoxError> {
        Ok(format!("[{template} {}]", serde_json::to_string(ctx)?))
    }

    fn render(source: &str, ctx: &mut RenderContext, settings: &Settings) -> String {
        let env = RenderEnv::new(settings, &echo);
        Template::compile(source).unwrap().render(ctx, &env).unwrap()
    }

    #[test]
    fn test_plain_text_unchanged() {
        let source = "<p>No tags here</p>\n";
        let template = Template::compile(source).unwrap();
        assert_eq!(template.nodes, vec![Node::Text(source.to_owned())]);
    }

    #[test]
    fn test_host_tags_kept_verbatim() {
        let source = "{% if user %}Hi{% endif %}{% set_disqus_title 'T' %}";
        let mut ctx = RenderContext::new();
        assert_eq!(
            render(source, &mut ctx, &Settings::default()),
            "{% if user %}Hi{% endif %}"
        );
    }

    #[test]
    fn test_empty_tag_kept_verbatim() {
        let mut ctx = RenderContext::new();
        assert_eq!(render("a{%  %}b", &mut ctx, &Settings::default()), "a{%  %}b");
    }

    #[test]
    fn test_setter_without_argument_fails_compile() {
        let err = Template::compile("<h1>Post</h1>\n\n{% set_disqus_url %}").unwrap_err();
        assert_eq!(err.to_string(), "line 3: set_disqus_url takes at least one argument");
        assert!(matches!(
            err,
            TagError::Template { line: 3, ref source } if matches!(**source, TagError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_unclosed_tag() {
        let err = Template::compile("ok\n{% set_disqus_url 'x'").unwrap_err();
        assert!(matches!(err, TagError::UnclosedTag { line: 2 }));
    }

    #[test]
    fn test_widget_argument_errors_fail_compile() {
        let err = Template::compile("{% disqus_popular_threads_widget 'a' 5 6 %}").unwrap_err();
        assert!(err.to_string().contains("takes at most 2 arguments"));

        let err = Template::compile("{% disqus_combination_widget colour='red' %}").unwrap_err();
        assert!(err.to_string().contains("unexpected keyword argument 'colour'"));
    }

    #[test]
    fn test_dev_rejects_arguments() {
        let err = Template::compile("{% disqus_dev 'x' %}").unwrap_err();
        assert!(err.to_string().contains("disqus_dev takes at most 0 arguments"));
    }

    #[test]
    fn test_setters_then_config_in_fragment() {
        let source = "{% set_disqus_identifier 'abc' %}{% set_disqus_url page_url %}{% disqus_num_replies %}";
        let mut ctx = RenderContext::new();
        ctx.insert("page_url", "http://x/");

        let html = render(source, &mut ctx, &Settings::default());

        assert_eq!(
            html,
            r#"[disqus/num_replies.html {"shortname":"","config":"\tvar disqus_identifier = \"abc\";\n\tvar disqus_url = \"http://x/\";"}]"#
        );
    }

    #[test]
    fn test_setter_after_widget_not_seen() {
        let source = "{% disqus_show_comments 'blog' %}{% set_disqus_title 'late' %}";
        let mut ctx = RenderContext::new();

        let html = render(source, &mut ctx, &Settings::default());

        assert_eq!(
            html,
            r#"[disqus/show_comments.html {"shortname":"blog","config":""}]"#
        );
        assert!(ctx.contains_key("disqus_title"));
    }

    #[test]
    fn test_widget_keyword_arguments() {
        let source = "{% disqus_combination_widget 'blog' 3 color='red' default_tab=tab %}";
        let mut ctx = RenderContext::new();
        ctx.insert("tab", "recent");

        let html = render(source, &mut ctx, &Settings::default());

        assert_eq!(
            html,
            r#"[disqus/combo_widget.html {"shortname":"blog","num_items":3,"hide_mods":0,"color":"red","default_tab":"recent","excerpt_length":200}]"#
        );
    }

    #[test]
    fn test_dev_tag() {
        let settings = Settings {
            debug: true,
            ..Default::default()
        };
        let mut ctx = RenderContext::new();

        let html = render("<head>{% disqus_dev %}</head>", &mut ctx, &settings);

        assert!(html.starts_with("<head><script type=\"text/javascript\">"));
        assert!(html.contains("var disqus_url = 'http://example.com/';"));
        assert!(html.ends_with("</script></head>"));
    }

    #[test]
    fn test_render_twice_fresh_contexts() {
        let template = Template::compile("{% set_disqus_title title %}{% disqus_show_comments %}").unwrap();
        let settings = Settings::default();
        let env = RenderEnv::new(&settings, &echo);

        let mut first = RenderContext::new();
        first.insert("title", "One");
        let mut second = RenderContext::new();
        second.insert("title", "Two");

        let a = template.render(&mut first, &env).unwrap();
        let b = template.render(&mut second, &env).unwrap();

        assert!(a.contains(r#"var disqus_title = \"One\";"#));
        assert!(b.contains(r#"var disqus_title = \"Two\";"#));
    }

    #[test]
    fn test_fragment_error_propagates() {
        let failing = |_: &str, _: &WidgetContext| Err::<String, BoxError>("no such template".into());
        let settings = Settings::default();
        let env = RenderEnv::new(&settings, &failing);
        let template = Template::compile("{% disqus_top_commenters_widget %}").unwrap();

        let err = template.render(&mut RenderContext::new(), &env).unwrap_err();

        assert_eq!(
            err.to_string(),
            "failed to render fragment 'disqus/top_commenters_widget.html': no such template"
        );
    }

    #[test]
    fn test_line_number() {
        assert_eq!(line_number("a\nb\nc", 0), 1);
        assert_eq!(line_number("a\nb\nc", 2), 2);
        assert_eq!(line_number("a\nb\nc", 4), 3);
    }
}

//! Configuration setter tags and the JavaScript config block.
//!
//! `{% set_disqus_identifier post.id %}` resolves its arguments against the
//! render context and stores the result under `disqus_identifier`. Later,
//! [`config_block`] serializes every stored value into the `var` lines that
//! precede the embed script.

use std::borrow::Cow;

use crate::TagError;
use crate::context::{RenderContext, stringify};
use crate::token::{Token, split_contents};

/// Disqus configuration variables settable from templates.
///
/// [`ConfigVar::ALL`] is the order in which [`config_block`] emits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigVar {
    /// `disqus_developer`: 0/1 developer mode.
    Developer,
    /// `disqus_identifier`: unique thread identifier. Defaults to the page URL.
    Identifier,
    /// `disqus_url`: canonical thread URL. Defaults to the page location.
    Url,
    /// `disqus_title`: thread title. Defaults to the page title or URL.
    Title,
}

impl ConfigVar {
    /// Every variable, in emission order.
    pub const ALL: [Self; 4] = [Self::Developer, Self::Identifier, Self::Url, Self::Title];

    /// Template tag that sets this variable.
    #[must_use]
    pub fn tag_name(self) -> &'static str {
        match self {
            Self::Developer => "set_disqus_developer",
            Self::Identifier => "set_disqus_identifier",
            Self::Url => "set_disqus_url",
            Self::Title => "set_disqus_title",
        }
    }

    /// Context key (and JavaScript variable name) the value is stored under.
    #[must_use]
    pub fn context_key(self) -> &'static str {
        match self {
            Self::Developer => "disqus_developer",
            Self::Identifier => "disqus_identifier",
            Self::Url => "disqus_url",
            Self::Title => "disqus_title",
        }
    }

    /// Find the variable set by a tag name.
    #[must_use]
    pub fn from_tag_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|var| var.tag_name() == name)
    }
}

/// A parsed setter tag, ready to be evaluated once per render.
///
/// # Example
///
/// ```
/// use disqus_tags::{RenderContext, SetterTag, config_block};
///
/// let tag = SetterTag::parse_contents(r#"set_disqus_identifier "post-" post_id"#).unwrap();
///
/// let mut ctx = RenderContext::new();
/// ctx.insert("post_id", 42);
/// assert_eq!(tag.render(&mut ctx), "");
///
/// assert_eq!(config_block(&ctx), "\tvar disqus_identifier = \"post-42\";");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetterTag {
    var: ConfigVar,
    tokens: Vec<Token>,
}

impl SetterTag {
    /// Build a setter from its argument bits (tag name excluded).
    ///
    /// # Errors
    ///
    /// Returns [`TagError::MissingArgument`] when `bits` is empty.
    pub fn parse(var: ConfigVar, bits: &[&str]) -> Result<Self, TagError> {
        if bits.is_empty() {
            return Err(TagError::MissingArgument {
                tag: var.tag_name().to_owned(),
            });
        }

        Ok(Self {
            var,
            tokens: bits.iter().map(|bit| Token::parse(bit)).collect(),
        })
    }

    /// Parse full tag contents, e.g. `set_disqus_url "http://example.com/"`.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::UnknownTag`] when the first bit is not a setter
    /// tag, or [`TagError::MissingArgument`] when no argument follows it.
    pub fn parse_contents(contents: &str) -> Result<Self, TagError> {
        let bits = split_contents(contents);
        let (name, args) = bits.split_first().ok_or_else(|| TagError::UnknownTag {
            name: String::new(),
        })?;
        let var = ConfigVar::from_tag_name(name).ok_or_else(|| TagError::UnknownTag {
            name: (*name).to_owned(),
        })?;
        Self::parse(var, args)
    }

    /// The variable this tag sets.
    #[must_use]
    pub fn var(&self) -> ConfigVar {
        self.var
    }

    /// Argument tokens in call order.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Resolve every token and concatenate them without a separator.
    #[must_use]
    pub fn resolve(&self, ctx: &RenderContext) -> String {
        self.tokens.iter().map(|token| token.resolve(ctx)).collect()
    }

    /// Store the resolved value in the context.
    ///
    /// Returns the tag's visible output, which is always empty.
    pub fn render(&self, ctx: &mut RenderContext) -> String {
        let value = self.resolve(ctx);
        ctx.insert(self.var.context_key(), value);
        String::new()
    }
}

/// Serialize the configuration variables present in the context.
///
/// Emits `\tvar <key> = "<value>";` for each [`ConfigVar`] set in `ctx`, in
/// [`ConfigVar::ALL`] order, joined by newlines. Returns an empty string
/// when none are set.
///
/// # Example
///
/// ```
/// use disqus_tags::{RenderContext, config_block};
///
/// let mut ctx = RenderContext::new();
/// ctx.insert("disqus_url", "http://x/");
/// ctx.insert("disqus_identifier", "abc");
///
/// assert_eq!(
///     config_block(&ctx),
///     "\tvar disqus_identifier = \"abc\";\n\tvar disqus_url = \"http://x/\";"
/// );
/// ```
#[must_use]
pub fn config_block(ctx: &RenderContext) -> String {
    ConfigVar::ALL
        .into_iter()
        .filter_map(|var| {
            let key = var.context_key();
            let value = stringify(ctx.get(key)?);
            Some(format!("\tvar {key} = \"{}\";", escape_js(&value)))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escape text for a double-quoted JavaScript string inside a `<script>`.
fn escape_js(value: &str) -> Cow<'_, str> {
    if !value.contains(['\\', '"', '\n', '\r', '<']) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 8);
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            // `</script>` would end the enclosing script element
            '<' if chars.peek() == Some(&'/') => escaped.push_str("<\\"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

//! Tag argument tokens.
//!
//! Splits tag contents like `set_disqus_title "Post: " post.title` into bits
//! and turns each bit into a [`Token`] that resolves against a
//! [`RenderContext`].

use std::collections::HashMap;

use serde_json::Value;

use crate::TagError;
use crate::context::{RenderContext, stringify};

/// One argument as written at the call site.
///
/// # Example
///
/// ```
/// use disqus_tags::{RenderContext, Token};
///
/// let mut ctx = RenderContext::new();
/// ctx.insert("slug", "hello-world");
///
/// assert_eq!(Token::parse(r#""slug""#).resolve(&ctx), "slug");
/// assert_eq!(Token::parse("slug").resolve(&ctx), "hello-world");
/// assert_eq!(Token::parse("missing").resolve(&ctx), "missing");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Quoted text (`"..."` or `'...'`), quotes stripped.
    Literal(String),
    /// Bare name, possibly dotted (`post.title`).
    Variable(String),
}

impl Token {
    /// Classify a single bit.
    #[must_use]
    pub fn parse(bit: &str) -> Self {
        match strip_quotes(bit) {
            Some(inner) => Self::Literal(inner.to_owned()),
            None => Self::Variable(bit.to_owned()),
        }
    }

    /// The token's literal text (variable name for variables).
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Literal(s) | Self::Variable(s) => s,
        }
    }

    /// Resolve to a string: variable lookup first, literal text on a miss.
    #[must_use]
    pub fn resolve(&self, ctx: &RenderContext) -> String {
        match self {
            Self::Literal(s) => s.clone(),
            Self::Variable(name) => ctx.lookup_string(name).unwrap_or_else(|| {
                tracing::debug!(variable = %name, "Variable not in context, using literal text");
                name.clone()
            }),
        }
    }

    /// Resolve to a JSON value for parameter validation.
    ///
    /// Like [`resolve`](Self::resolve), except a bare integer that is not a
    /// context variable becomes a number, so `{% tag 48 %}` passes `48`
    /// rather than `"48"`.
    #[must_use]
    pub fn resolve_value(&self, ctx: &RenderContext) -> Value {
        match self {
            Self::Literal(s) => Value::String(s.clone()),
            Self::Variable(name) => {
                if let Some(value) = ctx.lookup(name) {
                    return value.clone();
                }
                tracing::debug!(variable = %name, "Variable not in context, using literal text");
                name.parse::<i64>()
                    .map_or_else(|_| Value::String(name.clone()), Value::from)
            }
        }
    }
}

/// Return the inside of a bit wrapped in matching single or double quotes.
fn strip_quotes(bit: &str) -> Option<&str> {
    let first = bit.chars().next()?;
    if bit.len() < 2 || !(first == '"' || first == '\'') || !bit.ends_with(first) {
        return None;
    }
    Some(&bit[1..bit.len() - 1])
}

/// Split tag contents on whitespace, keeping quoted sections together.
///
/// Quotes may appear inside a bit (`title="Two words"`). An unterminated
/// quote extends to the end of the input.
///
/// # Example
///
/// ```
/// use disqus_tags::split_contents;
///
/// let bits = split_contents(r#"set_disqus_title "Hello world" post.id"#);
/// assert_eq!(bits, vec!["set_disqus_title", "\"Hello world\"", "post.id"]);
/// ```
#[must_use]
pub fn split_contents(contents: &str) -> Vec<&str> {
    let mut bits = Vec::new();
    let mut start: Option<usize> = None;
    let mut quote: Option<char> = None;

    for (i, c) in contents.char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None if c.is_whitespace() => {
                if let Some(s) = start.take() {
                    bits.push(&contents[s..i]);
                }
            }
            None => {
                start.get_or_insert(i);
                if c == '"' || c == '\'' {
                    quote = Some(c);
                }
            }
        }
    }

    if let Some(s) = start {
        bits.push(&contents[s..]);
    }

    bits
}

/// Arguments of an inclusion tag: positional tokens and `name=value` pairs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TagArgs {
    /// Positional arguments in call order.
    pub positional: Vec<Token>,
    /// Keyword arguments in call order.
    pub keyword: Vec<(String, Token)>,
}

impl TagArgs {
    /// Parse argument bits (tag name excluded).
    ///
    /// # Example
    ///
    /// ```
    /// use disqus_tags::{TagArgs, Token};
    ///
    /// let args = TagArgs::parse(&[r#""myblog""#, "num_items=10"]);
    /// assert_eq!(args.positional, vec![Token::Literal("myblog".to_owned())]);
    /// assert_eq!(args.keyword, vec![("num_items".to_owned(), Token::Variable("10".to_owned()))]);
    /// ```
    #[must_use]
    pub fn parse(bits: &[&str]) -> Self {
        let mut args = Self::default();
        for bit in bits {
            match split_keyword(bit) {
                Some((name, value)) => args
                    .keyword
                    .push((name.to_owned(), Token::parse(value))),
                None => args.positional.push(Token::parse(bit)),
            }
        }
        args
    }

    /// Check the arguments against a tag's parameter list.
    ///
    /// # Errors
    ///
    /// Returns an error for surplus positional arguments, unknown keywords,
    /// or a parameter given more than once.
    pub fn check(&self, tag: &str, params: &[&str]) -> Result<(), TagError> {
        if self.positional.len() > params.len() {
            return Err(TagError::TooManyArguments {
                tag: tag.to_owned(),
                max: params.len(),
            });
        }

        let mut seen: Vec<&str> = params[..self.positional.len()].to_vec();
        for (name, _) in &self.keyword {
            if !params.contains(&name.as_str()) {
                return Err(TagError::UnknownArgument {
                    tag: tag.to_owned(),
                    name: name.clone(),
                });
            }
            if seen.contains(&name.as_str()) {
                return Err(TagError::DuplicateArgument {
                    tag: tag.to_owned(),
                    name: name.clone(),
                });
            }
            seen.push(name);
        }

        Ok(())
    }

    /// Resolve every argument against the context, keyed by parameter name.
    ///
    /// Positional arguments take the names of `params` in order. Arguments
    /// without a matching parameter are dropped; call [`check`](Self::check)
    /// first to reject them.
    #[must_use]
    pub fn resolve(&self, params: &[&str], ctx: &RenderContext) -> ResolvedArgs {
        let mut values = HashMap::with_capacity(params.len());
        for (name, token) in params.iter().zip(&self.positional) {
            values.insert((*name).to_owned(), token.resolve_value(ctx));
        }
        for (name, token) in &self.keyword {
            values.insert(name.clone(), token.resolve_value(ctx));
        }
        ResolvedArgs { values }
    }
}

/// Split `name=value` when `name` is a plain identifier.
fn split_keyword(bit: &str) -> Option<(&str, &str)> {
    let (name, value) = bit.split_once('=')?;
    let is_identifier = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    is_identifier.then_some((name, value))
}

/// Inclusion tag arguments after resolution, keyed by parameter name.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ResolvedArgs {
    values: HashMap<String, Value>,
}

impl ResolvedArgs {
    /// Create an empty set (every parameter takes its default).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter value directly.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Get a parameter value, if supplied.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Get a parameter as text, if supplied.
    #[must_use]
    pub fn get_string(&self, name: &str) -> Option<String> {
        self.get(name).map(stringify)
    }
}

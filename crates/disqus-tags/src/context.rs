//! Per-render variable context.
//!
//! A [`RenderContext`] lives for exactly one template render. Setter tags
//! write into it, inclusion tags and the config block read from it, and it
//! is passed explicitly to every resolver.

use serde_json::{Map, Value};

/// Variables visible to tags during one render.
///
/// Values are JSON so hosts can pass nested page data and tags can reach it
/// with dotted paths such as `page.meta.slug`.
///
/// # Example
///
/// ```
/// use disqus_tags::RenderContext;
/// use serde_json::json;
///
/// let ctx = RenderContext::from_value(json!({
///     "page": { "slug": "hello-world", "tags": ["rust", "web"] }
/// }))
/// .unwrap();
///
/// assert_eq!(ctx.lookup_string("page.slug"), Some("hello-world".to_owned()));
/// assert_eq!(ctx.lookup_string("page.tags.1"), Some("web".to_owned()));
/// assert_eq!(ctx.lookup("page.missing"), None);
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RenderContext {
    vars: Map<String, Value>,
}

impl RenderContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context from a JSON object.
    ///
    /// Returns `None` if `value` is not an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(vars) => Some(Self { vars }),
            _ => None,
        }
    }

    /// Set a top-level variable, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.vars.insert(key.into(), value.into())
    }

    /// Get a top-level variable.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.vars.get(key)
    }

    /// Whether a top-level variable is set.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Look up a dotted variable path.
    ///
    /// The first segment names a top-level variable. Later segments index
    /// objects by key and arrays by position. Any miss yields `None`.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next().filter(|s| !s.is_empty())?;
        let mut current = self.vars.get(first)?;

        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        Some(current)
    }

    /// Look up a dotted variable path and stringify it.
    #[must_use]
    pub fn lookup_string(&self, path: &str) -> Option<String> {
        self.lookup(path).map(stringify)
    }

    /// Borrow the underlying variables.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.vars
    }
}

impl From<Map<String, Value>> for RenderContext {
    fn from(vars: Map<String, Value>) -> Self {
        Self { vars }
    }
}

/// Render a context value as text.
///
/// Strings are used as-is, numbers in decimal, booleans as `true`/`false`,
/// null as the empty string, and arrays/objects as compact JSON.
#[must_use]
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

//! Widget parameter validation.
//!
//! None of these functions fail. Unsupported input falls back to the
//! parameter's default so the page always renders something reasonable.

use serde::Serialize;
use serde_json::Value;

use disqus_config::{Settings, is_valid_shortname};

use crate::context::stringify;

/// Whether a value counts as "true" for widget flags.
///
/// True for JSON `true`, the number `1` (or `1.0`), and the strings `1`, `True`,
/// `true`, `T` and `t`. Everything else, including a missing value, is false.
#[must_use]
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| (f - 1.0).abs() < f64::EPSILON),
        Some(Value::String(s)) => matches!(s.as_str(), "1" | "True" | "true" | "T" | "t"),
        _ => false,
    }
}

/// A truthy flag as the `0`/`1` integer widgets expect.
#[must_use]
pub fn flag(value: Option<&Value>) -> u8 {
    u8::from(is_truthy(value))
}

/// A non-negative count from a number or numeric string, else `default`.
#[must_use]
pub fn count(value: Option<&Value>, default: u32) -> u32 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse::<u32>().ok(),
        _ => None,
    };

    match (parsed, value) {
        (Some(n), _) => n,
        (None, Some(v)) => {
            tracing::debug!(value = %v, default, "Invalid count, using default");
            default
        }
        (None, None) => default,
    }
}

/// Resolve the shortname a widget should use.
///
/// The site-wide shortname from settings wins when configured. Otherwise the
/// tag argument is used if it is a valid shortname, and the empty string
/// if not.
#[must_use]
pub fn shortname(settings: &Settings, arg: Option<&Value>) -> String {
    if let Some(configured) = settings.shortname() {
        return configured.to_owned();
    }

    let Some(arg) = arg else {
        return String::new();
    };
    let name = stringify(arg);
    if is_valid_shortname(&name) {
        name
    } else {
        tracing::debug!(shortname = %name, "Invalid shortname, using empty shortname");
        String::new()
    }
}

/// Avatar size for the recent comments and top commenters widgets.
///
/// # Example
///
/// ```
/// use disqus_tags::AvatarSize;
/// use serde_json::json;
///
/// assert_eq!(AvatarSize::resolve(Some(&json!("medium"))).pixels(), 32);
/// assert_eq!(AvatarSize::resolve(Some(&json!(48))).pixels(), 48);
/// assert_eq!(AvatarSize::resolve(Some(&json!(999))).pixels(), 32);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AvatarSize {
    /// 24px.
    Small,
    /// 32px.
    #[default]
    Medium,
    /// 48px.
    Large,
    /// 96px.
    XLarge,
    /// 128px.
    Ginormous,
}

impl AvatarSize {
    /// Every size, smallest first.
    pub const ALL: [Self; 5] = [
        Self::Small,
        Self::Medium,
        Self::Large,
        Self::XLarge,
        Self::Ginormous,
    ];

    /// Name accepted in templates.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::XLarge => "x-large",
            Self::Ginormous => "ginormous",
        }
    }

    /// Size in pixels.
    #[must_use]
    pub fn pixels(self) -> u32 {
        match self {
            Self::Small => 24,
            Self::Medium => 32,
            Self::Large => 48,
            Self::XLarge => 96,
            Self::Ginormous => 128,
        }
    }

    /// Size by template name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|size| size.name() == name)
    }

    /// Size by exact pixel value.
    #[must_use]
    pub fn from_pixels(pixels: u64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|size| u64::from(size.pixels()) == pixels)
    }

    /// Resolve a tag argument: a size name, or one of the supported pixel
    /// values as a number or numeric string. Anything else is [`Medium`](Self::Medium).
    #[must_use]
    pub fn resolve(value: Option<&Value>) -> Self {
        let size = match value {
            None => return Self::default(),
            Some(Value::Number(n)) => n.as_u64().and_then(Self::from_pixels),
            Some(Value::String(s)) => Self::from_name(s)
                .or_else(|| s.trim().parse::<u64>().ok().and_then(Self::from_pixels)),
            Some(_) => None,
        };

        size.unwrap_or_else(|| {
            if let Some(v) = value {
                tracing::debug!(value = %v, "Unsupported avatar size, using 32");
            }
            Self::default()
        })
    }
}

/// Color scheme of the combination widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    #[default]
    Blue,
    Grey,
    Green,
    Red,
    Orange,
}

impl Color {
    /// Every supported color.
    pub const ALL: [Self; 5] = [Self::Blue, Self::Grey, Self::Green, Self::Red, Self::Orange];

    /// Name accepted in templates.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Grey => "grey",
            Self::Green => "green",
            Self::Red => "red",
            Self::Orange => "orange",
        }
    }

    /// Resolve a tag argument, falling back to blue.
    #[must_use]
    pub fn resolve(value: Option<&Value>) -> Self {
        resolve_named(value, &Self::ALL, Self::name, "color")
    }
}

/// Tab the combination widget opens on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    People,
    Recent,
    Popular,
}

impl Tab {
    /// Every supported tab.
    pub const ALL: [Self; 3] = [Self::People, Self::Recent, Self::Popular];

    /// Name accepted in templates.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::People => "people",
            Self::Recent => "recent",
            Self::Popular => "popular",
        }
    }

    /// Resolve a tag argument, falling back to people.
    #[must_use]
    pub fn resolve(value: Option<&Value>) -> Self {
        resolve_named(value, &Self::ALL, Self::name, "default_tab")
    }
}

/// Pick the allow-list entry whose name matches `value`, else the default.
fn resolve_named<T: Copy + Default>(
    value: Option<&Value>,
    allowed: &[T],
    name: fn(T) -> &'static str,
    param: &str,
) -> T {
    let Some(value) = value else {
        return T::default();
    };
    let text = stringify(value);
    allowed
        .iter()
        .copied()
        .find(|item| name(*item) == text)
        .unwrap_or_else(|| {
            tracing::debug!(param, value = %text, "Unsupported value, using default");
            T::default()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthy_values() {
        for value in [
            json!(true),
            json!(1),
            json!(1.0),
            json!("1"),
            json!("True"),
            json!("true"),
            json!("T"),
            json!("t"),
        ] {
            assert!(is_truthy(Some(&value)), "{value} should be truthy");
        }
    }

    #[test]
    fn test_falsy_values() {
        for value in [
            json!(false),
            json!(0),
            json!(2),
            json!(0.5),
            json!(-1),
            json!("yes"),
            json!("TRUE"),
            json!(""),
            Value::Null,
            json!([1]),
        ] {
            assert!(!is_truthy(Some(&value)), "{value} should be falsy");
        }
        assert!(!is_truthy(None));
    }

    #[test]
    fn test_flag() {
        assert_eq!(flag(Some(&json!("t"))), 1);
        assert_eq!(flag(None), 0);
    }

    #[test]
    fn test_count() {
        assert_eq!(count(Some(&json!(10)), 5), 10);
        assert_eq!(count(Some(&json!(" 25 ")), 5), 25);
        assert_eq!(count(Some(&json!("ten")), 5), 5);
        assert_eq!(count(Some(&json!(-3)), 5), 5);
        assert_eq!(count(Some(&json!(2.5)), 200), 200);
        assert_eq!(count(None, 200), 200);
    }

    #[test]
    fn test_avatar_named_sizes() {
        assert_eq!(AvatarSize::resolve(Some(&json!("small"))).pixels(), 24);
        assert_eq!(AvatarSize::resolve(Some(&json!("medium"))).pixels(), 32);
        assert_eq!(AvatarSize::resolve(Some(&json!("large"))).pixels(), 48);
        assert_eq!(AvatarSize::resolve(Some(&json!("x-large"))).pixels(), 96);
        assert_eq!(AvatarSize::resolve(Some(&json!("ginormous"))).pixels(), 128);
    }

    #[test]
    fn test_avatar_raw_pixels() {
        assert_eq!(AvatarSize::resolve(Some(&json!(48))), AvatarSize::Large);
        assert_eq!(AvatarSize::resolve(Some(&json!("128"))), AvatarSize::Ginormous);
    }

    #[test]
    fn test_avatar_clamps_to_medium() {
        assert_eq!(AvatarSize::resolve(Some(&json!(999))).pixels(), 32);
        assert_eq!(AvatarSize::resolve(Some(&json!("huge"))).pixels(), 32);
        assert_eq!(AvatarSize::resolve(Some(&json!(true))).pixels(), 32);
        assert_eq!(AvatarSize::resolve(None).pixels(), 32);
    }

    #[test]
    fn test_color() {
        assert_eq!(Color::resolve(Some(&json!("orange"))), Color::Orange);
        assert_eq!(Color::resolve(Some(&json!("purple"))), Color::Blue);
        assert_eq!(Color::resolve(Some(&json!("Red"))), Color::Blue);
        assert_eq!(Color::resolve(None), Color::Blue);
    }

    #[test]
    fn test_tab() {
        assert_eq!(Tab::resolve(Some(&json!("popular"))), Tab::Popular);
        assert_eq!(Tab::resolve(Some(&json!("archive"))), Tab::People);
        assert_eq!(Tab::resolve(None), Tab::People);
    }

    #[test]
    fn test_color_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Color::Grey).unwrap(), json!("grey"));
        assert_eq!(serde_json::to_value(Tab::Recent).unwrap(), json!("recent"));
    }

    #[test]
    fn test_shortname_setting_wins() {
        let mut settings = Settings::default();
        settings.disqus.website_shortname = Some("sitewide".to_owned());
        assert_eq!(shortname(&settings, Some(&json!("percall"))), "sitewide");
    }

    #[test]
    fn test_shortname_from_argument() {
        let settings = Settings::default();
        assert_eq!(shortname(&settings, Some(&json!("percall"))), "percall");
        assert_eq!(shortname(&settings, None), "");
    }

    #[test]
    fn test_shortname_invalid_argument() {
        let settings = Settings::default();
        assert_eq!(shortname(&settings, Some(&json!("bad name\""))), "");
    }
}

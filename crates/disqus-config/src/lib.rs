//! Process-wide settings for the Disqus template helpers.
//!
//! Parses `disqus.toml` with serde and provides auto-discovery of the
//! settings file in parent directories. Hosts can apply their own values on
//! top of the file via [`SettingsOverrides`].
//!
//! ## Environment Variable Expansion
//!
//! String values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `disqus.website_shortname`
//! - `site.domain`
//!
//! ## Example
//!
//! ```
//! use disqus_config::Settings;
//!
//! let settings = Settings::parse(r#"
//! debug = true
//!
//! [disqus]
//! website_shortname = "myblog"
//!
//! [site]
//! domain = "blog.example.com"
//! "#).unwrap();
//!
//! assert!(settings.debug);
//! assert_eq!(settings.shortname(), Some("myblog"));
//! assert_eq!(settings.site.domain, "blog.example.com");
//! ```

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings filename to search for.
const CONFIG_FILENAME: &str = "disqus.toml";

/// Host-supplied values that take precedence over the settings file.
///
/// All fields are optional. Only non-None values override the loaded settings.
#[derive(Debug, Default)]
pub struct SettingsOverrides {
    /// Override the debug flag.
    pub debug: Option<bool>,
    /// Override the site-wide Disqus shortname.
    pub website_shortname: Option<String>,
    /// Override the current site's domain.
    pub domain: Option<String>,
}

/// Process-wide settings, read-only once loaded.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Debug mode. Enables the developer-mode snippet.
    pub debug: bool,
    /// Disqus account settings.
    pub disqus: DisqusConfig,
    /// Current site identity.
    pub site: SiteConfig,

    /// Path to the settings file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Disqus account settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DisqusConfig {
    /// Site-wide shortname. When set, it wins over shortnames passed to tags.
    pub website_shortname: Option<String>,
}

/// Current site identity.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Domain of the current site, without scheme (e.g. `example.com`).
    pub domain: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            domain: "example.com".to_owned(),
        }
    }
}

/// Settings error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Settings file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Settings error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Settings field path (e.g., "`site.domain`").
        field: String,
        /// Error message (e.g., "${`DISQUS_SHORTNAME`} not set").
        message: String,
    },
}

/// Whether `name` is usable as a Disqus shortname.
///
/// Shortnames are non-empty and made of ASCII letters, digits, `-` and `_`.
#[must_use]
pub fn is_valid_shortname(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl Settings {
    /// Load settings from file with optional overrides.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `disqus.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// Overrides are applied after loading, then the result is validated.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the final settings are invalid.
    pub fn load(
        config_path: Option<&Path>,
        overrides: Option<&SettingsOverrides>,
    ) -> Result<Self, ConfigError> {
        let mut settings = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else {
            Self::load_or_default(Self::discover_config())?
        };

        if let Some(overrides) = overrides {
            settings.apply_overrides(overrides);
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from TOML text, expanding environment references.
    ///
    /// # Errors
    ///
    /// Returns error if the TOML is malformed, a referenced variable is unset,
    /// or validation fails.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut settings: Self = toml::from_str(content)?;
        settings.expand_env_vars()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Site-wide shortname, if one is configured and non-empty.
    #[must_use]
    pub fn shortname(&self) -> Option<&str> {
        self.disqus
            .website_shortname
            .as_deref()
            .filter(|name| !name.is_empty())
    }

    /// Validate settings values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_site()?;
        self.validate_disqus()?;
        Ok(())
    }

    fn validate_site(&self) -> Result<(), ConfigError> {
        let domain = &self.site.domain;
        if domain.is_empty() {
            return Err(ConfigError::Validation(
                "site.domain cannot be empty".to_owned(),
            ));
        }
        // The developer snippet prepends the scheme itself
        if domain.contains("://") {
            return Err(ConfigError::Validation(
                "site.domain must not include a scheme".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_disqus(&self) -> Result<(), ConfigError> {
        let Some(shortname) = &self.disqus.website_shortname else {
            return Ok(());
        };
        if shortname.is_empty() {
            return Err(ConfigError::Validation(
                "disqus.website_shortname cannot be empty".to_owned(),
            ));
        }
        if !is_valid_shortname(shortname) {
            return Err(ConfigError::Validation(format!(
                "disqus.website_shortname contains invalid characters: {shortname}"
            )));
        }
        Ok(())
    }

    fn apply_overrides(&mut self, overrides: &SettingsOverrides) {
        if let Some(debug) = overrides.debug {
            self.debug = debug;
        }
        if let Some(shortname) = &overrides.website_shortname {
            self.disqus.website_shortname = Some(shortname.clone());
        }
        if let Some(domain) = &overrides.domain {
            self.site.domain.clone_from(domain);
        }
    }

    /// Load a discovered settings file, or defaults when there is none.
    fn load_or_default(discovered: Option<PathBuf>) -> Result<Self, ConfigError> {
        match discovered {
            Some(path) => Self::load_from_file(&path),
            None => {
                tracing::debug!("No {CONFIG_FILENAME} found, using default settings");
                Ok(Self::default())
            }
        }
    }

    /// Search for settings file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        Self::discover_config_from(&std::env::current_dir().ok()?)
    }

    /// Search for settings file in `start` and its parents.
    fn discover_config_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut settings: Self = toml::from_str(&content)?;
        settings.expand_env_vars()?;
        settings.config_path = Some(path.to_path_buf());

        tracing::info!(
            path = %path.display(),
            debug = settings.debug,
            "Loaded Disqus settings"
        );

        Ok(settings)
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.disqus.website_shortname = expand::expand_env_opt(
            self.disqus.website_shortname.as_deref(),
            "disqus.website_shortname",
        )?;
        self.site.domain = expand::expand_env(&self.site.domain, "site.domain")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_is_valid_shortname() {
        assert!(is_valid_shortname("myblog"));
        assert!(is_valid_shortname("my-blog_2"));
        assert!(!is_valid_shortname(""));
        assert!(!is_valid_shortname("my blog"));
        assert!(!is_valid_shortname("blog.example"));
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(!settings.debug);
        assert_eq!(settings.shortname(), None);
        assert_eq!(settings.site.domain, "example.com");
        assert!(settings.config_path.is_none());
        settings.validate().unwrap();
    }

    #[test]
    fn test_parse_empty() {
        let settings = Settings::parse("").unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.site.domain, "example.com");
    }

    #[test]
    fn test_parse_full() {
        let toml = r#"
debug = true

[disqus]
website_shortname = "my-blog"

[site]
domain = "localhost:8000"
"#;
        let settings = Settings::parse(toml).unwrap();
        assert!(settings.debug);
        assert_eq!(settings.shortname(), Some("my-blog"));
        assert_eq!(settings.site.domain, "localhost:8000");
    }

    #[test]
    fn test_parse_expands_shortname() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("DISQUS_TEST_LIB_SHORTNAME", "envblog");
        }
        let toml = r#"
[disqus]
website_shortname = "${DISQUS_TEST_LIB_SHORTNAME}"
"#;
        let settings = Settings::parse(toml).unwrap();
        assert_eq!(settings.shortname(), Some("envblog"));
        unsafe {
            std::env::remove_var("DISQUS_TEST_LIB_SHORTNAME");
        }
    }

    #[test]
    fn test_empty_domain_rejected() {
        let err = Settings::parse("[site]\ndomain = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("site.domain"));
    }

    #[test]
    fn test_domain_with_scheme_rejected() {
        let err = Settings::parse("[site]\ndomain = \"http://example.com\"\n").unwrap_err();
        assert!(err.to_string().contains("scheme"));
    }

    #[test]
    fn test_invalid_shortname_rejected() {
        let err = Settings::parse("[disqus]\nwebsite_shortname = \"my blog\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("website_shortname"));
    }

    #[test]
    fn test_empty_shortname_rejected() {
        let err = Settings::parse("[disqus]\nwebsite_shortname = \"\"\n").unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_malformed_toml() {
        let err = Settings::parse("debug = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_apply_overrides() {
        let mut settings = Settings::default();
        let overrides = SettingsOverrides {
            debug: Some(true),
            website_shortname: Some("override".to_owned()),
            ..Default::default()
        };

        settings.apply_overrides(&overrides);

        assert!(settings.debug);
        assert_eq!(settings.shortname(), Some("override"));
        assert_eq!(settings.site.domain, "example.com"); // Unchanged
    }

    #[test]
    fn test_apply_overrides_domain() {
        let mut settings = Settings::default();
        let overrides = SettingsOverrides {
            domain: Some("docs.example.org".to_owned()),
            ..Default::default()
        };

        settings.apply_overrides(&overrides);

        assert_eq!(settings.site.domain, "docs.example.org");
        assert!(!settings.debug);
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("disqus.toml");
        std::fs::write(
            &path,
            "debug = true\n[disqus]\nwebsite_shortname = \"fromfile\"\n",
        )
        .unwrap();

        let settings = Settings::load(Some(path.as_path()), None).unwrap();

        assert!(settings.debug);
        assert_eq!(settings.shortname(), Some("fromfile"));
        assert_eq!(settings.config_path, Some(path));
    }

    #[test]
    fn test_load_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("disqus.toml");
        std::fs::write(&path, "debug = true\n").unwrap();

        let overrides = SettingsOverrides {
            debug: Some(false),
            ..Default::default()
        };
        let settings = Settings::load(Some(path.as_path()), Some(&overrides)).unwrap();

        assert!(!settings.debug);
    }

    #[test]
    fn test_load_validates_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("disqus.toml");
        std::fs::write(&path, "").unwrap();

        let overrides = SettingsOverrides {
            domain: Some(String::new()),
            ..Default::default()
        };
        let result = Settings::load(Some(path.as_path()), Some(&overrides));

        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let result = Settings::load(Some(path.as_path()), None);

        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_discover_config_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "debug = true\n").unwrap();
        let start = dir.path().join("blog").join("posts");
        std::fs::create_dir_all(&start).unwrap();

        let discovered = Settings::discover_config_from(&start);

        assert_eq!(discovered, Some(path.clone()));
        let settings = Settings::load_or_default(discovered).unwrap();
        assert!(settings.debug);
        assert_eq!(settings.config_path, Some(path));
    }

    #[test]
    fn test_discover_config_nearest_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();
        let nested = dir.path().join("site");
        std::fs::create_dir(&nested).unwrap();
        let nearest = nested.join(CONFIG_FILENAME);
        std::fs::write(&nearest, "").unwrap();

        assert_eq!(Settings::discover_config_from(&nested), Some(nearest));
    }

    #[test]
    fn test_discover_config_none_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let start = dir.path().join("empty");
        std::fs::create_dir(&start).unwrap();

        let discovered = Settings::discover_config_from(&start);

        assert_eq!(discovered, None);
        let settings = Settings::load_or_default(discovered).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.site.domain, "example.com");
        assert!(settings.config_path.is_none());
    }
}

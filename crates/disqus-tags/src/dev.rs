//! Developer-mode snippet for local servers.

use disqus_config::{Settings, SiteConfig};

/// Source of the current site's domain.
///
/// Site identity belongs to the host; [`SiteConfig`] and [`Settings`]
/// implement this from the `[site]` settings section.
pub trait SiteLookup {
    /// Domain of the current site, without scheme.
    fn current_domain(&self) -> &str;
}

impl SiteLookup for SiteConfig {
    fn current_domain(&self) -> &str {
        &self.domain
    }
}

impl SiteLookup for Settings {
    fn current_domain(&self) -> &str {
        self.site.current_domain()
    }
}

/// Script enabling Disqus developer mode on a local server.
///
/// Returns the snippet only when `settings.debug` is true, and the empty
/// string otherwise.
///
/// # Example
///
/// ```
/// use disqus_config::Settings;
/// use disqus_tags::disqus_dev;
///
/// let mut settings = Settings::default();
/// assert_eq!(disqus_dev(&settings, &settings.site), "");
///
/// settings.debug = true;
/// assert!(disqus_dev(&settings, &settings.site).contains("var disqus_url = 'http://example.com/';"));
/// ```
#[must_use]
pub fn disqus_dev(settings: &Settings, site: &(impl SiteLookup + ?Sized)) -> String {
    if !settings.debug {
        return String::new();
    }

    format!(
        "<script type=\"text/javascript\">\n    var disqus_developer = 1;\n    var disqus_url = 'http://{}/';\n</script>",
        site.current_domain()
    )
}

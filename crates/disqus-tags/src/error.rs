//! Tag errors.
//!
//! Every variant except [`TagError::Fragment`] is raised while compiling a
//! template, before any render starts.

/// Boxed error returned by host fragment renderers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error raised by tag parsing, template compilation, or fragment rendering.
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    /// A setter tag was used without any argument.
    #[error("{tag} takes at least one argument")]
    MissingArgument {
        /// Tag name as written (e.g. `set_disqus_url`).
        tag: String,
    },
    /// More positional arguments than the tag accepts.
    #[error("{tag} takes at most {max} arguments")]
    TooManyArguments {
        /// Tag name.
        tag: String,
        /// Number of parameters the tag declares.
        max: usize,
    },
    /// A keyword argument the tag does not declare.
    #[error("{tag} got an unexpected keyword argument '{name}'")]
    UnknownArgument {
        /// Tag name.
        tag: String,
        /// Keyword as written.
        name: String,
    },
    /// The same parameter given twice (positionally and/or by keyword).
    #[error("{tag} got multiple values for argument '{name}'")]
    DuplicateArgument {
        /// Tag name.
        tag: String,
        /// Parameter name.
        name: String,
    },
    /// The tag name is not one of this library's tags.
    #[error("'{name}' is not a Disqus tag")]
    UnknownTag {
        /// Tag name as written.
        name: String,
    },
    /// A `{%` without a closing `%}`.
    #[error("line {line}: unclosed tag, expected '%}}'")]
    UnclosedTag {
        /// 1-based line of the opening `{%`.
        line: usize,
    },
    /// A tag error located in a template source.
    #[error("line {line}: {source}")]
    Template {
        /// 1-based line of the tag.
        line: usize,
        /// Underlying tag error.
        #[source]
        source: Box<TagError>,
    },
    /// The host failed to render an inclusion fragment.
    #[error("failed to render fragment '{template}': {source}")]
    Fragment {
        /// Fragment template name (e.g. `disqus/show_comments.html`).
        template: String,
        /// Error returned by the host renderer.
        #[source]
        source: BoxError,
    },
}

impl TagError {
    /// Attach the template line where this error occurred.
    #[must_use]
    pub fn at_line(self, line: usize) -> Self {
        Self::Template {
            line,
            source: Box::new(self),
        }
    }
}

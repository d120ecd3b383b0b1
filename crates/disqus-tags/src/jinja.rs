//! Fragment rendering through a `minijinja` environment.

use minijinja::Environment;

use crate::error::BoxError;
use crate::widgets::{FragmentRenderer, WidgetContext};

/// Looks up fragments by [`Widget::template_name`](crate::Widget::template_name)
/// among the environment's templates.
impl FragmentRenderer for Environment<'_> {
    fn render_fragment(&self, template: &str, context: &WidgetContext) -> Result<String, BoxError> {
        let template = self.get_template(template)?;
        Ok(template.render(context)?)
    }
}

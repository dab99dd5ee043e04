use minijinja::{Environment, Error, ErrorKind, Value};

use crate::config::Config;
use crate::locator::Locator;

/// Renders templates resolved through a [`Locator`].
///
/// The renderer owns a configured MiniJinja environment.  Templates are
/// loaded lazily on first use and cached by the environment afterwards.
pub struct Renderer {
    env: Environment<'static>,
    source: String,
}

impl Renderer {
    /// Creates a renderer from the config and the locator to load from.
    pub fn new<L: Locator>(config: &Config, locator: L) -> Renderer {
        let mut env = Environment::new();
        env.set_debug(true);
        config.apply_to_env(&mut env);

        let source = locator.describe();
        tracing::debug!(
            source = %source,
            autoescape = %config.autoescape(),
            strict = config.strict(),
            "configured template environment"
        );

        env.set_loader(move |name| match locator.resolve(name) {
            Ok(contents) => {
                tracing::debug!(name, "resolved template");
                Ok(Some(contents))
            }
            Err(err) if err.is_not_found() => {
                tracing::debug!(name, "template not found");
                Ok(None)
            }
            Err(err) => {
                Err(Error::new(ErrorKind::InvalidOperation, "could not load template")
                    .with_source(err))
            }
        });

        Renderer { env, source }
    }

    /// Describes where this renderer loads templates from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Renders the template `name` with the given context.
    pub fn render(&self, name: &str, ctx: Value) -> Result<String, Error> {
        let rv = self.env.get_template(name)?.render(ctx)?;
        tracing::info!(name, bytes = rv.len(), "rendered template");
        Ok(rv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use minijinja::context;
    use similar_asserts::assert_eq;

    use crate::locator::{EmbeddedLocator, FsLocator};

    static TEMPLATES: &[(&str, &str)] = &[
        ("example.txt", "Hello, {{ name }}!"),
        ("page.html", "<p>{{ name }}</p>"),
        ("age.txt", "[{{ age }}]"),
        ("broken.txt", "{% for item in seq"),
    ];

    fn renderer(config: &Config) -> Renderer {
        Renderer::new(config, EmbeddedLocator::new(TEMPLATES))
    }

    #[test]
    fn test_render_default_context() {
        let config = Config::default();
        let rv = renderer(&config)
            .render("example.txt", config.context())
            .unwrap();
        assert_eq!(rv, "Hello, Jeff!");
    }

    #[test]
    fn test_render_is_idempotent() {
        let config = Config::default();
        let renderer = renderer(&config);
        let first = renderer.render("example.txt", config.context()).unwrap();
        let second = renderer.render("example.txt", config.context()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_escaping_follows_extension() {
        let config = Config::default();
        let renderer = renderer(&config);
        let ctx = context!(name => "<b>");
        assert_eq!(renderer.render("page.html", ctx.clone()).unwrap(), "<p>&lt;b&gt;</p>");
        assert_eq!(renderer.render("example.txt", ctx).unwrap(), "Hello, <b>!");
    }

    #[test]
    fn test_missing_variable_lenient() {
        let config = Config::default();
        let rv = renderer(&config)
            .render("age.txt", config.context())
            .unwrap();
        assert_eq!(rv, "[]");
    }

    #[test]
    fn test_missing_variable_strict() {
        let config = strict_config();
        let err = renderer(&config)
            .render("age.txt", config.context())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UndefinedError);
        assert_eq!(err.name(), Some("age.txt"));
    }

    #[test]
    fn test_template_not_found() {
        let config = Config::default();
        let err = renderer(&config)
            .render("missing.txt", config.context())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TemplateNotFound);
    }

    #[test]
    fn test_syntax_error() {
        let config = Config::default();
        let err = renderer(&config)
            .render("broken.txt", config.context())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SyntaxError);
    }

    #[test]
    fn test_unreadable_template() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("folder.txt")).unwrap();
        let config = Config::default();
        let renderer = Renderer::new(&config, FsLocator::new(dir.path()));
        assert!(renderer.source().starts_with("directory "));
        let err = renderer
            .render("folder.txt", config.context())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
        assert!(std::error::Error::source(&err).is_some());
    }

    fn strict_config() -> Config {
        serde_json::from_str(r#"{"strict": true}"#).unwrap()
    }
}

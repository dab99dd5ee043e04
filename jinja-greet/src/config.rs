use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Context, Error};
use clap::ArgMatches;
use minijinja::{AutoEscape, Environment, UndefinedBehavior, Value};
use serde::{Deserialize, Serialize};

use crate::locator::{EmbeddedLocator, FsLocator, Locator};

/// The template rendered when no other name is given.
pub const DEFAULT_TEMPLATE: &str = "example.txt";

/// Template names ending in one of these (case-insensitive) are HTML escaped
/// in `auto` mode.
const HTML_EXTENSIONS: &[&str] = &[".html", ".htm", ".xml"];

/// Selects how values are escaped when they are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoEscapeMode {
    /// Pick the escaping from the template's file extension.
    #[default]
    Auto,
    Html,
    Json,
    None,
}

impl AutoEscapeMode {
    /// Returns the escaping that applies to the template called `name`.
    pub fn for_template(self, name: &str) -> AutoEscape {
        match self {
            AutoEscapeMode::None => AutoEscape::None,
            AutoEscapeMode::Html => AutoEscape::Html,
            AutoEscapeMode::Json => AutoEscape::Json,
            AutoEscapeMode::Auto => {
                let name = name.to_ascii_lowercase();
                if HTML_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
                    AutoEscape::Html
                } else {
                    AutoEscape::None
                }
            }
        }
    }
}

impl FromStr for AutoEscapeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "auto" => AutoEscapeMode::Auto,
            "html" => AutoEscapeMode::Html,
            "json" => AutoEscapeMode::Json,
            "none" => AutoEscapeMode::None,
            _ => bail!("unknown autoescape mode '{}'", s),
        })
    }
}

impl fmt::Display for AutoEscapeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AutoEscapeMode::Auto => "auto",
            AutoEscapeMode::Html => "html",
            AutoEscapeMode::Json => "json",
            AutoEscapeMode::None => "none",
        })
    }
}

/// Holds in-memory config state for the execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    template: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    template_dir: Option<PathBuf>,
    bundled: bool,
    autoescape: AutoEscapeMode,
    strict: bool,
    newline: bool,
    defines: Arc<BTreeMap<String, Value>>,
}

impl Default for Config {
    fn default() -> Self {
        let mut defines = BTreeMap::new();
        defines.insert("name".to_string(), Value::from("Jeff"));
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            template_dir: None,
            bundled: false,
            autoescape: AutoEscapeMode::Auto,
            strict: false,
            newline: true,
            defines: Arc::new(defines),
        }
    }
}

impl Config {
    pub fn update_from_matches(&mut self, matches: &ArgMatches) -> Result<(), Error> {
        if let Some(template) = matches.get_one::<String>("template") {
            self.template = template.clone();
        }
        if let Some(dir) = matches.get_one::<PathBuf>("template-dir") {
            self.template_dir = Some(dir.clone());
            self.bundled = false;
        }
        if matches.get_flag("bundled") {
            self.bundled = true;
        }
        if let Some(autoescape) = matches.get_one::<String>("autoescape") {
            self.autoescape = autoescape.parse()?;
        }
        if matches.get_flag("strict") {
            self.strict = true;
        }
        if matches.get_flag("no-newline") {
            self.newline = false;
        }
        if let Some(items) = matches.get_many::<String>("define") {
            self.add_defines(items.map(|x| x.as_str()))?;
        }
        Ok(())
    }

    #[cfg(feature = "toml")]
    pub fn load_from_toml(p: &std::path::Path) -> Result<Config, Error> {
        let contents = std::fs::read_to_string(p)
            .with_context(|| format!("unable to read config file '{}'", p.display()))?;
        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("invalid config file '{}'", p.display()))?;
        Ok(cfg)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, Error> {
        toml::to_string_pretty(self).context("could not serialize config")
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn autoescape(&self) -> AutoEscapeMode {
        self.autoescape
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    pub fn newline(&self) -> bool {
        self.newline
    }

    /// The render context built from the defined variables.
    pub fn context(&self) -> Value {
        Value::from_dyn_object(self.defines.clone())
    }

    /// Builds the locator selected by this config.
    pub fn locator(&self) -> Box<dyn Locator> {
        if self.bundled {
            Box::new(EmbeddedLocator::bundled())
        } else if let Some(ref dir) = self.template_dir {
            Box::new(FsLocator::new(dir))
        } else {
            Box::new(FsLocator::package())
        }
    }

    pub fn apply_to_env(&self, env: &mut Environment) {
        let autoescape = self.autoescape;
        env.set_auto_escape_callback(move |name| autoescape.for_template(name));
        env.set_undefined_behavior(if self.strict {
            UndefinedBehavior::Strict
        } else {
            UndefinedBehavior::Lenient
        });
    }

    fn add_defines<'a, I>(&mut self, items: I) -> Result<(), Error>
    where
        I: Iterator<Item = &'a str>,
    {
        let defines = Arc::make_mut(&mut self.defines);
        for item in items {
            if let Some((key, raw_value)) = item.split_once(":=") {
                defines.insert(key.to_string(), interpret_raw_value(raw_value)?);
            } else if let Some((key, string_value)) = item.split_once('=') {
                defines.insert(key.to_string(), Value::from(string_value));
            } else {
                defines.insert(item.to_string(), Value::from(true));
            }
        }
        Ok(())
    }
}

fn interpret_raw_value(s: &str) -> Result<Value, Error> {
    serde_json::from_str::<Value>(s)
        .with_context(|| format!("invalid raw value '{}' (not valid JSON)", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    use similar_asserts::assert_eq;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.template(), "example.txt");
        assert_eq!(cfg.autoescape(), AutoEscapeMode::Auto);
        assert!(!cfg.strict());
        assert!(cfg.newline());
        assert_eq!(cfg.context().get_attr("name").unwrap(), Value::from("Jeff"));
        assert!(cfg.locator().describe().ends_with("templates"));
    }

    #[test]
    fn test_auto_escape_selection() {
        let mode = AutoEscapeMode::Auto;
        assert_eq!(mode.for_template("example.txt"), AutoEscape::None);
        assert_eq!(mode.for_template("index.html"), AutoEscape::Html);
        assert_eq!(mode.for_template("index.htm"), AutoEscape::Html);
        assert_eq!(mode.for_template("feed.xml"), AutoEscape::Html);
        assert_eq!(mode.for_template("PAGE.HTML"), AutoEscape::Html);
        assert_eq!(mode.for_template("Feed.Xml"), AutoEscape::Html);
        assert_eq!(mode.for_template("x.html.j2"), AutoEscape::None);
        assert_eq!(mode.for_template("x.xhtml"), AutoEscape::None);
        assert_eq!(mode.for_template("html"), AutoEscape::None);
        assert_eq!(mode.for_template("data.json"), AutoEscape::None);
        assert_eq!(AutoEscapeMode::Html.for_template("x.txt"), AutoEscape::Html);
        assert_eq!(AutoEscapeMode::None.for_template("x.html"), AutoEscape::None);
        assert_eq!(AutoEscapeMode::Json.for_template("x.txt"), AutoEscape::Json);
    }

    #[test]
    fn test_parse_autoescape() {
        assert_eq!("html".parse::<AutoEscapeMode>().unwrap(), AutoEscapeMode::Html);
        assert_eq!(AutoEscapeMode::Json.to_string(), "json");
        let err = "xml".parse::<AutoEscapeMode>().unwrap_err();
        assert_eq!(err.to_string(), "unknown autoescape mode 'xml'");
    }

    #[test]
    fn test_defines() {
        let mut cfg = Config::default();
        cfg.add_defines(["name=Peter", "age:=42", "flag", "items:=[1,2]"].into_iter())
            .unwrap();
        let ctx = cfg.context();
        assert_eq!(ctx.get_attr("name").unwrap(), Value::from("Peter"));
        assert_eq!(ctx.get_attr("age").unwrap(), Value::from(42));
        assert_eq!(ctx.get_attr("flag").unwrap(), Value::from(true));
        assert_eq!(ctx.get_attr("items").unwrap().len(), Some(2));

        let err = cfg.add_defines(["bad:={"].into_iter()).unwrap_err();
        assert_eq!(err.to_string(), "invalid raw value '{' (not valid JSON)");
    }

    #[test]
    #[cfg(feature = "toml")]
    fn test_load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("greet.toml");
        std::fs::write(
            &path,
            "template = \"page.html\"\nstrict = true\n\n[defines]\nname = \"Anna\"\n",
        )
        .unwrap();
        let cfg = Config::load_from_toml(&path).unwrap();
        assert_eq!(cfg.template(), "page.html");
        assert!(cfg.strict());
        assert!(cfg.newline());
        assert_eq!(cfg.context().get_attr("name").unwrap(), Value::from("Anna"));

        let err = Config::load_from_toml(&dir.path().join("missing.toml")).unwrap_err();
        assert!(err.to_string().starts_with("unable to read config file"));
    }
}

//! Renders a named Jinja2 template from the package template folder.
//!
//! The heavy lifting is done by MiniJinja.  This crate wires up where
//! templates come from ([`Locator`]), how the environment is configured
//! ([`Config`]) and the render call itself ([`Renderer`]):
//!
//! ```rust,no_run
//! use jinja_greet::{Config, Renderer};
//!
//! let config = Config::default();
//! let renderer = Renderer::new(&config, config.locator());
//! println!("{}", renderer.render(config.template(), config.context()).unwrap());
//! ```
mod config;
mod locator;
mod render;

pub use self::config::{AutoEscapeMode, Config, DEFAULT_TEMPLATE};
pub use self::locator::{EmbeddedLocator, FsLocator, LocateError, Locator, PACKAGE_TEMPLATE_DIR};
pub use self::render::Renderer;

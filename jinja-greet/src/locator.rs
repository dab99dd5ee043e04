//! Template source lookup.
//!
//! A [`Locator`] turns a logical template name into the raw template
//! source.  Two implementations are provided: [`FsLocator`] reads from a
//! directory on disk and [`EmbeddedLocator`] serves templates that were
//! compiled into the binary.
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// The templates folder that ships with this package.
pub const PACKAGE_TEMPLATE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/templates");

static BUNDLED_TEMPLATES: &[(&str, &str)] =
    include!(concat!(env!("OUT_DIR"), "/bundled_templates.rs"));

/// Errors produced while resolving a template name.
#[derive(Error, Debug)]
pub enum LocateError {
    /// No template with that name exists at the location.  Names that
    /// would leave the location are reported the same way.
    #[error("template {name:?} does not exist")]
    NotFound { name: String },
    /// The template exists but could not be read.
    #[error("could not read template {name:?}")]
    Io {
        name: String,
        #[source]
        source: minijinja::Error,
    },
}

impl LocateError {
    /// Returns `true` if the error means the template does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LocateError::NotFound { .. })
    }
}

/// Resolves template names to their source.
pub trait Locator: Send + Sync + 'static {
    /// Returns the raw source of the template called `name`.
    fn resolve(&self, name: &str) -> Result<String, LocateError>;

    /// Describes where templates are looked up.
    fn describe(&self) -> String;
}

impl<L: Locator + ?Sized> Locator for Box<L> {
    fn resolve(&self, name: &str) -> Result<String, LocateError> {
        (**self).resolve(name)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Loads templates from a directory on the filesystem.
#[derive(Debug, Clone)]
pub struct FsLocator {
    dir: PathBuf,
}

impl FsLocator {
    /// Creates a locator for the given directory.
    pub fn new<P: AsRef<Path>>(dir: P) -> FsLocator {
        FsLocator {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Creates a locator for the templates folder of this package.
    pub fn package() -> FsLocator {
        FsLocator::new(PACKAGE_TEMPLATE_DIR)
    }

    /// The directory templates are loaded from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Locator for FsLocator {
    fn resolve(&self, name: &str) -> Result<String, LocateError> {
        tracing::debug!(dir = %self.dir.display(), name, "reading template");
        match minijinja::path_loader(&self.dir)(name) {
            Ok(Some(source)) => Ok(source),
            Ok(None) => Err(LocateError::NotFound {
                name: name.to_string(),
            }),
            Err(err) => Err(LocateError::Io {
                name: name.to_string(),
                source: err,
            }),
        }
    }

    fn describe(&self) -> String {
        format!("directory {}", self.dir.display())
    }
}

/// Serves templates from a static table compiled into the binary.
#[derive(Clone)]
pub struct EmbeddedLocator {
    templates: &'static [(&'static str, &'static str)],
}

impl EmbeddedLocator {
    /// Creates a locator over a `(name, source)` table.
    pub fn new(templates: &'static [(&'static str, &'static str)]) -> EmbeddedLocator {
        EmbeddedLocator { templates }
    }

    /// The templates folder of this package as it was at build time.
    pub fn bundled() -> EmbeddedLocator {
        EmbeddedLocator::new(BUNDLED_TEMPLATES)
    }

    /// Iterates over the names of all embedded templates.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.templates.iter().map(|(name, _)| *name)
    }
}

impl fmt::Debug for EmbeddedLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedLocator")
            .field("templates", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

impl Locator for EmbeddedLocator {
    fn resolve(&self, name: &str) -> Result<String, LocateError> {
        self.templates
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, source)| source.to_string())
            .ok_or_else(|| LocateError::NotFound {
                name: name.to_string(),
            })
    }

    fn describe(&self) -> String {
        format!("{} bundled template(s)", self.templates.len())
    }
}

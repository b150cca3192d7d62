//! Override sources.
//!
//! The resolver never reads the process environment directly. It asks an
//! [`OverrideSource`] for each key, so callers decide where overrides come
//! from: the environment, a file, an in-memory map, or a stack of those.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Key to string lookup consulted once per fixture field.
pub trait OverrideSource {
    /// Returns the raw override for `key`, if the source has one.
    fn lookup(&self, key: &str) -> Option<String>;
}

impl<S: OverrideSource + ?Sized> OverrideSource for &S {
    fn lookup(&self, key: &str) -> Option<String> {
        (**self).lookup(key)
    }
}

impl<S: OverrideSource + ?Sized> OverrideSource for Box<S> {
    fn lookup(&self, key: &str) -> Option<String> {
        (**self).lookup(key)
    }
}

/// Reads overrides from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl OverrideSource for EnvSource {
    fn lookup(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// In-memory overrides.
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    values: HashMap<String, String>,
}

impl MapSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an override.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl OverrideSource for MapSource {
    fn lookup(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Overrides loaded from a flat TOML table.
///
/// Keys are the same names the environment uses:
///
/// ```toml
/// KEYCLOAK_TEST_REALM_NAME = "playground"
/// POSTGRES_PORT = 5432
/// FLYWAY_CLEAN = false
/// ```
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl FileSource {
    /// Loads overrides from `path`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read and
    /// `ConfigError::Parse` if it is not a flat table of scalars.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let values = parse_flat_table(&content).map_err(|message| ConfigError::Parse {
            path: path.clone(),
            message,
        })?;

        tracing::debug!("Loaded {} overrides from {}", values.len(), path.display());
        Ok(Self { path, values })
    }

    /// Path the overrides were loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OverrideSource for FileSource {
    fn lookup(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

fn parse_flat_table(content: &str) -> std::result::Result<HashMap<String, String>, String> {
    let table: toml::Table = toml::from_str(content).map_err(|e| e.to_string())?;

    table
        .into_iter()
        .map(|(key, value)| {
            let raw = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                toml::Value::Float(f) => f.to_string(),
                other => {
                    return Err(format!(
                        "key '{key}' must be a string, integer or boolean, found {}",
                        other.type_str()
                    ))
                }
            };
            Ok((key, raw))
        })
        .collect()
}

/// Ordered stack of sources; the first non-empty answer wins.
#[derive(Default)]
pub struct LayeredSource {
    layers: Vec<Box<dyn OverrideSource + Send + Sync>>,
}

impl LayeredSource {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a layer with lower precedence than the ones already added.
    #[must_use]
    pub fn with(mut self, source: impl OverrideSource + Send + Sync + 'static) -> Self {
        self.layers.push(Box::new(source));
        self
    }

    /// Number of layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the stack has no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl OverrideSource for LayeredSource {
    fn lookup(&self, key: &str) -> Option<String> {
        self.layers
            .iter()
            .filter_map(|layer| layer.lookup(key))
            .find(|value| !value.is_empty())
    }
}

impl std::fmt::Debug for LayeredSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayeredSource")
            .field("layers", &self.layers.len())
            .finish()
    }
}

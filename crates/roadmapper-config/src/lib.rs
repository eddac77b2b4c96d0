//! # roadmapper-config
//!
//! Roadmap definition files for roadmapper.
//!
//! This crate provides:
//! - A serde model of TOML and JSON definition files
//! - Conversion into a [`roadmapper_core::Roadmap`], with nested roadmaps as
//!   lazily built [`roadmapper_core::NestedRoadmap`]s
//!
//! Relative paths (logo, font files) are resolved against the directory of
//! the definition file.
//!
//! ## Example
//!
//! ```rust,ignore
//! use roadmapper_config::load;
//!
//! let roadmap = load("roadmap.toml")?;
//! roadmapper_render::save(&roadmap, "roadmap.pdf")?;
//! ```

use std::path::{Path, PathBuf};

use roadmapper_core::{Roadmap, RoadmapError};
use thiserror::Error;
use tracing::debug;

pub mod build;
pub mod definition;

pub use build::{default_detail_text, parse_date, Loader};
pub use definition::Definition;

/// Errors raised while loading a definition file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML definition: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid JSON definition: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error(transparent)]
    Roadmap(#[from] RoadmapError),

    #[error("Unsupported definition format: {0}")]
    UnsupportedFormat(String),
}

/// Definition file syntax, chosen by extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("toml") => Ok(Format::Toml),
            Some("json") => Ok(Format::Json),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Parse a definition from text.
pub fn parse(text: &str, format: Format) -> Result<Definition, ConfigError> {
    let definition = match format {
        Format::Toml => toml::from_str(text)?,
        Format::Json => serde_json::from_str(text)?,
    };
    Ok(definition)
}

/// Read and parse a definition file.
pub fn load_definition(path: impl AsRef<Path>) -> Result<Definition, ConfigError> {
    let path = path.as_ref();
    let format = Format::from_path(path)?;
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), ?format, "loaded definition");
    parse(&text, format)
}

/// Directory that relative paths of `path` resolve against.
pub fn base_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Load a definition file into a roadmap.
pub fn load(path: impl AsRef<Path>) -> Result<Roadmap, ConfigError> {
    let path = path.as_ref();
    let definition = load_definition(path)?;
    Loader::new(base_dir(path)).build(&definition)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(Format::from_path(Path::new("a.TOML")).unwrap(), Format::Toml);
        assert_eq!(Format::from_path(Path::new("dir/a.json")).unwrap(), Format::Json);
        assert!(matches!(
            Format::from_path(Path::new("a.yaml")),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn base_dir_of_bare_file_name_is_current_dir() {
        assert_eq!(base_dir(Path::new("roadmap.toml")), PathBuf::from("."));
        assert_eq!(base_dir(Path::new("defs/roadmap.toml")), PathBuf::from("defs"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load("does/not/exist.toml").unwrap_err();
        assert!(err.to_string().contains("does/not/exist.toml"));
    }
}

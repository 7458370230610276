//! ps-project: partition source files and solver configuration files.
//!
//! Sources are YAML (`.yaml`, `.yml`) or JSON (`.json`), picked by extension.

pub mod schema;
pub mod validate;

use std::path::{Path, PathBuf};

use ps_network::{NetworkError, Partition};
use ps_solver::{SolverConfig, SolverError};
use tracing::debug;

pub use schema::*;
pub use validate::{ValidationError, merge_sources, validate_source};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unsupported file format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Solver config error: {0}")]
    Solver(#[from] SolverError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Source file encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    pub fn from_path(path: &Path) -> ProjectResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Ok(Format::Yaml),
            Some("json") => Ok(Format::Json),
            _ => Err(ProjectError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

fn parse<T: serde::de::DeserializeOwned>(content: &str, format: Format) -> ProjectResult<T> {
    Ok(match format {
        Format::Yaml => serde_yaml::from_str(content)?,
        Format::Json => serde_json::from_str(content)?,
    })
}

/// Parse and validate one partition source.
pub fn parse_source(label: &str, content: &str, format: Format) -> ProjectResult<PartitionSource> {
    let source: PartitionSource = parse(content, format)?;
    validate_source(label, &source)?;
    Ok(source)
}

pub fn parse_solver_config(content: &str, format: Format) -> ProjectResult<SolverConfig> {
    let config: SolverConfig = parse(content, format)?;
    config.validate()?;
    Ok(config)
}

pub fn load_source(path: &Path) -> ProjectResult<PartitionSource> {
    let format = Format::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_source(&path.display().to_string(), &content, format)
}

/// Load one partition from one or more source files.
///
/// The partition is named after the first file's stem.
pub fn load_partition<P: AsRef<Path>>(paths: &[P]) -> ProjectResult<Partition> {
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        sources.push((path.display().to_string(), load_source(path)?));
    }
    let partition = merge_sources(&sources)?;
    debug!(
        files = paths.len(),
        branches = partition.branches().len(),
        injections = partition.injections.len(),
        "loaded partition"
    );

    let name = paths
        .first()
        .and_then(|p| p.as_ref().file_stem())
        .map(|s| s.to_string_lossy().into_owned());
    Ok(match name {
        Some(name) => partition.with_name(name),
        None => partition,
    })
}

pub fn load_solver_config(path: &Path) -> ProjectResult<SolverConfig> {
    let format = Format::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_solver_config(&content, format)
}

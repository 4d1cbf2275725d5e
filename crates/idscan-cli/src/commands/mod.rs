//! Subcommands of the `idscan` binary.

pub mod batch;
pub mod config;
pub mod extract;
pub mod process;

use std::path::{Path, PathBuf};

use idscan_core::DocumentType;
use idscan_core::models::config::IdScanConfig;

/// Load the config from `--config`, else the user config file, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<IdScanConfig> {
    let default_path = config::default_config_path();
    let config = match config_path {
        Some(path) => IdScanConfig::from_file(Path::new(path))?,
        None if default_path.exists() => IdScanConfig::from_file(&default_path)?,
        None => IdScanConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Turn a `--document-type` tag into a document type.
pub fn resolve_document_type(tag: &str, strict: bool) -> anyhow::Result<DocumentType> {
    if strict {
        Ok(DocumentType::parse_strict(tag)?)
    } else {
        Ok(DocumentType::from_tag(tag))
    }
}

/// Write `contents` to `dir/name`, creating `dir` if needed.
pub fn write_in_dir(dir: &Path, name: &str, contents: &str) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(name);
    std::fs::write(&path, contents)?;
    Ok(path)
}

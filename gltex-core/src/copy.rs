//! Copies renamed textures into their final location

use crate::{Error, Result};
use log::info;
use std::fs;
use std::path::PathBuf;

/// Copier configuration
#[derive(Debug, Clone)]
pub struct CopyConfig {
    /// Directory to copy from
    pub source_dir: PathBuf,
    /// Directory to copy into
    pub dest_dir: PathBuf,
    /// Extension of the files to copy, without the dot
    pub extension: String,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("renamed_textures"),
            dest_dir: PathBuf::from("."),
            extension: "png".to_string(),
        }
    }
}

/// Copies every matching file of the source directory into the
/// destination, overwriting files of the same name.
///
/// Returns the copied file names. Fails without copying anything when the
/// source directory is missing.
pub fn copy_textures(config: &CopyConfig) -> Result<Vec<String>> {
    if !config.source_dir.is_dir() {
        return Err(Error::SourceDirMissing(config.source_dir.clone()));
    }

    let suffix = format!(".{}", config.extension);
    let mut names = Vec::new();
    for entry in fs::read_dir(&config.source_dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type()?.is_file() && name.ends_with(&suffix) {
            names.push(name);
        }
    }
    names.sort();

    info!("Found {} texture files to copy", names.len());
    fs::create_dir_all(&config.dest_dir)?;

    for name in &names {
        fs::copy(config.source_dir.join(name), config.dest_dir.join(name))?;
        info!("Copied {}", name);
    }

    Ok(names)
}

mod shader_processor;

pub use shader_processor::*;

use anyhow::{Context, Error as AnyError};
use log::debug;
use serde::Deserialize;
use std::path::Path;

/// Loads the optional `<file>.<ext>.meta` JSON sidecar of a source file.
pub fn load_metadata<T>(file_path: &Path) -> Result<Option<T>, AnyError>
where
    T: for<'de> Deserialize<'de>,
{
    let metadata_extension = match file_path.extension() {
        Some(extension) => format!("{}.meta", extension.to_string_lossy().to_string()),
        None => "meta".to_owned(),
    };
    let metadata_path = file_path.with_extension(metadata_extension);

    if !metadata_path.is_file() {
        debug!(
            "the metadata `{}` does not exist. skipping.",
            metadata_path.display()
        );
        return Ok(None);
    }

    let content = match std::fs::read_to_string(&metadata_path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(
                "the metadata `{}` does not exist. skipping.",
                metadata_path.display()
            );
            return Ok(None);
        }
        Err(err) => {
            return Err(AnyError::from(err)).with_context(|| {
                format!("failed to read the metadata `{}`", metadata_path.display())
            });
        }
    };

    let metadata = serde_json::from_str(&content)
        .with_context(|| format!("parsing the metadata `{}`", metadata_path.display()))?;

    Ok(Some(metadata))
}

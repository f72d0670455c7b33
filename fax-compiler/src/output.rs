use anyhow::{anyhow, Context, Error as AnyError};
use fax_container::Container;
use log::{debug, error, warn};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Writes every container under `output`, replacing whatever was there.
///
/// Containers are written into a staging directory next to `output` first.
/// The previous output root is only replaced once every container has been
/// written, so a failed run leaves it untouched.
pub fn write_containers(
    output: &Path,
    containers: &BTreeMap<PathBuf, Container>,
) -> Result<(), AnyError> {
    let staging = sibling_path(output, "staging")?;
    let previous = sibling_path(output, "previous")?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!(
                    "failed to create the output directory `{}`",
                    parent.display()
                )
            })?;
        }
    }

    remove_if_exists(&staging)?;

    if let Err(err) = write_staging(&staging, containers) {
        if let Err(cleanup_err) = std::fs::remove_dir_all(&staging) {
            debug!(
                "failed to clean up the staging directory `{}`: {}",
                staging.display(),
                cleanup_err
            );
        }
        return Err(err);
    }

    swap_into_place(&staging, output, &previous)?;
    remove_if_exists(&previous)?;

    Ok(())
}

/// Moves `output` aside to `previous` and `staging` onto `output`.
///
/// If the second move fails, `previous` is moved back onto `output`.
fn swap_into_place(staging: &Path, output: &Path, previous: &Path) -> Result<(), AnyError> {
    let replaced = output.exists();

    if replaced {
        warn!(
            "the output path `{}` already exists, it will be overwritten.",
            output.display()
        );

        remove_if_exists(previous)?;
        std::fs::rename(output, previous).with_context(|| {
            format!(
                "failed to move the previous output `{}` aside",
                output.display()
            )
        })?;
    }

    if let Err(err) = std::fs::rename(staging, output) {
        if replaced {
            if let Err(restore_err) = std::fs::rename(previous, output) {
                error!(
                    "failed to restore the previous output `{}` from `{}`: {}",
                    output.display(),
                    previous.display(),
                    restore_err
                );
            }
        }

        return Err(AnyError::from(err)).with_context(|| {
            format!(
                "failed to move the staging directory `{}` to `{}`",
                staging.display(),
                output.display()
            )
        });
    }

    Ok(())
}

fn write_staging(staging: &Path, containers: &BTreeMap<PathBuf, Container>) -> Result<(), AnyError> {
    std::fs::create_dir_all(staging).with_context(|| {
        format!(
            "failed to create the staging directory `{}`",
            staging.display()
        )
    })?;

    for (relative, container) in containers {
        let file = staging.join(relative);

        if let Some(directory) = file.parent() {
            std::fs::create_dir_all(directory).with_context(|| {
                format!("failed to create the directory `{}`", directory.display())
            })?;
        }

        let data = container
            .encode()
            .with_context(|| format!("failed to encode the container `{}`", relative.display()))?;
        std::fs::write(&file, &data)
            .with_context(|| format!("unable to write to the file `{}`", file.display()))?;

        debug!(
            "wrote `{}` ({} stages, {} bytes).",
            relative.display(),
            container.stages().len(),
            data.len()
        );
    }

    Ok(())
}

fn sibling_path(output: &Path, suffix: &str) -> Result<PathBuf, AnyError> {
    let name = match output.file_name() {
        Some(name) => name.to_string_lossy().to_string(),
        None => {
            return Err(anyhow!(
                "the output path `{}` is not valid",
                output.display()
            ))
        }
    };

    Ok(output.with_file_name(format!("{}.{}", name, suffix)))
}

fn remove_if_exists(path: &Path) -> Result<(), AnyError> {
    if !path.exists() {
        return Ok(());
    }

    let result = if path.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };

    result.with_context(|| format!("failed to remove `{}`", path.display()))
}

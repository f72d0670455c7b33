use crate::{
    compiler::{NagaCompiler, ShaderCompiler},
    output::write_containers,
    processors::ShaderProcessor,
};
use anyhow::{anyhow, Context, Error as AnyError};
use fax_container::CONTAINER_EXTENSION;
use log::{debug, info};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

pub fn compile(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<(), AnyError> {
    let input = resolve_input(input.as_ref())?;
    let mut compiler = NagaCompiler::new(&input);

    compile_with(&mut compiler, &input, output.as_ref())
}

/// Compiles every module under `input` with `compiler` and writes the containers to `output`.
///
/// Nothing is written unless every module compiles.
pub fn compile_with<C>(compiler: &mut C, input: &Path, output: &Path) -> Result<(), AnyError>
where
    C: ShaderCompiler,
{
    info!("compiling shaders.");

    let sources = discover_sources(input, compiler.extensions())?;
    let mut processor = ShaderProcessor::new(compiler);
    let mut containers = BTreeMap::new();

    for (relative, source) in sources {
        debug!("processing the shader `{}`.", source.display());

        let container = match processor.process_module(&source)? {
            Some(container) => container,
            None => continue,
        };

        containers.insert(relative, container);
    }

    write_containers(output, &containers)?;

    info!(
        "compilation finished. {} containers written to `{}`.",
        containers.len(),
        output.display()
    );

    Ok(())
}

pub(crate) fn resolve_input(input: &Path) -> Result<PathBuf, AnyError> {
    let input = match input.canonicalize() {
        Ok(input) => input,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(anyhow!(
                "the input path `{}` does not exist",
                input.display()
            ));
        }
        Err(err) => {
            return Err(anyhow!(err)).with_context(|| {
                format!(
                    "failed to canonicalize the input path `{}`",
                    input.display()
                )
            })
        }
    };

    if !input.is_dir() {
        return Err(anyhow!(
            "the input path `{}` must be a directory",
            input.display()
        ));
    }

    Ok(input)
}

/// Finds shader sources under `root`, keyed by their container path.
///
/// Both paths are relative to `root`. Directories are walked breadth first,
/// entries in name order. Two sources that map to the same container path are
/// an error.
pub(crate) fn discover_sources(
    root: &Path,
    extensions: &[&str],
) -> Result<BTreeMap<PathBuf, PathBuf>, AnyError> {
    let mut dirs = vec![root.to_owned()];
    let mut sources = BTreeMap::<PathBuf, PathBuf>::new();

    loop {
        if dirs.is_empty() {
            break;
        }

        let mut added_dirs = Vec::new();

        for dir in &dirs {
            let mut dir_entries = dir
                .read_dir()
                .with_context(|| format!("failed to read the directory `{}`", dir.display()))?
                .collect::<Result<Vec<_>, _>>()?;
            dir_entries.sort_by_key(|entry| entry.file_name());

            for entry in dir_entries {
                let metadata = entry.metadata()?;
                let path = entry.path();

                if metadata.is_dir() {
                    debug!("entry `{}` is a directory.", path.display());
                    added_dirs.push(path);
                    continue;
                }

                if !metadata.is_file() {
                    debug!("entry `{}` is not a file. skipping.", path.display());
                    continue;
                }

                let extension = match path.extension() {
                    Some(extension) => extension.to_string_lossy().to_string(),
                    None => {
                        debug!("the file `{}` has no extension. ignoring.", path.display());
                        continue;
                    }
                };

                if !extensions.contains(&extension.as_str()) {
                    debug!(
                        "the file `{}` has an unsupported extension. ignoring.",
                        path.display()
                    );
                    continue;
                }

                let source = path.strip_prefix(root)?.to_owned();
                let relative = source.with_extension(CONTAINER_EXTENSION);

                if let Some(existing) = sources.get(&relative) {
                    return Err(anyhow!(
                        "the shader `{}` is duplicating the output path `{}` of `{}`",
                        source.display(),
                        relative.display(),
                        existing.display()
                    ));
                }

                sources.insert(relative, source);
            }
        }

        dirs = added_dirs;
    }

    Ok(sources)
}

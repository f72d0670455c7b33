use super::compile::{discover_sources, resolve_input};
use crate::{
    compiler::{NagaCompiler, ShaderCompiler},
    processors::{reflect_descriptor_sets, DescriptorSet},
};
use anyhow::{Context, Error as AnyError};
use log::debug;
use serde::Serialize;
use std::{
    io::Write,
    path::{Path, PathBuf},
};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ModuleReflection {
    pub source: PathBuf,
    pub descriptor_sets: Vec<DescriptorSet>,
}

pub fn reflect(input: impl AsRef<Path>, json: bool) -> Result<(), AnyError> {
    let input = resolve_input(input.as_ref())?;
    let mut compiler = NagaCompiler::new(&input);
    let stdout = std::io::stdout();

    reflect_with(&mut compiler, &input, &mut stdout.lock(), json)
}

pub fn reflect_with<C>(
    compiler: &mut C,
    input: &Path,
    writer: &mut impl Write,
    json: bool,
) -> Result<(), AnyError>
where
    C: ShaderCompiler,
{
    let mut modules = Vec::new();

    for source in discover_sources(input, compiler.extensions())?.into_values() {
        debug!("reflecting the shader `{}`.", source.display());

        let module = compiler
            .load_module(&source)
            .with_context(|| format!("failed to load the shader `{}`", source.display()))?;
        let descriptor_sets = reflect_descriptor_sets(&*compiler, &module).with_context(|| {
            format!("failed to reflect the resources of `{}`", source.display())
        })?;

        modules.push(ModuleReflection {
            source,
            descriptor_sets,
        });
    }

    if json {
        serde_json::to_writer_pretty(&mut *writer, &modules)?;
        writeln!(writer)?;
        return Ok(());
    }

    for module in &modules {
        writeln!(writer, "{}", module.source.display())?;

        for set in &module.descriptor_sets {
            writeln!(writer, "  set {}", set.index())?;

            for index in 0..set.len() {
                writeln!(writer, "    {}", set.get(index)?)?;
            }
        }
    }

    Ok(())
}

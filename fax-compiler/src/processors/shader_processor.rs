mod classifier;
mod descriptors;
mod parameters;

pub use classifier::*;
pub use descriptors::*;
pub use parameters::*;

use crate::compiler::{ShaderCompiler, SPIRV_TARGET_INDEX};
use anyhow::{Context, Error as AnyError};
use fax_container::{Container, StageRecord};
use log::debug;
use std::path::Path;

/// Turns shader modules into containers, one module at a time.
pub struct ShaderProcessor<'c, C> {
    compiler: &'c mut C,
}

impl<'c, C> ShaderProcessor<'c, C>
where
    C: ShaderCompiler,
{
    pub fn new(compiler: &'c mut C) -> Self {
        Self { compiler }
    }

    /// Compiles every entry point of the module at `path`.
    ///
    /// Returns `None` for a module without entry points.
    pub fn process_module(&mut self, path: &Path) -> Result<Option<Container>, AnyError> {
        let module = self
            .compiler
            .load_module(path)
            .with_context(|| format!("failed to load the shader `{}`", path.display()))?;
        let entry_points = self.compiler.entry_points(&module);

        if entry_points.is_empty() {
            debug!(
                "the shader `{}` defines no entry points. skipping.",
                path.display()
            );
            return Ok(None);
        }

        for set in reflect_descriptor_sets(&*self.compiler, &module)
            .with_context(|| format!("failed to reflect the resources of `{}`", path.display()))?
        {
            if set.is_empty() {
                debug!("`{}` set {} has no descriptors.", path.display(), set.index());
                continue;
            }

            debug!(
                "`{}` set {} has {} descriptors.",
                path.display(),
                set.index(),
                set.len()
            );
            for descriptor in set.iter() {
                debug!("`{}` set {}: {}", path.display(), set.index(), descriptor);
            }
        }

        let mut state = PipelineState::new();
        let mut container = Container::default();

        for entry_point in &entry_points {
            let stage = entry_point.stage.stage_kind().with_context(|| {
                format!(
                    "encountered unknown entry point stage in `{}`: {}",
                    path.display(),
                    entry_point.name
                )
            })?;

            state.classify(stage).with_context(|| {
                format!(
                    "the entry point `{}` does not fit the pipeline of `{}`",
                    entry_point.name,
                    path.display()
                )
            })?;

            let parameters = extract_parameters(stage, entry_point).with_context(|| {
                format!(
                    "invalid {} stage metadata in `{}`",
                    stage,
                    path.display()
                )
            })?;

            let code = self
                .compiler
                .generate_code(&module, entry_point, SPIRV_TARGET_INDEX)
                .with_context(|| {
                    format!(
                        "failed to compile the entry point `{}` of `{}`",
                        entry_point.name,
                        path.display()
                    )
                })?;

            debug!(
                "compiled the {} entry point `{}` of `{}` into {} bytes.",
                stage,
                entry_point.name,
                path.display(),
                code.len()
            );

            container.push(StageRecord::new(stage, parameters, code));
        }

        debug!(
            "the shader `{}` is a {} pipeline ({}).",
            path.display(),
            state.kind(),
            state.substage()
        );

        Ok(Some(container))
    }
}

/// Builds one descriptor set per reflected resource block of `module`.
pub fn reflect_descriptor_sets<C>(
    compiler: &C,
    module: &C::Module,
) -> Result<Vec<DescriptorSet>, DescriptorError>
where
    C: ShaderCompiler,
{
    compiler
        .resource_blocks(module)
        .iter()
        .map(|(index, layout)| DescriptorSet::build(layout, *index))
        .collect()
}

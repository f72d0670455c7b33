use super::{
    Annotation, BindingType, DescriptorRange, Diagnostic, EntryPointReflection, ExecutionStage,
    ParameterReflection, ResourceBlockLayout, ResourceField, ShaderCompiler, SPIRV_TARGET_INDEX,
};
use crate::processors::load_metadata;
use log::debug;
use naga::{
    valid::{Capabilities, ModuleInfo, ValidationFlags, Validator},
    AddressSpace, ArraySize, GlobalVariable, Handle, ImageClass, Module, ShaderStage, Type,
    TypeInner,
};
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Per-shader sidecar metadata, read from `<file>.wgsl.meta`.
///
/// WGSL has no user attributes, so entry point annotations live here.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct ShaderMetadata {
    #[serde(default)]
    pub annotations: BTreeMap<String, Vec<Annotation>>,
}

#[derive(Debug)]
pub struct NagaModule {
    path: PathBuf,
    module: Module,
    info: ModuleInfo,
    metadata: ShaderMetadata,
}

/// WGSL front end and SPIR-V back end, both provided by naga.
pub struct NagaCompiler {
    search_path: PathBuf,
    spirv_options: naga::back::spv::Options<'static>,
}

impl NagaCompiler {
    pub fn new(search_path: impl Into<PathBuf>) -> Self {
        Self {
            search_path: search_path.into(),
            spirv_options: naga::back::spv::Options::default(),
        }
    }
}

impl ShaderCompiler for NagaCompiler {
    type Module = NagaModule;

    fn extensions(&self) -> &'static [&'static str] {
        &["wgsl"]
    }

    fn load_module(&mut self, path: &Path) -> Result<Self::Module, Diagnostic> {
        let file = self.search_path.join(path);
        let source = std::fs::read_to_string(&file).map_err(|err| {
            Diagnostic(format!("failed to read `{}`: {}", file.display(), err))
        })?;

        let module = naga::front::wgsl::parse_str(&source)
            .map_err(|err| Diagnostic(err.emit_to_string(&source)))?;

        let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
        let info = validator
            .validate(&module)
            .map_err(|err| Diagnostic(err.emit_to_string(&source)))?;

        let metadata = load_metadata::<ShaderMetadata>(&file)
            .map_err(|err| Diagnostic(format!("{:#}", err)))?
            .unwrap_or_default();

        for name in metadata.annotations.keys() {
            if !module.entry_points.iter().any(|entry| &entry.name == name) {
                debug!(
                    "the metadata of `{}` annotates `{}` which is not an entry point.",
                    path.display(),
                    name
                );
            }
        }

        Ok(NagaModule {
            path: path.to_owned(),
            module,
            info,
            metadata,
        })
    }

    fn entry_points(&self, module: &Self::Module) -> Vec<EntryPointReflection> {
        module
            .module
            .entry_points
            .iter()
            .map(|entry_point| {
                let stage = match entry_point.stage {
                    ShaderStage::Vertex => ExecutionStage::Vertex,
                    ShaderStage::Fragment => ExecutionStage::Fragment,
                    ShaderStage::Compute => ExecutionStage::Compute,
                };
                let parameters = entry_point
                    .function
                    .arguments
                    .iter()
                    .map(|argument| ParameterReflection {
                        name: argument.name.clone().unwrap_or_default(),
                        type_name: type_name(&module.module, argument.ty),
                    })
                    .collect();
                let annotations = module
                    .metadata
                    .annotations
                    .get(&entry_point.name)
                    .cloned()
                    .unwrap_or_default();

                EntryPointReflection {
                    name: entry_point.name.clone(),
                    stage,
                    parameters,
                    annotations,
                }
            })
            .collect()
    }

    fn resource_blocks(&self, module: &Self::Module) -> BTreeMap<usize, ResourceBlockLayout> {
        let mut groups = BTreeMap::<u32, Vec<(u32, &GlobalVariable)>>::new();

        for (_, variable) in module.module.global_variables.iter() {
            let binding = match &variable.binding {
                Some(binding) => binding,
                None => {
                    continue;
                }
            };

            groups
                .entry(binding.group)
                .or_default()
                .push((binding.binding, variable));
        }

        groups
            .into_iter()
            .map(|(group, mut variables)| {
                variables.sort_by_key(|(binding, _)| *binding);

                let mut ranges = Vec::with_capacity(variables.len());
                let mut fields = Vec::with_capacity(variables.len());
                let mut slot = 0;

                for (binding, variable) in variables {
                    let (binding_type, descriptor_count) =
                        reflect_binding(&module.module, variable);

                    fields.push(ResourceField {
                        name: variable
                            .name
                            .clone()
                            .unwrap_or_else(|| format!("binding{}", binding)),
                        binding: slot,
                    });
                    ranges.push(DescriptorRange {
                        binding_type,
                        descriptor_count,
                    });
                    slot += descriptor_count;
                }

                let layout = ResourceBlockLayout {
                    name: format!("group{}", group),
                    size: 0,
                    ranges,
                    fields,
                };

                (group as usize, layout)
            })
            .collect()
    }

    fn generate_code(
        &mut self,
        module: &Self::Module,
        entry_point: &EntryPointReflection,
        target_index: usize,
    ) -> Result<Vec<u8>, Diagnostic> {
        if target_index != SPIRV_TARGET_INDEX {
            return Err(Diagnostic(format!(
                "target index {} is out of range, the session only targets SPIR-V",
                target_index
            )));
        }

        let shader_stage = match entry_point.stage {
            ExecutionStage::Vertex => ShaderStage::Vertex,
            ExecutionStage::Fragment => ShaderStage::Fragment,
            ExecutionStage::Compute => ShaderStage::Compute,
            stage => {
                return Err(Diagnostic(format!(
                    "the `{:?}` stage of `{}` is not supported by the WGSL backend",
                    stage, entry_point.name
                )));
            }
        };
        let pipeline_options = naga::back::spv::PipelineOptions {
            shader_stage,
            entry_point: entry_point.name.clone(),
        };

        let words = naga::back::spv::write_vec(
            &module.module,
            &module.info,
            &self.spirv_options,
            Some(&pipeline_options),
        )
        .map_err(|err| {
            Diagnostic(format!(
                "failed to generate SPIR-V for `{}` in `{}`: {}",
                entry_point.name,
                module.path.display(),
                err
            ))
        })?;

        Ok(words.iter().flat_map(|word| word.to_le_bytes()).collect())
    }
}

fn type_name(module: &Module, ty: Handle<Type>) -> String {
    module.types[ty].name.clone().unwrap_or_default()
}

fn reflect_binding(module: &Module, variable: &GlobalVariable) -> (BindingType, usize) {
    let (ty, count) = match &module.types[variable.ty].inner {
        TypeInner::BindingArray { base, size } => match size {
            ArraySize::Constant(size) => (*base, size.get() as usize),
            ArraySize::Dynamic => (*base, 1),
        },
        _ => (variable.ty, 1),
    };

    let binding_type = match variable.space {
        AddressSpace::Uniform => BindingType::ConstantBuffer,
        AddressSpace::Storage { .. } => BindingType::RawBuffer,
        AddressSpace::PushConstant => BindingType::PushConstant,
        AddressSpace::Handle => match &module.types[ty].inner {
            TypeInner::Sampler { .. } => BindingType::Sampler,
            TypeInner::Image {
                class: ImageClass::Storage { .. },
                ..
            } => BindingType::MutableTexture,
            TypeInner::Image { .. } => BindingType::Texture,
            TypeInner::AccelerationStructure => BindingType::RayTracingAccelerationStructure,
            _ => BindingType::Unknown,
        },
        _ => BindingType::Unknown,
    };

    (binding_type, count)
}

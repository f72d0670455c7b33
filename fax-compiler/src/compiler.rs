mod naga_compiler;

pub use naga_compiler::*;

use serde::Deserialize;
use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter, Result as FmtResult},
    path::Path,
};
use thiserror::Error;

/// Index of the SPIR-V target every session is bound to.
pub const SPIRV_TARGET_INDEX: usize = 0;

/// Diagnostic text produced by a compiler backend. Always fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct Diagnostic(pub String);

/// Execution stage tag as reported by the backend's program layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionStage {
    None,
    Vertex,
    Hull,
    Domain,
    Geometry,
    Fragment,
    Compute,
    RayGeneration,
    Intersection,
    AnyHit,
    ClosestHit,
    Miss,
    Callable,
    Mesh,
    Amplification,
    Unknown(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntryPointReflection {
    pub name: String,
    pub stage: ExecutionStage,
    pub parameters: Vec<ParameterReflection>,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterReflection {
    pub name: String,
    pub type_name: String,
}

/// A user annotation attached to an entry point, e.g. `targets("R8G8B8A8_UNORM")`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Annotation {
    pub name: String,
    #[serde(default)]
    pub arguments: Vec<AnnotationValue>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum AnnotationValue {
    String(String),
    Integer(i64),
    Float(f64),
}

impl AnnotationValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }
}

impl Display for AnnotationValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::String(value) => write!(f, "\"{}\"", value),
            Self::Integer(value) => write!(f, "{}", value),
            Self::Float(value) => write!(f, "{}", value),
        }
    }
}

/// Native binding type of a descriptor range, as reflected by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingType {
    Sampler,
    Texture,
    CombinedTextureSampler,
    MutableTexture,
    TypedBuffer,
    MutableTypedBuffer,
    ConstantBuffer,
    RawBuffer,
    MutableRawBuffer,
    InputRenderTarget,
    RayTracingAccelerationStructure,
    PushConstant,
    ParameterBlock,
    VaryingInput,
    VaryingOutput,
    ExistentialValue,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DescriptorRange {
    pub binding_type: BindingType,
    pub descriptor_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceField {
    pub name: String,
    /// First binding slot the field occupies within its block.
    pub binding: usize,
}

/// Layout of one resource block (one descriptor set) of a program.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceBlockLayout {
    pub name: String,
    /// Size of the block's own uniform data, zero if it only holds resources.
    pub size: usize,
    pub ranges: Vec<DescriptorRange>,
    pub fields: Vec<ResourceField>,
}

impl ResourceBlockLayout {
    pub fn field_at(&self, binding: usize) -> Option<&ResourceField> {
        self.fields.iter().find(|field| field.binding == binding)
    }
}

/// Reflection and code generation contract of a shader compiler backend.
///
/// A compiler is a session bound to one search path and one code target.
/// Any [`Diagnostic`] it returns aborts the whole run.
pub trait ShaderCompiler {
    type Module;

    /// Source file extensions this backend loads, without the leading dot.
    fn extensions(&self) -> &'static [&'static str];

    /// Loads the module at `path`, relative to the session's search path.
    fn load_module(&mut self, path: &Path) -> Result<Self::Module, Diagnostic>;

    fn entry_points(&self, module: &Self::Module) -> Vec<EntryPointReflection>;

    /// Resource blocks keyed by their descriptor set index.
    fn resource_blocks(&self, module: &Self::Module) -> BTreeMap<usize, ResourceBlockLayout>;

    /// Links `entry_point` and generates code for the target at `target_index`.
    fn generate_code(
        &mut self,
        module: &Self::Module,
        entry_point: &EntryPointReflection,
        target_index: usize,
    ) -> Result<Vec<u8>, Diagnostic>;
}

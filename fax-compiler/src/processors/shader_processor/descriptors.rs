use crate::compiler::{BindingType, DescriptorRange, ResourceBlockLayout};
use serde::Serialize;
use std::fmt::{Display, Formatter, Result as FmtResult};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("the binding type `{binding_type:?}` has no descriptor equivalent")]
    UnsupportedBindingType { binding_type: BindingType },
    #[error("the resource block `{block}` declares no field at binding {binding}")]
    MissingField { block: String, binding: usize },
    #[error("descriptor index {index} is out of range for a set of {len} descriptors")]
    OutOfRange { index: usize, len: usize },
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    /// Selects which texels to read from a texture.
    Sampler,
    /// Texture read through a separate sampler.
    SampledTexture,
    /// Texture and its sampler bound together.
    SamplerAndTexture,
    /// Texture that can be read and written in the same shader.
    StorageTexture,
    UniformTexelBuffer,
    StorageTexelBuffer,
    UniformBuffer,
    StorageBuffer,
    /// Framebuffer-local attachment read.
    InputAttachment,
    AccelerationStructure,
}

impl TryFrom<BindingType> for DescriptorKind {
    type Error = DescriptorError;

    fn try_from(binding_type: BindingType) -> Result<Self, Self::Error> {
        let kind = match binding_type {
            BindingType::Sampler => Self::Sampler,
            BindingType::Texture => Self::SampledTexture,
            BindingType::CombinedTextureSampler => Self::SamplerAndTexture,
            BindingType::MutableTexture => Self::StorageTexture,
            BindingType::TypedBuffer => Self::UniformTexelBuffer,
            BindingType::MutableTypedBuffer => Self::StorageTexelBuffer,
            BindingType::ConstantBuffer => Self::UniformBuffer,
            BindingType::RawBuffer => Self::StorageBuffer,
            BindingType::InputRenderTarget => Self::InputAttachment,
            BindingType::RayTracingAccelerationStructure => Self::AccelerationStructure,
            BindingType::MutableRawBuffer
            | BindingType::PushConstant
            | BindingType::ParameterBlock
            | BindingType::VaryingInput
            | BindingType::VaryingOutput
            | BindingType::ExistentialValue
            | BindingType::Unknown => {
                return Err(DescriptorError::UnsupportedBindingType { binding_type });
            }
        };

        Ok(kind)
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Descriptor {
    pub name: String,
    pub kind: DescriptorKind,
    /// First binding slot.
    pub index: usize,
    /// Number of consecutive slots.
    pub count: usize,
}

impl Display for Descriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "[{}] {} {:?} x{}",
            self.index, self.name, self.kind, self.count
        )
    }
}

/// Descriptors of one set, in binding order with contiguous slots.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct DescriptorSet {
    index: usize,
    descriptors: Vec<Descriptor>,
}

impl DescriptorSet {
    pub fn build(layout: &ResourceBlockLayout, index: usize) -> Result<Self, DescriptorError> {
        let mut set = Self {
            index,
            descriptors: Vec::with_capacity(layout.ranges.len() + 1),
        };

        // a block with its own data gets an implicit uniform buffer in front
        if 0 < layout.size {
            set.descriptors.push(Descriptor {
                name: layout.name.clone(),
                kind: DescriptorKind::UniformBuffer,
                index: 0,
                count: 1,
            });
        }

        for range in &layout.ranges {
            set.add_range(layout, range)?;
        }

        Ok(set)
    }

    fn add_range(
        &mut self,
        layout: &ResourceBlockLayout,
        range: &DescriptorRange,
    ) -> Result<(), DescriptorError> {
        let index = match self.descriptors.last() {
            Some(last) => last.index + last.count,
            None => 0,
        };
        let kind = DescriptorKind::try_from(range.binding_type)?;
        let name = match layout.field_at(index) {
            Some(field) => field.name.clone(),
            None => {
                return Err(DescriptorError::MissingField {
                    block: layout.name.clone(),
                    binding: index,
                });
            }
        };

        self.descriptors.push(Descriptor {
            name,
            kind,
            index,
            count: range.descriptor_count,
        });

        Ok(())
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Descriptor, DescriptorError> {
        self.descriptors
            .get(index)
            .ok_or(DescriptorError::OutOfRange {
                index,
                len: self.descriptors.len(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Descriptor> {
        self.descriptors.iter()
    }
}

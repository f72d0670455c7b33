use crate::compiler::ExecutionStage;
use fax_container::StageKind;
use std::fmt::{Display, Formatter, Result as FmtResult};
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageTagError {
    #[error("the entry point declares no execution stage")]
    Missing,
    #[error("`{0}` is not a recognized execution stage tag")]
    Unrecognized(u32),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationError {
    #[error("the module mixes incompatible pipeline kinds: `{stage}` is a {candidate} stage but the module is a {existing} pipeline")]
    MixedPipelineKinds {
        stage: StageKind,
        existing: PipelineKind,
        candidate: PipelineKind,
    },
    #[error("the module declares two mutually exclusive geometry substages: `{stage}` belongs to the {candidate} but the module already uses the {existing}")]
    ConflictingSubstages {
        stage: StageKind,
        existing: Substage,
        candidate: Substage,
    },
}

impl ExecutionStage {
    pub fn stage_kind(self) -> Result<StageKind, StageTagError> {
        let kind = match self {
            Self::None => return Err(StageTagError::Missing),
            Self::Unknown(tag) => return Err(StageTagError::Unrecognized(tag)),
            Self::Vertex => StageKind::Vertex,
            Self::Hull => StageKind::Hull,
            Self::Domain => StageKind::Domain,
            Self::Geometry => StageKind::Geometry,
            Self::Fragment => StageKind::Fragment,
            Self::Compute => StageKind::Compute,
            Self::RayGeneration => StageKind::RayGeneration,
            Self::Intersection => StageKind::Intersection,
            Self::AnyHit => StageKind::AnyHit,
            Self::ClosestHit => StageKind::ClosestHit,
            Self::Miss => StageKind::Miss,
            Self::Callable => StageKind::Callable,
            Self::Mesh => StageKind::Mesh,
            Self::Amplification => StageKind::Amplification,
        };

        Ok(kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineKind {
    Unset,
    Graphics,
    Compute,
    RayTracing,
}

impl Display for PipelineKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Unset => write!(f, "unset"),
            Self::Graphics => write!(f, "graphics"),
            Self::Compute => write!(f, "compute"),
            Self::RayTracing => write!(f, "ray tracing"),
        }
    }
}

/// Geometry front end of a graphics pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Substage {
    NA,
    VertexFamily,
    MeshFamily,
}

impl Display for Substage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::NA => write!(f, "no substage"),
            Self::VertexFamily => write!(f, "vertex substage"),
            Self::MeshFamily => write!(f, "mesh substage"),
        }
    }
}

/// Pipeline kind and substage a stage belongs to.
///
/// Mesh and amplification are grouped with ray tracing.
pub fn pipeline_of(stage: StageKind) -> (PipelineKind, Substage) {
    match stage {
        StageKind::Vertex
        | StageKind::Hull
        | StageKind::Domain
        | StageKind::Geometry
        | StageKind::Fragment => (PipelineKind::Graphics, Substage::VertexFamily),
        StageKind::Compute => (PipelineKind::Compute, Substage::NA),
        StageKind::RayGeneration
        | StageKind::Intersection
        | StageKind::AnyHit
        | StageKind::ClosestHit
        | StageKind::Miss
        | StageKind::Callable => (PipelineKind::RayTracing, Substage::NA),
        StageKind::Mesh | StageKind::Amplification => {
            (PipelineKind::RayTracing, Substage::MeshFamily)
        }
    }
}

/// Classification state of a single module. Create one per module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineState {
    kind: PipelineKind,
    substage: Substage,
}

impl PipelineState {
    pub fn new() -> Self {
        Self {
            kind: PipelineKind::Unset,
            substage: Substage::NA,
        }
    }

    pub fn kind(&self) -> PipelineKind {
        self.kind
    }

    pub fn substage(&self) -> Substage {
        self.substage
    }

    pub fn classify(&mut self, stage: StageKind) -> Result<(), ClassificationError> {
        let (candidate_kind, candidate_substage) = pipeline_of(stage);

        if self.kind == PipelineKind::Unset {
            self.kind = candidate_kind;
            self.substage = candidate_substage;
            return Ok(());
        }

        if self.kind != candidate_kind {
            return Err(ClassificationError::MixedPipelineKinds {
                stage,
                existing: self.kind,
                candidate: candidate_kind,
            });
        }

        if candidate_substage == Substage::NA {
            return Ok(());
        }

        if self.substage == Substage::NA {
            self.substage = candidate_substage;
            return Ok(());
        }

        if self.substage != candidate_substage {
            return Err(ClassificationError::ConflictingSubstages {
                stage,
                existing: self.substage,
                candidate: candidate_substage,
            });
        }

        Ok(())
    }
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new()
    }
}

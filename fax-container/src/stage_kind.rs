use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Pipeline role of a compiled entry point.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StageKind {
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
}

impl StageKind {
    pub const ALL: [StageKind; 14] = [
        Self::Vertex,
        Self::Hull,
        Self::Domain,
        Self::Geometry,
        Self::Fragment,
        Self::Compute,
        Self::RayGeneration,
        Self::Intersection,
        Self::AnyHit,
        Self::ClosestHit,
        Self::Miss,
        Self::Callable,
        Self::Mesh,
        Self::Amplification,
    ];

    /// Keyword written in front of each stage record of a container.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Hull => "hull",
            Self::Domain => "domain",
            Self::Geometry => "geometry",
            Self::Fragment => "fragment",
            Self::Compute => "compute",
            Self::RayGeneration => "rayGeneration",
            Self::Intersection => "intersection",
            Self::AnyHit => "anyHit",
            Self::ClosestHit => "closestHit",
            Self::Miss => "miss",
            Self::Callable => "callable",
            Self::Mesh => "mesh",
            Self::Amplification => "task",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.keyword() == keyword)
    }
}

impl Display for StageKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.keyword())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_kind_keyword_lookup() {
        for stage in StageKind::ALL {
            assert_eq!(StageKind::from_keyword(stage.keyword()), Some(stage));
        }

        assert_eq!(
            StageKind::from_keyword("task"),
            Some(StageKind::Amplification)
        );
        assert_eq!(StageKind::from_keyword("amplification"), None);
        assert_eq!(StageKind::from_keyword("Vertex"), None);
    }
}

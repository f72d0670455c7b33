use crate::compiler::{AnnotationValue, EntryPointReflection};
use fax_container::StageKind;
use thiserror::Error;

/// Vertex input types that are recorded for vertex stages.
pub const VERTEX_ATTRIBUTES: [&str; 7] = [
    "Vertex3D",
    "Vertex2D",
    "Normal",
    "Tangent",
    "UVCoordinates",
    "VertexColor",
    "BoneWeights",
];

pub const COLOR_TARGETS: [&str; 72] = [
    "R32G32B32A32_FLOAT",
    "R32G32B32A32_UINT",
    "R32G32B32A32_SINT",
    "R32G32B32_FLOAT",
    "R32G32B32_UINT",
    "R32G32B32_SINT",
    "R16G16B16A16_FLOAT",
    "R16G16B16A16_UNORM",
    "R16G16B16A16_UINT",
    "R16G16B16A16_SNORM",
    "R16G16B16A16_SINT",
    "R32G32_FLOAT",
    "R32G32_UINT",
    "R32G32_SINT",
    "R10G10B10A2_UNORM",
    "R10G10B10A2_UINT",
    "R11G11B10_FLOAT",
    "R8G8B8A8_UNORM",
    "R8G8B8A8_UNORM_SRGB",
    "R8G8B8A8_UINT",
    "R8G8B8A8_SNORM",
    "R8G8B8A8_SINT",
    "R16G16_FLOAT",
    "R16G16_UNORM",
    "R16G16_UINT",
    "R16G16_SNORM",
    "R16G16_SINT",
    "R32_FLOAT",
    "R32_UINT",
    "R32_SINT",
    "R8G8_UNORM",
    "R8G8_UINT",
    "R8G8_SNORM",
    "R8G8_SINT",
    "R16_FLOAT",
    "R16_UNORM",
    "R16_UINT",
    "R16_SNORM",
    "R16_SINT",
    "R8_UNORM",
    "R8_UINT",
    "R8_SNORM",
    "R8_SINT",
    "A8_UNORM",
    "R9G9B9E5_SHAREDEXP",
    "R8G8_B8G8_UNORM",
    "G8R8_G8B8_UNORM",
    "BC1_UNORM",
    "BC1_UNORM_SRGB",
    "BC2_UNORM",
    "BC2_UNORM_SRGB",
    "BC3_UNORM",
    "BC3_UNORM_SRGB",
    "BC4_UNORM",
    "BC4_SNORM",
    "BC5_UNORM",
    "BC5_SNORM",
    "B5G6R5_UNORM",
    "B5G5R5A1_UNORM",
    "B8G8R8A8_UNORM",
    "B8G8R8X8_UNORM",
    "B8G8R8A8_UNORM_SRGB",
    "B8G8R8X8_UNORM_SRGB",
    "BC6H_UF16",
    "BC6H_SF16",
    "BC7_UNORM",
    "BC7_UNORM_SRGB",
    "AYUV",
    "NV12",
    "OPAQUE_420",
    "YUY2",
    "B4G4R4A4_UNORM",
];

/// Depth targets, including `none` for an explicitly depthless pass.
pub const DEPTH_TARGETS: [&str; 5] = [
    "D32_FLOAT_S8X24_UINT",
    "D32_FLOAT",
    "D24_UNORM_S8_UINT",
    "D16_UNORM",
    "none",
];

pub const DEFAULT_COLOR_TARGET: &str = "R8G8B8A8_UNORM";
pub const DEFAULT_DEPTH_TARGET: &str = "D32_FLOAT";

const TARGETS_ANNOTATION: &str = "targets";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("unknown target format `{target}` defined in fragment stage `{entry_point}`")]
    UnknownTarget { entry_point: String, target: String },
    #[error("multiple depth targets defined for fragment stage `{entry_point}`: `{first}` and `{second}`")]
    MultipleDepthTargets {
        entry_point: String,
        first: String,
        second: String,
    },
    #[error("target {value} of fragment stage `{entry_point}` is not a string")]
    NonStringTarget {
        entry_point: String,
        value: AnnotationValue,
    },
}

pub fn is_color_target(target: &str) -> bool {
    COLOR_TARGETS.contains(&target)
}

pub fn is_depth_target(target: &str) -> bool {
    DEPTH_TARGETS.contains(&target)
}

/// Stage metadata strings stored alongside the compiled code of `entry_point`.
pub fn extract_parameters(
    stage: StageKind,
    entry_point: &EntryPointReflection,
) -> Result<Vec<String>, ParameterError> {
    match stage {
        StageKind::Vertex => Ok(vertex_parameters(entry_point)),
        StageKind::Fragment => fragment_parameters(entry_point),
        StageKind::Hull
        | StageKind::Domain
        | StageKind::Geometry
        | StageKind::Compute
        | StageKind::RayGeneration
        | StageKind::Intersection
        | StageKind::AnyHit
        | StageKind::ClosestHit
        | StageKind::Miss
        | StageKind::Callable
        | StageKind::Mesh
        | StageKind::Amplification => Ok(vec![]),
    }
}

fn vertex_parameters(entry_point: &EntryPointReflection) -> Vec<String> {
    entry_point
        .parameters
        .iter()
        .filter(|parameter| VERTEX_ATTRIBUTES.contains(&parameter.type_name.as_str()))
        .map(|parameter| parameter.type_name.clone())
        .collect()
}

fn fragment_parameters(entry_point: &EntryPointReflection) -> Result<Vec<String>, ParameterError> {
    let mut annotations = entry_point
        .annotations
        .iter()
        .filter(|annotation| annotation.name == TARGETS_ANNOTATION)
        .peekable();

    if annotations.peek().is_none() {
        return Ok(vec![
            DEFAULT_COLOR_TARGET.to_owned(),
            DEFAULT_DEPTH_TARGET.to_owned(),
        ]);
    }

    let mut parameters = Vec::new();
    let mut depth_target: Option<&str> = None;

    for argument in annotations.flat_map(|annotation| &annotation.arguments) {
        let target = match argument.as_str() {
            Some(target) => target,
            None => {
                return Err(ParameterError::NonStringTarget {
                    entry_point: entry_point.name.clone(),
                    value: argument.clone(),
                });
            }
        };

        if is_color_target(target) {
            parameters.push(target.to_owned());
        } else if is_depth_target(target) {
            if let Some(first) = depth_target {
                return Err(ParameterError::MultipleDepthTargets {
                    entry_point: entry_point.name.clone(),
                    first: first.to_owned(),
                    second: target.to_owned(),
                });
            }

            depth_target = Some(target);
            parameters.push(target.to_owned());
        } else {
            return Err(ParameterError::UnknownTarget {
                entry_point: entry_point.name.clone(),
                target: target.to_owned(),
            });
        }
    }

    Ok(parameters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{Annotation, ExecutionStage, ParameterReflection};

    fn entry_point(
        stage: ExecutionStage,
        types: &[&str],
        annotations: Vec<Annotation>,
    ) -> EntryPointReflection {
        EntryPointReflection {
            name: "main".to_owned(),
            stage,
            parameters: types
                .iter()
                .enumerate()
                .map(|(index, ty)| ParameterReflection {
                    name: format!("p{}", index),
                    type_name: ty.to_string(),
                })
                .collect(),
            annotations,
        }
    }

    fn targets(arguments: &[&str]) -> Annotation {
        Annotation {
            name: "targets".to_owned(),
            arguments: arguments
                .iter()
                .map(|argument| AnnotationValue::String(argument.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_vertex_parameters_keep_known_types_in_order() {
        let entry = entry_point(
            ExecutionStage::Vertex,
            &["Normal", "float3", "Vertex3D", "InstanceData", "BoneWeights"],
            vec![],
        );

        assert_eq!(
            extract_parameters(StageKind::Vertex, &entry).unwrap(),
            vec!["Normal", "Vertex3D", "BoneWeights"]
        );
    }

    #[test]
    fn test_vertex_parameters_all_unknown() {
        let entry = entry_point(ExecutionStage::Vertex, &["uint", "Position"], vec![]);
        assert!(extract_parameters(StageKind::Vertex, &entry)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_fragment_parameters_default_targets() {
        let entry = entry_point(ExecutionStage::Fragment, &[], vec![]);
        assert_eq!(
            extract_parameters(StageKind::Fragment, &entry).unwrap(),
            vec!["R8G8B8A8_UNORM", "D32_FLOAT"]
        );

        // Unrelated annotations do not replace the default.
        let entry = entry_point(
            ExecutionStage::Fragment,
            &[],
            vec![Annotation {
                name: "blend".to_owned(),
                arguments: vec![],
            }],
        );
        assert_eq!(
            extract_parameters(StageKind::Fragment, &entry).unwrap(),
            vec!["R8G8B8A8_UNORM", "D32_FLOAT"]
        );
    }

    #[test]
    fn test_fragment_parameters_keep_declaration_order() {
        let entry = entry_point(
            ExecutionStage::Fragment,
            &[],
            vec![targets(&[
                "R16G16B16A16_FLOAT",
                "D24_UNORM_S8_UINT",
                "R8G8B8A8_UNORM_SRGB",
            ])],
        );

        assert_eq!(
            extract_parameters(StageKind::Fragment, &entry).unwrap(),
            vec!["R16G16B16A16_FLOAT", "D24_UNORM_S8_UINT", "R8G8B8A8_UNORM_SRGB"]
        );
    }

    #[test]
    fn test_fragment_parameters_empty_targets() {
        let entry = entry_point(ExecutionStage::Fragment, &[], vec![targets(&[])]);
        assert!(extract_parameters(StageKind::Fragment, &entry)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_fragment_parameters_reject_two_depth_targets() {
        let entry = entry_point(
            ExecutionStage::Fragment,
            &[],
            vec![targets(&["R8G8B8A8_UNORM", "D32_FLOAT", "D16_UNORM"])],
        );

        assert_eq!(
            extract_parameters(StageKind::Fragment, &entry),
            Err(ParameterError::MultipleDepthTargets {
                entry_point: "main".to_owned(),
                first: "D32_FLOAT".to_owned(),
                second: "D16_UNORM".to_owned(),
            })
        );
    }

    #[test]
    fn test_fragment_parameters_depth_rule_spans_annotations() {
        let entry = entry_point(
            ExecutionStage::Fragment,
            &[],
            vec![targets(&["none"]), targets(&["R32_FLOAT", "D16_UNORM"])],
        );

        assert!(matches!(
            extract_parameters(StageKind::Fragment, &entry),
            Err(ParameterError::MultipleDepthTargets { .. })
        ));
    }

    #[test]
    fn test_fragment_parameters_reject_unknown_target() {
        let entry = entry_point(
            ExecutionStage::Fragment,
            &[],
            vec![targets(&["R8G8B8A8_UNORM", "RGBA8"])],
        );

        let err = extract_parameters(StageKind::Fragment, &entry).unwrap_err();
        assert_eq!(
            err,
            ParameterError::UnknownTarget {
                entry_point: "main".to_owned(),
                target: "RGBA8".to_owned(),
            }
        );
        assert!(err.to_string().contains("RGBA8"));
    }

    #[test]
    fn test_fragment_parameters_reject_non_string_target() {
        let entry = entry_point(
            ExecutionStage::Fragment,
            &[],
            vec![Annotation {
                name: "targets".to_owned(),
                arguments: vec![AnnotationValue::Integer(4)],
            }],
        );

        assert!(matches!(
            extract_parameters(StageKind::Fragment, &entry),
            Err(ParameterError::NonStringTarget { .. })
        ));
    }

    #[test]
    fn test_other_stages_have_no_parameters() {
        let entry = entry_point(
            ExecutionStage::Compute,
            &["Vertex3D"],
            vec![targets(&["not-a-format"])],
        );

        for stage in StageKind::ALL {
            if stage == StageKind::Vertex || stage == StageKind::Fragment {
                continue;
            }

            assert!(extract_parameters(stage, &entry).unwrap().is_empty());
        }
    }

    #[test]
    fn test_vocabularies_have_no_structural_bytes() {
        let all = VERTEX_ATTRIBUTES
            .iter()
            .chain(COLOR_TARGETS.iter())
            .chain(DEPTH_TARGETS.iter());

        for text in all {
            assert!(!text
                .bytes()
                .any(|byte| fax_container::STRUCTURAL_BYTES.contains(&byte)));
        }
    }
}

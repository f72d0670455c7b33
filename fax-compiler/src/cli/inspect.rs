use anyhow::{Context, Error as AnyError};
use fax_container::{Container, StageKind};
use serde::Serialize;
use std::{
    io::Write,
    path::{Path, PathBuf},
};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    pub path: PathBuf,
    pub stages: Vec<StageSummary>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct StageSummary {
    pub stage: StageKind,
    pub parameters: Vec<String>,
    pub code_length: usize,
}

impl ContainerSummary {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AnyError> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .with_context(|| format!("failed to read the container `{}`", path.display()))?;
        let container = Container::parse(data)
            .with_context(|| format!("failed to parse the container `{}`", path.display()))?;

        Ok(Self::new(path, &container))
    }

    pub fn new(path: impl Into<PathBuf>, container: &Container) -> Self {
        Self {
            path: path.into(),
            stages: container
                .stages()
                .iter()
                .map(|stage| StageSummary {
                    stage: stage.kind(),
                    parameters: stage.parameters().to_vec(),
                    code_length: stage.code().len(),
                })
                .collect(),
        }
    }
}

pub fn inspect(containers: &[PathBuf], json: bool) -> Result<(), AnyError> {
    let stdout = std::io::stdout();
    inspect_to(&mut stdout.lock(), containers, json)
}

pub fn inspect_to(
    writer: &mut impl Write,
    containers: &[PathBuf],
    json: bool,
) -> Result<(), AnyError> {
    let summaries = containers
        .iter()
        .map(ContainerSummary::load)
        .collect::<Result<Vec<_>, _>>()?;

    if json {
        serde_json::to_writer_pretty(&mut *writer, &summaries)?;
        writeln!(writer)?;
        return Ok(());
    }

    for summary in &summaries {
        writeln!(
            writer,
            "{} ({} stages)",
            summary.path.display(),
            summary.stages.len()
        )?;

        for stage in &summary.stages {
            writeln!(
                writer,
                "  {}<{}> {} bytes",
                stage.stage,
                stage.parameters.join(","),
                stage.code_length
            )?;
        }
    }

    Ok(())
}

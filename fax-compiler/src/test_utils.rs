use crate::compiler::{
    Diagnostic, EntryPointReflection, ExecutionStage, ResourceBlockLayout, ShaderCompiler,
};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
};

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

/// Directory under the system temp dir, removed on drop.
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    pub fn new(label: &str) -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "fax-compiler-{}-{}-{}",
            label,
            std::process::id(),
            id
        ));

        if path.exists() {
            std::fs::remove_dir_all(&path).unwrap();
        }
        std::fs::create_dir_all(&path).unwrap();

        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, relative: impl AsRef<Path>, content: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path.join(relative);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();

        path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

/// In-memory compiler backend keyed by module path.
#[derive(Debug, Default)]
pub struct FakeCompiler {
    pub modules: BTreeMap<PathBuf, FakeModule>,
    pub compiled: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeModule {
    pub entry_points: Vec<EntryPointReflection>,
    pub resource_blocks: BTreeMap<usize, ResourceBlockLayout>,
    pub codegen_diagnostic: Option<String>,
}

impl FakeCompiler {
    pub fn with_module(mut self, path: impl Into<PathBuf>, module: FakeModule) -> Self {
        self.modules.insert(path.into(), module);
        self
    }
}

impl FakeModule {
    pub fn new(entry_points: Vec<EntryPointReflection>) -> Self {
        Self {
            entry_points,
            ..Default::default()
        }
    }
}

pub fn fake_entry_point(name: &str, stage: ExecutionStage) -> EntryPointReflection {
    EntryPointReflection {
        name: name.to_owned(),
        stage,
        parameters: vec![],
        annotations: vec![],
    }
}

impl ShaderCompiler for FakeCompiler {
    type Module = FakeModule;

    fn extensions(&self) -> &'static [&'static str] {
        &["slang", "fslang"]
    }

    fn load_module(&mut self, path: &Path) -> Result<Self::Module, Diagnostic> {
        self.modules
            .get(path)
            .cloned()
            .ok_or_else(|| Diagnostic(format!("cannot open `{}`", path.display())))
    }

    fn entry_points(&self, module: &Self::Module) -> Vec<EntryPointReflection> {
        module.entry_points.clone()
    }

    fn resource_blocks(&self, module: &Self::Module) -> BTreeMap<usize, ResourceBlockLayout> {
        module.resource_blocks.clone()
    }

    fn generate_code(
        &mut self,
        module: &Self::Module,
        entry_point: &EntryPointReflection,
        _target_index: usize,
    ) -> Result<Vec<u8>, Diagnostic> {
        if let Some(diagnostic) = &module.codegen_diagnostic {
            return Err(Diagnostic(diagnostic.clone()));
        }

        self.compiled.push(entry_point.name.clone());
        Ok(format!("code:{}", entry_point.name).into_bytes())
    }
}

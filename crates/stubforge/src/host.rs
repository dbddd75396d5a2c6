/// Collaborator interfaces
///
/// The generator itself neither compiles scripts nor hosts the scripting
/// runtime; these traits describe what it needs from the components that do.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// A library currently loaded by the hosting process.
#[derive(Debug, Clone)]
pub struct LoadedLibrary {
    /// Simple library name, without extension.
    pub name: String,
    /// On-disk location the bytes can be read from.
    pub path: PathBuf,
    /// Generated at run time, with no backing file.
    pub is_dynamic: bool,
    /// Executable rather than a support library.
    pub has_entry_point: bool,
}

/// Enumerates the scripting runtime's own support libraries so standalone
/// builds can bundle them.
pub trait RuntimeHost {
    fn loaded_libraries(&self) -> Vec<LoadedLibrary>;

    /// Name prefixes identifying the runtime's own libraries.
    fn library_prefixes(&self) -> Vec<String>;
}

/// Metadata handed to the external module compiler.
#[derive(Debug, Clone, Default)]
pub struct CompileMetadata {
    pub main_module: String,
    pub file_version: String,
    pub copyright: String,
    pub product_name: String,
    pub product_version: String,
}

/// The scripting language's own compiler: turns source files into one
/// compiled module on disk.
pub trait ModuleCompiler {
    fn compile_module(
        &self,
        output: &Path,
        metadata: &CompileMetadata,
        sources: &[PathBuf],
    ) -> Result<()>;
}

/// Diagnostic description of the scripting engine; used only for the startup
/// banner, never functionally.
pub trait ScriptEngineInfo {
    fn display_name(&self) -> String;
    fn language_version(&self) -> String;
}

/// A `RuntimeHost` backed by a fixed library list, for callers that know the
/// runtime installation layout up front (the CLI, tests).
#[derive(Debug, Clone, Default)]
pub struct StaticHost {
    libraries: Vec<LoadedLibrary>,
    prefixes: Vec<String>,
}

impl StaticHost {
    pub fn new(libraries: Vec<LoadedLibrary>, prefixes: Vec<String>) -> Self {
        Self {
            libraries,
            prefixes,
        }
    }

    /// Build a host from support-library file paths; every listed library is
    /// treated as a bundlable runtime dependency, so each library's own name
    /// doubles as a matching prefix.
    pub fn from_paths(paths: &[PathBuf]) -> Self {
        let libraries: Vec<LoadedLibrary> = paths
            .iter()
            .map(|path| LoadedLibrary {
                name: path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                path: path.clone(),
                is_dynamic: false,
                has_entry_point: false,
            })
            .collect();
        let prefixes = libraries.iter().map(|l| l.name.clone()).collect();
        Self::new(libraries, prefixes)
    }
}

impl RuntimeHost for StaticHost {
    fn loaded_libraries(&self) -> Vec<LoadedLibrary> {
        self.libraries.clone()
    }

    fn library_prefixes(&self) -> Vec<String> {
        self.prefixes.clone()
    }
}

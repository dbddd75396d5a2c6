/// Build pipeline
///
/// Runs the three stages in order, each completing before the next starts:
/// packager, synthesizer, emitter. One invocation produces one output.

use std::path::PathBuf;

use tracing::info;

use crate::config::{LaunchConfig, TargetKind};
use crate::emit::emit;
use crate::error::Result;
use crate::host::{CompileMetadata, ModuleCompiler, RuntimeHost, ScriptEngineInfo};
use crate::package::package;
use crate::synth::synthesize;

/// What a build produced.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    /// Path of the compiled module. For embedded builds the file no longer
    /// exists on disk; its bytes live inside the launcher.
    pub module_path: PathBuf,
    /// Path of the emitted launcher; `None` for library-only builds.
    pub launcher_path: Option<PathBuf>,
    /// Resource names embedded in the launcher.
    pub resource_names: Vec<String>,
}

/// The launcher builder. Owns a validated configuration and runs the
/// pipeline against collaborator implementations.
pub struct Builder {
    config: LaunchConfig,
}

impl Builder {
    /// Validate the configuration and create a builder; configuration errors
    /// surface here, before any pipeline stage runs.
    pub fn new(config: LaunchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    /// Build the launcher for an already-compiled module sitting at the
    /// configured module path.
    pub fn build(&self, host: &dyn RuntimeHost) -> Result<BuildOutput> {
        let module_path = self.config.module_path();

        if self.config.target == TargetKind::Library {
            info!(output = %module_path.display(), "library target, no launcher emitted");
            return Ok(BuildOutput {
                module_path,
                launcher_path: None,
                resource_names: Vec::new(),
            });
        }

        let packaged = package(&self.config, host)?;
        let program = synthesize(&self.config, &packaged);
        let resource_names = program.resource_names.clone();
        let launcher_path = emit(&self.config, &program, packaged.resources)?;

        Ok(BuildOutput {
            module_path,
            launcher_path: Some(launcher_path),
            resource_names,
        })
    }

    /// Compile the sources with the external module compiler, then build the
    /// launcher. The engine description is logged for diagnostics only.
    pub fn build_from_sources(
        &self,
        engine: &dyn ScriptEngineInfo,
        compiler: &dyn ModuleCompiler,
        host: &dyn RuntimeHost,
        sources: &[PathBuf],
    ) -> Result<BuildOutput> {
        info!(
            engine = %engine.display_name(),
            version = %engine.language_version(),
            "compiling module"
        );

        let metadata = CompileMetadata {
            main_module: self.config.main_module.clone(),
            file_version: self.config.file_version.clone(),
            copyright: self.config.copyright.clone(),
            product_name: self.config.product_name.clone(),
            product_version: self.config.product_version.clone(),
        };
        compiler.compile_module(&self.config.module_path(), &metadata, sources)?;

        self.build(host)
    }
}
